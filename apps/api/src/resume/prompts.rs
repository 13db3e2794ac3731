// Resume extraction prompt.
//
// The JSON shape below is the contract with the model: ParsedResume
// deserializes exactly these keys. Bump RESUME_PROMPT_VERSION whenever the
// template changes.

pub const RESUME_PROMPT_VERSION: &str = "resume-extract/v2";

pub const RESUME_EXTRACT_INSTRUCTIONS: &str = r#"Below is the text extracted from a resume, followed by the hyperlinks (URLs) found in it.
Extract the candidate's name, email, phone number, skills, work experience, education, projects, certifications and links.

Respond in exactly this JSON format:

{"name": "<name>", "email": "<email>", "phone": "<phone>", "skills": ["<skill1>", "<skill2>", ...], "education": [{"institution": "<institution_name>", "degree": "<degree>", "startDate": "<start_date>", "endDate": "<end_date>"}, ...], "workExperience": [{"company": "<company_name>", "role": "<role>", "startDate": "<start_date>", "endDate": "<end_date>", "description": "<description>"}, ...], "projects": [{"title": "<project_title>", "description": "<project_description>", "links": ["<url1>", "<url2>", ...]}, ...], "certifications": ["<certification1>", "<certification2>", ...], "links": ["<url1>", "<url2>", ...], "linkedIn": "<url>", "github": "<url>", "leetcode": "<url>", "codechef": "<url>"}

RULES:
1. Return ONLY the JSON object. No explanations, no extra text.
2. If any of the specified information is missing, use the string "not found" as its value.
3. Do not write "\n" or "\" escape sequences inside values.
4. Put every URL you find in "links". When a URL is a LinkedIn, GitHub, LeetCode or CodeChef profile, also put it under the matching key; otherwise that key is "not found"."#;

/// Builds the single prompt sent for one resume.
pub fn build_resume_prompt(text: &str, links: &[String]) -> String {
    let links = if links.is_empty() {
        "(none)".to_string()
    } else {
        links.join("\n")
    };
    format!(
        "{RESUME_EXTRACT_INSTRUCTIONS}\n\nRESUME TEXT:\n{}\n\nEXTRACTED LINKS:\n{links}\n",
        text.trim_end()
    )
}
