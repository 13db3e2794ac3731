//! Deterministic mapping of URLs onto recognized profile keys.
//!
//! The model is asked to fill these keys too, but its answer is replaced by
//! whatever the URLs actually say.

use reqwest::Url;

use crate::resume::models::{Extracted, ParsedResume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSite {
    LinkedIn,
    GitHub,
    LeetCode,
    CodeChef,
}

impl ProfileSite {
    pub const ALL: [ProfileSite; 4] = [
        ProfileSite::LinkedIn,
        ProfileSite::GitHub,
        ProfileSite::LeetCode,
        ProfileSite::CodeChef,
    ];

    /// JSON key in `ParsedResume`.
    pub fn key(self) -> &'static str {
        match self {
            ProfileSite::LinkedIn => "linkedIn",
            ProfileSite::GitHub => "github",
            ProfileSite::LeetCode => "leetcode",
            ProfileSite::CodeChef => "codechef",
        }
    }

    fn domain(self) -> &'static str {
        match self {
            ProfileSite::LinkedIn => "linkedin.com",
            ProfileSite::GitHub => "github.com",
            ProfileSite::LeetCode => "leetcode.com",
            ProfileSite::CodeChef => "codechef.com",
        }
    }

    /// The site a URL belongs to, matched on host (subdomains included).
    /// Scheme-less URLs such as `github.com/jane` are accepted.
    pub fn recognize(url: &str) -> Option<Self> {
        let url = url.trim();
        let parsed = if url.contains("://") {
            Url::parse(url).ok()?
        } else {
            Url::parse(&format!("https://{url}")).ok()?
        };
        let host = parsed.host_str()?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|site| {
            let domain = site.domain();
            host == domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    fn slot(self, resume: &mut ParsedResume) -> &mut Extracted<String> {
        match self {
            ProfileSite::LinkedIn => &mut resume.linked_in,
            ProfileSite::GitHub => &mut resume.github,
            ProfileSite::LeetCode => &mut resume.leetcode,
            ProfileSite::CodeChef => &mut resume.codechef,
        }
    }
}

/// Merges the PDF's annotation links into `links`, then sets each profile
/// key to the first URL on that site, or to `NotFound`.
pub fn apply_profiles(resume: &mut ParsedResume, pdf_links: &[String]) {
    resume.merge_links(pdf_links);

    let candidates: Vec<String> = resume.links.as_ref().cloned().unwrap_or_default();
    for site in ProfileSite::ALL {
        let found = candidates
            .iter()
            .find(|url| ProfileSite::recognize(url) == Some(site))
            .cloned();
        *site.slot(resume) = match found {
            Some(url) => Extracted::Found(url),
            None => Extracted::NotFound,
        };
    }

    // Differently-cased variants of the profile keys would shadow the real ones.
    resume.additional.retain(|key, _| {
        !ProfileSite::ALL
            .iter()
            .any(|site| site.key().eq_ignore_ascii_case(key))
    });
}
