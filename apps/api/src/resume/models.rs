//! Structured resume record produced by the normalizer.
//!
//! Every field that the model could not resolve carries the literal string
//! `"not found"` on the wire. The JSON shape never loses a key and never
//! contains `null`.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Sentinel written in place of any unresolved field.
pub const NOT_FOUND: &str = "not found";

/// A resume field that is either resolved or explicitly marked as not found.
#[derive(Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    Found(T),
    NotFound,
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Extracted::NotFound
    }
}

impl<T> Extracted<T> {
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Extracted::Found(v) => Some(v),
            Extracted::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Extracted::Found(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for Extracted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extracted::Found(v) => v.fmt(f),
            Extracted::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

impl<T: Serialize> Serialize for Extracted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Extracted::Found(v) => v.serialize(serializer),
            Extracted::NotFound => serializer.serialize_str(NOT_FOUND),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Extracted<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if is_sentinel(&value) {
            return Ok(Extracted::NotFound);
        }
        let strict = match T::deserialize(value.clone()) {
            Ok(v) => return Ok(Extracted::Found(v)),
            Err(e) => e,
        };
        match loosen(value) {
            Value::Array(items) if items.is_empty() => Ok(Extracted::NotFound),
            loosened => T::deserialize(loosened)
                .map(Extracted::Found)
                .map_err(|_| D::Error::custom(strict)),
        }
    }
}

/// Second chance for values with the right meaning but the wrong JSON type:
/// numbers and booleans become strings and sentinel items leave arrays.
fn loosen(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !is_sentinel(item))
                .map(loosen)
                .collect(),
        ),
        other => other,
    }
}

/// `null`, an empty string and any casing/padding of "not found" all mean
/// the model had nothing for this field.
fn is_sentinel(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_sentinel_str(s),
        _ => false,
    }
}

fn is_sentinel_str(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case(NOT_FOUND)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub institution: Extracted<String>,
    pub degree: Extracted<String>,
    pub start_date: Extracted<String>,
    pub end_date: Extracted<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkExperience {
    pub company: Extracted<String>,
    pub role: Extracted<String>,
    pub start_date: Extracted<String>,
    pub end_date: Extracted<String>,
    pub description: Extracted<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub title: Extracted<String>,
    pub description: Extracted<String>,
    pub links: Extracted<Vec<String>>,
}

/// The parsed resume returned by `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParsedResume {
    pub name: Extracted<String>,
    pub email: Extracted<String>,
    pub phone: Extracted<String>,
    pub skills: Extracted<Vec<String>>,
    pub education: Extracted<Vec<Education>>,
    pub work_experience: Extracted<Vec<WorkExperience>>,
    pub projects: Extracted<Vec<Project>>,
    pub certifications: Extracted<Vec<String>>,
    pub links: Extracted<Vec<String>>,
    pub linked_in: Extracted<String>,
    pub github: Extracted<String>,
    pub leetcode: Extracted<String>,
    pub codechef: Extracted<String>,
    /// Keys the model returned beyond the documented shape.
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

impl ParsedResume {
    /// Drops sentinel and blank entries from string lists and removes
    /// duplicates while keeping first-seen order. A list left empty
    /// becomes `NotFound`.
    pub fn tidy(&mut self) {
        tidy_list(&mut self.skills, |s| s.to_lowercase());
        tidy_list(&mut self.certifications, |s| s.to_string());
        tidy_list(&mut self.links, |s| s.to_string());
        if let Extracted::Found(projects) = &mut self.projects {
            for project in projects.iter_mut() {
                tidy_list(&mut project.links, |s| s.to_string());
            }
        }
    }

    /// Appends `urls` to `links`, skipping ones already present.
    pub fn merge_links(&mut self, urls: &[String]) {
        if urls.is_empty() {
            return;
        }
        if !self.links.is_found() {
            self.links = Extracted::Found(Vec::new());
        }
        if let Extracted::Found(links) = &mut self.links {
            for url in urls {
                if !links.iter().any(|existing| existing == url) {
                    links.push(url.clone());
                }
            }
        }
    }
}

fn tidy_list(list: &mut Extracted<Vec<String>>, key: impl Fn(&str) -> String) {
    let Extracted::Found(items) = list else {
        return;
    };
    let mut seen = Vec::with_capacity(items.len());
    items.retain(|item| {
        if is_sentinel_str(item) {
            return false;
        }
        let k = key(item.trim());
        if seen.contains(&k) {
            false
        } else {
            seen.push(k);
            true
        }
    });
    for item in items.iter_mut() {
        *item = item.trim().to_string();
    }
    if items.is_empty() {
        *list = Extracted::NotFound;
    }
}

/// Response envelope for a processed upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: ParsedResume,
}
