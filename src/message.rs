use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Minimal message projection used for rule evaluation.
///
/// Only header-derived fields are carried; body content is never needed for
/// matching. `headers` is keyed by lower-cased header name.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailContext {
    pub message_id: String,
    pub from_email: String,
    pub subject: String,
    pub headers: HashMap<String, String>,
}

impl MailContext {
    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

static ANGLE_ADDR: OnceLock<Regex> = OnceLock::new();

/// Normalize an RFC 2822 style From value to a bare address.
///
/// `"Jane Doe" <jane@example.com>` becomes `jane@example.com`; a value with
/// no angle-bracket part is returned trimmed as-is.
pub fn normalize_sender(raw: &str) -> String {
    let re = ANGLE_ADDR.get_or_init(|| {
        Regex::new(r"<\s*([^<>\s]+@[^<>\s]+)\s*>").unwrap()
    });
    if let Some(caps) = re.captures(raw) {
        return caps[1].trim().to_string();
    }
    raw.trim().to_string()
}

/// Lower-case all header names, keeping the last value on collision.
pub fn lower_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect()
}
