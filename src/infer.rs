use crate::config::{Action, MatchCriteria, TriageRule};
use crate::message::{lower_headers, normalize_sender};
use anyhow::bail;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct Inference {
    pub rule: TriageRule,
    pub confidence: Confidence,
    pub explanation: String,
}

/// Pick a stable match token out of a List-Id value like
/// `1440 Daily Digest <daily.join1440.com>`.
fn list_id_token(raw: &str) -> String {
    let cleaned = raw.trim().trim_matches(|c| c == '<' || c == '>').trim();
    let token = cleaned.split_whitespace().next().unwrap_or(cleaned);
    // Very long List-Ids keep their stable suffix (it tends to end in the
    // sending domain).
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 80 {
        chars[chars.len() - 60..].iter().collect()
    } else {
        token.to_string()
    }
}

/// Infer durable match criteria for a newsletter from one or more example
/// emails' headers.
///
/// Priority ladder:
///   1. List-Id contains (very stable) -> high confidence
///   2. From domain + List-Unsubscribe present -> medium confidence
///   3. From exact -> low confidence
pub fn infer_rule(
    rule_name: &str,
    example_headers: &[HashMap<String, String>],
) -> anyhow::Result<Inference> {
    if example_headers.is_empty() {
        bail!("no example headers provided for inference");
    }

    let lowered: Vec<HashMap<String, String>> =
        example_headers.iter().map(lower_headers).collect();

    let list_ids: Vec<&str> = lowered
        .iter()
        .filter_map(|h| h.get("list-id").map(String::as_str))
        .filter(|v| !v.is_empty())
        .collect();
    let unsub = lowered.iter().any(|h| h.contains_key("list-unsubscribe"));

    if let Some(first) = list_ids.first() {
        let token = list_id_token(first);
        let rule = TriageRule {
            name: rule_name.to_string(),
            action: Action::Print,
            criteria: MatchCriteria {
                header_list_id_contains: Some(token.clone()),
                requires_unsubscribe_header: unsub,
                ..Default::default()
            },
        };
        let mut explanation = format!("Using List-Id header contains '{token}'.");
        if unsub {
            explanation.push_str(" Also requiring List-Unsubscribe header.");
        }
        return Ok(Inference {
            rule,
            confidence: Confidence::High,
            explanation,
        });
    }

    let from_vals: Vec<&str> = lowered
        .iter()
        .filter_map(|h| h.get("from").map(String::as_str))
        .filter(|v| !v.is_empty())
        .collect();

    if from_vals.is_empty() {
        bail!("could not infer a rule (missing List-Id and From headers)");
    }

    let addrs: Vec<String> = from_vals.iter().map(|v| normalize_sender(v)).collect();
    let domains: Vec<String> = addrs
        .iter()
        .filter_map(|a| a.split_once('@').map(|(_, d)| d.to_lowercase()))
        .collect();

    if let Some(dom) = domains.first() {
        let rule = TriageRule {
            name: rule_name.to_string(),
            action: Action::Print,
            criteria: MatchCriteria {
                from_domain: Some(dom.clone()),
                requires_unsubscribe_header: unsub,
                ..Default::default()
            },
        };
        let explanation = if unsub {
            format!("Using From domain '{dom}' and requiring List-Unsubscribe header.")
        } else {
            format!("Using From domain '{dom}'.")
        };
        return Ok(Inference {
            rule,
            confidence: Confidence::Medium,
            explanation,
        });
    }

    let addr0 = addrs[0].clone();
    let rule = TriageRule {
        name: rule_name.to_string(),
        action: Action::Print,
        criteria: MatchCriteria {
            from_exact: Some(addr0.clone()),
            ..Default::default()
        },
    };
    Ok(Inference {
        rule,
        confidence: Confidence::Low,
        explanation: format!(
            "Using exact From value '{addr0}'. Consider another sample for better stability."
        ),
    })
}
