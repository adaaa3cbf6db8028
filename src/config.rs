use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_PRINTER: &str = "HP577dw";

/// What to do with a message once a rule matches it.
///
/// This is a closed set: unknown action strings are rejected at config load,
/// never coerced into a no-op at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Print,
    Archive,
    Delete,
    Clickup,
}

impl Action {
    pub fn parse(s: &str) -> Option<Action> {
        match s {
            "print" => Some(Action::Print),
            "archive" => Some(Action::Archive),
            "delete" => Some(Action::Delete),
            "clickup" => Some(Action::Clickup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Print => "print",
            Action::Archive => "archive",
            Action::Delete => "delete",
            Action::Clickup => "clickup",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative match conditions for one rule.
///
/// Every field is independently optional; an absent field places no
/// constraint on that attribute. For newsletters the common combination is
/// `header_list_id_contains` plus `requires_unsubscribe_header`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchCriteria {
    pub header_list_id_contains: Option<String>,
    pub requires_unsubscribe_header: bool,
    pub from_domain: Option<String>,
    pub from_exact: Option<String>,
    pub subject_contains: Option<String>,
    pub subject_excludes: Option<String>,
}

/// One named triage rule: declarative criteria plus the action to take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRule {
    pub name: String,
    pub action: Action,
    #[serde(rename = "match")]
    pub criteria: MatchCriteria,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub printer_name: String,
    #[serde(rename = "print_rules")]
    pub rules: Vec<TriageRule>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Safe default when no config exists yet: nothing matches anything.
        AppConfig {
            printer_name: DEFAULT_PRINTER.to_string(),
            rules: Vec::new(),
        }
    }
}

impl AppConfig {
    /// A small starter config written by `--generate-config`.
    pub fn sample() -> Self {
        AppConfig {
            printer_name: DEFAULT_PRINTER.to_string(),
            rules: vec![
                TriageRule {
                    name: "Print 1440 Daily".to_string(),
                    action: Action::Print,
                    criteria: MatchCriteria {
                        header_list_id_contains: Some("daily.join1440.com".to_string()),
                        requires_unsubscribe_header: true,
                        ..Default::default()
                    },
                },
                TriageRule {
                    name: "Archive order confirmations".to_string(),
                    action: Action::Archive,
                    criteria: MatchCriteria {
                        from_domain: Some("example.com".to_string()),
                        subject_contains: Some("order".to_string()),
                        ..Default::default()
                    },
                },
            ],
        }
    }

    /// Parse and validate a config document.
    ///
    /// Validation errors identify the offending rule by name, or by position
    /// when the name itself is unusable.
    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let root: Value = serde_json::from_str(data).context("config is not valid JSON")?;
        let obj = match root.as_object() {
            Some(obj) => obj,
            None => bail!("config file root must be a JSON object"),
        };

        let printer_name = match obj.get("printer_name") {
            None => DEFAULT_PRINTER.to_string(),
            Some(v) => match v.as_str().map(str::trim) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => bail!("config 'printer_name' must be a non-empty string"),
            },
        };

        let rules_raw = match obj.get("print_rules") {
            None => &[] as &[Value],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => bail!("config 'print_rules' must be a list"),
        };

        let mut rules = Vec::with_capacity(rules_raw.len());
        let mut seen: HashSet<String> = HashSet::new();
        for (i, raw) in rules_raw.iter().enumerate() {
            let rule = parse_rule(raw).with_context(|| format!("in rule #{}", i + 1))?;
            if !seen.insert(rule.name.to_lowercase()) {
                bail!("duplicate rule name '{}' (names are case-insensitive)", rule.name);
            }
            rules.push(rule);
        }

        Ok(AppConfig {
            printer_name,
            rules,
        })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

fn parse_rule(raw: &Value) -> anyhow::Result<TriageRule> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => bail!("rule must be a JSON object"),
    };

    let name = match obj.get("name").and_then(Value::as_str).map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => bail!("rule must have a non-empty 'name' string"),
    };

    let action = match obj.get("action").and_then(Value::as_str) {
        Some(a) => match Action::parse(a) {
            Some(action) => action,
            None => bail!("rule '{}' has invalid action: {:?}", name, a),
        },
        None => bail!("rule '{}' must have an 'action' string", name),
    };

    let criteria = match obj.get("match") {
        Some(v) if v.is_object() => serde_json::from_value(v.clone())
            .with_context(|| format!("rule '{}' has a malformed 'match' object", name))?,
        _ => bail!("rule '{}' must have a 'match' object", name),
    };

    Ok(TriageRule {
        name,
        action,
        criteria,
    })
}

/// Per-user config location, overridable via MAILSIFT_CONFIG_PATH.
pub fn default_config_path() -> PathBuf {
    if let Ok(override_path) = std::env::var("MAILSIFT_CONFIG_PATH") {
        return PathBuf::from(override_path);
    }
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".config").join("mailsift").join("config.json")
}

/// Load the config from `path`, or the safe empty default when no file
/// exists yet.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    AppConfig::from_json(&data)
        .with_context(|| format!("invalid config {}", path.display()))
}

/// Save atomically: write a temp file next to the target, then rename over.
pub fn save_config(cfg: &AppConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, cfg.to_json()?)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    log::info!("saved config with {} rules to {}", cfg.rules.len(), path.display());
    Ok(())
}

/// Add a rule, or replace an existing one with the same name
/// (case-insensitive). Order of the surviving rules is preserved.
pub fn add_rule(cfg: &AppConfig, rule: TriageRule) -> AppConfig {
    let mut rules = cfg.rules.clone();
    let key = rule.name.to_lowercase();
    match rules.iter_mut().find(|r| r.name.to_lowercase() == key) {
        Some(slot) => *slot = rule,
        None => rules.push(rule),
    }
    AppConfig {
        printer_name: cfg.printer_name.clone(),
        rules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_json(name: &str, action: &str) -> String {
        format!(
            r#"{{"printer_name": "HP577dw",
                 "print_rules": [{{"name": "{name}", "action": "{action}",
                                  "match": {{"from_domain": "example.com"}}}}]}}"#
        )
    }

    #[test]
    fn test_round_trip() {
        let cfg = AppConfig::sample();
        let json = cfg.to_json().unwrap();
        let back = AppConfig::from_json(&json).unwrap();
        assert_eq!(back.printer_name, cfg.printer_name);
        assert_eq!(back.rules, cfg.rules);
    }

    #[test]
    fn test_invalid_action_names_the_rule() {
        let err = AppConfig::from_json(&rule_json("Weekly digest", "shred")).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Weekly digest"), "got: {msg}");
        assert!(msg.contains("shred"), "got: {msg}");
    }

    #[test]
    fn test_empty_name_rejected_with_position() {
        let err = AppConfig::from_json(&rule_json("   ", "print")).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("rule #1"), "got: {msg}");
        assert!(msg.contains("non-empty 'name'"), "got: {msg}");
    }

    #[test]
    fn test_match_must_be_an_object() {
        let data = r#"{"print_rules": [{"name": "x", "action": "print", "match": "nope"}]}"#;
        let err = AppConfig::from_json(data).unwrap_err();
        assert!(format!("{err:#}").contains("'match' object"));
    }

    #[test]
    fn test_duplicate_names_rejected_case_insensitively() {
        let data = r#"{"print_rules": [
            {"name": "Daily", "action": "print", "match": {}},
            {"name": "daily", "action": "archive", "match": {}}
        ]}"#;
        let err = AppConfig::from_json(data).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate rule name"));
    }

    #[test]
    fn test_missing_printer_name_defaults() {
        let cfg = AppConfig::from_json(r#"{"print_rules": []}"#).unwrap();
        assert_eq!(cfg.printer_name, "HP577dw");
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(AppConfig::from_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_load_missing_file_is_safe_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.json")).unwrap();
        assert!(cfg.rules.is_empty());
        assert_eq!(cfg.printer_name, "HP577dw");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = AppConfig::sample();
        save_config(&cfg, &path).unwrap();
        let back = load_config(&path).unwrap();
        assert_eq!(back.rules.len(), 2);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_add_rule_replaces_by_name() {
        let cfg = AppConfig::sample();
        let replacement = TriageRule {
            name: "PRINT 1440 DAILY".to_string(),
            action: Action::Archive,
            criteria: MatchCriteria::default(),
        };
        let updated = add_rule(&cfg, replacement);
        assert_eq!(updated.rules.len(), 2);
        // Replaced in place, keeping its slot in the order.
        assert_eq!(updated.rules[0].action, Action::Archive);
        assert_eq!(updated.rules[1].name, "Archive order confirmations");
    }

    #[test]
    fn test_add_rule_appends_new_names() {
        let cfg = AppConfig::default();
        let updated = add_rule(
            &cfg,
            TriageRule {
                name: "New".to_string(),
                action: Action::Delete,
                criteria: MatchCriteria::default(),
            },
        );
        assert_eq!(updated.rules.len(), 1);
    }

    #[test]
    fn test_action_parse_is_closed() {
        assert_eq!(Action::parse("print"), Some(Action::Print));
        assert_eq!(Action::parse("clickup"), Some(Action::Clickup));
        assert_eq!(Action::parse("Print"), None);
        assert_eq!(Action::parse("forward"), None);
    }

    #[test]
    fn test_criteria_absent_fields_survive_round_trip() {
        let c = MatchCriteria {
            subject_excludes: Some("promo".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: MatchCriteria = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
