use crate::config::{Action, AppConfig, MatchCriteria, TriageRule};
use crate::message::{normalize_sender, MailContext};

/// One compiled match condition. The closed variant set keeps the
/// "no constraints means never match" invariant testable and makes the
/// compiled form of a rule inspectable, unlike opaque closures.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchCondition {
    /// Case-insensitive, whitespace-trimmed equality against the normalized
    /// sender address.
    FromExact(String),
    /// Lenient containment of `@<domain>` anywhere in the lower-cased raw
    /// From value. Intentionally not a structural domain check; see the
    /// pinned test below before tightening this.
    FromDomain(String),
    SubjectContains(String),
    SubjectExcludes(String),
}

impl MatchCondition {
    pub fn matches(&self, msg: &MailContext) -> bool {
        match self {
            MatchCondition::FromExact(addr) => {
                normalize_sender(&msg.from_email).to_lowercase() == *addr
            }
            MatchCondition::FromDomain(domain) => msg
                .from_email
                .to_lowercase()
                .contains(&format!("@{domain}")),
            MatchCondition::SubjectContains(needle) => {
                msg.subject.to_lowercase().contains(needle)
            }
            MatchCondition::SubjectExcludes(needle) => {
                !msg.subject.to_lowercase().contains(needle)
            }
        }
    }
}

/// A rule ready for evaluation: name, action, and the AND of its conditions.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub action: Action,
    conditions: Vec<MatchCondition>,
}

impl CompiledRule {
    pub fn matches(&self, msg: &MailContext) -> bool {
        // An unconfigured rule must never match anything.
        if self.conditions.is_empty() {
            return false;
        }
        self.conditions.iter().all(|c| c.matches(msg))
    }

    pub fn conditions(&self) -> &[MatchCondition] {
        &self.conditions
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Compile declarative criteria into match conditions. Never fails: empty or
/// absent fields simply contribute no condition. Needles are lower-cased here
/// once so evaluation only lower-cases the message side.
pub fn compile_criteria(criteria: &MatchCriteria) -> Vec<MatchCondition> {
    let mut conditions = Vec::new();
    if let Some(addr) = non_empty(&criteria.from_exact) {
        conditions.push(MatchCondition::FromExact(addr.to_lowercase()));
    }
    if let Some(domain) = non_empty(&criteria.from_domain) {
        conditions.push(MatchCondition::FromDomain(domain.to_lowercase()));
    }
    if let Some(needle) = non_empty(&criteria.subject_contains) {
        conditions.push(MatchCondition::SubjectContains(needle.to_lowercase()));
    }
    if let Some(needle) = non_empty(&criteria.subject_excludes) {
        conditions.push(MatchCondition::SubjectExcludes(needle.to_lowercase()));
    }
    conditions
}

pub fn compile_rule(rule: &TriageRule) -> CompiledRule {
    CompiledRule {
        name: rule.name.clone(),
        action: rule.action,
        conditions: compile_criteria(&rule.criteria),
    }
}

/// Ordered rule list with first-match-wins evaluation.
pub struct RulesEngine {
    rules: Vec<CompiledRule>,
}

impl RulesEngine {
    pub fn new(rules: Vec<CompiledRule>) -> Self {
        RulesEngine { rules }
    }

    /// Compile every rule in configuration order.
    pub fn from_config(cfg: &AppConfig) -> Self {
        RulesEngine::new(cfg.rules.iter().map(compile_rule).collect())
    }

    /// Return the first rule whose conditions all hold, or None.
    /// Deterministic and side-effect-free; order is configuration order.
    pub fn first_match(&self, msg: &MailContext) -> Option<&CompiledRule> {
        for rule in &self.rules {
            if rule.matches(msg) {
                log::debug!(
                    "rule '{}' matched message {} (action: {})",
                    rule.name,
                    msg.message_id,
                    rule.action
                );
                return Some(rule);
            }
        }
        None
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
