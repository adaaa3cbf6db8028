use crate::config::Action;
use crate::message::MailContext;
use crate::rules::RulesEngine;
use serde::{Deserialize, Serialize};

/// One planned action: which message, which rule claimed it, what to do.
/// The plan carries no mutation; a dry run is simply a plan that is never
/// handed to an executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub message_id: String,
    pub rule_name: String,
    pub action: Action,
}

/// Evaluate a batch of messages against the engine, in batch order.
/// Messages that match no rule are skipped.
pub fn build_plan(engine: &RulesEngine, messages: &[MailContext]) -> Vec<PlanEntry> {
    let mut plan = Vec::new();
    for msg in messages {
        match engine.first_match(msg) {
            Some(rule) => {
                log::info!(
                    "planned {} for message {} (rule '{}')",
                    rule.action,
                    msg.message_id,
                    rule.name
                );
                plan.push(PlanEntry {
                    message_id: msg.message_id.clone(),
                    rule_name: rule.name.clone(),
                    action: rule.action,
                });
            }
            None => {
                log::debug!("no rule matched message {}", msg.message_id);
            }
        }
    }
    plan
}

/// The execution collaborator seam. Implementations perform the actual
/// print/archive/delete/task side effects; this crate never does.
pub trait ActionExecutor {
    fn execute(&mut self, entry: &PlanEntry) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct PlanOutcome {
    pub entry: PlanEntry,
    pub result: anyhow::Result<()>,
}

/// Run every entry through the executor, collecting per-item outcomes.
/// A failing entry does not stop the rest of the plan.
pub fn execute_plan(executor: &mut dyn ActionExecutor, plan: &[PlanEntry]) -> Vec<PlanOutcome> {
    plan.iter()
        .map(|entry| {
            let result = executor.execute(entry);
            match &result {
                Ok(()) => log::info!(
                    "executed {} on message {} (rule '{}')",
                    entry.action,
                    entry.message_id,
                    entry.rule_name
                ),
                Err(e) => log::warn!(
                    "action {} failed on message {}: {e:#}",
                    entry.action,
                    entry.message_id
                ),
            }
            PlanOutcome {
                entry: entry.clone(),
                result,
            }
        })
        .collect()
}
