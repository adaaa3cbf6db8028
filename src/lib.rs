pub mod config;
pub mod infer;
pub mod message;
pub mod pdf;
pub mod plan;
pub mod rules;
pub mod search;

pub use config::{Action, AppConfig, MatchCriteria, TriageRule};
pub use message::MailContext;
pub use plan::{build_plan, execute_plan, ActionExecutor, PlanEntry};
pub use rules::{compile_rule, CompiledRule, MatchCondition, RulesEngine};
