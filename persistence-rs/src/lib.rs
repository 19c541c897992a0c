// persistence-rs/src/lib.rs
// Storage for the accountability pipeline: reliability ledger, safety rules,
// cultural personas and manager feedback. The in-memory backends are the
// reference implementations behind each trait.

pub mod cache;
pub mod error;
pub mod feedback;
pub mod ledger;
pub mod personas;
pub mod rules;
pub mod seeds;

pub use cache::TtlCache;
pub use error::StoreError;
pub use feedback::{compute_acceptance_rate, FeedbackLoop, InMemoryFeedbackLoop};
pub use ledger::{apply_outcome, InMemoryLedger, ReliabilityLedger};
pub use personas::{InMemoryPersonaStore, PersonaStore};
pub use rules::{InMemorySafetyRuleStore, SafetyRuleStore};
pub use seeds::{builtin_instruction, default_rules, system_personas, SYSTEM_ONBOARDER};

#[cfg(test)]
mod tests;
