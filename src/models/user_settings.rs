use serde::{Deserialize, Serialize};

/// Per-user choice of how `rules::suggest` should narrow down matches across
/// a transaction's matching rules. Stored as JSONB; defaults to `AllMatches`
/// when a user has no settings row yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionStrategyConfig {
    AllMatches,
    TopN { n: usize },
    ConfidenceThreshold { threshold: f64 },
    PriorityFiltered,
}

impl Default for SuggestionStrategyConfig {
    fn default() -> Self {
        SuggestionStrategyConfig::AllMatches
    }
}
