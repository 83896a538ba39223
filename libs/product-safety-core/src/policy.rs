use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Flagged-event count above which a verdict escalates from caution to
/// warning. Product policy, not derived from anything.
pub const DEFAULT_CAUTION_THRESHOLD: u32 = 2;

/// How flag values and synonyms are matched against ingredient text.
///
/// `Substring` is the shipped default and deliberately over-matches (a flag
/// for "egg" also hits "eggplant") so that a restriction is never silently
/// missed. `WholeWord` requires non-alphanumeric characters on both sides of
/// the match.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    #[default]
    Substring,
    WholeWord,
}

#[derive(Debug, Error)]
#[error("unknown match mode '{0}', expected 'substring' or 'wholeWord'")]
pub struct UnknownMatchMode(String);

impl FromStr for MatchMode {
    type Err = UnknownMatchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "substring" => Ok(MatchMode::Substring),
            "wholeword" => Ok(MatchMode::WholeWord),
            _ => Err(UnknownMatchMode(s.to_string())),
        }
    }
}

/// Tunable analysis policy. Severity thresholds live here rather than inside
/// the algorithm so product rules can change without touching it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisPolicy {
    /// `flagged_count <= caution_threshold` stays at caution; above it the
    /// verdict becomes warning.
    pub caution_threshold: u32,
    pub match_mode: MatchMode,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            caution_threshold: DEFAULT_CAUTION_THRESHOLD,
            match_mode: MatchMode::Substring,
        }
    }
}
