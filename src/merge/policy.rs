//! Matching key policy
//!
//! Decides which entry survives when two sources offer the same key.

use std::fmt;

/// Rule for resolving equal keys offered by different sources
///
/// Ties are resolved pairwise as they are found. The losing source is
/// advanced past the key and keeps contributing its later entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchingKeyPolicy {
    /// Keep the entry that is already in the merge working set
    #[default]
    DontCare,

    /// Keep the entry from the most recently registered source
    ChooseLatest,

    /// Keep the entry from the earliest registered source
    ChooseEarliest,
}

impl MatchingKeyPolicy {
    /// Whether an incoming cursor displaces the one already holding the key
    pub(crate) fn challenger_wins(self, challenger_age: usize, incumbent_age: usize) -> bool {
        match self {
            MatchingKeyPolicy::DontCare => false,
            MatchingKeyPolicy::ChooseLatest => challenger_age > incumbent_age,
            MatchingKeyPolicy::ChooseEarliest => challenger_age < incumbent_age,
        }
    }
}

impl fmt::Display for MatchingKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchingKeyPolicy::DontCare => "dont-care",
            MatchingKeyPolicy::ChooseLatest => "choose-latest",
            MatchingKeyPolicy::ChooseEarliest => "choose-earliest",
        };
        f.write_str(name)
    }
}
