// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Abort taxonomy (spec §9 Open Questions, resolved).
//!
//! The signals that classify an execution as an operator-visible abort are
//! heuristic in the original system: exit-code substrings in the error
//! message, plus whatever the vendor DB's `RunState` reports. This module
//! codifies both as a small configurable table rather than scattering
//! string literals through the engine.

/// Run-state labels the instrument DB can report for the most recent run
/// (spec §6.3 state-label mapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Complete,
    Aborted,
    Error,
    Unknown,
}

impl RunState {
    /// Translate a vendor numeric run-state code into a label.
    ///
    /// The mapping is representative, not exhaustive (spec §6.3): unknown
    /// codes resolve to `Unknown` rather than failing.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => RunState::Running,
            3 => RunState::Complete,
            64 => RunState::Aborted,
            _ if code < 0 => RunState::Error,
            _ => RunState::Unknown,
        }
    }

    /// Whether this state should be treated as an abort for reclassification
    /// purposes (spec §4.E: "Aborted" and "Error" both count).
    pub fn is_abort(&self) -> bool {
        matches!(self, RunState::Aborted | RunState::Error)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RunState::Running => "Running",
            RunState::Complete => "Complete",
            RunState::Aborted => "Aborted",
            RunState::Error => "Error",
            RunState::Unknown => "Unknown",
        })
    }
}

/// Configurable substring taxonomy for classifying an error message as an
/// abort. Defaults to the literal keyword list used by the source system.
#[derive(Debug, Clone)]
pub struct AbortTaxonomy {
    keywords: Vec<String>,
}

impl AbortTaxonomy {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    /// Case-insensitive substring match against the configured keywords.
    pub fn message_indicates_abort(&self, message: Option<&str>) -> bool {
        let Some(message) = message else { return false };
        let lowered = message.to_lowercase();
        self.keywords.iter().any(|kw| lowered.contains(kw.as_str()))
    }
}

impl Default for AbortTaxonomy {
    fn default() -> Self {
        Self::new(
            ["abort", "aborted", "manual abort", "stopped by user", "user stopped"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_state_from_code_mapping() {
        assert_eq!(RunState::from_code(2), RunState::Running);
        assert_eq!(RunState::from_code(3), RunState::Complete);
        assert_eq!(RunState::from_code(64), RunState::Aborted);
        assert_eq!(RunState::from_code(9999), RunState::Unknown);
    }

    #[test]
    fn abort_and_error_are_abort_states() {
        assert!(RunState::Aborted.is_abort());
        assert!(RunState::Error.is_abort());
        assert!(!RunState::Complete.is_abort());
        assert!(!RunState::Running.is_abort());
    }

    #[test]
    fn default_taxonomy_matches_known_phrases() {
        let tax = AbortTaxonomy::default();
        assert!(tax.message_indicates_abort(Some("Execution failed: return code 64 (manual abort)")));
        assert!(tax.message_indicates_abort(Some("Stopped by user at 12:03")));
        assert!(!tax.message_indicates_abort(Some("timed out waiting for file")));
        assert!(!tax.message_indicates_abort(None));
    }

    #[test]
    fn taxonomy_is_case_insensitive() {
        let tax = AbortTaxonomy::default();
        assert!(tax.message_indicates_abort(Some("ABORTED by operator")));
    }
}
