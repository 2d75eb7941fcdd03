//! Assessment stage machine — tracks which screen the user is on.

use serde::{Deserialize, Serialize};

/// The stages of the baseline assessment.
///
/// Progresses linearly: Welcome → Assessment → BctIntro → BctActive → Results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Welcome,
    Assessment,
    BctIntro,
    BctActive,
    Results,
}

impl Stage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (Welcome, Assessment)
                | (Assessment, BctIntro)
                | (BctIntro, BctActive)
                | (BctActive, Results)
        )
    }

    /// Whether this stage is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Results)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Welcome
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::Assessment => "assessment",
            Self::BctIntro => "bct_intro",
            Self::BctActive => "bct_active",
            Self::Results => "results",
        };
        write!(f, "{s}")
    }
}
