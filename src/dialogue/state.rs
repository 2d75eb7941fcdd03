//! Conversation state machine — tracks where the onboarding script is.

use serde::{Deserialize, Serialize};

/// The states of the scripted onboarding conversation.
///
/// Progresses linearly: Init → Stage1ConfirmationPending → Stage1IntroShown →
/// PracticeAckPending → TrackingExplained → ReadyToBegin. Only the
/// confirmation step can hold in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Init,
    Stage1ConfirmationPending,
    Stage1IntroShown,
    PracticeAckPending,
    TrackingExplained,
    ReadyToBegin,
}

impl ConversationState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ConversationState) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            (Init, Stage1ConfirmationPending)
                | (Stage1ConfirmationPending, Stage1IntroShown)
                | (Stage1IntroShown, PracticeAckPending)
                | (PracticeAckPending, TrackingExplained)
                | (TrackingExplained, ReadyToBegin)
        )
    }

    /// Whether the script has nothing further to say.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ReadyToBegin)
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::Init
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Stage1ConfirmationPending => "stage1_confirmation_pending",
            Self::Stage1IntroShown => "stage1_intro_shown",
            Self::PracticeAckPending => "practice_ack_pending",
            Self::TrackingExplained => "tracking_explained",
            Self::ReadyToBegin => "ready_to_begin",
        };
        write!(f, "{s}")
    }
}
