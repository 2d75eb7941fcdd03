//! Questionnaire data model: domains, sections, questions and responses.

use serde::{Deserialize, Serialize};

/// Highest ordinal on every answer scale.
pub const SCALE_MAX: u8 = 4;

/// The four measured facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Regulation,
    Awareness,
    Outlook,
    Attention,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Regulation,
        Domain::Awareness,
        Domain::Outlook,
        Domain::Attention,
    ];
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Regulation => "Regulation",
            Self::Awareness => "Awareness",
            Self::Outlook => "Outlook",
            Self::Attention => "Attention",
        };
        write!(f, "{s}")
    }
}

/// Label family of a question's answer scale. Both map onto the same 0-4
/// ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Frequency,
    Agreement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub text: &'static str,
    pub scale: ScaleKind,
    /// Higher raw answers mean a worse outcome; scored as `4 - raw`.
    pub reverse: bool,
}

impl Question {
    pub const fn frequency(text: &'static str) -> Self {
        Self {
            text,
            scale: ScaleKind::Frequency,
            reverse: false,
        }
    }

    pub const fn agreement(text: &'static str) -> Self {
        Self {
            text,
            scale: ScaleKind::Agreement,
            reverse: false,
        }
    }

    pub const fn reversed(self) -> Self {
        Self {
            reverse: true,
            ..self
        }
    }
}

/// A named group of questions measuring one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub id: &'static str,
    pub name: &'static str,
    pub domain: Domain,
    pub description: &'static str,
    pub questions: &'static [Question],
    pub scale_labels: [&'static str; 5],
}

/// A recorded answer. The reverse flag is copied from the question at the
/// time of answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub value: u8,
    pub reverse: bool,
}

impl Response {
    pub fn new(value: u8, question: &Question) -> Self {
        Self {
            value,
            reverse: question.reverse,
        }
    }

    /// Score after reverse adjustment, always on the 0-4 scale.
    pub fn adjusted(&self) -> u8 {
        if self.reverse {
            SCALE_MAX - self.value.min(SCALE_MAX)
        } else {
            self.value
        }
    }
}
