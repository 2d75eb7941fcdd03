//! Score computation: section means, domain scores, the composite REwired
//! Index and its tier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

use super::model::{Domain, Response, Section};

/// Upper bound of every section and domain score.
pub const SCORE_MAX: f64 = 5.0;

/// Mean of the reverse-adjusted response values.
pub fn section_score(section_id: &str, responses: &[Response]) -> Result<f64, AssessmentError> {
    if responses.is_empty() {
        return Err(AssessmentError::EmptySection(section_id.to_string()));
    }
    let sum: u32 = responses.iter().map(|r| u32::from(r.adjusted())).sum();
    Ok(f64::from(sum) / responses.len() as f64)
}

/// Format a score with one decimal, rounding exact ties upward.
///
/// `{:.1}` rounds ties to even, so 2.25 would print as "2.2". A value is an
/// exact tie at one decimal only when four times it is an odd integer; those
/// are rounded up, everything else keeps the correctly rounded output.
pub fn format_score(score: f64) -> String {
    let quarters = score * 4.0;
    if quarters.fract() == 0.0 && quarters.rem_euclid(2.0) == 1.0 {
        format!("{:.1}", (score * 10.0 + 0.5).floor() / 10.0)
    } else {
        format!("{:.1}", score)
    }
}

/// Attention task score: the fraction of the budget survived, scaled to 0-5.
pub fn task_score(elapsed_secs: u32, duration_secs: u32) -> f64 {
    if duration_secs == 0 {
        return 0.0;
    }
    let elapsed = elapsed_secs.min(duration_secs);
    f64::from(elapsed) / f64::from(duration_secs) * SCORE_MAX
}

/// One score per domain, each in [0, 5].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    pub regulation: f64,
    pub awareness: f64,
    pub outlook: f64,
    pub attention: f64,
}

impl DomainScores {
    /// Derive domain scores from per-section scores.
    ///
    /// Each domain takes the mean of its sections; attention additionally
    /// averages in the attention task score as an equal partner.
    pub fn from_sections(
        sections: &[Section],
        section_scores: &BTreeMap<String, f64>,
        task_score: f64,
    ) -> Self {
        let mean_for = |domain: Domain| -> f64 {
            let scores: Vec<f64> = sections
                .iter()
                .filter(|s| s.domain == domain)
                .filter_map(|s| section_scores.get(s.id).copied())
                .collect();
            if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            }
        };

        Self {
            regulation: mean_for(Domain::Regulation),
            awareness: mean_for(Domain::Awareness),
            outlook: mean_for(Domain::Outlook),
            attention: (mean_for(Domain::Attention) + task_score) / 2.0,
        }
    }

    pub fn get(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Regulation => self.regulation,
            Domain::Awareness => self.awareness,
            Domain::Outlook => self.outlook,
            Domain::Attention => self.attention,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.regulation + self.awareness + self.outlook + self.attention) / 4.0
    }

    /// Composite REwired Index, `round(mean * 20)` clamped to 0-100.
    pub fn composite_index(&self) -> u8 {
        (self.mean() * 20.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Categorical band of the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Integrated (Embodied)")]
    Integrated,
    #[serde(rename = "Optimized (Coherent)")]
    Optimized,
    #[serde(rename = "Operational (Stabilizing)")]
    Operational,
    #[serde(rename = "Baseline Mode (Installing...)")]
    BaselineMode,
    #[serde(rename = "System Offline (Critical)")]
    SystemOffline,
}

impl Tier {
    pub fn from_index(index: u8) -> Self {
        match index {
            81.. => Self::Integrated,
            61..=80 => Self::Optimized,
            41..=60 => Self::Operational,
            21..=40 => Self::BaselineMode,
            _ => Self::SystemOffline,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Integrated => "Integrated (Embodied)",
            Self::Optimized => "Optimized (Coherent)",
            Self::Operational => "Operational (Stabilizing)",
            Self::BaselineMode => "Baseline Mode (Installing...)",
            Self::SystemOffline => "System Offline (Critical)",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
