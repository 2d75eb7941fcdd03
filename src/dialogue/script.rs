//! Scripted onboarding messages.
//!
//! Each batch lists its lines with the pause (in milliseconds) to leave after
//! the previous line, simulating typing cadence.

use crate::assessment::scoring::format_score;

use super::model::BaselineSnapshot;

/// One scripted assistant line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub text: String,
    pub delay_ms: u64,
}

impl ScriptLine {
    fn new(delay_ms: u64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay_ms,
        }
    }
}

pub const DEFERRAL: &str =
    "No problem. Take your time. When you're ready to start, just say so.";

pub const ASSUME_YES: &str = "I'll take that as a yes. Let's go.";

pub const LISTENING: &str = "I'm listening. What's on your mind?";

/// Baseline review, ending with the stage-1 prompt.
pub fn greeting(baseline: &BaselineSnapshot) -> Vec<ScriptLine> {
    let d = &baseline.domain_scores;
    vec![
        ScriptLine::new(
            0,
            "Hey. I'm the IOS System Installer.\n\n\
             Your baseline diagnostic is complete. Let's review what we found.",
        ),
        ScriptLine::new(
            1500,
            format!(
                "**Your REwired Index: {}/100**\n\n\
                 Status: *{}*\n\n\
                 This is your starting point - not good or bad, just where you are right now.",
                baseline.rewired_index, baseline.tier
            ),
        ),
        ScriptLine::new(
            1500,
            format!(
                "Here's your domain breakdown:\n\n\
                 **Regulation:** {}/5.0 - Nervous system stability\n\
                 **Awareness:** {}/5.0 - Meta-cognitive capacity\n\
                 **Outlook:** {}/5.0 - Emotional baseline\n\
                 **Attention:** {}/5.0 - Sustained focus\n\n\
                 These four domains form your neural and mental operating system. \
                 We're going to systematically upgrade each one.",
                format_score(d.regulation),
                format_score(d.awareness),
                format_score(d.outlook),
                format_score(d.attention)
            ),
        ),
        ScriptLine::new(2000, "Ready to begin Stage 1?"),
    ]
}

/// Stage 1 introduction, ending with an invitation for questions.
pub fn stage1_intro() -> Vec<ScriptLine> {
    vec![
        ScriptLine::new(
            0,
            "**Stage 1: Neural Priming**\n\n\
             *Stabilize the signal. Teach your nervous system calm.*\n\n\
             This stage installs two daily rituals that form the foundation of everything else.",
        ),
        ScriptLine::new(
            2000,
            "**Your Daily Practices:**\n\n\
             **1. 🫁 Resonance Breathing (HRVB)** - 5-7 minutes\n   \
             *When:* Morning, immediately upon waking\n   \
             *What:* 4-second inhale, 6-second exhale rhythm\n   \
             *Why:* Stimulates vagus nerve, increases heart rate variability, builds regulatory capacity\n\n\
             **2. 👁 Awareness Rep** - 2 minutes\n   \
             *When:* Morning after breathing (+ optional midday/evening)\n   \
             *What:* Guided decentering practice - rest in awareness, not reactivity\n   \
             *Why:* Strengthens meta-awareness circuitry, teaches your mind to observe rather than identify with thought\n\n\
             That's it. Two practices. Every morning.",
        ),
        ScriptLine::new(
            2000,
            "**Here's how this works:**\n\n\
             Stage 1 taught regulation.\n\
             You'll do these practices daily for at least 14 days.\n\n\
             I'll track your adherence and progress through weekly check-ins.\n\n\
             When you hit ≥80% adherence + show delta improvement in Regulation and Awareness, \
             you'll unlock Stage 2.\n\n\
             No unlock without competence proof. The system doesn't install without repetition.\n\n\
             Questions?",
        ),
    ]
}

/// Daily tracking explanation, ending with the start prompt.
pub fn tracking() -> Vec<ScriptLine> {
    vec![
        ScriptLine::new(
            0,
            "**Tracking & Progress:**\n\n\
             Every morning, you'll check in with me:\n\
             - Confirm you completed each practice\n\
             - Rate your calm level (0-5)\n\n\
             Every Sunday, we'll do a weekly delta check-in:\n\
             - 4 quick questions across all domains\n\
             - Track improvement vs baseline\n\n\
             After 14 days, if you've hit the criteria, Stage 2 unlocks.",
        ),
        ScriptLine::new(
            2000,
            "**Important notes:**\n\n\
             **On \"rituals\" vs \"practices\":** I call these rituals, not practices. \
             Practices are optional. Rituals are non-negotiable. This is your operating system - \
             treat it like you'd treat brushing your teeth.\n\n\
             **On motivation:** I'm not a cheerleader. I won't celebrate participation trophies. \
             But when you hit real milestones, I'll acknowledge them.\n\n\
             **On resistance:** You'll resist. Your nervous system prefers familiar patterns, \
             even dysfunctional ones. When resistance shows up, we'll work with it.\n\n\
             Ready to start tomorrow morning?",
        ),
    ]
}

/// Header line shown above the conversation.
pub fn header(baseline: &BaselineSnapshot) -> String {
    format!(
        "Stage {} • REwired Index: {}",
        baseline.current_stage, baseline.rewired_index
    )
}
