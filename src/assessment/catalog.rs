//! The baseline questionnaire, in presentation order.

use super::model::{Domain, Question, Section};

const FREQUENCY_LABELS: [&str; 5] = ["Never", "Rarely", "Sometimes", "Often", "Very Often"];
const AGREEMENT_LABELS: [&str; 5] = [
    "Strongly Disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly Agree",
];

/// Section id under which the attention task score is reported.
pub const PRESENCE_TEST_ID: &str = "presence_test";

pub static SECTIONS: &[Section] = &[
    Section {
        id: "calm_core",
        name: "Calm Core Assessment",
        domain: Domain::Regulation,
        description: "Measuring your nervous system's baseline stress and regulatory capacity",
        questions: &[
            Question::frequency(
                "In the past week, how often have you felt unable to control important things in your life?",
            ),
            Question::frequency(
                "In the past week, how often have you felt confident about your ability to handle personal problems?",
            )
            .reversed(),
            Question::frequency(
                "In the past week, how often have you felt that things were going your way?",
            )
            .reversed(),
            Question::frequency(
                "In the past week, how often have you felt difficulties piling up so high you could not overcome them?",
            ),
        ],
        scale_labels: FREQUENCY_LABELS,
    },
    Section {
        id: "observer_index",
        name: "Observer Index",
        domain: Domain::Awareness,
        description: "Assessing your capacity for meta-awareness and cognitive decentering",
        questions: &[
            Question::agreement("I am able to separate myself from my thoughts and feelings"),
            Question::agreement("I can observe unpleasant feelings without getting caught up in them"),
            Question::agreement("I am able to see my thoughts as mental events rather than facts"),
            Question::agreement("I can notice when my mind wanders without getting lost in thought"),
            Question::agreement("I experience my thoughts as separate from who I am"),
            Question::agreement("I can watch my feelings without being swept away by them"),
            Question::agreement("I am able to see my experiences from a distance"),
        ],
        scale_labels: AGREEMENT_LABELS,
    },
    Section {
        id: "vitality_index",
        name: "Vitality Index",
        domain: Domain::Outlook,
        description: "Measuring your baseline emotional tone and life satisfaction",
        questions: &[
            Question::frequency("Over the past two weeks, I have felt cheerful and in good spirits"),
            Question::frequency("Over the past two weeks, I have felt calm and relaxed"),
            Question::frequency("Over the past two weeks, I have felt active and vigorous"),
            Question::frequency("Over the past two weeks, I woke up feeling fresh and rested"),
            Question::frequency(
                "Over the past two weeks, my daily life has been filled with things that interest me",
            ),
        ],
        scale_labels: FREQUENCY_LABELS,
    },
    Section {
        id: "focus_diagnostic",
        name: "Focus Diagnostic",
        domain: Domain::Attention,
        description: "Evaluating sustained attention and mind-wandering patterns",
        questions: &[
            Question::frequency("I find my thoughts wandering spontaneously"),
            Question::frequency(
                "When I'm working, I find myself thinking about things unrelated to the task",
            ),
            Question::frequency("I have difficulty maintaining focus on simple or repetitive tasks"),
            Question::frequency("While reading, I find I haven't been thinking about the text"),
            Question::frequency("I do things without paying full attention"),
        ],
        scale_labels: FREQUENCY_LABELS,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_domain_has_a_section() {
        for domain in Domain::ALL {
            assert!(
                SECTIONS.iter().any(|s| s.domain == domain),
                "{domain} has no section"
            );
        }
    }

    #[test]
    fn sections_are_non_empty_and_unique() {
        let mut ids: Vec<&str> = SECTIONS.iter().map(|s| s.id).collect();
        assert!(SECTIONS.iter().all(|s| !s.questions.is_empty()));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SECTIONS.len());
        assert!(!ids.contains(&PRESENCE_TEST_ID));
    }

    #[test]
    fn only_calm_core_has_reverse_items() {
        let reversed: Vec<(&str, usize)> = SECTIONS
            .iter()
            .flat_map(|s| {
                s.questions
                    .iter()
                    .enumerate()
                    .filter(|(_, q)| q.reverse)
                    .map(move |(i, _)| (s.id, i))
            })
            .collect();
        assert_eq!(reversed, vec![("calm_core", 1), ("calm_core", 2)]);
    }
}
