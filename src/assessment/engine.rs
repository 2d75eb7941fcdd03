//! Synchronous assessment state machine.
//!
//! Owns the questionnaire position, the recorded responses and the attention
//! task. All timing lives outside: the countdown is driven by calling
//! [`AssessmentEngine::tick`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::AssessmentError;

use super::catalog::PRESENCE_TEST_ID;
use super::model::{Question, Response, SCALE_MAX, Section};
use super::result::ResultRecord;
use super::scoring::{DomainScores, Tier, section_score};
use super::stage::Stage;
use super::task::{BreathCountTask, TaskOutcome};

/// The question currently on screen.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView {
    pub section: &'static Section,
    pub question: &'static Question,
    pub section_index: usize,
    pub section_count: usize,
    pub question_index: usize,
}

/// Completion percentages for the current position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub section_percent: f64,
    pub overall_percent: f64,
}

pub struct AssessmentEngine {
    sections: &'static [Section],
    task_duration_secs: u32,
    stage: Stage,
    section_index: usize,
    question_index: usize,
    selected: Option<u8>,
    responses: Vec<Vec<Response>>,
    task: Option<BreathCountTask>,
}

impl AssessmentEngine {
    pub fn new(sections: &'static [Section], task_duration_secs: u32) -> Self {
        Self {
            sections,
            task_duration_secs,
            stage: Stage::Welcome,
            section_index: 0,
            question_index: 0,
            selected: None,
            responses: vec![Vec::new(); sections.len()],
            task: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn sections(&self) -> &'static [Section] {
        self.sections
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), AssessmentError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(AssessmentError::WrongStage {
                expected,
                actual: self.stage,
            })
        }
    }

    fn enter(&mut self, target: Stage) {
        debug_assert!(self.stage.can_transition_to(target));
        tracing::debug!(from = %self.stage, to = %target, "Assessment stage change");
        self.stage = target;
    }

    /// Welcome → Assessment, on explicit confirmation.
    pub fn begin(&mut self) -> Result<(), AssessmentError> {
        self.expect_stage(Stage::Welcome)?;
        self.enter(Stage::Assessment);
        Ok(())
    }

    pub fn current_question(&self) -> Option<QuestionView> {
        if self.stage != Stage::Assessment {
            return None;
        }
        let sections = self.sections;
        let section = sections.get(self.section_index)?;
        let question = section.questions.get(self.question_index)?;
        Some(QuestionView {
            section,
            question,
            section_index: self.section_index,
            section_count: sections.len(),
            question_index: self.question_index,
        })
    }

    /// Pick an answer for the current question. Can be changed until
    /// [`advance`](Self::advance).
    pub fn select(&mut self, value: u8) -> Result<(), AssessmentError> {
        self.expect_stage(Stage::Assessment)?;
        if value > SCALE_MAX {
            return Err(AssessmentError::InvalidValue(value));
        }
        self.selected = Some(value);
        Ok(())
    }

    pub fn selected(&self) -> Option<u8> {
        self.selected
    }

    /// Record the selected answer and move on. Rejected when nothing is
    /// selected; the position does not change in that case.
    pub fn advance(&mut self) -> Result<Stage, AssessmentError> {
        self.expect_stage(Stage::Assessment)?;
        let value = self.selected.ok_or(AssessmentError::NoSelection)?;
        let sections = self.sections;
        let section = &sections[self.section_index];
        let question = &section.questions[self.question_index];

        self.responses[self.section_index].push(Response::new(value, question));
        self.selected = None;

        if self.question_index + 1 < section.questions.len() {
            self.question_index += 1;
        } else if self.section_index + 1 < self.sections.len() {
            self.section_index += 1;
            self.question_index = 0;
        } else {
            self.enter(Stage::BctIntro);
        }
        Ok(self.stage)
    }

    pub fn progress(&self) -> Option<Progress> {
        let view = self.current_question()?;
        let section_percent =
            (view.question_index + 1) as f64 / view.section.questions.len() as f64 * 100.0;
        let overall_percent = (view.section_index as f64 * 100.0 + section_percent)
            / (view.section_count as f64 * 100.0)
            * 100.0;
        Some(Progress {
            section_percent,
            overall_percent,
        })
    }

    /// Label of the advance action at the current position.
    pub fn advance_label(&self) -> Option<&'static str> {
        let view = self.current_question()?;
        Some(if view.question_index + 1 < view.section.questions.len() {
            "Next Question"
        } else if view.section_index + 1 < view.section_count {
            "Continue to Next Section"
        } else {
            "Complete Section"
        })
    }

    pub fn responses(&self, section_index: usize) -> &[Response] {
        self.responses
            .get(section_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// BctIntro → BctActive with a fresh task.
    pub fn start_task(&mut self) -> Result<(), AssessmentError> {
        self.expect_stage(Stage::BctIntro)?;
        self.task = Some(BreathCountTask::new(self.task_duration_secs));
        self.enter(Stage::BctActive);
        Ok(())
    }

    pub fn task(&self) -> Option<&BreathCountTask> {
        self.task.as_ref()
    }

    fn active_task(&mut self) -> Result<&mut BreathCountTask, AssessmentError> {
        self.expect_stage(Stage::BctActive)?;
        self.task.as_mut().ok_or(AssessmentError::TaskNotStarted)
    }

    pub fn next_breath(&mut self) -> Result<Option<TaskOutcome>, AssessmentError> {
        self.active_task()?.next_breath()
    }

    pub fn complete_cycle(&mut self) -> Result<Option<TaskOutcome>, AssessmentError> {
        self.active_task()?.complete_cycle()
    }

    pub fn lost_count(&mut self) -> Result<TaskOutcome, AssessmentError> {
        self.active_task()?.lost_count()
    }

    /// One countdown second. No-op outside an active, unfinished task.
    pub fn tick(&mut self) -> Option<TaskOutcome> {
        match self.active_task() {
            Ok(task) => task.tick(),
            Err(_) => None,
        }
    }

    /// Compute the result record for a finished task.
    pub fn compute_result(
        &self,
        outcome: &TaskOutcome,
        timestamp: DateTime<Utc>,
    ) -> Result<ResultRecord, AssessmentError> {
        let mut section_scores = BTreeMap::new();
        for (section, responses) in self.sections.iter().zip(&self.responses) {
            section_scores.insert(section.id.to_string(), section_score(section.id, responses)?);
        }

        let bct_score = outcome.score();
        let domain_scores = DomainScores::from_sections(self.sections, &section_scores, bct_score);
        section_scores.insert(PRESENCE_TEST_ID.to_string(), bct_score);

        let rewired_index = domain_scores.composite_index();
        Ok(ResultRecord {
            section_scores,
            domain_scores,
            rewired_index,
            tier: Tier::from_index(rewired_index),
            bct_elapsed: outcome.elapsed_secs,
            bct_score,
            timestamp,
        })
    }

    /// BctActive → Results. Only once the task has terminated.
    pub fn show_results(&mut self) -> Result<(), AssessmentError> {
        let finished = self.active_task()?.is_finished();
        if !finished {
            return Err(AssessmentError::TaskRunning);
        }
        self.enter(Stage::Results);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::catalog::SECTIONS;
    use crate::assessment::task::TerminationReason;

    fn engine() -> AssessmentEngine {
        AssessmentEngine::new(SECTIONS, 180)
    }

    fn answer_all(engine: &mut AssessmentEngine, value: u8) {
        while engine.stage() == Stage::Assessment {
            engine.select(value).unwrap();
            engine.advance().unwrap();
        }
    }

    #[test]
    fn welcome_requires_confirmation() {
        let mut e = engine();
        assert_eq!(e.stage(), Stage::Welcome);
        assert!(e.current_question().is_none());
        assert!(matches!(
            e.select(1),
            Err(AssessmentError::WrongStage { .. })
        ));
        e.begin().unwrap();
        assert_eq!(e.stage(), Stage::Assessment);
        assert!(e.begin().is_err());
    }

    #[test]
    fn advance_without_selection_is_rejected() {
        let mut e = engine();
        e.begin().unwrap();
        assert_eq!(e.advance(), Err(AssessmentError::NoSelection));
        let view = e.current_question().unwrap();
        assert_eq!((view.section_index, view.question_index), (0, 0));
        assert!(e.responses(0).is_empty());
    }

    #[test]
    fn out_of_scale_value_is_rejected() {
        let mut e = engine();
        e.begin().unwrap();
        assert_eq!(e.select(5), Err(AssessmentError::InvalidValue(5)));
        assert!(e.selected().is_none());
    }

    #[test]
    fn advancing_walks_sections_in_order() {
        let mut e = engine();
        e.begin().unwrap();

        let first_len = SECTIONS[0].questions.len();
        for i in 0..first_len {
            let view = e.current_question().unwrap();
            assert_eq!(view.section.id, "calm_core");
            assert_eq!(view.question_index, i);
            e.select(3).unwrap();
            e.advance().unwrap();
            assert!(e.selected().is_none(), "selection clears on advance");
        }

        let view = e.current_question().unwrap();
        assert_eq!(view.section.id, "observer_index");
        assert_eq!(view.question_index, 0);

        // Reverse flags are copied onto the responses.
        let flags: Vec<bool> = e.responses(0).iter().map(|r| r.reverse).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn last_answer_moves_to_task_intro() {
        let mut e = engine();
        e.begin().unwrap();
        answer_all(&mut e, 2);
        assert_eq!(e.stage(), Stage::BctIntro);
        for (i, section) in SECTIONS.iter().enumerate() {
            assert_eq!(e.responses(i).len(), section.questions.len());
        }
    }

    #[test]
    fn progress_and_labels() {
        let mut e = engine();
        e.begin().unwrap();
        let p = e.progress().unwrap();
        assert_eq!(p.section_percent, 25.0);
        assert_eq!(p.overall_percent, 6.25);
        assert_eq!(e.advance_label(), Some("Next Question"));

        for _ in 0..3 {
            e.select(0).unwrap();
            e.advance().unwrap();
        }
        assert_eq!(e.advance_label(), Some("Continue to Next Section"));
        assert_eq!(e.progress().unwrap().overall_percent, 25.0);

        // Jump to the last question of the last section.
        while {
            let v = e.current_question().unwrap();
            !(v.section_index == v.section_count - 1
                && v.question_index == v.section.questions.len() - 1)
        } {
            e.select(0).unwrap();
            e.advance().unwrap();
        }
        assert_eq!(e.advance_label(), Some("Complete Section"));
        assert_eq!(e.progress().unwrap().overall_percent, 100.0);
    }

    #[test]
    fn task_starts_fresh() {
        let mut e = engine();
        e.begin().unwrap();
        answer_all(&mut e, 1);
        assert!(e.tick().is_none());
        e.start_task().unwrap();
        assert_eq!(e.stage(), Stage::BctActive);
        let task = e.task().unwrap();
        assert_eq!(task.remaining_secs(), 180);
        assert_eq!(task.breaths(), 0);
        assert_eq!(task.cycles(), 0);
    }

    #[test]
    fn uniform_middle_answers_with_perfect_task() {
        let mut e = engine();
        e.begin().unwrap();
        answer_all(&mut e, 2);
        e.start_task().unwrap();

        let mut outcome = None;
        while outcome.is_none() {
            outcome = e.tick();
        }
        let outcome = outcome.unwrap();
        assert_eq!(outcome.reason, TerminationReason::Perfect);

        let record = e.compute_result(&outcome, Utc::now()).unwrap();
        for section in SECTIONS {
            assert_eq!(record.section_scores[section.id], 2.0);
        }
        assert_eq!(record.section_scores[PRESENCE_TEST_ID], 5.0);
        assert_eq!(record.domain_scores.regulation, 2.0);
        assert_eq!(record.domain_scores.outlook, 2.0);
        assert_eq!(record.domain_scores.attention, 3.5);
        assert_eq!(record.rewired_index, 48);
        assert_eq!(record.tier, Tier::Operational);
        assert_eq!(record.bct_elapsed, 180);

        e.show_results().unwrap();
        assert_eq!(e.stage(), Stage::Results);
        assert!(e.stage().is_terminal());
    }

    #[test]
    fn results_require_finished_task() {
        let mut e = engine();
        e.begin().unwrap();
        answer_all(&mut e, 4);
        e.start_task().unwrap();
        assert_eq!(e.show_results(), Err(AssessmentError::TaskRunning));
        e.lost_count().unwrap();
        e.show_results().unwrap();
        assert!(e.next_breath().is_err());
        assert!(e.tick().is_none());
    }
}
