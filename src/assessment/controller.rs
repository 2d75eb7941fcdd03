//! AssessmentController — async shell around the engine: drives the
//! countdown, terminates the attention task exactly once and persists the
//! result.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::error::AssessmentError;
use crate::navigation::Route;
use crate::session::SessionContext;

use super::catalog::SECTIONS;
use super::engine::{AssessmentEngine, Progress, QuestionView};
use super::result::ResultRecord;
use super::stage::Stage;
use super::task::{BreathCountTask, TaskOutcome};

/// What the user sees once the attention task has ended.
#[derive(Debug, Clone)]
pub struct Completion {
    pub outcome: TaskOutcome,
    pub record: ResultRecord,
    /// Whether the baseline reached storage. Results are shown either way.
    pub persisted: bool,
}

#[derive(Clone)]
pub struct AssessmentController {
    ctx: SessionContext,
    engine: Arc<Mutex<AssessmentEngine>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    completion: Arc<Mutex<Option<Completion>>>,
    stage_tx: Arc<watch::Sender<Stage>>,
}

impl AssessmentController {
    pub fn new(ctx: SessionContext) -> Self {
        let engine = AssessmentEngine::new(SECTIONS, ctx.config.task.duration_secs);
        let (stage_tx, _rx) = watch::channel(engine.stage());
        Self {
            ctx,
            engine: Arc::new(Mutex::new(engine)),
            ticker: Arc::new(Mutex::new(None)),
            completion: Arc::new(Mutex::new(None)),
            stage_tx: Arc::new(stage_tx),
        }
    }

    /// Observe stage changes.
    pub fn subscribe(&self) -> watch::Receiver<Stage> {
        self.stage_tx.subscribe()
    }

    pub async fn stage(&self) -> Stage {
        self.engine.lock().await.stage()
    }

    fn publish(&self, stage: Stage) {
        self.stage_tx.send_if_modified(|current| {
            if *current == stage {
                false
            } else {
                *current = stage;
                true
            }
        });
    }

    pub async fn begin(&self) -> Result<(), AssessmentError> {
        let mut engine = self.engine.lock().await;
        engine.begin()?;
        info!(session_id = %self.ctx.id, "Assessment started");
        self.publish(engine.stage());
        Ok(())
    }

    pub async fn current_question(&self) -> Option<QuestionView> {
        self.engine.lock().await.current_question()
    }

    pub async fn progress(&self) -> Option<Progress> {
        self.engine.lock().await.progress()
    }

    pub async fn advance_label(&self) -> Option<&'static str> {
        self.engine.lock().await.advance_label()
    }

    pub async fn select(&self, value: u8) -> Result<(), AssessmentError> {
        self.engine.lock().await.select(value)
    }

    pub async fn advance(&self) -> Result<Stage, AssessmentError> {
        let mut engine = self.engine.lock().await;
        let stage = engine.advance()?;
        if stage == Stage::BctIntro {
            info!(session_id = %self.ctx.id, "Questionnaire complete");
        }
        self.publish(stage);
        Ok(stage)
    }

    /// Start the attention task and its countdown.
    pub async fn start_task(&self) -> Result<(), AssessmentError> {
        {
            let mut engine = self.engine.lock().await;
            engine.start_task()?;
            self.publish(engine.stage());
        }
        info!(
            session_id = %self.ctx.id,
            duration_secs = self.ctx.config.task.duration_secs,
            "Attention task started"
        );
        self.spawn_ticker().await;
        Ok(())
    }

    /// Live copy of the attention task, if one was started.
    pub async fn task_snapshot(&self) -> Option<BreathCountTask> {
        self.engine.lock().await.task().cloned()
    }

    pub async fn next_breath(&self) -> Result<Option<Completion>, AssessmentError> {
        let mut engine = self.engine.lock().await;
        match engine.next_breath()? {
            Some(outcome) => self.finish(&mut engine, outcome, true).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn complete_cycle(&self) -> Result<Option<Completion>, AssessmentError> {
        let mut engine = self.engine.lock().await;
        match engine.complete_cycle()? {
            Some(outcome) => self.finish(&mut engine, outcome, true).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn lost_count(&self) -> Result<Completion, AssessmentError> {
        let mut engine = self.engine.lock().await;
        let outcome = engine.lost_count()?;
        self.finish(&mut engine, outcome, true).await
    }

    /// The completed result, once the task has ended.
    pub async fn completion(&self) -> Option<Completion> {
        self.completion.lock().await.clone()
    }

    /// Manual "continue" from the results screen.
    pub async fn continue_to_dialogue(&self) -> Result<(), AssessmentError> {
        let stage = self.stage().await;
        if stage != Stage::Results {
            return Err(AssessmentError::WrongStage {
                expected: Stage::Results,
                actual: stage,
            });
        }
        self.ctx.navigator.navigate(Route::Dialogue);
        Ok(())
    }

    /// Terminate the task: stop the countdown, score, persist, show results.
    ///
    /// Runs with the engine lock held, so a concurrent tick or action sees the
    /// finished task and cannot terminate a second time.
    async fn finish(
        &self,
        engine: &mut AssessmentEngine,
        outcome: TaskOutcome,
        abort_ticker: bool,
    ) -> Result<Completion, AssessmentError> {
        self.stop_ticker(abort_ticker).await;
        info!(
            session_id = %self.ctx.id,
            reason = %outcome.reason,
            elapsed_secs = outcome.elapsed_secs,
            cycles = outcome.cycles_completed,
            "Attention task finished"
        );

        let record = engine.compute_result(&outcome, Utc::now())?;
        let persisted = match record.persist(self.ctx.store.as_ref()).await {
            Ok(()) => {
                info!(
                    session_id = %self.ctx.id,
                    rewired_index = record.rewired_index,
                    tier = %record.tier,
                    "Baseline stored"
                );
                true
            }
            Err(e) => {
                warn!(session_id = %self.ctx.id, "Failed to persist baseline: {}", e);
                false
            }
        };

        engine.show_results()?;
        let completion = Completion {
            outcome,
            record,
            persisted,
        };
        *self.completion.lock().await = Some(completion.clone());
        self.publish(engine.stage());
        Ok(completion)
    }

    async fn stop_ticker(&self, abort: bool) {
        if let Some(handle) = self.ticker.lock().await.take() {
            // The ticker itself calls in with `abort = false`; it exits on
            // its own once the task is finished.
            if abort {
                handle.abort();
            }
        }
    }

    async fn spawn_ticker(&self) {
        let controller = self.clone();
        let tick_interval = self.ctx.config.task.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(tick_interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !controller.handle_tick().await {
                    break;
                }
            }
            debug!(session_id = %controller.ctx.id, "Countdown stopped");
        });

        let mut guard = self.ticker.lock().await;
        if let Some(previous) = guard.replace(handle) {
            previous.abort();
        }
    }

    /// Returns whether the countdown should keep running.
    async fn handle_tick(&self) -> bool {
        let mut engine = self.engine.lock().await;
        if engine.stage() != Stage::BctActive {
            return false;
        }
        match engine.tick() {
            Some(outcome) => {
                if let Err(e) = self.finish(&mut engine, outcome, false).await {
                    warn!(session_id = %self.ctx.id, "Failed to finish attention task: {}", e);
                }
                false
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::assessment::task::TerminationReason;
    use crate::config::{InstallerConfig, TaskConfig};
    use crate::navigation::RecordingNavigator;
    use crate::store::{MemoryStorage, Storage, keys};

    fn context(
        store: Arc<MemoryStorage>,
        nav: Arc<RecordingNavigator>,
        tick: Duration,
    ) -> SessionContext {
        let config = InstallerConfig {
            task: TaskConfig {
                duration_secs: 180,
                tick_interval: tick,
            },
            pacing: false,
            ..InstallerConfig::default()
        };
        SessionContext::new(store, nav, config)
    }

    async fn answered(controller: &AssessmentController, value: u8) {
        controller.begin().await.unwrap();
        while controller.stage().await == Stage::Assessment {
            controller.select(value).await.unwrap();
            controller.advance().await.unwrap();
        }
    }

    #[tokio::test]
    async fn perfect_run_via_countdown() {
        let store = Arc::new(MemoryStorage::new());
        let nav = Arc::new(RecordingNavigator::new());
        let controller =
            AssessmentController::new(context(store.clone(), nav.clone(), Duration::from_millis(1)));
        let mut stages = controller.subscribe();

        answered(&controller, 2).await;
        controller.start_task().await.unwrap();

        tokio::time::timeout(Duration::from_secs(10), async {
            while *stages.borrow_and_update() != Stage::Results {
                stages.changed().await.unwrap();
            }
        })
        .await
        .expect("countdown should reach zero");

        let completion = controller.completion().await.unwrap();
        assert_eq!(completion.outcome.reason, TerminationReason::Perfect);
        assert_eq!(completion.outcome.elapsed_secs, 180);
        assert_eq!(completion.record.rewired_index, 48);
        assert!(completion.persisted);
        assert_eq!(
            store.read(keys::SYSTEM_INITIALIZED).await.unwrap().as_deref(),
            Some("true")
        );

        // No ticks after termination.
        let remaining = controller.task_snapshot().await.unwrap().remaining_secs();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            controller.task_snapshot().await.unwrap().remaining_secs(),
            remaining
        );

        controller.continue_to_dialogue().await.unwrap();
        assert_eq!(nav.routes(), vec![Route::Dialogue]);
    }

    #[tokio::test]
    async fn lost_count_terminates_once() {
        let store = Arc::new(MemoryStorage::new());
        let nav = Arc::new(RecordingNavigator::new());
        let controller =
            AssessmentController::new(context(store.clone(), nav, Duration::from_secs(60)));

        answered(&controller, 4).await;
        controller.start_task().await.unwrap();

        let completion = controller.lost_count().await.unwrap();
        assert_eq!(completion.outcome.reason, TerminationReason::LostCount);
        assert_eq!(completion.outcome.elapsed_secs, 0);
        assert_eq!(completion.record.bct_score, 0.0);
        assert_eq!(controller.stage().await, Stage::Results);

        let writes = store.write_count();
        assert!(controller.lost_count().await.is_err());
        assert!(controller.next_breath().await.is_err());
        assert_eq!(store.write_count(), writes, "no second persistence");
    }

    #[tokio::test]
    async fn ninth_breath_ends_task() {
        let store = Arc::new(MemoryStorage::new());
        let nav = Arc::new(RecordingNavigator::new());
        let controller = AssessmentController::new(context(store, nav, Duration::from_secs(60)));

        answered(&controller, 1).await;
        controller.start_task().await.unwrap();
        for _ in 0..8 {
            assert!(controller.next_breath().await.unwrap().is_none());
        }
        let completion = controller.next_breath().await.unwrap().unwrap();
        assert_eq!(completion.outcome.reason, TerminationReason::BreathAfterEight);
    }

    #[tokio::test]
    async fn storage_failure_still_shows_results() {
        let store = Arc::new(MemoryStorage::new());
        store.set_fail_writes(true);
        let nav = Arc::new(RecordingNavigator::new());
        let controller =
            AssessmentController::new(context(store.clone(), nav, Duration::from_secs(60)));

        answered(&controller, 3).await;
        controller.start_task().await.unwrap();
        let completion = controller.complete_cycle().await.unwrap().unwrap();

        assert_eq!(
            completion.outcome.reason,
            TerminationReason::WrongCount { breath: 0 }
        );
        assert!(!completion.persisted);
        assert_eq!(controller.stage().await, Stage::Results);
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn continue_requires_results() {
        let store = Arc::new(MemoryStorage::new());
        let nav = Arc::new(RecordingNavigator::new());
        let controller =
            AssessmentController::new(context(store, nav.clone(), Duration::from_secs(60)));
        assert!(controller.continue_to_dialogue().await.is_err());
        assert!(nav.routes().is_empty());
    }
}
