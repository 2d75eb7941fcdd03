//! End-to-end: questionnaire → attention task → stored baseline → dialogue.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use rewired::assessment::{AssessmentController, Stage, TerminationReason, Tier};
use rewired::config::{InstallerConfig, TaskConfig};
use rewired::dialogue::{ConversationState, DialogueDriver};
use rewired::navigation::{RecordingNavigator, Route};
use rewired::session::SessionContext;
use rewired::store::{LibSqlBackend, MemoryStorage, Storage};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn config(duration_secs: u32, tick: Duration) -> InstallerConfig {
    InstallerConfig {
        task: TaskConfig {
            duration_secs,
            tick_interval: tick,
        },
        pacing: false,
        ..InstallerConfig::default()
    }
}

/// Answer every question with the same value and stop at the task intro.
async fn answer_all(controller: &AssessmentController, value: u8) {
    controller.begin().await.unwrap();
    while controller.current_question().await.is_some() {
        controller.select(value).await.unwrap();
        controller.advance().await.unwrap();
    }
    assert_eq!(controller.stage().await, Stage::BctIntro);
}

async fn wait_for_results(controller: &AssessmentController) {
    let mut rx = controller.subscribe();
    timeout(TEST_TIMEOUT, async {
        while *rx.borrow_and_update() != Stage::Results {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("attention task never finished");
}

#[tokio::test]
async fn perfect_run_unlocks_dialogue() {
    let store = Arc::new(MemoryStorage::new());
    let nav = Arc::new(RecordingNavigator::new());
    let ctx = SessionContext::new(
        store.clone(),
        nav.clone(),
        config(2, Duration::from_millis(1)),
    );

    let controller = AssessmentController::new(ctx.clone());
    answer_all(&controller, 2).await;
    controller.start_task().await.unwrap();
    wait_for_results(&controller).await;

    let completion = controller.completion().await.unwrap();
    assert_eq!(completion.outcome.reason, TerminationReason::Perfect);
    assert!(completion.persisted);
    // Sections all 2.0, attention (2.0 + 5.0) / 2 → mean 2.375 → 48.
    assert_eq!(completion.record.rewired_index, 48);
    assert_eq!(completion.record.tier, Tier::Operational);

    controller.continue_to_dialogue().await.unwrap();
    assert_eq!(nav.routes(), vec![Route::Dialogue]);

    let mut driver = DialogueDriver::initialize(&ctx).await.unwrap();
    assert_eq!(driver.header(), "Stage 1 • REwired Index: 48");
    let greeting = driver.take_outbox();
    assert!(greeting[1].message.content.contains("48/100"));
    assert_eq!(driver.state(), ConversationState::Stage1ConfirmationPending);

    driver.handle_user_message("yes please");
    driver.take_outbox();
    driver.handle_user_message("got it");
    driver.take_outbox();
    assert_eq!(driver.state(), ConversationState::ReadyToBegin);
}

#[tokio::test]
async fn lost_count_scores_zero_attention() {
    let store = Arc::new(MemoryStorage::new());
    let nav = Arc::new(RecordingNavigator::new());
    let ctx = SessionContext::new(store, nav, config(180, Duration::from_secs(60)));

    let controller = AssessmentController::new(ctx);
    answer_all(&controller, 2).await;
    controller.start_task().await.unwrap();
    let completion = controller.lost_count().await.unwrap();

    assert_eq!(completion.outcome.elapsed_secs, 0);
    assert_eq!(completion.record.bct_score, 0.0);
    // (2 + 2 + 2 + 1) / 4 = 1.75 → 35.
    assert_eq!(completion.record.rewired_index, 35);
    assert_eq!(completion.record.tier, Tier::BaselineMode);
    assert_eq!(controller.stage().await, Stage::Results);
}

#[tokio::test]
async fn dialogue_without_baseline_redirects() {
    let store = Arc::new(MemoryStorage::new());
    let nav = Arc::new(RecordingNavigator::new());
    let ctx = SessionContext::new(store, nav.clone(), InstallerConfig::default());

    assert!(DialogueDriver::initialize(&ctx).await.is_err());
    assert_eq!(nav.routes(), vec![Route::Assessment]);
}

#[tokio::test]
async fn baseline_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("rewired.db");

    {
        let store: Arc<dyn Storage> = Arc::new(LibSqlBackend::new_local(&path).await.unwrap());
        let ctx = SessionContext::new(
            store,
            Arc::new(RecordingNavigator::new()),
            config(180, Duration::from_secs(60)),
        );
        let controller = AssessmentController::new(ctx);
        answer_all(&controller, 4).await;
        controller.start_task().await.unwrap();
        let completion = controller.lost_count().await.unwrap();
        assert!(completion.persisted);
    }

    let store: Arc<dyn Storage> = Arc::new(LibSqlBackend::new_local(&path).await.unwrap());
    let nav = Arc::new(RecordingNavigator::new());
    let ctx = SessionContext::new(store, nav.clone(), InstallerConfig::default());
    let driver = DialogueDriver::initialize(&ctx).await.unwrap();

    assert_eq!(driver.baseline().current_stage, 1);
    assert!(nav.routes().is_empty());
}
