//! DialogueDriver — plays the onboarding script over a persisted baseline.
//!
//! The driver never blocks on time: it appends assistant lines to an outbox
//! and the presentation layer drains it (see [`super::pacing`]). It reads
//! storage once at startup and never writes back.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::DialogueError;
use crate::navigation::Route;
use crate::session::SessionContext;

use super::intent::{Intent, classify};
use super::model::{BaselineSnapshot, ChatMessage, PacedMessage};
use super::script::{self, ScriptLine};
use super::state::ConversationState;

pub struct DialogueDriver {
    baseline: BaselineSnapshot,
    state: ConversationState,
    transcript: Vec<ChatMessage>,
    outbox: VecDeque<PacedMessage>,
    pacing: bool,
}

impl DialogueDriver {
    /// Load the baseline and queue the greeting.
    ///
    /// When the baseline is missing or unreadable the user is redirected to
    /// the assessment and no dialogue is produced.
    pub async fn initialize(ctx: &SessionContext) -> Result<Self, DialogueError> {
        match BaselineSnapshot::load(ctx.store.as_ref()).await {
            Ok(baseline) => {
                info!(
                    session_id = %ctx.id,
                    rewired_index = baseline.rewired_index,
                    tier = %baseline.tier,
                    "Baseline loaded, starting onboarding"
                );
                let mut driver = Self::new(baseline, ctx.config.pacing);
                driver.start();
                Ok(driver)
            }
            Err(e) => {
                warn!(session_id = %ctx.id, "Baseline unavailable, redirecting: {}", e);
                ctx.navigator.navigate(Route::Assessment);
                Err(DialogueError::NotInitialized(e.to_string()))
            }
        }
    }

    /// A driver in `Init` with nothing queued.
    pub fn new(baseline: BaselineSnapshot, pacing: bool) -> Self {
        Self {
            baseline,
            state: ConversationState::Init,
            transcript: Vec::new(),
            outbox: VecDeque::new(),
            pacing,
        }
    }

    /// Queue the baseline review. Only meaningful in `Init`.
    pub fn start(&mut self) {
        if self.state != ConversationState::Init || !self.transcript.is_empty() {
            return;
        }
        let lines = script::greeting(&self.baseline);
        self.enqueue(lines, Some(ConversationState::Stage1ConfirmationPending));
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn baseline(&self) -> &BaselineSnapshot {
        &self.baseline
    }

    pub fn header(&self) -> String {
        script::header(&self.baseline)
    }

    /// Every message so far, user and assistant, in order.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Number of assistant messages not yet handed to the presentation layer.
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Hand queued messages to the presentation layer, settling any
    /// follow-up state they carry.
    pub fn take_outbox(&mut self) -> Vec<PacedMessage> {
        let batch: Vec<PacedMessage> = self.outbox.drain(..).collect();
        for paced in &batch {
            if let Some(next) = paced.then {
                self.transition(next);
            }
        }
        batch
    }

    /// Process one user reply. Blank input is ignored.
    pub fn handle_user_message(&mut self, input: &str) -> ConversationState {
        let text = input.trim();
        if text.is_empty() {
            return self.state;
        }
        self.transcript.push(ChatMessage::user(text));

        match self.state {
            ConversationState::Stage1ConfirmationPending => match classify(text) {
                Intent::Affirmative => self.introduce_stage1(),
                Intent::Negative => self.say(script::DEFERRAL),
                Intent::Unclear => {
                    self.say(script::ASSUME_YES);
                    self.introduce_stage1();
                }
            },
            ConversationState::PracticeAckPending => self.introduce_tracking(),
            _ => self.say(script::LISTENING),
        }
        self.state
    }

    fn introduce_stage1(&mut self) {
        self.transition(ConversationState::Stage1IntroShown);
        self.enqueue(
            script::stage1_intro(),
            Some(ConversationState::PracticeAckPending),
        );
    }

    fn introduce_tracking(&mut self) {
        self.transition(ConversationState::TrackingExplained);
        self.enqueue(script::tracking(), Some(ConversationState::ReadyToBegin));
    }

    fn say(&mut self, text: &str) {
        self.enqueue(
            vec![ScriptLine {
                text: text.to_string(),
                delay_ms: 0,
            }],
            None,
        );
    }

    /// Append a batch to the transcript and the outbox. The follow-up state
    /// rides on the last line.
    fn enqueue(&mut self, lines: Vec<ScriptLine>, then: Option<ConversationState>) {
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.into_iter().enumerate() {
            let message = ChatMessage::assistant(line.text);
            let delay = if self.pacing {
                Duration::from_millis(line.delay_ms)
            } else {
                Duration::ZERO
            };
            self.transcript.push(message.clone());
            self.outbox.push_back(PacedMessage {
                message,
                delay,
                then: if i == last { then } else { None },
            });
        }
    }

    fn transition(&mut self, target: ConversationState) {
        if self.state.can_transition_to(target) {
            debug!(from = %self.state, to = %target, "Conversation state change");
            self.state = target;
        } else {
            warn!(from = %self.state, to = %target, "Ignoring invalid conversation transition");
        }
    }
}
