//! Presentation-side scheduler for scripted messages.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::model::{ChatMessage, PacedMessage};

/// Spawn a task that replays queued messages with their delays, in order.
///
/// Feed it whatever [`DialogueDriver::take_outbox`] returns; messages come
/// out on `tx` after their pause. The task ends when either side closes.
///
/// [`DialogueDriver::take_outbox`]: super::driver::DialogueDriver::take_outbox
pub fn spawn_pacer(
    mut rx: mpsc::UnboundedReceiver<PacedMessage>,
    tx: mpsc::UnboundedSender<ChatMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(paced) = rx.recv().await {
            if !paced.delay.is_zero() {
                tokio::time::sleep(paced.delay).await;
            }
            if tx.send(paced.message).is_err() {
                tracing::debug!("Pacer output closed");
                break;
            }
        }
    })
}

/// Hand a drained outbox to a running pacer. Returns how many messages were
/// accepted; the rest are dropped once the pacer has gone away.
pub fn forward_batch(
    pacer: &mpsc::UnboundedSender<PacedMessage>,
    batch: Vec<PacedMessage>,
) -> usize {
    let total = batch.len();
    let mut accepted = 0;
    for paced in batch {
        if pacer.send(paced).is_err() {
            tracing::warn!(dropped = total - accepted, "Pacer closed, dropping messages");
            break;
        }
        accepted += 1;
    }
    accepted
}
