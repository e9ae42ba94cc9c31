// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery tracker.
//!
//! Chooses the acknowledgment from what was actually communicated, not
//! from whether the job errored. The core invariant: a success signal is
//! emitted only when no text reply was intended, or when text was
//! confirmed sent. Every finalized job lands in exactly one
//! `Delivered*` state.

use crate::postprocess::strip_noise;
use tracing::{error, warn};
use valor_adapters::transport::ChatTransport;
use valor_core::{DeliveryState, Job, Reaction};

/// Sent in place of a reply that post-processing reduced to nothing.
const EMPTY_REPLY_FALLBACK: &str =
    "Done — the agent finished without a text summary. Check the project for the result.";

/// Appended to a reply when the auto-continuation budget ran out.
const EXHAUSTION_NOTE: &str =
    "(Auto-continuation limit reached; delivering the latest progress as-is.)";

/// Per-job finalization record.
///
/// `replied` is an explicit field set exactly once, after the transport
/// confirms the send; the reaction choice reads it instead of inferring
/// success from the absence of an error.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOutcome {
    pub state: DeliveryState,
    pub replied: bool,
    pub reaction: Reaction,
}

/// Finalizes jobs against the chat transport.
#[derive(Clone)]
pub struct DeliveryTracker<T: ChatTransport> {
    transport: T,
}

impl<T: ChatTransport> DeliveryTracker<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Deliver a successful job's output.
    ///
    /// Empty raw output means no reply was intended: one ack reaction,
    /// no message. Non-empty raw output must reach the user: if
    /// post-processing strips it to nothing, a fallback text goes out
    /// instead, with a warning logged.
    pub async fn finalize_reply(&self, job: &Job, raw_text: &str, exhausted: bool) -> DeliveryOutcome {
        let text_intended = !raw_text.trim().is_empty();

        if !text_intended {
            self.react(job, Reaction::Ack).await;
            return DeliveryOutcome {
                state: DeliveryState::DeliveredAck,
                replied: false,
                reaction: Reaction::Ack,
            };
        }

        let mut text = strip_noise(raw_text);
        if text.is_empty() {
            warn!(
                job_id = %job.id,
                raw_len = raw_text.len(),
                "post-processing stripped a non-empty reply to nothing, substituting fallback text",
            );
            text = EMPTY_REPLY_FALLBACK.to_string();
        }
        if exhausted {
            text = format!("{text}\n\n{EXHAUSTION_NOTE}");
        }

        match self
            .transport
            .send_text(&job.chat_id, &text, Some(&job.message_id))
            .await
        {
            Ok(()) => {
                // The one place `replied` becomes true: after a confirmed send.
                self.react(job, Reaction::Replied).await;
                DeliveryOutcome {
                    state: DeliveryState::DeliveredReply,
                    replied: true,
                    reaction: Reaction::Replied,
                }
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "reply send failed, downgrading to error signal");
                self.react(job, Reaction::Error).await;
                DeliveryOutcome {
                    state: DeliveryState::DeliveredError,
                    replied: false,
                    reaction: Reaction::Error,
                }
            }
        }
    }

    /// Deliver an error: a distinct error reaction plus an error message.
    pub async fn finalize_error(&self, job: &Job, message: &str) -> DeliveryOutcome {
        if let Err(e) = self
            .transport
            .send_text(&job.chat_id, message, Some(&job.message_id))
            .await
        {
            // Still mark the error reaction; the user must never see a
            // bare success signal out of this path.
            error!(job_id = %job.id, error = %e, "error message send failed");
        }
        self.react(job, Reaction::Error).await;
        DeliveryOutcome {
            state: DeliveryState::DeliveredError,
            replied: false,
            reaction: Reaction::Error,
        }
    }

    async fn react(&self, job: &Job, reaction: Reaction) {
        if let Err(e) = self
            .transport
            .send_reaction(&job.chat_id, &job.message_id, reaction)
            .await
        {
            warn!(job_id = %job.id, %reaction, error = %e, "reaction send failed");
        }
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
