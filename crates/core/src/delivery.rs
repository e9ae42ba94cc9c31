// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery outcome of a job, and the reaction vocabulary used to signal it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable outcome of a job with respect to what was actually sent.
///
/// Every finalized job ends in exactly one of the three `Delivered*`
/// states; there is no "unknown" terminal state. A job that spawned a
/// continuation stays `Processing` — its chain's final job carries the
/// terminal state for the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Job accepted, nothing sent yet.
    Received,
    /// A worker picked the job up.
    Processing,
    /// Acknowledged with a reaction only; no text reply was intended.
    DeliveredAck,
    /// A text reply was confirmed sent.
    DeliveredReply,
    /// An error reaction and message were sent.
    DeliveredError,
}

impl DeliveryState {
    /// serde default for job records written before the tracker ran.
    pub fn received() -> Self {
        DeliveryState::Received
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliveryState::DeliveredAck
                | DeliveryState::DeliveredReply
                | DeliveryState::DeliveredError
        )
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryState::Received => write!(f, "received"),
            DeliveryState::Processing => write!(f, "processing"),
            DeliveryState::DeliveredAck => write!(f, "delivered_ack"),
            DeliveryState::DeliveredReply => write!(f, "delivered_reply"),
            DeliveryState::DeliveredError => write!(f, "delivered_error"),
        }
    }
}

/// Acknowledgment signals emitted to the chat transport.
///
/// The three terminal signals are visually distinct from each other and
/// from `Processing`; in particular `Error` never reuses the processing
/// symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// Shown while a job is being worked on.
    Processing,
    /// Simple acknowledgment; no text reply.
    Ack,
    /// A text reply was sent.
    Replied,
    /// Something went wrong; an error message accompanies this.
    Error,
}

impl Reaction {
    pub fn emoji(&self) -> &'static str {
        match self {
            Reaction::Processing => "\u{1F440}",       // 👀
            Reaction::Ack => "\u{1F44D}",              // 👍
            Reaction::Replied => "\u{2705}",           // ✅
            Reaction::Error => "\u{26A0}\u{FE0F}",     // ⚠️
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reaction::Processing => write!(f, "processing"),
            Reaction::Ack => write!(f, "ack"),
            Reaction::Replied => write!(f, "replied"),
            Reaction::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
