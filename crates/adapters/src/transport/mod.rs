// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat transport adapter.
//!
//! The bridge that moves messages in and out of the chat network is a
//! separate process; the execution core only ever calls these two
//! operations. A reaction is a small visual signal attached to the
//! user's original message; a text send is the actual reply.

mod noop;

pub use noop::NoOpChatTransport;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeChatTransport, TransportCall};

use async_trait::async_trait;
use thiserror::Error;
use valor_core::Reaction;

/// Errors from transport operations
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for the chat network.
#[async_trait]
pub trait ChatTransport: Clone + Send + Sync + 'static {
    /// Attach a reaction to a message.
    async fn send_reaction(
        &self,
        chat_id: &str,
        message_id: &str,
        reaction: Reaction,
    ) -> Result<(), TransportError>;

    /// Send a text reply. `Ok(())` means the transport confirmed the send.
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<(), TransportError>;
}
