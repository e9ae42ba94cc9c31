// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op transport for headless runs.

use super::{ChatTransport, TransportError};
use async_trait::async_trait;
use tracing::debug;
use valor_core::Reaction;

/// Transport that logs instead of sending. Useful when the bridge is down
/// or in local development.
#[derive(Clone, Default)]
pub struct NoOpChatTransport;

#[async_trait]
impl ChatTransport for NoOpChatTransport {
    async fn send_reaction(
        &self,
        chat_id: &str,
        message_id: &str,
        reaction: Reaction,
    ) -> Result<(), TransportError> {
        debug!(chat_id, message_id, %reaction, "noop transport: reaction");
        Ok(())
    }

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!(chat_id, reply_to, text_len = text.len(), "noop transport: text");
        Ok(())
    }
}
