// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake chat transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChatTransport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use valor_core::Reaction;

/// Recorded transport call
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Reaction {
        chat_id: String,
        message_id: String,
        reaction: Reaction,
    },
    Text {
        chat_id: String,
        text: String,
        reply_to: Option<String>,
    },
}

struct FakeTransportState {
    calls: Vec<TransportCall>,
    fail_text_sends: u32,
}

/// Fake transport that records calls and can fail text sends on demand.
#[derive(Clone)]
pub struct FakeChatTransport {
    inner: Arc<Mutex<FakeTransportState>>,
}

impl Default for FakeChatTransport {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeTransportState {
                calls: Vec::new(),
                fail_text_sends: 0,
            })),
        }
    }
}

impl FakeChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` text sends fail.
    pub fn fail_next_text_sends(&self, n: u32) {
        self.inner.lock().fail_text_sends = n;
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().calls.clone()
    }

    /// Just the reactions, in order.
    pub fn reactions(&self) -> Vec<Reaction> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Reaction { reaction, .. } => Some(*reaction),
                _ => None,
            })
            .collect()
    }

    /// Just the sent texts, in order.
    pub fn texts(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatTransport for FakeChatTransport {
    async fn send_reaction(
        &self,
        chat_id: &str,
        message_id: &str,
        reaction: Reaction,
    ) -> Result<(), TransportError> {
        self.inner.lock().calls.push(TransportCall::Reaction {
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
            reaction,
        });
        Ok(())
    }

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.fail_text_sends > 0 {
            inner.fail_text_sends -= 1;
            return Err(TransportError::SendFailed("injected failure".to_string()));
        }
        inner.calls.push(TransportCall::Text {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            reply_to: reply_to.map(|s| s.to_string()),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
