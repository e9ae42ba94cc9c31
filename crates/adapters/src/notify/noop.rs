// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op notify adapter.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use tracing::info;

/// Logs instead of notifying. For servers without a desktop session.
#[derive(Clone, Default)]
pub struct NoOpNotifyAdapter;

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        info!(title, message, "notification (noop)");
        Ok(())
    }
}
