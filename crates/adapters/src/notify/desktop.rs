// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notifications via the OS notification service.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;

/// Shows OS desktop notifications.
#[derive(Clone, Default)]
pub struct DesktopNotifyAdapter;

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let title = title.to_string();
        let message = message.to_string();
        // notify-rust blocks on DBus; keep it off the async executor
        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .summary(&title)
                .body(&message)
                .show()
                .map(|_| ())
                .map_err(|e| NotifyError::Failed(e.to_string()))
        })
        .await
        .map_err(|e| NotifyError::Failed(e.to_string()))?
    }
}
