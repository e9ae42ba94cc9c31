// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifier.

crate::define_id! {
    /// Identity of a conversational agent session.
    ///
    /// Stable across the continuation jobs of one exchange, so the
    /// session engine can resume prior context.
    pub struct SessionId;
}
