// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable job store for the Valor execution core.
//!
//! Mutations are appended to a JSONL write-ahead log and fsynced before the
//! call returns; the in-memory state is a fold over the log. Recovery loads
//! the latest snapshot and replays the WAL tail.

mod snapshot;
mod store;
mod wal;

pub use snapshot::{Snapshot, SnapshotError};
pub use store::{JobStore, RecoveryReport, StoreError, StoreState};
pub use wal::{Wal, WalEntry, WalError};
