// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL write-ahead log for job events.
//!
//! Each entry is a single line of JSON: `{"seq":N,"event":{...}}\n`.
//! Appends are flushed and fsynced before `append` returns; job-queue
//! mutations are rare enough that the durability point can sit on the
//! public API boundary instead of a group-commit buffer.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use valor_core::JobEvent;

/// Errors from WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialization helper for writing entries without cloning the event.
#[derive(Serialize)]
struct WalRecordRef<'a> {
    seq: u64,
    event: &'a JobEvent,
}

/// Deserialization helper for reading entries.
#[derive(Deserialize)]
struct WalRecord {
    seq: u64,
    event: JobEvent,
}

/// A single WAL entry with its sequence number.
#[derive(Debug, Clone)]
pub struct WalEntry {
    pub seq: u64,
    pub event: JobEvent,
}

/// Append-only JSONL log of job events.
pub struct Wal {
    file: File,
    path: PathBuf,
    /// Highest sequence number written so far.
    write_seq: u64,
}

impl Wal {
    /// Open or create a WAL at the given path.
    ///
    /// A corrupt tail (torn write from a crash) is rotated to `.bak` and
    /// the valid prefix preserved, so replay never stops at garbage.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let (valid_lines, max_seq, corrupt) = Self::scan(&file)?;

        let file = if corrupt {
            drop(file);
            let bak_path = crate::snapshot::rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_entries = valid_lines.len(),
                "Corrupt WAL tail detected, rotating to .bak and preserving valid entries",
            );
            std::fs::rename(path, &bak_path)?;

            {
                let mut clean = File::create(path)?;
                for line in &valid_lines {
                    clean.write_all(line.as_bytes())?;
                    clean.write_all(b"\n")?;
                }
                clean.sync_all()?;
            }

            OpenOptions::new()
                .create(true)
                .read(true)
                .append(true)
                .open(path)?
        } else {
            file
        };

        Ok(Self {
            file,
            path: path.to_owned(),
            write_seq: max_seq,
        })
    }

    /// Read all parseable lines, stopping at the first corrupt entry.
    ///
    /// Returns `(valid_lines, max_seq, corrupt)`.
    fn scan(file: &File) -> Result<(Vec<String>, u64, bool), WalError> {
        let mut reader = BufReader::new(file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;

        let mut valid_lines = Vec::new();
        let mut max_seq = 0u64;
        let mut corrupt = false;
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    corrupt = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: WalRecord = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(_) => {
                    corrupt = true;
                    break;
                }
            };

            max_seq = max_seq.max(record.seq);
            valid_lines.push(trimmed.to_string());
        }

        Ok((valid_lines, max_seq, corrupt))
    }

    /// Append an event and fsync. This is the durability point: once
    /// `append` returns, the event survives a crash.
    pub fn append(&mut self, event: &JobEvent) -> Result<u64, WalError> {
        self.write_seq += 1;
        let seq = self.write_seq;
        let record = WalRecordRef { seq, event };
        let mut json_bytes = serde_json::to_vec(&record)?;
        json_bytes.push(b'\n');
        self.file.write_all(&json_bytes)?;
        self.file.sync_all()?;
        Ok(seq)
    }

    /// Highest sequence number written.
    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// All entries with a sequence number greater than `seq`, in order.
    ///
    /// Used for recovery: replay on top of a snapshot taken at `seq`.
    pub fn entries_after(&self, seq: u64) -> Result<Vec<WalEntry>, WalError> {
        let mut reader = BufReader::new(self.file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;

        let mut entries = Vec::new();
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
                Err(e) => return Err(e.into()),
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: WalRecord = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "Corrupt WAL entry during replay, stopping at corruption point");
                    break;
                }
            };

            if record.seq > seq {
                entries.push(WalEntry {
                    seq: record.seq,
                    event: record.event,
                });
            }
        }

        Ok(entries)
    }

    /// Drop entries at or below `seq`, reclaiming space after a checkpoint.
    ///
    /// Rewrites the log to a temp file and atomically renames it in.
    pub fn truncate_through(&mut self, seq: u64) -> Result<(), WalError> {
        let kept = self.entries_after(seq)?;
        let tmp_path = self.path.with_extension("tmp");

        {
            let mut tmp_file = File::create(&tmp_path)?;
            for entry in &kept {
                let record = WalRecordRef {
                    seq: entry.seq,
                    event: &entry.event,
                };
                let mut json_bytes = serde_json::to_vec(&record)?;
                json_bytes.push(b'\n');
                tmp_file.write_all(&json_bytes)?;
            }
            tmp_file.sync_all()?;
        }

        std::fs::rename(&tmp_path, &self.path)?;

        self.file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
