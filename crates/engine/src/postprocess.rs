// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output post-processing before delivery.
//!
//! Agent CLIs interleave the assistant's words with tool invocations,
//! progress spinners and ANSI styling. Only the words go to chat.

use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::unwrap_used)] // literal pattern, exercised by every test below
fn ansi_escapes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap())
}

/// Lines matching any of these are tool/runner noise, not assistant text.
const NOISE_PREFIXES: &[&str] = &[
    "[tool]",
    "[tool_use]",
    "[tool_result]",
    "⏺",
    "⎿",
    "∴",
    "tokens:",
    "ctrl+",
];

fn is_noise_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    NOISE_PREFIXES
        .iter()
        .any(|p| trimmed.to_ascii_lowercase().starts_with(&p.to_ascii_lowercase()))
}

/// Strip tool noise and terminal styling from raw agent output.
///
/// May legitimately reduce a non-empty response to nothing (a run that
/// only produced tool calls); the delivery tracker substitutes a fallback
/// in that case rather than dropping the reply.
pub fn strip_noise(raw: &str) -> String {
    let no_ansi = ansi_escapes().replace_all(raw, "");
    let kept: Vec<&str> = no_ansi
        .lines()
        .filter(|line| !is_noise_line(line))
        .collect();
    kept.join("\n").trim().to_string()
}

#[cfg(test)]
#[path = "postprocess_tests.rs"]
mod tests;
