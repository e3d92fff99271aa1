//! JSONL rewrite log for regex-filter
//!
//! Records every hook invocation that changed text, for later review of
//! which rules fire in practice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::engine::Applied;

/// A rewrite log entry
#[derive(Debug, Serialize)]
pub struct RewriteEntry {
    /// When the rewrite happened
    pub timestamp: DateTime<Utc>,

    /// Hook that triggered it (llm_response, decorating_result)
    pub hook: String,

    /// 1-based positions of the rules that changed the text
    pub applied_rules: Vec<usize>,

    /// Rules skipped because they failed at match time
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_rules: Vec<usize>,

    /// Length of the original text, in characters
    pub chars_before: usize,

    /// Length of the rewritten text, in characters
    pub chars_after: usize,
}

impl RewriteEntry {
    pub fn new(hook: &str, original: &str, applied: &Applied) -> Self {
        Self {
            timestamp: Utc::now(),
            hook: hook.to_string(),
            applied_rules: applied.applied.clone(),
            failed_rules: applied.failed.clone(),
            chars_before: original.chars().count(),
            chars_after: applied.text.chars().count(),
        }
    }
}

/// Rewrite logger
#[derive(Default)]
pub struct RewriteLog {
    writer: Option<BufWriter<File>>,
}

impl RewriteLog {
    /// Open (or create) the log file; `None` disables logging
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            match OpenOptions::new().create(true).append(true).open(p) {
                Ok(file) => Some(BufWriter::new(file)),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "rewrite log disabled");
                    None
                }
            }
        });

        Self { writer }
    }

    /// Append an entry
    pub fn log(&mut self, entry: &RewriteEntry) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Log a rewrite made by a hook
    pub fn log_rewrite(
        &mut self,
        hook: &str,
        original: &str,
        applied: &Applied,
    ) -> Result<(), std::io::Error> {
        let entry = RewriteEntry::new(hook, original, applied);
        self.log(&entry)
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}

impl std::fmt::Debug for RewriteLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteLog")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
