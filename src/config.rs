//! Configuration document for regex-filter
//!
//! The document is the durable form of the rule list: rules grouped by
//! action plus the plugin switches. It is stored as TOML, or as JSON when
//! the file name ends in `.json`.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{FilterError, Result};
use crate::rules::{Action, DEFAULT_BACKTRACK_LIMIT};

/// A rule as written in the document
///
/// Older documents list bare pattern strings; newer ones use tables.
/// Anything else is kept as `Malformed` so the rest of the document still
/// loads and the entry is written back untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRuleRecord {
    /// Pattern only, empty replacement
    PatternOnly(String),

    /// Pattern with an optional replacement
    Structured {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replacement: Option<String>,
    },

    /// Entry that is neither of the above
    Malformed(serde_json::Value),
}

impl RawRuleRecord {
    /// Record written for a rule added at runtime
    pub fn new(pattern: &str, replacement: &str, action: Action) -> Self {
        RawRuleRecord::Structured {
            pattern: pattern.to_string(),
            replacement: action
                .uses_replacement()
                .then(|| replacement.to_string()),
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            RawRuleRecord::PatternOnly(pattern) => pattern,
            RawRuleRecord::Structured { pattern, .. } => pattern,
            RawRuleRecord::Malformed(_) => "",
        }
    }

    pub fn replacement(&self) -> &str {
        match self {
            RawRuleRecord::PatternOnly(_) | RawRuleRecord::Malformed(_) => "",
            RawRuleRecord::Structured { replacement, .. } => replacement.as_deref().unwrap_or(""),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_backtrack_limit() -> usize {
    DEFAULT_BACKTRACK_LIMIT
}

/// The persisted configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Master switch for both hooks
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also rewrite every outgoing message, not only model responses
    #[serde(default)]
    pub listen_all_responses: bool,

    /// Match-time backtracking budget per rule application
    #[serde(default = "default_backtrack_limit")]
    pub backtrack_limit: usize,

    /// JSONL file receiving one entry per hook rewrite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_log: Option<String>,

    #[serde(default)]
    pub replace_rules: Vec<RawRuleRecord>,

    #[serde(default)]
    pub delete_rules: Vec<RawRuleRecord>,

    #[serde(default)]
    pub append_rules: Vec<RawRuleRecord>,

    #[serde(default)]
    pub prepend_rules: Vec<RawRuleRecord>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_all_responses: false,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
            rewrite_log: None,
            replace_rules: Vec::new(),
            delete_rules: Vec::new(),
            append_rules: Vec::new(),
            prepend_rules: Vec::new(),
        }
    }
}

impl ConfigDocument {
    /// Records stored for an action
    pub fn bucket(&self, action: Action) -> &[RawRuleRecord] {
        match action {
            Action::Replace => &self.replace_rules,
            Action::Delete => &self.delete_rules,
            Action::Append => &self.append_rules,
            Action::Prepend => &self.prepend_rules,
        }
    }

    pub fn bucket_mut(&mut self, action: Action) -> &mut Vec<RawRuleRecord> {
        match action {
            Action::Replace => &mut self.replace_rules,
            Action::Delete => &mut self.delete_rules,
            Action::Append => &mut self.append_rules,
            Action::Prepend => &mut self.prepend_rules,
        }
    }

    /// Total number of records across all buckets
    pub fn record_count(&self) -> usize {
        Action::ALL.iter().map(|a| self.bucket(*a).len()).sum()
    }

    /// Parse a document, choosing the format from the path
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let parsed: std::result::Result<Self, String> = if is_json(path) {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            toml::from_str(content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| FilterError::ConfigParse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Serialize a document, choosing the format from the path
    pub fn render(&self, path: &Path) -> Result<String> {
        let rendered = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| e.to_string())
        } else {
            toml::to_string_pretty(self).map_err(|e| e.to_string())
        };
        rendered.map_err(|message| FilterError::Persistence {
            path: path.display().to_string(),
            message,
        })
    }

    /// Get the rewrite log path (expanded)
    pub fn rewrite_log_path(&self) -> Option<PathBuf> {
        self.rewrite_log.as_ref().map(|p| expand_path(p))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Expand ~ in path strings
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Standard document location
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("regex-filter")
        .join("config.toml")
}

/// Durable backing for a configuration document
pub trait DocumentStore {
    /// Write the whole document
    fn save(&mut self, document: &ConfigDocument) -> Result<()>;

    /// Where the document lives, for messages
    fn location(&self) -> String;
}

/// Document stored in a file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the document. A missing file is an empty document.
    pub fn load(&self) -> Result<ConfigDocument> {
        if !self.path.exists() {
            return Ok(ConfigDocument::default());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| FilterError::ConfigParse {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        ConfigDocument::parse(&content, &self.path)
    }
}

impl DocumentStore for FileStore {
    fn save(&mut self, document: &ConfigDocument) -> Result<()> {
        let persistence = |e: std::io::Error| FilterError::Persistence {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };

        let content = document.render(&self.path)?;
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(persistence)?;
                parent
            }
            None => Path::new("."),
        };

        // Write beside the target and rename over it, so a failed write
        // leaves the previous document in place
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(persistence)?;
        temp.write_all(content.as_bytes()).map_err(persistence)?;
        temp.as_file().sync_all().map_err(persistence)?;
        temp.persist(&self.path)
            .map_err(|e| persistence(e.error))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Store that keeps nothing, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Reject every save while set
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self { fail_writes: true }
    }
}

impl DocumentStore for MemoryStore {
    fn save(&mut self, _document: &ConfigDocument) -> Result<()> {
        if self.fail_writes {
            return Err(FilterError::Persistence {
                path: self.location(),
                message: "write rejected".to_string(),
            });
        }
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

/// A document together with the store it persists to
///
/// The in-memory copy only changes after the store accepted the write.
pub struct ConfigHandle {
    document: ConfigDocument,
    store: Box<dyn DocumentStore>,
}

impl ConfigHandle {
    pub fn new(document: ConfigDocument, store: Box<dyn DocumentStore>) -> Self {
        Self { document, store }
    }

    /// Load a file-backed document
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = FileStore::new(path);
        let document = store.load()?;
        Ok(Self::new(document, Box::new(store)))
    }

    /// A document that is never written anywhere durable
    pub fn in_memory(document: ConfigDocument) -> Self {
        Self::new(document, Box::new(MemoryStore::default()))
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Persist `candidate`, then adopt it as the current document
    pub fn commit(&mut self, candidate: ConfigDocument) -> Result<()> {
        self.store.save(&candidate)?;
        self.document = candidate;
        Ok(())
    }

    /// Write the current document again
    pub fn save(&mut self) -> Result<()> {
        self.store.save(&self.document)
    }

    pub(crate) fn document_mut(&mut self) -> &mut ConfigDocument {
        &mut self.document
    }
}

impl std::fmt::Debug for ConfigHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("document", &self.document)
            .field("location", &self.store.location())
            .finish()
    }
}
