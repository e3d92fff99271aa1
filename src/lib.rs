//! regex-filter - ordered regex rewrite rules for chat-bot replies
//!
//! This library rewrites outgoing text with a user-editable list of regex
//! rules, applied strictly in order: each rule sees the output of the one
//! before it.
//!
//! # Features
//!
//! - **Four actions**: replace, delete, append after match, prepend before match
//! - **Per-rule isolation**: a rule that fails at match time is skipped, the rest still run
//! - **Durable rules**: rules live in a TOML or JSON document, grouped by action
//! - **Consistent edits**: the document is saved before the in-memory list changes
//! - **Host hooks**: model responses and plain-text segments of outgoing messages
//! - **Chat commands**: add, list, remove, test, toggle
//!
//! # Example
//!
//! ```
//! use regex_filter::{Command, ConfigDocument, ConfigHandle, LlmResponse, RegexFilter};
//!
//! let mut filter = RegexFilter::load(ConfigHandle::in_memory(ConfigDocument::default()));
//! filter.execute(Command::parse("regex_add colour color").unwrap());
//!
//! let mut response = LlmResponse { completion_text: "my colour".to_string() };
//! filter.on_llm_response(&mut response);
//! assert_eq!(response.completion_text, "my color");
//! ```

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod message;
pub mod plugin;
pub mod rewrite_log;
pub mod rules;
pub mod store;

// Re-exports for convenience
pub use commands::Command;
pub use config::{ConfigDocument, ConfigHandle, DocumentStore, FileStore, MemoryStore, RawRuleRecord};
pub use engine::{apply, Applied};
pub use error::FilterError;
pub use message::{HookEvent, LlmResponse, Segment};
pub use plugin::RegexFilter;
pub use rules::{Action, Rule};
pub use store::{add_rule, add_rule_with_action, hydrate, remove_rule, RuleStore};
