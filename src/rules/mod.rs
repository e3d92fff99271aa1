//! Rewrite rules for regex-filter
//!
//! A rule pairs a compiled pattern with a replacement and the action that
//! decides how the replacement is used.

pub mod defaults;

use std::borrow::Cow;
use std::fmt;

use fancy_regex::{Regex, RegexBuilder};

use crate::error::{FilterError, Result};

/// Backtracking budget used when a document does not set one
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// What a rule does with each match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Substitute every match with the replacement
    Replace,

    /// Remove every match
    Delete,

    /// Insert the replacement right after every match
    Append,

    /// Insert the replacement right before every match
    Prepend,
}

impl Action {
    /// Every action in document bucket order
    pub const ALL: [Action; 4] = [
        Action::Replace,
        Action::Delete,
        Action::Append,
        Action::Prepend,
    ];

    /// Configuration document key holding rules of this action
    pub fn bucket(&self) -> &'static str {
        match self {
            Action::Replace => "replace_rules",
            Action::Delete => "delete_rules",
            Action::Append => "append_rules",
            Action::Prepend => "prepend_rules",
        }
    }

    /// Human-readable label used in descriptions and listings
    pub fn label(&self) -> &'static str {
        match self {
            Action::Replace => "Replace",
            Action::Delete => "Delete",
            Action::Append => "Append",
            Action::Prepend => "Prepend",
        }
    }

    /// Whether the replacement text is meaningful for this action
    pub fn uses_replacement(&self) -> bool {
        !matches!(self, Action::Delete)
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "replace" => Some(Action::Replace),
            "delete" => Some(Action::Delete),
            "append" => Some(Action::Append),
            "prepend" => Some(Action::Prepend),
            _ => None,
        }
    }

    /// Action chosen when none is given: empty replacement deletes
    pub fn infer(replacement: &str) -> Self {
        if replacement.is_empty() {
            Action::Delete
        } else {
            Action::Replace
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single compiled rewrite rule
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    replacement: String,
    action: Action,
    description: String,
    regex: Regex,
}

impl Rule {
    /// Compile a rule. Delete rules always carry an empty replacement.
    pub fn new(
        pattern: &str,
        replacement: &str,
        action: Action,
        backtrack_limit: usize,
    ) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .backtrack_limit(backtrack_limit)
            .build()
            .map_err(|e| FilterError::invalid_pattern(pattern, e))?;

        let replacement = if action.uses_replacement() {
            replacement.to_string()
        } else {
            String::new()
        };

        Ok(Self {
            description: describe(pattern, &replacement, action),
            pattern: pattern.to_string(),
            replacement,
            action,
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Substitute every non-overlapping match, left to right.
    ///
    /// Fails only when the engine gives up at match time.
    pub fn rewrite<'t>(
        &self,
        text: &'t str,
    ) -> std::result::Result<Cow<'t, str>, fancy_regex::Error> {
        let template: Cow<'_, str> = match self.action {
            Action::Replace => Cow::Borrowed(self.replacement.as_str()),
            Action::Delete => Cow::Borrowed(""),
            Action::Append => Cow::Owned(format!("${{0}}{}", self.replacement)),
            Action::Prepend => Cow::Owned(format!("{}${{0}}", self.replacement)),
        };
        self.regex.try_replacen(text, 0, &*template)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.replacement == other.replacement
            && self.action == other.action
            && self.description == other.description
    }
}

impl Eq for Rule {}

/// Description derived from the rule's parts
pub fn describe(pattern: &str, replacement: &str, action: Action) -> String {
    if action.uses_replacement() {
        format!("{}: {} -> {}", action.label(), pattern, replacement)
    } else {
        format!("{}: {}", action.label(), pattern)
    }
}
