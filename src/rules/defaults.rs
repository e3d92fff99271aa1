//! Built-in rule set
//!
//! Seeded into a document that yields no usable rules at all.

use crate::rules::Action;

/// A default rule definition
#[derive(Debug, Clone, Copy)]
pub struct DefaultRule {
    pub pattern: &'static str,
    pub replacement: &'static str,
    pub action: Action,
}

impl DefaultRule {
    const fn new(pattern: &'static str, replacement: &'static str, action: Action) -> Self {
        Self {
            pattern,
            replacement,
            action,
        }
    }
}

/// Rules used when the document has none
pub const DEFAULT_RULES: &[DefaultRule] = &[
    DefaultRule::new("不可以", "可以", Action::Replace),
    DefaultRule::new("(糟糕|坏|不好)", "好", Action::Replace),
    DefaultRule::new("问题", "", Action::Delete),
];
