//! Rule store and its synchronization with the configuration document
//!
//! The store is the runtime rule list. The document is its durable form.
//! Mutations persist the document first and touch the store only after the
//! write succeeded, so the two never diverge.

use tracing::{debug, info, warn};

use crate::config::{ConfigDocument, ConfigHandle, RawRuleRecord};
use crate::engine::{self, Applied};
use crate::error::{FilterError, Result};
use crate::rules::defaults::DEFAULT_RULES;
use crate::rules::{Action, Rule};

/// Ordered list of rules; position 1 is applied first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStore {
    rules: Vec<Rule>,
    backtrack_limit: usize,
}

impl RuleStore {
    /// Create an empty store
    pub fn new(backtrack_limit: usize) -> Self {
        Self {
            rules: Vec::new(),
            backtrack_limit,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule at a 1-based position
    pub fn get(&self, index: usize) -> Option<&Rule> {
        index.checked_sub(1).and_then(|i| self.rules.get(i))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn backtrack_limit(&self) -> usize {
        self.backtrack_limit
    }

    /// Run every rule over `text` in order
    pub fn apply(&self, text: &str) -> Applied {
        engine::apply(&self.rules, text)
    }

    /// Compile a rule with this store's limits
    pub fn compile(&self, pattern: &str, replacement: &str, action: Action) -> Result<Rule> {
        Rule::new(pattern, replacement, action, self.backtrack_limit)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < 1 || index > self.rules.len() {
            return Err(FilterError::IndexOutOfRange {
                index,
                len: self.rules.len(),
            });
        }
        Ok(())
    }
}

/// Outcome of hydrating a document
#[derive(Debug)]
pub struct Hydrated {
    pub store: RuleStore,

    /// The document had no usable rules and received the defaults
    pub seeded_defaults: bool,
}

/// Build the rule list from a document.
///
/// Buckets are read in `Action::ALL` order. Malformed records and records
/// with an empty or uncompilable pattern are logged and skipped; they stay
/// in the document as they were. When nothing usable remains
/// the default rules are loaded and appended to the document's buckets, so
/// hydrating the updated document again yields the same list.
pub fn hydrate(document: &mut ConfigDocument) -> Hydrated {
    let mut store = RuleStore::new(document.backtrack_limit);

    for action in Action::ALL {
        for record in document.bucket(action) {
            if let RawRuleRecord::Malformed(value) = record {
                warn!(bucket = action.bucket(), record = %value, "skipping malformed rule record");
                continue;
            }
            let pattern = record.pattern();
            if pattern.is_empty() {
                debug!(bucket = action.bucket(), "skipping rule with empty pattern");
                continue;
            }
            match store.compile(pattern, record.replacement(), action) {
                Ok(rule) => {
                    debug!(action = %action, pattern, "loaded rule");
                    store.rules.push(rule);
                }
                Err(e) => warn!(bucket = action.bucket(), error = %e, "skipping rule"),
            }
        }
    }

    let seeded_defaults = store.is_empty();
    if seeded_defaults {
        for default in DEFAULT_RULES {
            match store.compile(default.pattern, default.replacement, default.action) {
                Ok(rule) => {
                    store.rules.push(rule);
                    document.bucket_mut(default.action).push(RawRuleRecord::new(
                        default.pattern,
                        default.replacement,
                        default.action,
                    ));
                }
                Err(e) => warn!(error = %e, "skipping default rule"),
            }
        }
        info!(count = store.len(), "no rules configured, using defaults");
    }

    Hydrated {
        store,
        seeded_defaults,
    }
}

/// Add a rule whose action follows from the replacement: empty deletes,
/// anything else replaces. Returns the new rule's 1-based index.
pub fn add_rule(
    store: &mut RuleStore,
    config: &mut ConfigHandle,
    pattern: &str,
    replacement: &str,
) -> Result<usize> {
    add_rule_with_action(store, config, pattern, replacement, Action::infer(replacement))
}

/// Add a rule with an explicit action. Returns the new rule's 1-based index.
pub fn add_rule_with_action(
    store: &mut RuleStore,
    config: &mut ConfigHandle,
    pattern: &str,
    replacement: &str,
    action: Action,
) -> Result<usize> {
    let rule = store.compile(pattern, replacement, action)?;

    let mut candidate = config.document().clone();
    candidate
        .bucket_mut(action)
        .push(RawRuleRecord::new(rule.pattern(), rule.replacement(), action));
    config.commit(candidate)?;

    info!(description = rule.description(), "rule added");
    store.rules.push(rule);
    Ok(store.len())
}

/// Remove the rule at a 1-based index and its document record.
///
/// The record matched is the first in the rule's bucket with the same
/// pattern and, for actions that carry one, the same replacement.
pub fn remove_rule(store: &mut RuleStore, config: &mut ConfigHandle, index: usize) -> Result<Rule> {
    store.check_index(index)?;
    let rule = &store.rules[index - 1];
    let action = rule.action();

    let mut candidate = config.document().clone();
    let bucket = candidate.bucket_mut(action);
    let position = bucket
        .iter()
        .position(|record| {
            record.pattern() == rule.pattern()
                && (!action.uses_replacement() || record.replacement() == rule.replacement())
        })
        .ok_or_else(|| FilterError::ConfigDesync {
            pattern: rule.pattern().to_string(),
            bucket: action.bucket().to_string(),
        })?;
    bucket.remove(position);
    config.commit(candidate)?;

    let removed = store.rules.remove(index - 1);
    info!(index, description = removed.description(), "rule removed");
    Ok(removed)
}
