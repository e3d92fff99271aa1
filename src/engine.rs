//! Rule engine for regex-filter
//!
//! Applies an ordered rule list to a piece of text. Each rule sees the text
//! produced by the rules before it.

use tracing::{debug, warn};

use crate::error::FilterError;
use crate::rules::Rule;

/// Result of running a rule list over some text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Applied {
    /// Text after every rule ran
    pub text: String,

    /// 1-based positions of rules that changed the text, ascending
    pub applied: Vec<usize>,

    /// 1-based positions of rules that failed at match time and were skipped
    pub failed: Vec<usize>,
}

impl Applied {
    /// Whether any rule changed the text
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Apply `rules` to `input` in order.
///
/// A rule that fails at match time is logged and skipped; the next rule
/// continues from the text as it was before the failed one.
pub fn apply(rules: &[Rule], input: &str) -> Applied {
    let mut result = Applied {
        text: input.to_string(),
        ..Applied::default()
    };
    if input.is_empty() {
        return result;
    }

    for (i, rule) in rules.iter().enumerate() {
        let index = i + 1;
        match rule.rewrite(&result.text) {
            Ok(rewritten) => {
                if rewritten != result.text {
                    result.text = rewritten.into_owned();
                    result.applied.push(index);
                    debug!(index, description = rule.description(), "applied rule");
                }
            }
            Err(e) => {
                let err = FilterError::RuleRuntime {
                    index,
                    pattern: rule.pattern().to_string(),
                    message: e.to_string(),
                };
                warn!(error = %err, "rule skipped");
                result.failed.push(index);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Action, DEFAULT_BACKTRACK_LIMIT};

    fn rule(pattern: &str, replacement: &str, action: Action) -> Rule {
        Rule::new(pattern, replacement, action, DEFAULT_BACKTRACK_LIMIT).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let rules = vec![rule("^", "x", Action::Replace)];
        assert_eq!(apply(&rules, ""), Applied::default());
    }

    #[test]
    fn test_no_match_is_stable() {
        let rules = vec![rule("zzz", "y", Action::Replace)];
        let result = apply(&rules, "hello");
        assert_eq!(result.text, "hello");
        assert!(result.applied.is_empty());
        assert!(!result.changed());
    }

    #[test]
    fn test_order_is_load_bearing() {
        let a_to_b = rule("a", "b", Action::Replace);
        let b_to_c = rule("b", "c", Action::Replace);

        let forward = apply(&[a_to_b.clone(), b_to_c.clone()], "a");
        assert_eq!(forward.text, "c");
        assert_eq!(forward.applied, vec![1, 2]);

        let reversed = apply(&[b_to_c, a_to_b], "a");
        assert_eq!(reversed.text, "b");
        assert_eq!(reversed.applied, vec![2]);
    }

    #[test]
    fn test_match_that_changes_nothing_is_not_recorded() {
        let rules = vec![rule("a", "a", Action::Replace), rule("b", "x", Action::Replace)];
        let result = apply(&rules, "ab");
        assert_eq!(result.text, "ax");
        assert_eq!(result.applied, vec![2]);
    }

    #[test]
    fn test_runtime_failure_is_isolated() {
        let runaway = Rule::new("(?i)(a|b|ab)*(?=c)", "X", Action::Replace, 1_000).unwrap();
        let rules = vec![runaway, rule("b", "", Action::Delete)];

        let input = "ab".repeat(28);
        let result = apply(&rules, &input);

        assert_eq!(result.text, "a".repeat(28));
        assert_eq!(result.applied, vec![2]);
        assert_eq!(result.failed, vec![1]);
    }

    #[test]
    fn test_deterministic() {
        let rules = vec![rule(r"(\d+)", "N", Action::Replace), rule("X+", "", Action::Delete)];
        let first = apply(&rules, "id42 XX");
        let second = apply(&rules, "id42 XX");
        assert_eq!(first, second);
        assert_eq!(first.text, "idN ");
    }
}
