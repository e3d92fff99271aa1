//! Plugin state and host-facing behavior
//!
//! `RegexFilter` owns the rule list, the configuration handle and the
//! rewrite log. The host drives it through the two hooks and the chat
//! commands; every call runs to completion before the next one.

use tracing::{debug, error, info};

use crate::commands::Command;
use crate::config::{ConfigDocument, ConfigHandle};
use crate::engine::Applied;
use crate::error::Result;
use crate::message::{LlmResponse, Segment};
use crate::rewrite_log::RewriteLog;
use crate::rules::Action;
use crate::store::{self, RuleStore};

/// The loaded plugin
#[derive(Debug)]
pub struct RegexFilter {
    rules: RuleStore,
    config: ConfigHandle,
    rewrite_log: RewriteLog,
}

impl RegexFilter {
    /// Hydrate the rule list from a configuration handle.
    ///
    /// When defaults had to be seeded they are saved once; a failed save is
    /// logged and the plugin still loads.
    pub fn load(mut config: ConfigHandle) -> Self {
        let hydrated = store::hydrate(config.document_mut());
        if hydrated.seeded_defaults {
            if let Err(e) = config.save() {
                error!(error = %e, "failed to persist default rules");
            }
        }

        let rewrite_log = RewriteLog::new(config.document().rewrite_log_path().as_deref());

        info!(
            config = %config.location(),
            rules = hydrated.store.len(),
            enabled = config.document().enabled,
            listen_all_responses = config.document().listen_all_responses,
            "regex filter loaded"
        );

        Self {
            rules: hydrated.store,
            config,
            rewrite_log,
        }
    }

    /// Called when the host unloads the plugin
    pub fn shutdown(self) {
        info!("regex filter unloaded");
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn document(&self) -> &ConfigDocument {
        self.config.document()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.document().enabled
    }

    pub fn listens_to_all(&self) -> bool {
        self.config.document().listen_all_responses
    }

    /// Rewrite a model response in place. Returns what was applied, if the
    /// filter is enabled and the text changed.
    pub fn on_llm_response(&mut self, response: &mut LlmResponse) -> Option<Applied> {
        if !self.is_enabled() || response.completion_text.is_empty() {
            return None;
        }

        let applied = self.rules.apply(&response.completion_text);
        if !applied.changed() {
            return None;
        }

        info!(rules = applied.applied.len(), "llm response rewritten");
        self.record("llm_response", &response.completion_text, &applied);
        response.completion_text = applied.text.clone();
        Some(applied)
    }

    /// Rewrite the plain-text segments of an outgoing message in place.
    /// Returns whether any segment changed.
    pub fn on_decorating_result(&mut self, chain: &mut [Segment]) -> bool {
        if !self.is_enabled() || !self.listens_to_all() {
            debug!(
                enabled = self.is_enabled(),
                listen_all_responses = self.listens_to_all(),
                "outgoing message skipped"
            );
            return false;
        }

        let mut modified = false;
        for segment in chain.iter_mut() {
            let Segment::Plain { text } = segment else {
                continue;
            };
            let applied = self.rules.apply(text);
            if applied.changed() {
                self.record("decorating_result", text, &applied);
                *text = applied.text;
                modified = true;
            }
        }

        if modified {
            info!("outgoing message rewritten");
        }
        modified
    }

    fn record(&mut self, hook: &str, original: &str, applied: &Applied) {
        if let Err(e) = self.rewrite_log.log_rewrite(hook, original, applied) {
            error!(error = %e, "failed to write rewrite log");
        }
    }

    /// Add a rule, inferring the action when none is given
    pub fn add_rule(
        &mut self,
        pattern: &str,
        replacement: &str,
        action: Option<Action>,
    ) -> Result<usize> {
        let action = action.unwrap_or_else(|| Action::infer(replacement));
        store::add_rule_with_action(&mut self.rules, &mut self.config, pattern, replacement, action)
    }

    /// Flip the master switch and persist it
    pub fn toggle(&mut self) -> Result<bool> {
        let mut candidate = self.config.document().clone();
        candidate.enabled = !candidate.enabled;
        self.config.commit(candidate)?;
        Ok(self.is_enabled())
    }

    /// Flip outgoing-message rewriting and persist it
    pub fn toggle_listen_all(&mut self) -> Result<bool> {
        let mut candidate = self.config.document().clone();
        candidate.listen_all_responses = !candidate.listen_all_responses;
        self.config.commit(candidate)?;
        Ok(self.listens_to_all())
    }

    /// Run a chat command and return the reply text
    pub fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Add {
                pattern,
                replacement,
                action,
            } => self.cmd_add(&pattern, &replacement, action),
            Command::List => self.cmd_list(),
            Command::Remove { index } => self.cmd_remove(index),
            Command::Test { text } => self.cmd_test(&text),
            Command::ToggleListenAll => match self.toggle_listen_all() {
                Ok(true) => "Listening to all replies: on".to_string(),
                Ok(false) => "Listening to all replies: off".to_string(),
                Err(e) => format!("Failed to update setting: {}", e),
            },
            Command::Toggle => match self.toggle() {
                Ok(true) => "RegexFilter enabled".to_string(),
                Ok(false) => "RegexFilter disabled".to_string(),
                Err(e) => format!("Failed to update setting: {}", e),
            },
        }
    }

    fn cmd_add(&mut self, pattern: &str, replacement: &str, action: Option<Action>) -> String {
        match self.add_rule(pattern, replacement, action) {
            Ok(index) => {
                let rule = &self.rules.rules()[index - 1];
                format!(
                    "{} rule added as #{}: {}\nRules: {}",
                    rule.action(),
                    index,
                    rule.description(),
                    self.rules.len()
                )
            }
            Err(e) => format!("Rule not added: {}", e),
        }
    }

    fn cmd_list(&self) -> String {
        if self.rules.is_empty() {
            return "No rules configured".to_string();
        }

        let mut result = String::from("Current regex rules:\n");
        for action in Action::ALL {
            let lines: Vec<String> = self
                .rules
                .iter()
                .enumerate()
                .filter(|(_, rule)| rule.action() == action)
                .map(|(i, rule)| {
                    let mut line = format!("{}. pattern: `{}`", i + 1, rule.pattern());
                    if action.uses_replacement() {
                        line.push_str(&format!(" | text: `{}`", rule.replacement()));
                    }
                    line.push_str(&format!("\n   {}", rule.description()));
                    line
                })
                .collect();

            if !lines.is_empty() {
                result.push_str(&format!("\n{} rules:\n{}\n", action, lines.join("\n")));
            }
        }
        result
    }

    fn cmd_remove(&mut self, index: usize) -> String {
        match store::remove_rule(&mut self.rules, &mut self.config, index) {
            Ok(rule) => format!(
                "Rule removed: pattern `{}` | action {}\n{}",
                rule.pattern(),
                rule.action(),
                rule.description()
            ),
            Err(e) => format!("Rule not removed: {}", e),
        }
    }

    fn cmd_test(&self, text: &str) -> String {
        let mut result = String::new();
        if !self.is_enabled() {
            result.push_str("RegexFilter is disabled; live messages are not being rewritten\n");
        }

        let applied = self.rules.apply(text);
        result.push_str(&format!("Original: {}\nProcessed: {}\n", text, applied.text));

        if applied.applied.is_empty() {
            result.push_str("No rules applied");
        } else {
            let described: Vec<String> = applied
                .applied
                .iter()
                .filter_map(|i| self.rules.get(*i).map(|r| format!("rule {}: {}", i, r.description())))
                .collect();
            result.push_str(&format!("Applied rules:\n- {}", described.join("\n- ")));
        }

        if !applied.failed.is_empty() {
            let failed: Vec<String> = applied.failed.iter().map(|i| i.to_string()).collect();
            result.push_str(&format!("\nFailed rules (skipped): {}", failed.join(", ")));
        }

        result
    }
}
