//! Bundled host: runs the rule over a whole tree and renders the results

use super::diagnostics::{Diagnostic, Severity};
use super::rule::GuardedUseRule;
use crate::config::CheckerConfig;
use crate::tree::SyntaxTree;
use tracing::debug;

/// Main linter configuration
#[derive(Debug, Clone)]
pub struct LintConfig {
    pub min_severity: Severity,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            format: OutputFormat::Human,
        }
    }
}

/// Main linter instance
#[derive(Debug)]
pub struct Linter {
    config: LintConfig,
    rule: GuardedUseRule,
    diagnostics: Vec<Diagnostic>,
}

impl Linter {
    pub fn new(config: LintConfig, checker: CheckerConfig) -> Self {
        Self {
            config,
            rule: GuardedUseRule::new(checker),
            diagnostics: Vec::new(),
        }
    }

    /// Check every node of `tree` the rule is interested in, parents before
    /// children. Returns the number of new diagnostics.
    pub fn lint_tree(&mut self, tree: &SyntaxTree) -> usize {
        let before = self.diagnostics.len();
        for node in tree.preorder() {
            if GuardedUseRule::interested_in(tree.kind(node)) {
                self.rule.check_node(tree, node, &mut self.diagnostics);
            }
        }
        let found = self.diagnostics.len() - before;
        debug!(nodes = tree.len(), found, "linted tree");
        found
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }

    /// Format diagnostics for output
    pub fn format_output(&self) -> String {
        match self.config.format {
            OutputFormat::Human => self.format_human(),
            OutputFormat::Json => self.format_json(),
        }
    }

    /// Human-readable output with source excerpts from `source`
    pub fn format_with_source(&self, source: &str) -> String {
        self.reported()
            .map(|d| d.format_with_context(source))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn reported(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= self.config.min_severity)
    }

    fn format_human(&self) -> String {
        self.reported().map(|d| d.format_human()).collect()
    }

    fn format_json(&self) -> String {
        let diagnostics: Vec<_> = self.reported().map(|d| d.to_json()).collect();

        serde_json::to_string_pretty(&serde_json::json!({
            "diagnostics": diagnostics
        }))
        .unwrap_or_default()
    }

    /// Get exit code (0 = clean, 2 = warnings). Both guard codes are
    /// warnings, so there is no error status.
    pub fn exit_code(&self) -> i32 {
        if self.has_warnings() {
            2
        } else {
            0
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Linter::new(LintConfig::default(), CheckerConfig::default())
    }
}
