//! Diagnostic types for guarded-use violations

use super::formatting::source_excerpt;
use crate::syntax::Span;
use serde_json::{json, Value};
use std::fmt;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The two ways a capability use can be unsafe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardCode {
    /// No liveness check covers the use
    UnguardedUse,
    /// A liveness check covers the use, but it checks another object
    WrongGuardUse,
}

impl GuardCode {
    pub fn id(self) -> &'static str {
        match self {
            GuardCode::UnguardedUse => "G001",
            GuardCode::WrongGuardUse => "G002",
        }
    }

    pub fn rule(self) -> &'static str {
        match self {
            GuardCode::UnguardedUse => "unguarded-capability-use",
            GuardCode::WrongGuardUse => "wrong-guard-capability-use",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            GuardCode::UnguardedUse => "capability used across an asynchronous gap",
            GuardCode::WrongGuardUse => {
                "capability used across an asynchronous gap, guarded by an unrelated liveness check"
            }
        }
    }

    pub fn correction(self) -> &'static str {
        match self {
            GuardCode::UnguardedUse => {
                "check the capability's liveness accessor after the gap, or use it before the gap"
            }
            GuardCode::WrongGuardUse => "check the liveness accessor that belongs to this capability",
        }
    }

    pub fn severity(self) -> Severity {
        Severity::Warning
    }

    /// A diagnostic for this code at `span`
    pub fn at(self, span: &Span) -> Diagnostic {
        Diagnostic::new(
            self.severity(),
            self.id(),
            self.rule(),
            self.message(),
            Some(span.clone()),
        )
        .with_suggestions(vec![self.correction().to_string()])
    }
}

impl fmt::Display for GuardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A linter diagnostic with source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub rule: String,
    pub message: String,
    pub location: Option<Span>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
        location: Option<Span>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            rule: rule.into(),
            message: message.into(),
            location,
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Format as human-readable output
    pub fn format_human(&self) -> String {
        let mut output = String::new();

        match &self.location {
            Some(span) if !span.is_synthetic() => {
                output.push_str(&format!("{} {}: {}\n", span, self.severity, self.rule));
            }
            _ => {
                output.push_str(&format!("{}: {}\n", self.severity, self.rule));
            }
        }
        output.push_str(&format!("  message: {}\n", self.message));

        if !self.suggestions.is_empty() {
            output.push_str("  suggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("    - {}\n", suggestion));
            }
        }

        output
    }

    /// Format diagnostic with source context
    ///
    /// Includes source line and caret pointing to the use
    pub fn format_with_context(&self, source: &str) -> String {
        let mut output = format!("{} [{}] {}\n", self.severity, self.code, self.rule);

        if let Some(span) = self.location.as_ref().filter(|s| !s.is_synthetic()) {
            output.push_str(&format!("  --> {}\n", span));
            let excerpt = source_excerpt(source, span);
            if !excerpt.is_empty() {
                output.push_str("   |\n");
                output.push_str(&excerpt);
            }
        }

        output.push_str(&format!("   message: {}\n", self.message));

        if !self.suggestions.is_empty() {
            output.push_str("   help:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("     - {}\n", suggestion));
            }
        }

        output
    }

    pub fn to_json(&self) -> Value {
        let span = self.location.as_ref();
        json!({
            "severity": self.severity.to_string(),
            "code": self.code,
            "rule": self.rule,
            "message": self.message,
            "file": span.and_then(|s| s.file.clone()),
            "line": span.map(|s| s.line),
            "column": span.map(|s| s.col),
            "suggestions": self.suggestions,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_human())
    }
}

/// Where a rule sends its findings
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
