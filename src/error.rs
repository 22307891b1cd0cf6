//! Diagnostics collected during lexing and parsing, plus the errors the
//! driver itself can surface.

use thiserror::Error;

/// A single recorded syntax problem.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {message}")]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

/// Sink for lexer and parser diagnostics.
///
/// Reporting never alters control flow: the producing call still returns
/// per its own contract, and the caller checks [`Reporter::had_error`]
/// afterwards to decide what to do with the result.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    had_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, line: usize, message: &str) {
        self.diagnostics.push(Diagnostic {
            line,
            message: message.to_string(),
        });
        self.had_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Clears recorded state, e.g. between REPL lines.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
        self.had_error = false;
    }
}

/// Errors surfaced by the driver.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("parsing failed with {count} syntax error(s)")]
    Parse { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_records_and_flags() {
        let mut reporter = Reporter::new();
        assert!(!reporter.had_error());

        reporter.report(3, "Unexpected character.");
        assert!(reporter.had_error());
        assert_eq!(reporter.diagnostics().len(), 1);
        assert_eq!(
            reporter.diagnostics()[0].to_string(),
            "[line 3] Error: Unexpected character."
        );
    }

    #[test]
    fn reset_clears_state() {
        let mut reporter = Reporter::new();
        reporter.report(1, "Expect expression.");
        reporter.reset();
        assert!(!reporter.had_error());
        assert!(reporter.diagnostics().is_empty());
    }
}
