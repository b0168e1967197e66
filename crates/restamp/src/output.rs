//! Colored terminal output utilities.

use console::{Style, Term};
use restamp_assets::CompilationError;
use restamp_rewriter::TargetSpec;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a rewritten asset name, cyan bold, prefixed by the action.
    pub(crate) fn rewritten(&self, name: &str, dry_run: bool) {
        let action = if dry_run { "Would rewrite" } else { "Rewrote" };
        let _ = self.term.write_line(&format!(
            "{action} {}",
            self.cyan_bold.apply_to(name)
        ));
    }

    /// Print a hook error as `hook: message` in red.
    pub(crate) fn compilation_error(&self, error: &CompilationError) {
        let line = format!("{}: {}", error.hook, error.message);
        let _ = self.term.write_line(&self.red.apply_to(line).to_string());
    }

    /// Print a target and its rules.
    pub(crate) fn target(&self, spec: &TargetSpec) {
        let basename = if spec.basename_only { " (basename)" } else { "" };
        let _ = self.term.write_line(&format!(
            "{}{}",
            self.cyan_bold.apply_to(&spec.matcher),
            self.dim.apply_to(basename)
        ));
        for rule in &spec.rules {
            let _ = self.term.write_line(&format!(
                "  /{}/ {} /{}/",
                rule.placeholder.as_str(),
                self.dim.apply_to("<-"),
                rule.source.as_str()
            ));
        }
    }
}
