//! Styled status output.
//!
//! Everything goes to stderr so that converted documents written to stdout
//! can be piped.

use console::{Style, Term};

pub(crate) struct Output {
    term: Term,
    success: Style,
    warning: Style,
    error: Style,
    highlight: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            highlight: Style::new().cyan().bold(),
        }
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.error, msg);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.styled(&self.highlight, msg);
    }

    /// Print conversion warnings under a count heading.
    pub(crate) fn warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        self.warning(&format!("Warnings ({}):", warnings.len()));
        for warning in warnings {
            self.warning(&format!("  - {warning}"));
        }
    }
}
