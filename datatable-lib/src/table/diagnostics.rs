//! One-time integrator warnings

use std::sync::Mutex;

/// A known misconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    /// Server pagination without a total item count.
    ServerPaginationWithoutTotal,
    /// A controlled page number without a change callback.
    ControlledPageWithoutHandler,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::ServerPaginationWithoutTotal => f.write_str(
                "server pagination requires total items for an accurate page range",
            ),
            Diagnostic::ControlledPageWithoutHandler => f.write_str(
                "a controlled page was provided without a change callback; \
                 falling back to uncontrolled pagination",
            ),
        }
    }
}

/// Records diagnostics, logging each one the first time only.
#[derive(Debug, Default)]
pub struct Diagnostics {
    fired: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `diagnostic` unless it already fired. Returns `true` if logged.
    pub fn warn_once(&self, diagnostic: Diagnostic) -> bool {
        let Ok(mut fired) = self.fired.lock() else {
            return false;
        };
        if fired.contains(&diagnostic) {
            return false;
        }
        fired.push(diagnostic);
        log::warn!("DataTable: {}", diagnostic);
        true
    }

    /// Everything fired so far, in order.
    pub fn fired(&self) -> Vec<Diagnostic> {
        self.fired.lock().map(|g| g.clone()).unwrap_or_default()
    }
}
