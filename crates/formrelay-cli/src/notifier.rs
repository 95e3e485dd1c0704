//! Terminal stand-in for the browser's alert dialog.

use std::io::Write;
use std::sync::Mutex;

use formrelay::Notifier;

/// Writes alerts to stderr and remembers them for the final report.
#[derive(Default)]
pub struct TerminalNotifier {
    quiet: bool,
    shown: Mutex<Vec<String>>,
}

impl TerminalNotifier {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Every message alerted so far.
    pub fn shown(&self) -> Vec<String> {
        self.shown
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        if !self.quiet {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "  [alert] {message}");
            let _ = stderr.flush();
        }
        self.shown
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(message.to_string());
    }
}
