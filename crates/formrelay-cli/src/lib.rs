//! formrelay CLI — drive the relay against an HTML page and a live endpoint.

pub mod commands;
pub mod notifier;
pub mod output;

pub use notifier::TerminalNotifier;
