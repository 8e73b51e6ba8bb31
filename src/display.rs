use comfy_table::{presets::NOTHING, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::{IsTerminal, Write};

/// Presentation sink for everything a run writes to the user.
pub trait Console {
    fn print(&mut self, line: &str);
    /// Shows a transient status message until `clear_status` is called.
    fn status(&mut self, message: &str);
    fn clear_status(&mut self);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Writes results to stdout and diagnostics to stderr.
pub struct Terminal {
    status: Option<String>,
    interactive: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            status: None,
            interactive: std::io::stderr().is_terminal(),
        }
    }

    fn erase_status(&self) {
        if self.interactive && self.status.is_some() {
            eprint!("\r\x1b[2K");
        }
    }

    fn draw_status(&self) {
        if !self.interactive {
            return;
        }
        if let Some(message) = &self.status {
            eprint!("{} {}", "…".green(), message.green().bold());
            let _ = std::io::stderr().flush();
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for Terminal {
    fn print(&mut self, line: &str) {
        self.erase_status();
        println!("{line}");
        self.draw_status();
    }

    fn status(&mut self, message: &str) {
        self.erase_status();
        self.status = Some(message.to_string());
        self.draw_status();
    }

    fn clear_status(&mut self) {
        self.erase_status();
        self.status = None;
    }

    fn warn(&mut self, msg: &str) {
        self.erase_status();
        warn(msg);
        self.draw_status();
    }

    fn error(&mut self, msg: &str) {
        self.erase_status();
        error(msg);
        self.draw_status();
    }
}

/// Borderless table in the style used for pull request listings.
pub fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn warn(msg: &str) {
    eprintln!("{} {msg}", "warning:".yellow().bold());
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg.red().bold());
}
