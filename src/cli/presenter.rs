//! CLI presenter for output formatting

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::media::MediaDeviceState;
use crate::domain::recording::format_clock;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    pub fn is_spinner_active(&self) -> bool {
        self.is_spinner_active.load(Ordering::SeqCst)
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.println_stderr(format!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.println_stderr(format!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.println_stderr(format!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.println_stderr(format!("{} {}", "✗".red(), message));
    }

    // Keeps the spinner line intact when printing around it
    fn println_stderr(&self, line: String) {
        match self.spinner {
            Some(ref spinner) => spinner.println(line),
            None => eprintln!("{}", line),
        }
    }

    /// Output text to stdout (the saved file path)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Output text to stdout without newline
    pub fn output_inline(&self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Format the recording overlay line, e.g. `● REC 01:05  cam  mic`
    pub fn format_overlay(&self, elapsed_secs: u64, camera: bool, mic: bool) -> String {
        let mut line = format!("{} REC {}", "●".red(), format_clock(elapsed_secs));
        if camera {
            line.push_str(&format!("  {}", "cam".cyan()));
        }
        if mic {
            line.push_str(&format!("  {}", "mic".cyan()));
        }
        line
    }

    /// Show the recording overlay
    pub fn show_recording_overlay(&mut self, camera: bool, mic: bool) {
        let line = self.format_overlay(0, camera, mic);
        self.start_spinner(&line);
    }

    /// Update recording overlay with the elapsed time
    pub fn update_recording_overlay(&self, elapsed_secs: u64, camera: bool, mic: bool) {
        self.update_spinner(&self.format_overlay(elapsed_secs, camera, mic));
    }

    /// Print daemon status
    pub fn daemon_status(&self, state: &str) {
        eprintln!("{} Daemon: {}", "●".cyan(), state);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print the capability flags derived from the device inventory
    pub fn media_summary(&self, media: &MediaDeviceState) {
        let flag = |on: bool| if on { "yes".green() } else { "no".red() };
        self.key_value("camera available", &flag(media.has_camera).to_string());
        self.key_value("microphone available", &flag(media.has_mic).to_string());
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn overlay_at_start() {
        plain();
        let presenter = Presenter::new();
        assert_eq!(presenter.format_overlay(0, false, false), "● REC 00:00");
    }

    #[test]
    fn overlay_shows_minutes() {
        plain();
        let presenter = Presenter::new();
        assert!(presenter.format_overlay(65, false, false).contains("01:05"));
    }

    #[test]
    fn overlay_lists_active_inputs() {
        plain();
        let presenter = Presenter::new();
        let line = presenter.format_overlay(5, true, true);
        assert!(line.ends_with("00:05  cam  mic"));

        let line = presenter.format_overlay(5, false, true);
        assert!(!line.contains("cam"));
        assert!(line.contains("mic"));
    }

    #[test]
    fn spinner_flag_follows_lifecycle() {
        let mut presenter = Presenter::new();
        assert!(!presenter.is_spinner_active());
        presenter.show_recording_overlay(false, true);
        assert!(presenter.is_spinner_active());
        presenter.stop_spinner();
        assert!(!presenter.is_spinner_active());
    }
}
