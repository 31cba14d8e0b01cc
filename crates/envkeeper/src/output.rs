//! Terminal output utilities

use console::style;
use envkeeper_core::types::StatusItem;
use envkeeper_platform::{DownloadProgress, RemovalAction, RemovalReport};
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print one status item with its drifted files
pub fn status_item(item: &StatusItem) {
    let line = item.to_string();
    if item.is_up_to_date() {
        success(&line);
    } else {
        println!("{} {}", style("✗").red().bold(), line);
    }

    if let StatusItem::Platform(platform) = item {
        for file in platform.files() {
            println!("    {} {}", style(file.drift).yellow(), file.path);
        }
    }
}

/// Print the decisions of a removal run
pub fn removal_report(report: &RemovalReport) {
    let verb = if report.dry_run { "would remove" } else { "removed" };
    for record in &report.entries {
        let suffix = if record.is_dir { "/" } else { "" };
        match record.action {
            RemovalAction::Removed => {
                println!("  {} {}{}", style(verb).red(), record.path, suffix)
            }
            RemovalAction::Preserved => {
                println!("  {} {}{}", style("kept").green(), record.path, suffix)
            }
        }
    }
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Progress bar fed by archive download callbacks
///
/// Starts as a spinner and switches to a byte bar once the server announces
/// a content length.
pub struct DownloadBar {
    pb: ProgressBar,
    sized: bool,
}

impl DownloadBar {
    /// Create a download bar, drawn nowhere when `hidden`
    pub fn new(msg: &str, hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        pb.set_message(msg.to_string());
        Self { pb, sized: false }
    }

    /// Apply one progress update
    pub fn update(&mut self, progress: &DownloadProgress) {
        if !self.sized {
            if let Some(total) = progress.total_bytes {
                self.pb.set_length(total);
                self.pb.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
                    )
                    .unwrap()
                    .progress_chars("#>-"),
                );
                self.sized = true;
            }
        }
        self.pb.set_position(progress.downloaded_bytes);
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
