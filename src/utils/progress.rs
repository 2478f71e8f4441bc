//! Spinners and bars shown while the pipeline steps run

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "    {spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str = "    {msg} [{bar:32.green/white}] {pos}/{len} {elapsed}";
// The last tick is drawn once the spinner stops; messages carry their own icon
const SPINNER_TICKS: &str = "◐◓◑◒ ";
const BAR_CHARS: &str = "=> ";
const TICK_INTERVAL: Duration = Duration::from_millis(120);

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_TICKS)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(BAR_CHARS)
}

/// Spinner for a step of unknown length
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner()
        .with_style(spinner_style())
        .with_message(message.to_string());
    spinner.enable_steady_tick(TICK_INTERVAL);
    spinner
}

/// Bar counting `len` units of work, e.g. plots to render
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    ProgressBar::new(len)
        .with_style(bar_style())
        .with_message(message.to_string())
}

pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("{} {}", style("✓").green(), message));
}

pub fn finish_with_warning(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("{} {}", style("!").yellow().bold(), message));
}

/// Run `work` behind a spinner showing `message`.
///
/// On success the spinner is replaced by the text `done` builds from the
/// result; on failure it is marked failed and the error is returned as is.
pub fn run_step<T>(
    message: &str,
    work: impl FnOnce() -> Result<T>,
    done: impl FnOnce(&T) -> String,
) -> Result<T> {
    let spinner = create_spinner(message);
    settle(&spinner, message, work(), done)
}

fn settle<T>(
    pb: &ProgressBar,
    message: &str,
    outcome: Result<T>,
    done: impl FnOnce(&T) -> String,
) -> Result<T> {
    match &outcome {
        Ok(value) => finish_with_success(pb, &done(value)),
        Err(_) => pb.abandon_with_message(format!(
            "{} {}",
            style("✗").red(),
            message.trim_end_matches("...")
        )),
    }
    outcome
}
