//! Progress reporting for the linking passes.
//!
//! Interactive runs get indicatif bars. With `--log-only` the bars are hidden
//! and each pass prints periodic `[phase] n/total (pct%)` lines instead, so the
//! output stays readable under `tail -f`.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Set once from the command line before any pass starts.
static LOG_ONLY: AtomicBool = AtomicBool::new(false);

pub const PHASE_LOAD: &str = "load";
pub const PHASE_RESOLVE: &str = "resolve";
pub const PHASE_ROMANIZE: &str = "romanize";

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// `12.3s` under a minute, `4.5m` above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

fn styled(pb: ProgressBar, template: &str, msg: &str) -> ProgressBar {
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(msg.to_string());
    pb
}

/// Bar over `len` feed entries or records. Hidden in log-only mode.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    styled(
        ProgressBar::new(len),
        "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})",
        msg,
    )
}

/// Spinner for file loading. Hidden in log-only mode.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = styled(ProgressBar::new_spinner(), "{msg} {spinner} [{elapsed_precise}]", msg);
    if !is_log_only() {
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb
}

/// Whether `current` is a reporting point: every `interval` items and the last one.
pub fn is_report_point(current: u64, total: u64, interval: u64) -> bool {
    interval > 0 && (current % interval == 0 || current == total)
}

/// Periodic progress line, log-only mode only.
pub fn log_progress(phase: &str, current: u64, total: u64, interval: u64) {
    if is_log_only() && total > 0 && is_report_point(current, total, interval) {
        let pct = 100.0 * current as f64 / total as f64;
        eprintln!("[{}] {}/{} ({:.1}%)", phase, current, total, pct);
    }
}

/// Close a bar or spinner and print how long the phase took.
pub fn finish_phase(pb: &ProgressBar, phase: &str, started: Instant, summary: &str) {
    pb.finish_and_clear();
    eprintln!(
        "[{}] {} in {}",
        phase,
        summary,
        format_duration(started.elapsed())
    );
}
