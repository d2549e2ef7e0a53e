//! Progress indicators for the readiness wait

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}

/// One tick per readiness poll.
///
/// Drawn on stdout; indicatif hides it by itself when stdout is not a
/// terminal, so piping the tool's output stays clean.
pub struct WaitProgress {
    pb: ProgressBar,
}

impl WaitProgress {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        pb.set_style(spinner_style());
        pb.set_message(message.to_string());
        Self { pb }
    }

    /// Never drawn; used by tests and non-interactive callers
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    /// Record one poll
    pub fn tick(&self) {
        self.pb.inc(1);
        self.pb.tick();
    }

    /// Number of polls recorded so far
    pub fn polls(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish_success(&self, message: &str) {
        self.pb.finish_with_message(format!("✓ {}", message));
    }

    pub fn finish_error(&self, message: &str) {
        self.pb.abandon_with_message(format!("✗ {}", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_counts_ticks() {
        let progress = WaitProgress::hidden();
        progress.tick();
        progress.tick();
        progress.tick();
        assert_eq!(progress.polls(), 3);
        progress.finish_success("done");
    }

    #[test]
    fn test_visible_progress() {
        let progress = WaitProgress::new("Connecting via pod/ssh-proxy");
        progress.tick();
        assert_eq!(progress.polls(), 1);
        progress.finish_error("failed");
    }
}
