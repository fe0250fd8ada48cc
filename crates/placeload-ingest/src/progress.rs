//! Terminal progress for an ingestion run

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner showing rows read and documents committed
pub struct ProgressReporter {
    /// None in quiet mode
    progress_bar: Option<ProgressBar>,
    start_time: Instant,
    read: u64,
    filtered: u64,
    committed: u64,
}

impl ProgressReporter {
    pub fn new(visible: bool) -> Self {
        let progress_bar = visible.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} rows read {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        Self {
            progress_bar,
            start_time: Instant::now(),
            read: 0,
            filtered: 0,
            committed: 0,
        }
    }

    /// Reporter that never draws
    pub fn hidden() -> Self {
        Self::new(false)
    }

    pub fn record_read(&mut self) {
        self.read += 1;
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(self.read);
        }
    }

    pub fn record_filtered(&mut self) {
        self.filtered += 1;
    }

    pub fn batch_committed(&mut self, size: usize) {
        self.committed += size as u64;
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(format!(
                "| {} committed | {} filtered | {:.1} rows/s",
                self.committed,
                self.filtered,
                self.rate()
            ));
        }
    }

    fn rate(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.read as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Stop the spinner, leaving a final summary line
    pub fn finish(&self, interrupted: bool) {
        if let Some(ref pb) = self.progress_bar {
            let message = format!(
                "| {} committed | {} filtered | {:.1} rows/s",
                self.committed,
                self.filtered,
                self.rate()
            );
            if interrupted {
                pb.abandon_with_message(format!("{} (interrupted)", message));
            } else {
                pb.finish_with_message(message);
            }
        }
    }
}
