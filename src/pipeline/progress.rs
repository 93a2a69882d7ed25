// file: src/pipeline/progress.rs
// description: stage progress display and run statistics
// reference: uses indicatif for progress bars and tracks processing metrics

use crate::pipeline::Stage;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub products_fetched: usize,
    pub products_retained: usize,
    pub bytes_published: usize,
    pub entries_verified: usize,
    pub duration_ms: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of fetched products that passed the price filter, in percent.
    pub fn retention_rate(&self) -> f64 {
        if self.products_fetched == 0 {
            return 0.0;
        }
        (self.products_retained as f64 / self.products_fetched as f64) * 100.0
    }
}

/// One bar tick per working stage.
pub struct ProgressTracker {
    bar: ProgressBar,
    stats: PipelineStats,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(visible: bool) -> Self {
        let total = Stage::WORKING.len() as u64;
        let bar = if visible {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };
        bar.set_length(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:20.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░"),
        );

        Self {
            bar,
            stats: PipelineStats::new(),
            start_time: Instant::now(),
        }
    }

    pub fn hidden() -> Self {
        Self::new(false)
    }

    pub fn enter(&self, stage: Stage) {
        self.bar.set_message(format!("{}...", stage.label()));
    }

    pub fn complete(&self, stage: Stage) {
        self.bar.set_message(format!("{} ok", stage.label()));
        self.bar.inc(1);
    }

    pub fn stats_mut(&mut self) -> &mut PipelineStats {
        &mut self.stats
    }

    pub fn finish(&mut self, success: bool) -> PipelineStats {
        if success {
            self.bar.finish_with_message("pipeline complete");
        } else {
            self.bar.abandon_with_message("pipeline failed");
        }
        self.stats.duration_ms = self.start_time.elapsed().as_millis() as u64;
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_rate() {
        let stats = PipelineStats {
            products_fetched: 30,
            products_retained: 12,
            ..PipelineStats::new()
        };
        assert!((stats.retention_rate() - 40.0).abs() < 1e-9);
        assert_eq!(PipelineStats::new().retention_rate(), 0.0);
    }

    #[test]
    fn test_tracker_counts_completed_stages() {
        let mut tracker = ProgressTracker::hidden();
        tracker.enter(Stage::Fetching);
        tracker.complete(Stage::Fetching);
        tracker.stats_mut().products_fetched = 5;

        assert_eq!(tracker.bar.position(), 1);
        let stats = tracker.finish(false);
        assert_eq!(stats.products_fetched, 5);
    }
}
