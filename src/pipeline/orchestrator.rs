// file: src/pipeline/orchestrator.rs
// description: drives fetch, filter, publish and verify as one forward-only run
// reference: result chaining with early exit on the first failed stage

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::pipeline::stage::Stage;
use crate::publisher::{PublishAck, Publisher};
use crate::source::CatalogFetcher;
use crate::transform::PriceFilter;
use crate::verifier::{ArtifactVerifier, VerificationReport};
use serde_json::Value;
use std::fmt;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationKind {
    Progress,
    Success,
    Warning,
    Failure,
}

/// One operator-facing line describing what a stage did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub stage: Stage,
    pub kind: NarrationKind,
    pub message: String,
}

impl fmt::Display for Narration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage.step() {
            Some(step) => write!(
                f,
                "[{}/{}] {}",
                step,
                Stage::WORKING.len(),
                self.message
            ),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub final_stage: Stage,
    pub failed_stage: Option<Stage>,
    pub error: Option<PipelineError>,
    pub narration: Vec<Narration>,
    pub stats: PipelineStats,
    pub ack: Option<PublishAck>,
    pub report: Option<VerificationReport>,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        self.final_stage == Stage::Done
    }

    pub fn exit_code(&self) -> i32 {
        self.error.as_ref().map_or(0, PipelineError::exit_code)
    }

    pub fn first_entry(&self) -> Option<&Value> {
        self.report.as_ref().and_then(|r| r.first_entry.as_ref())
    }
}

/// Mutable bookkeeping for a single run. Only ever moves forward.
struct PipelineRun {
    run_id: Uuid,
    stage: Stage,
    narration: Vec<Narration>,
    progress: ProgressTracker,
    ack: Option<PublishAck>,
    report: Option<VerificationReport>,
}

impl PipelineRun {
    fn new(run_id: Uuid, show_progress: bool) -> Self {
        Self {
            run_id,
            stage: Stage::Fetching,
            narration: Vec::new(),
            progress: ProgressTracker::new(show_progress),
            ack: None,
            report: None,
        }
    }

    fn say(&mut self, kind: NarrationKind, message: String) {
        self.narration.push(Narration {
            stage: self.stage,
            kind,
            message,
        });
    }

    fn begin(&mut self, message: String) {
        info!(stage = %self.stage, "{}", message);
        self.progress.enter(self.stage);
        self.say(NarrationKind::Progress, message);
    }

    fn warn(&mut self, message: String) {
        warn!(stage = %self.stage, "{}", message);
        self.say(NarrationKind::Warning, message);
    }

    fn advance(&mut self, message: String) {
        info!(stage = %self.stage, "{}", message);
        self.say(NarrationKind::Success, message);
        self.progress.complete(self.stage);
        self.stage = self.stage.next();
    }

    fn stats(&mut self) -> &mut PipelineStats {
        self.progress.stats_mut()
    }

    fn finish(mut self, result: Result<()>) -> PipelineOutcome {
        let (failed_stage, error) = match result {
            Ok(()) => {
                self.say(
                    NarrationKind::Success,
                    "Processing pipeline completed successfully".to_string(),
                );
                (None, None)
            }
            Err(err) => {
                let failed = err.stage().unwrap_or(self.stage);
                error!(stage = %failed, "Pipeline failed: {}", err);
                self.say(
                    NarrationKind::Failure,
                    format!("Processing pipeline failed at {}: {}", failed, err),
                );
                self.stage = Stage::Failed;
                (Some(failed), Some(err))
            }
        };

        let stats = self.progress.finish(error.is_none());
        PipelineOutcome {
            run_id: self.run_id,
            final_stage: self.stage,
            failed_stage,
            error,
            narration: self.narration,
            stats,
            ack: self.ack,
            report: self.report,
        }
    }
}

pub struct PipelineOrchestrator {
    fetcher: CatalogFetcher,
    filter: PriceFilter,
    publisher: Publisher,
    verifier: ArtifactVerifier,
    show_progress: bool,
}

impl PipelineOrchestrator {
    /// Builds every stage from configuration. Missing bucket or distribution
    /// URL fail here, before anything touches the network.
    pub fn new(config: &Config) -> Result<Self> {
        let bucket = config.require_bucket()?;
        let distribution_url = config.require_distribution_url()?;

        Ok(Self::from_parts(
            CatalogFetcher::new(&config.source)?,
            PriceFilter::new(config.filter.min_price)?,
            Publisher::from_config(&config.store, &bucket)?,
            ArtifactVerifier::new(&config.distribution, &distribution_url)?,
        ))
    }

    pub fn from_parts(
        fetcher: CatalogFetcher,
        filter: PriceFilter,
        publisher: Publisher,
        verifier: ArtifactVerifier,
    ) -> Self {
        Self {
            fetcher,
            filter,
            publisher,
            verifier,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn run(&self) -> PipelineOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id);

        async {
            info!("Starting product data processing pipeline");
            let mut run = PipelineRun::new(run_id, self.show_progress);
            let result = self.execute(&mut run).await;
            let outcome = run.finish(result);
            self.log_final_stats(&outcome);
            outcome
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, run: &mut PipelineRun) -> Result<()> {
        run.begin(format!("Downloading product data from {}", self.fetcher.url()));
        let catalog = self.fetcher.fetch().await?;
        run.stats().products_fetched = catalog.len();
        run.advance(format!("Downloaded {} products", catalog.len()));

        run.begin(format!(
            "Filtering products with price >= {}",
            self.filter.threshold()
        ));
        let filtered = self.filter.apply_non_empty(&catalog)?;
        run.stats().products_retained = filtered.len();
        run.advance(format!(
            "Found {} products with price >= {}",
            filtered.len(),
            self.filter.threshold()
        ));

        run.begin(format!(
            "Uploading filtered data to bucket {}",
            self.publisher.bucket()
        ));
        let ack = self.publisher.publish(&filtered).await?;
        run.stats().bytes_published = ack.bytes;
        run.advance(format!(
            "Uploaded {} ({} products, {} bytes)",
            ack.key, ack.product_count, ack.bytes
        ));
        run.ack = Some(ack);

        run.begin(format!("Downloading artifact from {}", self.verifier.url()));
        let report = self.verifier.verify().await?;
        run.stats().entries_verified = report.entry_count;
        if let Some(ack) = run.ack.clone() {
            for discrepancy in report.discrepancies(&ack) {
                run.warn(format!("{} (distribution cache may be stale)", discrepancy));
            }
        }
        run.advance(format!(
            "Verified {} products served from {}",
            report.entry_count, report.url
        ));
        run.report = Some(report);

        Ok(())
    }

    fn log_final_stats(&self, outcome: &PipelineOutcome) {
        let stats = &outcome.stats;
        info!("=== Pipeline Execution Summary ===");
        info!("Run: {}", outcome.run_id);
        info!("Outcome: {}", outcome.final_stage);
        info!("Duration: {} ms", stats.duration_ms);
        info!("Products fetched: {}", stats.products_fetched);
        info!(
            "Products retained: {} ({:.2}%)",
            stats.products_retained,
            stats.retention_rate()
        );
        info!("Bytes published: {}", stats.bytes_published);
        info!("Entries verified: {}", stats.entries_verified);
        info!("=================================");
    }
}
