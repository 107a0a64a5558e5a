use crate::generator::profile::{EventGenerator, GeneratorConfig};
use crate::workflow::config::WorkflowConfig;
use eventclass::event::{ClassifiedEvent, EventRecord};
use eventclass::prompt::PromptLayout;
use eventclass::telemetry::{MetricsRecorder, MetricsSnapshot};
use eventclass::{ClassificationResult, ClassifyResult, CompletionClient, ResponseParser};
use log::{info, warn};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Drives generate -> prompt -> complete -> parse cycles.
#[derive(Clone)]
pub struct Runner {
    client: Arc<dyn CompletionClient>,
    parser: Arc<dyn ResponseParser>,
    layout: PromptLayout,
    generator: GeneratorConfig,
    max_events: usize,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: &WorkflowConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            parser: Arc::from(config.layout.parser_with(config.json_extraction)),
            layout: config.layout,
            generator: config.generator.clone(),
            max_events: config.max_events,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn layout(&self) -> PromptLayout {
        self.layout
    }

    /// Largest batch a single request may ask for.
    pub fn max_events(&self) -> usize {
        self.max_events
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// One classification cycle for an existing event.
    pub fn classify(&self, event: &EventRecord) -> ClassifyResult<ClassificationResult> {
        let prompt = self.layout.render(event);
        let raw = self.client.complete(&prompt)?;
        self.parser.parse(&raw)
    }

    /// Classifies `count` freshly generated events in order.
    ///
    /// Every event yields one row; a failed cycle becomes an `Error` placeholder
    /// at its own id and the batch carries on.
    pub fn run_batch(&self, count: NonZeroUsize) -> Vec<ClassifiedEvent> {
        let generator = EventGenerator::new(self.generator.clone());
        let rows: Vec<ClassifiedEvent> = generator
            .take(count.get())
            .enumerate()
            .map(|(index, event)| {
                let id = index + 1;
                let result = match self.classify(&event) {
                    Ok(result) => {
                        self.metrics.record_classified(result.label().is_some());
                        result
                    }
                    Err(err) => {
                        warn!("event {} failed: {}", id, err);
                        self.metrics.record_failed();
                        ClassificationResult::failed(&err)
                    }
                };
                ClassifiedEvent::new(id, &event, result)
            })
            .collect();

        let failed = rows.iter().filter(|row| row.is_failure()).count();
        info!(
            "batch of {} events finished ({} failed, layout {})",
            rows.len(),
            failed,
            self.layout
        );
        rows
    }
}
