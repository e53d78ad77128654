//! Optional observability sink injected into the pipeline

use crate::compress::TableType;
use crate::config::CompressionConfig;
use std::sync::Arc;

/// Notable moments of a compression run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RegionsDetected {
        count: usize,
    },
    RegionPruned {
        region: String,
        table_type: TableType,
        retained_cells: usize,
        pruned_cells: usize,
    },
    GroupsBuilt {
        region: String,
        value_groups: usize,
        format_groups: usize,
    },
    CompressionFinished {
        original_cells: usize,
        representation_size: usize,
        compression_ratio: f64,
    },
    AutoConfigured {
        sparsity_percentage: f64,
        config: CompressionConfig,
    },
}

/// Receives pipeline events. Results never depend on whether a sink is attached.
pub trait EventSink: Send + Sync {
    fn log(&self, event: &PipelineEvent);
}

pub type SharedSink = Arc<dyn EventSink>;

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RegionsDetected { count } => {
                tracing::debug!(regions = count, "table regions detected");
            }
            PipelineEvent::RegionPruned {
                region,
                table_type,
                retained_cells,
                pruned_cells,
            } => {
                tracing::debug!(
                    %region,
                    table_type = table_type.as_str(),
                    retained_cells,
                    pruned_cells,
                    "region pruned"
                );
            }
            PipelineEvent::GroupsBuilt {
                region,
                value_groups,
                format_groups,
            } => {
                tracing::debug!(%region, value_groups, format_groups, "groups built");
            }
            PipelineEvent::CompressionFinished {
                original_cells,
                representation_size,
                compression_ratio,
            } => {
                tracing::info!(
                    original_cells,
                    representation_size,
                    compression_ratio = *compression_ratio,
                    "compression finished"
                );
            }
            PipelineEvent::AutoConfigured {
                sparsity_percentage,
                config,
            } => {
                tracing::info!(
                    sparsity = *sparsity_percentage,
                    k = config.k,
                    use_extraction = config.use_extraction,
                    use_translation = config.use_translation,
                    "auto-configured compression"
                );
            }
        }
    }
}

/// Collects events in memory for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    events: std::sync::Mutex<Vec<PipelineEvent>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl EventSink for RecordingSink {
    fn log(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
