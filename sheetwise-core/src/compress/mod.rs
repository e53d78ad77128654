//! Compression pipeline: detect tables, prune around anchors, then index
//! values and aggregate types over what is left

pub mod aggregator;
pub mod anchors;
pub mod classifier;
pub mod detector;
pub mod ranges;
pub mod translator;

pub use aggregator::{DataFormatAggregator, FormatGroups};
pub use anchors::{AnchorSet, PrunedRegion, StructuralAnchorExtractor};
pub use classifier::{DataType, classify};
pub use detector::{TableRegion, TableRegionDetector, TableType};
pub use ranges::{AddressRange, merge_address_ranges};
pub use translator::{InvertedIndex, InvertedIndexTranslator};

use crate::config::CompressionConfig;
use crate::error::Result;
use crate::grid::{CellRef, Grid};
use crate::observe::{PipelineEvent, SharedSink};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One detected table after pruning, with its own groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedRegion {
    pub region: TableRegion,
    pub pruned: PrunedRegion,
    pub value_groups: InvertedIndex,
    pub format_groups: FormatGroups,
    /// Retained non-empty cells, listed only when translation is disabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub untranslated: Vec<(CellRef, String)>,
}

/// A pipeline stage that ran, with what it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum CompressionStep {
    TableDetection {
        regions: usize,
    },
    StructuralExtraction {
        anchor_rows: usize,
        anchor_cols: usize,
        retained_cells: usize,
        pruned_cells: usize,
    },
    InvertedIndexTranslation {
        values: usize,
        entries: usize,
    },
    FormatAggregation {
        types: usize,
        entries: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub original_cells: usize,
    pub non_empty_cells: usize,
    pub retained_cells: usize,
    pub pruned_cells: usize,
    /// Entries a consumer has to read: value ranges, or raw cells when untranslated
    pub representation_size: usize,
    /// `original_cells / representation_size`, never below 1.0
    pub compression_ratio: f64,
    pub token_reduction_ratio: f64,
    pub sparsity_percentage: f64,
}

/// Output of one pipeline run. Encoders only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedRepresentation {
    pub original_shape: (u32, u32),
    pub compressed_shape: (u32, u32),
    pub regions: Vec<CompressedRegion>,
    pub value_groups: InvertedIndex,
    pub format_groups: FormatGroups,
    pub steps: Vec<CompressionStep>,
    pub stats: CompressionStats,
}

/// Runs the pipeline over a grid
#[derive(Clone)]
pub struct SheetCompressor {
    config: CompressionConfig,
    detector: TableRegionDetector,
    extractor: StructuralAnchorExtractor,
    translator: InvertedIndexTranslator,
    aggregator: DataFormatAggregator,
    sink: Option<SharedSink>,
}

impl SheetCompressor {
    pub fn new(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: TableRegionDetector::new(config.min_gap),
            extractor: StructuralAnchorExtractor,
            translator: InvertedIndexTranslator::new(config.translation_min_run),
            aggregator: DataFormatAggregator::new(config.aggregation_min_run),
            config,
            sink: None,
        })
    }

    pub fn with_sink(mut self, sink: Option<SharedSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(sink) = &self.sink {
            sink.log(&event);
        }
    }

    /// Compress a grid. Regions are processed in parallel and reassembled in sheet order.
    pub fn compress(&self, grid: &Grid) -> CompressedRepresentation {
        let regions = self.detector.detect(grid);
        self.emit(PipelineEvent::RegionsDetected {
            count: regions.len(),
        });

        let compressed: Vec<CompressedRegion> = regions
            .par_iter()
            .map(|region| self.compress_region(grid, region))
            .collect();

        let mut value_groups = InvertedIndex::new();
        let mut format_groups = FormatGroups::new();
        let mut retained_rows = BTreeSet::new();
        let mut retained_cols = BTreeSet::new();
        for region in &compressed {
            for (value, ranges) in &region.value_groups {
                value_groups
                    .entry(value.clone())
                    .or_default()
                    .extend(ranges.iter().copied());
            }
            for (data_type, ranges) in &region.format_groups {
                format_groups
                    .entry(*data_type)
                    .or_default()
                    .extend(ranges.iter().copied());
            }
            for at in region.pruned.positions() {
                retained_rows.insert(at.row);
                retained_cols.insert(at.col);
            }
        }

        let steps = self.steps(&compressed, &value_groups, &format_groups);
        let stats = self.stats(grid, &compressed, &value_groups, &format_groups);
        self.emit(PipelineEvent::CompressionFinished {
            original_cells: stats.original_cells,
            representation_size: stats.representation_size,
            compression_ratio: stats.compression_ratio,
        });

        CompressedRepresentation {
            original_shape: grid.shape(),
            compressed_shape: (retained_rows.len() as u32, retained_cols.len() as u32),
            regions: compressed,
            value_groups,
            format_groups,
            steps,
            stats,
        }
    }

    fn compress_region(&self, grid: &Grid, region: &TableRegion) -> CompressedRegion {
        let pruned = if self.config.use_extraction {
            let anchors = self.extractor.extract_anchors(grid, region);
            self.extractor.prune(region, &anchors, self.config.k)
        } else {
            PrunedRegion::full(*region)
        };
        self.emit(PipelineEvent::RegionPruned {
            region: region.to_string(),
            table_type: region.table_type,
            retained_cells: pruned.retained_cell_count(),
            pruned_cells: pruned.pruned_cell_count(),
        });

        let (value_groups, format_groups) = rayon::join(
            || {
                if self.config.use_translation {
                    self.translator.translate(grid, &pruned)
                } else {
                    InvertedIndex::new()
                }
            },
            || {
                if self.config.use_aggregation {
                    self.aggregator.aggregate(grid, &pruned)
                } else {
                    FormatGroups::new()
                }
            },
        );
        self.emit(PipelineEvent::GroupsBuilt {
            region: region.to_string(),
            value_groups: value_groups.len(),
            format_groups: format_groups.len(),
        });

        let untranslated = if self.config.use_translation {
            Vec::new()
        } else {
            pruned
                .cells(grid)
                .filter(|c| !c.is_empty())
                .map(|c| (c.at, c.value.as_text()))
                .collect()
        };

        CompressedRegion {
            region: *region,
            pruned,
            value_groups,
            format_groups,
            untranslated,
        }
    }

    fn steps(
        &self,
        regions: &[CompressedRegion],
        value_groups: &InvertedIndex,
        format_groups: &FormatGroups,
    ) -> Vec<CompressionStep> {
        let mut steps = vec![CompressionStep::TableDetection {
            regions: regions.len(),
        }];
        if self.config.use_extraction {
            steps.push(CompressionStep::StructuralExtraction {
                anchor_rows: regions.iter().map(|r| r.pruned.anchors.anchor_rows.len()).sum(),
                anchor_cols: regions.iter().map(|r| r.pruned.anchors.anchor_cols.len()).sum(),
                retained_cells: regions.iter().map(|r| r.pruned.retained_cell_count()).sum(),
                pruned_cells: regions.iter().map(|r| r.pruned.pruned_cell_count()).sum(),
            });
        }
        if self.config.use_translation {
            steps.push(CompressionStep::InvertedIndexTranslation {
                values: value_groups.len(),
                entries: value_groups.values().map(Vec::len).sum(),
            });
        }
        if self.config.use_aggregation {
            steps.push(CompressionStep::FormatAggregation {
                types: format_groups.len(),
                entries: format_groups.values().map(Vec::len).sum(),
            });
        }
        steps
    }

    fn stats(
        &self,
        grid: &Grid,
        regions: &[CompressedRegion],
        value_groups: &InvertedIndex,
        format_groups: &FormatGroups,
    ) -> CompressionStats {
        let original_cells = grid.total_cells();
        let untranslated: usize = regions.iter().map(|r| r.untranslated.len()).sum();
        let value_entries: usize = value_groups.values().map(Vec::len).sum();
        let format_entries: usize = format_groups.values().map(Vec::len).sum();

        let entries = if self.config.use_translation {
            value_entries
        } else {
            untranslated
        };
        let representation_size = entries.clamp(1, original_cells);

        // one token per key plus one per address entry; untranslated cells cost address + value
        let compressed_tokens = (value_groups.len()
            + value_entries
            + format_groups.len()
            + format_entries
            + untranslated * 2)
            .max(1);

        CompressionStats {
            original_cells,
            non_empty_cells: grid.non_empty_count(),
            retained_cells: regions.iter().map(|r| r.pruned.retained_cell_count()).sum(),
            pruned_cells: regions.iter().map(|r| r.pruned.pruned_cell_count()).sum(),
            representation_size,
            compression_ratio: original_cells as f64 / representation_size as f64,
            token_reduction_ratio: original_cells as f64 / compressed_tokens as f64,
            sparsity_percentage: grid.sparsity_percentage(),
        }
    }
}

impl std::fmt::Debug for SheetCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetCompressor")
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
