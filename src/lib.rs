// src/lib.rs
pub mod error;
pub mod format;
pub mod genus_preview;
pub mod heatmap;
pub mod metrics;
pub mod report_io;
pub mod tree;
pub mod types;
pub mod workflow;

use std::path::PathBuf;

use crate::error::ReportError;
use crate::metrics::MetricRegistry;
use crate::report_io::read_report_rows;
use crate::tree::{build_taxon_tree, TaxonTree, TreeConfig};
use crate::types::TaxonRow;
use crate::workflow::{CapabilityFlags, WorkflowCapabilities, WorkflowType};

pub use crate::format::{format_number, format_value, resolve_dual_metric, RenderableStack};
pub use crate::genus_preview::{aggregate_genus_preview, GenusPreview};
pub use crate::heatmap::{compute_legend_bounds, legend_bounds_by_metric, Bounds, ScaleKind};

/// Everything the rendering layer needs for one sample's taxonomic
/// report view. Holds structured data only; text renderings are
/// generated on demand.
pub struct ReportView {
    /// The aggregated taxon tree for the tree visualization.
    pub tree: TaxonTree,

    /// Metric registry governing the view's columns and tooltips.
    pub registry: MetricRegistry,

    /// The workflow this report was produced by.
    pub workflow: WorkflowType,

    /// Header capabilities for this workflow.
    pub capabilities: CapabilityFlags,
}

impl ReportView {
    /// Generate the indented text report on demand, ordered by `metric`.
    pub fn get_report_text(&self, metric: &str) -> String {
        self.tree.render_text(&self.registry, metric)
    }

    /// The default ordering metric: the registry's first entry.
    pub fn default_metric(&self) -> Option<&str> {
        self.registry.specs().first().map(|s| s.key.as_str())
    }
}

/// Build a sample's report view from already-fetched rows.
pub fn build_report_view(
    rows: &[TaxonRow],
    workflow: WorkflowType,
    tree_config: &TreeConfig,
    capabilities: &WorkflowCapabilities,
) -> Result<ReportView, ReportError> {
    // 1. Metric registry for this workflow
    let registry = MetricRegistry::for_workflow(workflow);

    // 2. Enforce the registry invariant on every row up front
    for row in rows {
        registry.validate_row(row)?;
    }

    // 3. Build the aggregated taxon tree
    let tree = build_taxon_tree(rows, &registry, tree_config);

    // 4. Resolve header capabilities (fails fast on config drift)
    let capabilities = capabilities.resolve_type(workflow)?;

    Ok(ReportView {
        tree,
        registry,
        workflow,
        capabilities,
    })
}

/// Unified function to build a report view from one or multiple report
/// files (plain or gzipped).
pub fn build_report_view_from_files(
    report_paths: Vec<PathBuf>,
    workflow: WorkflowType,
    tree_config: &TreeConfig,
) -> Result<ReportView, ReportError> {
    let registry = MetricRegistry::for_workflow(workflow);

    let mut all_rows = Vec::new();
    for path in report_paths {
        let rows = read_report_rows(&path, &registry)?;
        all_rows.extend(rows);
    }

    build_report_view(
        &all_rows,
        workflow,
        tree_config,
        &WorkflowCapabilities::default_config(),
    )
}
