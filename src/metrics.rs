// src/metrics.rs

use ahash::AHashMap;

use crate::error::ReportError;
use crate::types::TaxonRow;
use crate::workflow::WorkflowType;

/// How a metric combines across a node's direct children when the tree
/// aggregates bottom-up. Part of the metric spec, never the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Additive metrics: read/base counts, rPM/bPM.
    Sum,
    /// Score-like metrics where a clade inherits its best descendant.
    Max,
}

impl Combinator {
    /// Combine a set of child values. Returns `None` for an empty set so
    /// the caller can fall back to the node's own raw value; `Max` over
    /// nothing must not fabricate a value.
    pub fn combine(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Combinator::Sum => Some(values.iter().sum()),
            Combinator::Max => values.iter().cloned().fold(None, |acc, v| {
                Some(match acc {
                    Some(a) if a >= v => a,
                    _ => v,
                })
            }),
        }
    }
}

/// Static descriptor for one report metric.
#[derive(Debug, Clone)]
pub struct MetricSpec {
    pub key: String,
    pub label: String,
    pub decimal_places: usize,
    pub combinator: Combinator,
}

impl MetricSpec {
    pub fn new(key: &str, label: &str, decimal_places: usize, combinator: Combinator) -> Self {
        MetricSpec {
            key: key.to_string(),
            label: label.to_string(),
            decimal_places,
            combinator,
        }
    }
}

/// The set of metrics a workflow's report carries, in display order.
/// Built once at startup from configuration and treated as immutable.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    specs: Vec<MetricSpec>,
    by_key: AHashMap<String, usize>,
}

impl MetricRegistry {
    pub fn new(specs: Vec<MetricSpec>) -> Self {
        let mut by_key = AHashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            by_key.insert(spec.key.clone(), i);
        }
        MetricRegistry { specs, by_key }
    }

    /// The default tooltip-metric table for a workflow's taxon tree.
    pub fn for_workflow(workflow: WorkflowType) -> Self {
        let specs = match workflow {
            WorkflowType::ShortReadMngs => vec![
                MetricSpec::new("aggregatescore", "Aggregate Score", 0, Combinator::Max),
                MetricSpec::new("nt_r", "NT r", 0, Combinator::Sum),
                MetricSpec::new("nt_rpm", "NT rpm", 1, Combinator::Sum),
                MetricSpec::new("nr_r", "NR r", 0, Combinator::Sum),
                MetricSpec::new("nr_rpm", "NR rpm", 1, Combinator::Sum),
            ],
            WorkflowType::LongReadMngs => vec![
                MetricSpec::new("nt_b", "NT b", 0, Combinator::Sum),
                MetricSpec::new("nt_bpm", "NT bpm", 1, Combinator::Sum),
                MetricSpec::new("nr_b", "NR b", 0, Combinator::Sum),
                MetricSpec::new("nr_bpm", "NR bpm", 1, Combinator::Sum),
            ],
            // Non-mNGS workflows have no taxon-tree metrics.
            WorkflowType::ConsensusGenome | WorkflowType::Amr => vec![],
        };
        MetricRegistry::new(specs)
    }

    pub fn get(&self, key: &str) -> Option<&MetricSpec> {
        self.by_key.get(key).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Specs in display order.
    pub fn specs(&self) -> &[MetricSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Enforce the invariant that a row's values mapping never carries a
    /// key absent from the registry.
    pub fn validate_row(&self, row: &TaxonRow) -> Result<(), ReportError> {
        for key in row.values.keys() {
            if !self.contains(key) {
                return Err(ReportError::UnknownMetric {
                    key: key.clone(),
                    tax_id: row.tax_id,
                });
            }
        }
        Ok(())
    }
}
