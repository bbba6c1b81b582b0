//src/types.rs

use ahash::AHashMap;

/// Metric values for one taxon, keyed by metric key (e.g. "nt_r", "nr_rpm").
pub type MetricValues = AHashMap<String, f64>;

/// Pathogen tag -> species count for a genus row (e.g. "knownPathogen" -> 2).
pub type PathogenCounts = AHashMap<String, u32>;

/// The closed set of curator annotation kinds a species row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Hit,
    NotAHit,
    Inconclusive,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 3] = [
        AnnotationKind::Hit,
        AnnotationKind::NotAHit,
        AnnotationKind::Inconclusive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Hit => "hit",
            AnnotationKind::NotAHit => "not_a_hit",
            AnnotationKind::Inconclusive => "inconclusive",
        }
    }
}

/// Annotation kind -> count of annotated species under a genus.
pub type AnnotationCounts = AHashMap<AnnotationKind, u32>;

/// Which reference database a stacked NT/NR value belongs to.
/// Selection state lives outside this crate; we only reflect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    Nt,
    Nr,
}

/// Taxonomic level of a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxLevel {
    Species,
    Genus,
    /// Lineage ranks above genus (family, order, ..., superkingdom).
    Higher,
}

impl TaxLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxLevel::Species => "species",
            TaxLevel::Genus => "genus",
            TaxLevel::Higher => "higher",
        }
    }
}

/// One taxon's flat report entry, as returned by the report fetch.
/// Read-only once constructed; tree building derives new data from it
/// rather than mutating it in place.
#[derive(Debug, Clone)]
pub struct TaxonRow {
    pub tax_id: i64,
    pub parent_tax_id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub tax_level: TaxLevel,
    /// Per-metric raw values. Keys must exist in the metric registry.
    pub values: MetricValues,
    /// Pathogen tag counts across the species under this genus.
    /// Empty for non-genus rows and for genera without flagged species.
    pub pathogens: PathogenCounts,
    /// Annotation counts across the species under this genus.
    pub species_annotations: AnnotationCounts,
}

impl TaxonRow {
    pub fn new(
        tax_id: i64,
        parent_tax_id: i64,
        scientific_name: &str,
        tax_level: TaxLevel,
    ) -> Self {
        TaxonRow {
            tax_id,
            parent_tax_id,
            scientific_name: scientific_name.to_string(),
            common_name: None,
            tax_level,
            values: MetricValues::new(),
            pathogens: PathogenCounts::new(),
            species_annotations: AnnotationCounts::new(),
        }
    }

    pub fn with_value(mut self, metric: &str, value: f64) -> Self {
        self.values.insert(metric.to_string(), value);
        self
    }
}
