// src/workflow.rs

use ahash::AHashMap;

use crate::error::ReportError;

/// Pipeline category a sample was run through. Closed set; anything
/// else coming over the wire is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowType {
    ShortReadMngs,
    LongReadMngs,
    ConsensusGenome,
    Amr,
}

impl WorkflowType {
    pub const ALL: [WorkflowType; 4] = [
        WorkflowType::ShortReadMngs,
        WorkflowType::LongReadMngs,
        WorkflowType::ConsensusGenome,
        WorkflowType::Amr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::ShortReadMngs => "short-read-mngs",
            WorkflowType::LongReadMngs => "long-read-mngs",
            WorkflowType::ConsensusGenome => "consensus-genome",
            WorkflowType::Amr => "amr",
        }
    }

    pub fn parse(key: &str) -> Result<Self, ReportError> {
        match key {
            "short-read-mngs" => Ok(WorkflowType::ShortReadMngs),
            "long-read-mngs" => Ok(WorkflowType::LongReadMngs),
            "consensus-genome" => Ok(WorkflowType::ConsensusGenome),
            "amr" => Ok(WorkflowType::Amr),
            _ => Err(ReportError::UnknownWorkflow(key.to_string())),
        }
    }

    pub fn is_mngs(&self) -> bool {
        matches!(self, WorkflowType::ShortReadMngs | WorkflowType::LongReadMngs)
    }
}

/// UI capabilities a workflow's sample view exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityFlags {
    /// Download dropdown offers per-category report downloads.
    pub show_download_categories: bool,
    /// Saved-visualization button is available.
    pub show_save_button: bool,
    /// Header links through to the sample's pipeline runs.
    pub has_pipeline_runs_button: bool,
}

/// Immutable workflow -> capability lookup, built once at startup.
#[derive(Debug, Clone)]
pub struct WorkflowCapabilities {
    map: AHashMap<WorkflowType, CapabilityFlags>,
}

impl WorkflowCapabilities {
    pub fn new(map: AHashMap<WorkflowType, CapabilityFlags>) -> Self {
        WorkflowCapabilities { map }
    }

    /// The stock configuration: mNGS workflows get the full report
    /// download dropdown; consensus-genome and AMR get download-all only.
    pub fn default_config() -> Self {
        let mut map = AHashMap::new();
        map.insert(
            WorkflowType::ShortReadMngs,
            CapabilityFlags {
                show_download_categories: true,
                show_save_button: true,
                has_pipeline_runs_button: true,
            },
        );
        map.insert(
            WorkflowType::LongReadMngs,
            CapabilityFlags {
                show_download_categories: true,
                show_save_button: true,
                has_pipeline_runs_button: true,
            },
        );
        map.insert(
            WorkflowType::ConsensusGenome,
            CapabilityFlags {
                show_download_categories: false,
                show_save_button: false,
                has_pipeline_runs_button: true,
            },
        );
        map.insert(
            WorkflowType::Amr,
            CapabilityFlags {
                show_download_categories: false,
                show_save_button: false,
                has_pipeline_runs_button: false,
            },
        );
        WorkflowCapabilities::new(map)
    }

    /// Look up capabilities by workflow key. Unknown or unmapped keys
    /// fail fast: they mean the code and the config disagree.
    pub fn resolve(&self, key: &str) -> Result<CapabilityFlags, ReportError> {
        let workflow = WorkflowType::parse(key)?;
        self.map
            .get(&workflow)
            .copied()
            .ok_or_else(|| ReportError::UnmappedWorkflow(key.to_string()))
    }

    pub fn resolve_type(&self, workflow: WorkflowType) -> Result<CapabilityFlags, ReportError> {
        self.map
            .get(&workflow)
            .copied()
            .ok_or_else(|| ReportError::UnmappedWorkflow(workflow.as_str().to_string()))
    }
}
