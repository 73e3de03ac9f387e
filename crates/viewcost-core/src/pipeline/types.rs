use std::path::PathBuf;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Cleaning,
    Loading,
    SummedAreaTables,
    CostMatrices,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cleaning => write!(f, "Cleaning outputs"),
            Self::Loading => write!(f, "Loading frames"),
            Self::SummedAreaTables => write!(f, "Building tables"),
            Self::CostMatrices => write!(f, "Building matrices"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// (rows or matrices), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// Work items completed so far in the current stage.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// A unit of work that failed without aborting its siblings.
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: String,
    pub message: String,
}

/// Per-stage tally of units computed, skipped and failed.
#[derive(Debug, Default)]
pub struct StageReport {
    pub computed: usize,
    pub cached: usize,
    pub failures: Vec<UnitFailure>,
}

impl StageReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What a run did for one clip.
#[derive(Debug)]
pub struct ClipReport {
    pub clip: String,
    pub cache_dir: PathBuf,
    pub frame_count: usize,
    pub removed: usize,
    pub tables: Option<StageReport>,
    pub matrices: Option<StageReport>,
}

impl ClipReport {
    pub fn is_success(&self) -> bool {
        self.tables.as_ref().map_or(true, StageReport::is_success)
            && self.matrices.as_ref().map_or(true, StageReport::is_success)
    }
}

/// Artifacts present on disk for one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipStatus {
    pub clip: String,
    pub cache_dir: PathBuf,
    pub frame_count: usize,
    pub table_rows: usize,
    pub cost_matrices: usize,
    pub expected_matrices: usize,
}
