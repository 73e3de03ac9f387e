use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::cost::CostMatrixGenerator;
use crate::diff::DifferenceScorer;
use crate::error::{Result, ViewCostError};
use crate::io::sequence::{load_edge_masks, load_frames, ClipSource};
use crate::io::{ArtifactStore, CacheLayout, Outcome};
use crate::sat::TableRowBuilder;
use crate::sphere::weight_map;
use crate::viewport::{sweep, Viewport};

use super::config::PreprocessConfig;
use super::types::{
    ClipReport, ClipStatus, PipelineStage, ProgressReporter, StageReport, UnitFailure,
};

/// Store, key layout and viewport sweep for one clip under one config.
struct ClipContext {
    store: ArtifactStore,
    layout: CacheLayout,
    viewports: Vec<Viewport>,
}

impl ClipContext {
    fn new(clip: &ClipSource, config: &PreprocessConfig) -> Self {
        let cache_dir = config
            .cache_dir
            .clone()
            .unwrap_or_else(|| clip.default_cache_dir());
        Self {
            store: ArtifactStore::new(cache_dir),
            layout: CacheLayout::new(clip.name.clone(), config.resolution, config.threshold),
            viewports: sweep(
                config.center_y(),
                &config.viewport.fov,
                config.resolution,
                config.viewport.center_steps,
            ),
        }
    }

    fn cache_dir(&self) -> PathBuf {
        self.store.root().to_path_buf()
    }

    fn missing_rows(&self, frame_count: usize) -> Vec<usize> {
        (0..frame_count)
            .filter(|&i| !self.store.contains(&self.layout.table_row(i)))
            .collect()
    }
}

/// Run `f` inside a pool of `threads` workers, or on the global pool.
fn with_thread_pool<T: Send>(threads: Option<usize>, f: impl FnOnce() -> T + Send) -> Result<T> {
    match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ViewCostError::Config(e.to_string()))?;
            Ok(pool.install(f))
        }
        None => Ok(f()),
    }
}

/// Delete the table rows and sweep matrices a run with `config` would produce.
fn clean_outputs(ctx: &ClipContext, frame_count: usize) -> Result<usize> {
    let mut removed = 0;
    for i in 0..frame_count {
        if ctx.store.remove(&ctx.layout.table_row(i))? {
            removed += 1;
        }
    }
    for vp in &ctx.viewports {
        if ctx.store.remove(&ctx.layout.cost_matrix(vp))? {
            removed += 1;
        }
    }
    info!(removed, cache = %ctx.cache_dir().display(), "Prior outputs removed");
    Ok(removed)
}

/// Build every missing summed-area table row. Rows fail independently.
fn build_tables(
    clip: &ClipSource,
    config: &PreprocessConfig,
    ctx: &ClipContext,
    frame_count: usize,
    reporter: &dyn ProgressReporter,
) -> Result<StageReport> {
    let pending = ctx.missing_rows(frame_count);
    let mut report = StageReport {
        cached: frame_count - pending.len(),
        ..Default::default()
    };
    if pending.is_empty() {
        info!(clip = %clip.name, rows = frame_count, "All table rows already computed");
        return Ok(report);
    }

    reporter.begin_stage(PipelineStage::Loading, None);
    let frames = load_frames(clip, config.resolution)?;
    let masks = load_edge_masks(clip, config.resolution)?;
    reporter.finish_stage();

    let weights = weight_map(config.resolution)?;
    let scorer = DifferenceScorer::new(&weights, config.threshold)?;
    let builder = TableRowBuilder::new(&frames, &masks, &scorer)?;
    if builder.frame_count() != frame_count {
        return Err(ViewCostError::SequenceMismatch {
            frames: builder.frame_count(),
            masks: frame_count,
        });
    }

    info!(
        clip = %clip.name,
        rows = pending.len(),
        threshold = config.threshold,
        "Building summed-area table rows"
    );
    reporter.begin_stage(PipelineStage::SummedAreaTables, Some(pending.len()));
    let done = AtomicUsize::new(0);
    let results: Vec<(usize, Result<Outcome>)> = pending
        .par_iter()
        .map(|&i| {
            let outcome = builder.build_row(i, &ctx.store, &ctx.layout.table_row(i));
            reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
            (i, outcome)
        })
        .collect();
    reporter.finish_stage();

    for (i, outcome) in results {
        match outcome {
            Ok(Outcome::Computed) => report.computed += 1,
            Ok(Outcome::Cached) => report.cached += 1,
            Err(e) => {
                warn!(row = i, error = %e, "Table row failed");
                report.failures.push(UnitFailure {
                    unit: format!("table row {i}"),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Build every missing cost matrix of the configured sweep.
fn build_matrices(
    clip: &ClipSource,
    ctx: &ClipContext,
    frame_count: usize,
    reporter: &dyn ProgressReporter,
) -> Result<StageReport> {
    let generator = CostMatrixGenerator::new(&ctx.store, &ctx.layout, frame_count)?;
    let mut report = StageReport::default();

    reporter.begin_stage(PipelineStage::CostMatrices, Some(ctx.viewports.len()));
    match generator.generate(&ctx.viewports) {
        Ok(outcomes) => {
            for (_, outcome) in outcomes {
                match outcome {
                    Outcome::Computed => report.computed += 1,
                    Outcome::Cached => report.cached += 1,
                }
            }
            reporter.advance(ctx.viewports.len());
        }
        Err(e) => {
            warn!(clip = %clip.name, error = %e, "Cost matrices failed");
            report.failures.push(UnitFailure {
                unit: "cost matrices".into(),
                message: e.to_string(),
            });
        }
    }
    reporter.finish_stage();
    Ok(report)
}

/// Run the configured stages for one clip.
pub fn run_clip(
    clip: &ClipSource,
    config: &PreprocessConfig,
    reporter: &dyn ProgressReporter,
) -> Result<ClipReport> {
    config.validate()?;
    let ctx = ClipContext::new(clip, config);
    let frame_count = clip.frame_count()?;
    info!(
        clip = %clip.name,
        frames = frame_count,
        resolution = %config.resolution,
        stages = %config.stages,
        "Preprocessing clip"
    );

    with_thread_pool(config.threads, || {
        let mut report = ClipReport {
            clip: clip.name.clone(),
            cache_dir: ctx.cache_dir(),
            frame_count,
            removed: 0,
            tables: None,
            matrices: None,
        };

        if config.stages.clean {
            reporter.begin_stage(PipelineStage::Cleaning, None);
            report.removed = clean_outputs(&ctx, frame_count)?;
            reporter.finish_stage();
        }
        if config.stages.tables {
            report.tables = Some(build_tables(clip, config, &ctx, frame_count, reporter)?);
        }
        if config.stages.matrices {
            report.matrices = Some(build_matrices(clip, &ctx, frame_count, reporter)?);
        }
        Ok(report)
    })?
}

/// Run every clip independently; one clip failing does not stop the rest.
pub fn run_batch(
    clips: &[ClipSource],
    config: &PreprocessConfig,
    reporter: &dyn ProgressReporter,
) -> Vec<(String, Result<ClipReport>)> {
    clips
        .iter()
        .map(|clip| {
            let result = run_clip(clip, config, reporter);
            if let Err(ref e) = result {
                warn!(clip = %clip.name, error = %e, "Clip failed");
            }
            (clip.name.clone(), result)
        })
        .collect()
}

/// Count the artifacts already on disk for one clip.
pub fn clip_status(clip: &ClipSource, config: &PreprocessConfig) -> Result<ClipStatus> {
    config.validate()?;
    let ctx = ClipContext::new(clip, config);
    let frame_count = clip.frame_count()?;
    let table_rows = frame_count - ctx.missing_rows(frame_count).len();
    let cost_matrices = ctx
        .viewports
        .iter()
        .filter(|vp| ctx.store.contains(&ctx.layout.cost_matrix(vp)))
        .count();

    Ok(ClipStatus {
        clip: clip.name.clone(),
        cache_dir: ctx.cache_dir(),
        frame_count,
        table_rows,
        cost_matrices,
        expected_matrices: ctx.viewports.len(),
    })
}
