use crate::encode::sink::{FrameSink, SinkConfig};
use crate::eval::evaluator::{EvaluatedStage, Evaluator};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{StackError, StackResult};
use crate::geometry::{CardCorrections, CardFrame, StackFactors};
use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
use crate::scene::config::StageConfig;
use crate::scene::model::{ItemId, Toggles};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, mpsc};

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;
const SINK_CLOSED: &str = "encoder thread is not accepting frames";

/// Options controlling [`StageSession`] range rendering.
#[derive(Clone, Debug)]
pub struct StageSessionOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Chunk size used by the render->encode streaming pipeline.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Reuse the previous frame's pixels when the evaluated stage did not change.
    pub static_frame_elision: bool,
    /// Bounded channel capacity between the renderer and the encoder thread.
    pub channel_capacity: usize,
    pub backend: BackendKind,
}

impl Default for StageSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: true,
            channel_capacity: 4,
            backend: BackendKind::Cpu,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames actually rasterized.
    pub frames_rendered: u64,
    /// Frames that reused the previous frame's pixels.
    pub frames_elided: u64,
}

/// Geometry report for one drawn card.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CardProbe {
    pub item: ItemId,
    pub z_index: u32,
    pub frame: CardFrame,
    pub corrections: CardCorrections,
}

/// Geometry report for one frame, cards listed bottom to top.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StageProbe {
    pub frame: FrameIndex,
    /// Presentation time of `frame`.
    pub time_secs: f64,
    pub scroll_x: f64,
    pub toggles: Toggles,
    pub factors: StackFactors,
    /// Page a released drag at this offset would settle on.
    pub snapped_page: usize,
    pub cards: Vec<CardProbe>,
}

/// Front-loads and validates a stage, then renders frames of its timeline.
#[derive(Debug)]
pub struct StageSession {
    eval: Evaluator,
    opts: StageSessionOpts,
}

impl StageSession {
    #[tracing::instrument(skip_all, fields(items = cfg.items.len(), duration = cfg.duration))]
    pub fn new(cfg: StageConfig, opts: StageSessionOpts) -> StackResult<Self> {
        let eval = Evaluator::new(cfg)?;
        tracing::debug!(
            width = eval.layout().container_width().get(),
            cycle_frames = eval.scroll().cycle_frames(),
            "stage session ready"
        );
        Ok(Self { eval, opts })
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.eval
    }

    pub fn config(&self) -> &StageConfig {
        self.eval.config()
    }

    /// Total frames of the timeline.
    pub fn duration(&self) -> u64 {
        self.eval.config().duration
    }

    /// Full timeline as a range.
    pub fn full_range(&self) -> FrameRange {
        FrameRange::leading(self.duration(), None)
    }

    fn check_frame(&self, frame: FrameIndex) -> StackResult<()> {
        if frame.0 >= self.duration() {
            return Err(StackError::validation(format!(
                "frame {} is outside the timeline (duration {})",
                frame.0,
                self.duration()
            )));
        }
        Ok(())
    }

    /// Evaluate a single frame without rasterizing it.
    pub fn eval_frame(&self, frame: FrameIndex) -> StackResult<EvaluatedStage> {
        self.check_frame(frame)?;
        Ok(self.eval.eval_frame(frame.0))
    }

    /// Render a single frame.
    pub fn render_frame(&self, frame: FrameIndex) -> StackResult<FrameRGBA> {
        let stage = self.eval_frame(frame)?;
        let mut backend = create_backend(self.opts.backend);
        backend.render_stage(&stage, self.config().canvas)
    }

    /// Per-card geometry at `frame`.
    pub fn probe(&self, frame: FrameIndex) -> StackResult<StageProbe> {
        self.check_frame(frame)?;
        let state = self.eval.toggle_state(frame.0);
        let stage = self.eval.eval_frame(frame.0);
        Ok(StageProbe {
            frame,
            time_secs: frame.seconds(self.config().fps),
            scroll_x: stage.scroll_x,
            toggles: state.toggles,
            factors: state.factors,
            snapped_page: self.eval.snapped_page(stage.scroll_x, 0.0),
            cards: stage
                .cards
                .iter()
                .map(|c| CardProbe {
                    item: c.item,
                    z_index: c.z_index,
                    frame: c.frame,
                    corrections: c.corrections,
                })
                .collect(),
        })
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order. Chunks rendered in
    /// parallel are reordered at the sink boundary (bounded channel backpressure).
    #[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> StackResult<RenderStats> {
        if range.is_empty() {
            return Err(StackError::validation(
                "render_range range must be non-empty",
            ));
        }
        if range.end.0 > self.duration() {
            return Err(StackError::validation(
                "render_range range must be within the timeline",
            ));
        }

        let canvas = self.config().canvas;
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.config().fps,
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = (canvas.rgba_len() as u64).max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        std::thread::scope(|scope| -> StackResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            // Encoder thread: in-order delivery regardless of render completion order.
            let enc = scope.spawn(move || -> StackResult<()> {
                sink_ref.begin(cfg)?;

                let mut next = range_start;
                let mut pending = HashMap::<u64, Arc<FrameRGBA>>::new();
                while next < range_end {
                    if let Some(frame) = pending.remove(&next) {
                        sink_ref.push_frame(FrameIndex(next), &frame)?;
                        next += 1;
                        continue;
                    }
                    let msg = rx
                        .recv()
                        .map_err(|_| StackError::encode("encoder channel disconnected"))?;
                    pending.insert(msg.idx.0, msg.frame);
                }

                sink_ref.end()
            });

            let produce_res = (|| -> StackResult<RenderStats> {
                let mut stats = RenderStats::default();
                let mut backend = create_backend(self.opts.backend);
                let mut prev: Option<(EvaluatedStage, Arc<FrameRGBA>)> = None;
                let chunk = ChunkCtx {
                    eval: &self.eval,
                    kind: self.opts.backend,
                    elide: self.opts.static_frame_elision,
                };

                let mut chunk_start = range_start;
                while chunk_start < range_end {
                    let chunk_end = (chunk_start + chunk_size).min(range_end);
                    let chunk_stats = match pool.as_ref() {
                        Some(pool) => {
                            chunk.render_parallel(pool, chunk_start, chunk_end, &mut prev, &tx)?
                        }
                        None => chunk.render_sequential(
                            backend.as_mut(),
                            chunk_start,
                            chunk_end,
                            &mut prev,
                            &tx,
                        )?,
                    };
                    tracing::debug!(
                        chunk_start,
                        chunk_end,
                        rendered = chunk_stats.frames_rendered,
                        elided = chunk_stats.frames_elided,
                        "chunk done"
                    );
                    stats.frames_total += chunk_stats.frames_total;
                    stats.frames_rendered += chunk_stats.frames_rendered;
                    stats.frames_elided += chunk_stats.frames_elided;
                    chunk_start = chunk_end;
                }
                Ok(stats)
            })();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| StackError::encode("encoder thread panicked"))?;

            let stats = match (produce_res, enc_res) {
                (Ok(stats), Ok(())) => stats,
                // A closed channel only means the encoder stopped; its own error says why.
                (Err(StackError::Encode(msg)), Err(e)) if msg == SINK_CLOSED => return Err(e),
                (Err(e), _) | (Ok(_), Err(e)) => return Err(e),
            };
            tracing::info!(
                frames = stats.frames_total,
                rendered = stats.frames_rendered,
                elided = stats.frames_elided,
                "range rendered"
            );
            Ok(stats)
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: Arc<FrameRGBA>,
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    chunk_size.max(1) as u64
}

fn build_thread_pool(threads: Option<usize>) -> StackResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(StackError::validation(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StackError::render(format!("failed to build rayon thread pool: {e}")))
}

struct ChunkCtx<'a> {
    eval: &'a Evaluator,
    kind: BackendKind,
    elide: bool,
}

impl ChunkCtx<'_> {
    /// Evaluate `[start, end)` and map each frame to the stage it must be rasterized from.
    ///
    /// Returns the stages to rasterize plus, per frame, either an index into them or `None` when
    /// the frame reuses `prev`.
    fn plan(
        &self,
        start: u64,
        end: u64,
        prev: Option<&EvaluatedStage>,
    ) -> (Vec<EvaluatedStage>, Vec<Option<usize>>) {
        let mut unique = Vec::<EvaluatedStage>::new();
        let mut map = Vec::with_capacity((end - start) as usize);
        for f in start..end {
            let stage = self.eval.eval_frame(f);
            if self.elide && unique.last().or(prev) == Some(&stage) {
                map.push(unique.len().checked_sub(1));
                continue;
            }
            unique.push(stage);
            map.push(Some(unique.len() - 1));
        }
        (unique, map)
    }

    fn render_parallel(
        &self,
        pool: &rayon::ThreadPool,
        start: u64,
        end: u64,
        prev: &mut Option<(EvaluatedStage, Arc<FrameRGBA>)>,
        tx: &mpsc::SyncSender<FrameMsg>,
    ) -> StackResult<RenderStats> {
        let (unique, map) = self.plan(start, end, prev.as_ref().map(|(s, _)| s));
        let canvas = self.eval.config().canvas;
        let kind = self.kind;
        let rendered = pool.install(|| {
            unique
                .par_iter()
                .map_init(
                    || create_backend(kind),
                    |backend, stage| backend.render_stage(stage, canvas).map(Arc::new),
                )
                .collect::<Vec<_>>()
        });
        let rendered = rendered.into_iter().collect::<StackResult<Vec<_>>>()?;
        self.send(start, &map, &unique, &rendered, prev, tx)
    }

    fn render_sequential(
        &self,
        backend: &mut dyn RenderBackend,
        start: u64,
        end: u64,
        prev: &mut Option<(EvaluatedStage, Arc<FrameRGBA>)>,
        tx: &mpsc::SyncSender<FrameMsg>,
    ) -> StackResult<RenderStats> {
        let (unique, map) = self.plan(start, end, prev.as_ref().map(|(s, _)| s));
        let canvas = self.eval.config().canvas;
        let rendered = unique
            .iter()
            .map(|stage| backend.render_stage(stage, canvas).map(Arc::new))
            .collect::<StackResult<Vec<_>>>()?;
        self.send(start, &map, &unique, &rendered, prev, tx)
    }

    fn send(
        &self,
        start: u64,
        map: &[Option<usize>],
        unique: &[EvaluatedStage],
        rendered: &[Arc<FrameRGBA>],
        prev: &mut Option<(EvaluatedStage, Arc<FrameRGBA>)>,
        tx: &mpsc::SyncSender<FrameMsg>,
    ) -> StackResult<RenderStats> {
        for (f, slot) in (start..).zip(map) {
            let frame = match slot {
                Some(i) => rendered[*i].clone(),
                None => prev
                    .as_ref()
                    .map(|(_, frame)| frame.clone())
                    .ok_or_else(|| StackError::render("elided frame has no predecessor"))?,
            };
            tx.send(FrameMsg {
                idx: FrameIndex(f),
                frame,
            })
            .map_err(|_| StackError::encode(SINK_CLOSED))?;
        }
        if let (Some(stage), Some(frame)) = (unique.last(), rendered.last()) {
            *prev = Some((stage.clone(), frame.clone()));
        }
        let total = map.len() as u64;
        let rendered_count = rendered.len() as u64;
        Ok(RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total - rendered_count,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/stage_session.rs"]
mod tests;
