use crate::context::ExecutionContext;
use crate::error::{Result, WordpipeError};
use crate::registry::{Registry, StageOpts};
use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Selects one stage and its options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub opts: StageOpts,
}

impl StageSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            opts: StageOpts::new(),
        }
    }

    pub fn with_opts(mut self, opts: StageOpts) -> Self {
        self.opts = opts;
        self
    }
}

/// Declarative pipeline request: exactly one transcriber, then an ordered
/// list of post-processors. `opts` absent is equivalent to `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub transcriber: StageSpec,
    #[serde(default)]
    pub post: Vec<StageSpec>,
}

/// What one stage did: which component ran, with which options, for how
/// long, and whatever metadata it reported.
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub id: String,
    pub opts: StageOpts,
    pub runtime_s: f64,
    pub meta: StageOpts,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub transcriber: StageRecord,
    pub post: Vec<StageRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub words: Vec<Word>,
    pub meta: RunMeta,
}

/// Wall-clock seconds rounded to millisecond precision, for reporting only.
fn round_runtime(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

fn required_id<'a>(spec: &'a StageSpec, field: &str) -> Result<&'a str> {
    match spec.id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(WordpipeError::MissingField(format!("{field}.id"))),
    }
}

/// Run a pipeline with a fresh execution context.
pub fn run_pipeline_once(
    registry: &Registry,
    audio_path: &Path,
    spec: &PipelineSpec,
) -> Result<ExecutionResult> {
    let mut ctx = ExecutionContext::new();
    run_pipeline(registry, audio_path, spec, &mut ctx)
}

/// Execute a pipeline: one transcriber followed by each post-processor,
/// strictly in array order (later stages consume the exact output of earlier
/// ones).
///
/// Resolution of the transcriber happens before any stage is invoked, so a
/// spec naming an unknown transcriber fails without running anything. Each
/// post entry is resolved immediately before it runs. Stage errors propagate
/// unmodified and abort the run; there is no retry and no partial result.
/// Cache entries already written into `ctx` by successful stages are kept.
pub fn run_pipeline(
    registry: &Registry,
    audio_path: &Path,
    spec: &PipelineSpec,
    ctx: &mut ExecutionContext,
) -> Result<ExecutionResult> {
    let transcriber_id = required_id(&spec.transcriber, "transcriber")?;
    let binding = registry.transcriber(transcriber_id)?;

    debug!(id = transcriber_id, "running transcriber");
    ctx.reset_progress();
    let started = Instant::now();
    let output = binding
        .implementation
        .transcribe(audio_path, &spec.transcriber.opts, ctx)?;
    let runtime_s = round_runtime(started.elapsed().as_secs_f64());

    let mut words = output.words;
    let mut meta = RunMeta {
        transcriber: StageRecord {
            id: transcriber_id.to_string(),
            opts: spec.transcriber.opts.clone(),
            runtime_s,
            meta: output.meta,
        },
        post: Vec::with_capacity(spec.post.len()),
    };

    for (index, stage) in spec.post.iter().enumerate() {
        let post_id = required_id(stage, &format!("post[{index}]"))?;
        let binding = registry.post(post_id)?;

        debug!(id = post_id, index, "running post-processor");
        ctx.reset_progress();
        let started = Instant::now();
        let output = binding.implementation.process(words, &stage.opts, ctx)?;
        let runtime_s = round_runtime(started.elapsed().as_secs_f64());

        words = output.words;
        meta.post.push(StageRecord {
            id: post_id.to_string(),
            opts: stage.opts.clone(),
            runtime_s,
            meta: output.meta,
        });
    }

    Ok(ExecutionResult { words, meta })
}
