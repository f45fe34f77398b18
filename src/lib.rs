pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod post;
pub mod registry;
pub mod transcribe;
pub mod word;

pub use config::Config;
pub use context::{CacheKey, ExecutionContext, ProgressSink};
pub use error::{Result, WordpipeError};
pub use pipeline::{
    run_pipeline, run_pipeline_once, ExecutionResult, PipelineSpec, RunMeta, StageRecord,
    StageSpec,
};
pub use registry::{
    Catalog, CatalogEntry, ComponentDescriptor, ComponentKind, PostProcessor, Registry,
    StageOpts, StageOutput, Transcriber,
};
pub use word::Word;

/// Build a registry holding every builtin stage.
///
/// Registration is explicit and ordered; call this once at startup, before
/// any lookup or `describe` call.
pub fn builtin_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    transcribe::register_all(&mut registry)?;
    post::register_all(&mut registry)?;
    Ok(registry)
}
