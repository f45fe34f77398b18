use crate::context::ExecutionContext;
use crate::error::{Result, WordpipeError};
use crate::registry::{
    ComponentDescriptor, ComponentKind, Registry, StageOpts, StageOutput, Transcriber,
};
use crate::word::Word;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Transcriber that replays a precomputed word list from a JSON sidecar.
///
/// Stands in for the heavy speech-recognition engines: it lets a pipeline run
/// end to end against cached engine output, which is also how timing
/// post-processors are exercised during development.
pub struct WordsJsonTranscriber;

impl WordsJsonTranscriber {
    /// Resolve the word-list file: an explicit `path` opt wins, otherwise the
    /// `<audio>.words.json` sidecar next to the audio file.
    fn resolve_source(audio_path: &Path, opts: &StageOpts) -> PathBuf {
        match opts.get("path").and_then(|v| v.as_str()) {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("{}.words.json", audio_path.display())),
        }
    }
}

impl Transcriber for WordsJsonTranscriber {
    fn transcribe(
        &self,
        audio_path: &Path,
        opts: &StageOpts,
        ctx: &mut ExecutionContext,
    ) -> Result<StageOutput> {
        let source = Self::resolve_source(audio_path, opts);
        if !source.exists() {
            return Err(WordpipeError::FileNotFound(source.display().to_string()));
        }

        ctx.report_progress(0);

        debug!(source = %source.display(), "loading precomputed word list");
        let raw = std::fs::read_to_string(&source)?;
        let words: Vec<Word> = serde_json::from_str(&raw)?;

        ctx.report_progress(100);

        let mut meta = StageOpts::new();
        meta.insert("engine".into(), json!("words_json"));
        meta.insert("source".into(), json!(source.display().to_string()));
        meta.insert("words".into(), json!(words.len()));

        Ok(StageOutput::new(words).with_meta(meta))
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register_transcriber(
        ComponentDescriptor::new(
            "words_json",
            "Precomputed word list (JSON)",
            ComponentKind::Transcriber,
            "Replays a canonical word list from a JSON sidecar instead of running an engine.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": ["string", "null"],
                        "description": "Explicit word-list JSON path. Defaults to <audio>.words.json.",
                        "default": null,
                    },
                },
                "additionalProperties": false,
            }),
        ),
        Box::new(WordsJsonTranscriber),
    )
}
