use crate::context::ExecutionContext;
use crate::error::Result;
use crate::registry::{
    ComponentDescriptor, ComponentKind, PostProcessor, Registry, StageOpts, StageOutput,
};
use crate::word::Word;
use serde_json::json;

const DEFAULT_MAX_LEN: f64 = 0.30;
const DEFAULT_MIN_EXTEND: f64 = 0.10;

/// Expands very short words by extending their start time leftward, without
/// overlapping the previous word.
///
/// Some engines produce extremely short durations for function words, which
/// makes precise selection and playback difficult. This pass trades temporal
/// precision for usability by enforcing a minimum effective duration. First
/// and last words are never touched; it operates entirely in word-time space
/// and does not inspect audio.
pub struct AdjustShortWords;

impl PostProcessor for AdjustShortWords {
    fn process(
        &self,
        words: Vec<Word>,
        opts: &StageOpts,
        _ctx: &mut ExecutionContext,
    ) -> Result<StageOutput> {
        let max_len = opts
            .get("max_len")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_MAX_LEN);
        let min_extend = opts
            .get("min_extend")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_MIN_EXTEND);

        if words.len() < 3 {
            let mut meta = StageOpts::new();
            meta.insert("adjusted".into(), json!(0));
            return Ok(StageOutput::new(words).with_meta(meta));
        }

        let mut out = words;
        let mut adjusted = 0u64;

        for i in 1..out.len() - 1 {
            // Previous word as already adjusted earlier in this pass.
            let prev_end = out[i - 1].end;
            let word = &mut out[i];
            let duration = word.duration();

            if duration < max_len {
                let extend = duration.max(min_extend);
                let new_start = (word.start - extend).max(prev_end);

                if new_start < word.start {
                    word.start = new_start;
                    adjusted += 1;
                }
            }
        }

        let mut meta = StageOpts::new();
        meta.insert("adjusted".into(), json!(adjusted));
        meta.insert("max_len".into(), json!(max_len));
        meta.insert("min_extend".into(), json!(min_extend));

        Ok(StageOutput::new(out).with_meta(meta))
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register_post(
        ComponentDescriptor::new(
            "adjust_short_words",
            "Adjust short words (extend left)",
            ComponentKind::Post,
            "Expands very short words by extending their start time leftward, avoiding overlap.",
            json!({
                "type": "object",
                "properties": {
                    "max_len": {
                        "type": "number",
                        "description": "Words shorter than this (seconds) will be expanded.",
                        "default": DEFAULT_MAX_LEN,
                    },
                    "min_extend": {
                        "type": "number",
                        "description": "Minimum extension duration applied to short words (seconds).",
                        "default": DEFAULT_MIN_EXTEND,
                    },
                },
                "additionalProperties": false,
            }),
        ),
        Box::new(AdjustShortWords),
    )
}
