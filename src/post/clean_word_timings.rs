use crate::context::ExecutionContext;
use crate::error::Result;
use crate::registry::{
    ComponentDescriptor, ComponentKind, PostProcessor, Registry, StageOpts, StageOutput,
};
use crate::word::Word;
use serde_json::json;

const DEFAULT_TINY_GAP_MS: f64 = 50.0;

/// Normalizes adjacent word boundaries: clamps overlaps and closes tiny gaps
/// to the midpoint.
///
/// Single pass over adjacent pairs only, assuming time-ordered input. A
/// boundary moved by one adjustment is not re-checked against its other
/// neighbor; cascading edits are left as-is.
///
/// All times in the word list are seconds. Options taking milliseconds are
/// named `*_ms` and converted internally.
pub struct CleanWordTimings;

impl PostProcessor for CleanWordTimings {
    fn process(
        &self,
        words: Vec<Word>,
        opts: &StageOpts,
        _ctx: &mut ExecutionContext,
    ) -> Result<StageOutput> {
        if words.len() < 2 {
            let mut meta = StageOpts::new();
            meta.insert("overlaps_fixed".into(), json!(0));
            meta.insert("gaps_closed".into(), json!(0));
            return Ok(StageOutput::new(words).with_meta(meta));
        }

        let tiny_gap_ms = opts
            .get("tiny_gap_ms")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_TINY_GAP_MS);
        let tiny_gap = tiny_gap_ms / 1000.0;

        let mut out = words;
        let mut overlaps_fixed = 0u64;
        let mut gaps_closed = 0u64;

        for i in 0..out.len() - 1 {
            let mut w_end = out[i].end;
            let mut n_start = out[i + 1].start;

            // 1) Clamp overlaps
            if w_end > n_start {
                let mid = (w_end + n_start) / 2.0;
                out[i].end = mid;
                out[i + 1].start = mid;
                overlaps_fixed += 1;

                w_end = mid;
                n_start = mid;
            }

            // 2) Close tiny positive gaps
            let gap = n_start - w_end;
            if gap > 0.0 && gap < tiny_gap {
                let mid = (w_end + n_start) / 2.0;
                out[i].end = mid;
                out[i + 1].start = mid;
                gaps_closed += 1;
            }
        }

        let mut meta = StageOpts::new();
        meta.insert("tiny_gap_ms".into(), json!(tiny_gap_ms));
        meta.insert("overlaps_fixed".into(), json!(overlaps_fixed));
        meta.insert("gaps_closed".into(), json!(gaps_closed));

        Ok(StageOutput::new(out).with_meta(meta))
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register_post(
        ComponentDescriptor::new(
            "clean_word_timings",
            "Clean word timings (fix overlaps/gaps)",
            ComponentKind::Post,
            "Clamps overlaps and closes tiny gaps between adjacent words using midpoints.",
            json!({
                "type": "object",
                "properties": {
                    "tiny_gap_ms": {
                        "type": "number",
                        "description": "Close gaps smaller than this (milliseconds).",
                        "default": DEFAULT_TINY_GAP_MS,
                    },
                },
                "additionalProperties": false,
            }),
        ),
        Box::new(CleanWordTimings),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(words: Vec<Word>, opts: StageOpts) -> StageOutput {
        let mut ctx = ExecutionContext::new();
        CleanWordTimings.process(words, &opts, &mut ctx).unwrap()
    }

    fn opts_ms(tiny_gap_ms: f64) -> StageOpts {
        let mut opts = StageOpts::new();
        opts.insert("tiny_gap_ms".into(), json!(tiny_gap_ms));
        opts
    }

    #[test]
    fn test_overlap_clamped_to_midpoint() {
        let words = vec![Word::new("a", 0.0, 0.6), Word::new("b", 0.4, 1.0)];
        let output = run(words, StageOpts::new());

        assert_eq!(output.words[0].end, 0.5);
        assert_eq!(output.words[1].start, 0.5);
        assert_eq!(output.meta["overlaps_fixed"], 1);
        assert_eq!(output.meta["gaps_closed"], 0);
    }

    #[test]
    fn test_tiny_gap_closed_to_midpoint() {
        // 30ms gap, threshold 50ms
        let words = vec![Word::new("a", 0.0, 0.40), Word::new("b", 0.43, 1.0)];
        let output = run(words, StageOpts::new());

        assert!((output.words[0].end - 0.415).abs() < 1e-9);
        assert!((output.words[1].start - 0.415).abs() < 1e-9);
        assert_eq!(output.meta["gaps_closed"], 1);
    }

    #[test]
    fn test_large_gap_untouched() {
        let words = vec![Word::new("a", 0.0, 0.4), Word::new("b", 0.6, 1.0)];
        let output = run(words.clone(), StageOpts::new());

        assert_eq!(output.words, words);
        assert_eq!(output.meta["overlaps_fixed"], 0);
        assert_eq!(output.meta["gaps_closed"], 0);
    }

    #[test]
    fn test_zero_gap_untouched() {
        // Exact adjacency: gap of 0 is neither an overlap nor a positive gap.
        let words = vec![Word::new("hi", 0.0, 0.2), Word::new("there", 0.2, 0.25)];
        let output = run(words.clone(), opts_ms(100.0));

        assert_eq!(output.words, words);
        assert_eq!(output.meta["overlaps_fixed"], 0);
        assert_eq!(output.meta["gaps_closed"], 0);
    }

    #[test]
    fn test_gap_equal_to_threshold_untouched() {
        let words = vec![Word::new("a", 0.0, 0.4), Word::new("b", 0.45, 1.0)];
        let output = run(words.clone(), opts_ms(50.0));

        assert_eq!(output.words, words);
    }

    #[test]
    fn test_single_pass_no_recheck() {
        // Clamping a/b moves b.start past b.end, leaving b inverted. The
        // pass never revisits an adjusted boundary, so it stays that way.
        let words = vec![
            Word::new("a", 0.0, 1.0),
            Word::new("b", 0.2, 0.5),
            Word::new("c", 0.5, 0.9),
        ];
        let output = run(words, StageOpts::new());
        assert_eq!(output.words[0].end, 0.6);
        assert_eq!(output.words[1].start, 0.6);
        assert_eq!(output.words[1].end, 0.5);
        assert_eq!(output.words[2].start, 0.5);
        assert_eq!(output.meta["overlaps_fixed"], 1);
    }

    #[test]
    fn test_short_lists_pass_through() {
        let output = run(vec![Word::new("solo", 0.0, 0.5)], StageOpts::new());
        assert_eq!(output.words.len(), 1);
        assert_eq!(output.meta["overlaps_fixed"], 0);
        assert!(output.meta.get("tiny_gap_ms").is_none());
    }
}
