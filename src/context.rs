use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Receives progress updates from running stages.
///
/// Implementations must not block indefinitely; the executor calls them
/// synchronously from inside the pipeline run.
pub trait ProgressSink: Send {
    fn notify(&self, pct: u8);
}

impl<F: Fn(u8) + Send> ProgressSink for F {
    fn notify(&self, pct: u8) {
        self(pct)
    }
}

/// Key for the context cache.
///
/// By convention the parts describe an expensive-to-construct resource, e.g.
/// `["whisper", "base", "cpu", "int8"]` for a loaded model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }
}

/// Mutable state shared by reference across every stage of one pipeline run.
///
/// Two conventions stages rely on:
/// - progress: a stage may report a percent any number of times; values are
///   clamped to [0, 100] and consecutive duplicates are suppressed before
///   reaching the sink. Monotonicity is the stage's responsibility.
/// - cache: stages check the cache before constructing an expensive resource
///   and insert after construction. Entries are treated as immutable once
///   inserted. No eviction, no TTL; the cache lives as long as the context.
///
/// The executor creates a fresh context per run unless the caller supplies
/// one. A long-lived host can reuse a single context across runs to amortize
/// model loads.
#[derive(Default)]
pub struct ExecutionContext {
    progress: Option<Box<dyn ProgressSink>>,
    last_pct: Option<u8>,
    cache: HashMap<CacheKey, Arc<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a progress sink.
    pub fn with_progress(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Forget the last delivered progress value. The executor calls this at
    /// each stage boundary so de-duplication is scoped to one stage
    /// invocation, even when a context is reused across runs.
    pub fn reset_progress(&mut self) {
        self.last_pct = None;
    }

    /// Report stage progress. Clamps to [0, 100] and drops a value equal to
    /// the previously delivered one. No-op without a sink.
    pub fn report_progress(&mut self, pct: i64) {
        let Some(sink) = self.progress.as_ref() else {
            return;
        };
        let pct = pct.clamp(0, 100) as u8;
        if self.last_pct == Some(pct) {
            return;
        }
        sink.notify(pct);
        self.last_pct = Some(pct);
    }

    /// Typed cache lookup. Returns `None` on a missing key or a type
    /// mismatch.
    pub fn cache_get<T: Any + Send + Sync>(&self, key: &CacheKey) -> Option<Arc<T>> {
        let entry = self.cache.get(key)?;
        entry.clone().downcast::<T>().ok()
    }

    /// Insert a constructed resource. Replaces any existing entry under the
    /// same key.
    pub fn cache_put<T: Any + Send + Sync>(&mut self, key: CacheKey, value: Arc<T>) {
        self.cache.insert(key, value);
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
