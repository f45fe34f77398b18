use crate::context::ExecutionContext;
use crate::error::{Result, WordpipeError};
use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Open options map passed to a stage, interpreted by that stage alone.
pub type StageOpts = serde_json::Map<String, serde_json::Value>;

/// What a stage invocation produces: the (possibly replaced) word list plus
/// free-form metadata for the run report.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub words: Vec<Word>,
    pub meta: StageOpts,
}

impl StageOutput {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words,
            meta: StageOpts::new(),
        }
    }

    pub fn with_meta(mut self, meta: StageOpts) -> Self {
        self.meta = meta;
        self
    }
}

/// A stage producing a word list from raw audio.
pub trait Transcriber: Send + Sync {
    fn transcribe(
        &self,
        audio_path: &Path,
        opts: &StageOpts,
        ctx: &mut ExecutionContext,
    ) -> Result<StageOutput>;
}

/// A stage transforming a word list into another word list. No audio access.
///
/// Implementations must preserve list length and token order unless their
/// documented purpose is to filter or re-time.
pub trait PostProcessor: Send + Sync {
    fn process(
        &self,
        words: Vec<Word>,
        opts: &StageOpts,
        ctx: &mut ExecutionContext,
    ) -> Result<StageOutput>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Transcriber,
    Post,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKind::Transcriber => write!(f, "transcriber"),
            ComponentKind::Post => write!(f, "post-processor"),
        }
    }
}

/// Descriptive metadata for a registered component.
///
/// `options_schema` is JSON-Schema-ish: enough structure for a calling UI to
/// render an options form. The registry never validates option values against
/// it; keeping schema and implementation in sync is a documented convention.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDescriptor {
    pub id: String,
    pub label: String,
    pub kind: ComponentKind,
    pub description: String,
    pub options_schema: serde_json::Value,
}

impl ComponentDescriptor {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: ComponentKind,
        description: impl Into<String>,
        options_schema: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            description: description.into(),
            options_schema,
        }
    }
}

/// A descriptor paired with its callable implementation.
pub struct TranscriberBinding {
    pub descriptor: ComponentDescriptor,
    pub implementation: Box<dyn Transcriber>,
}

impl std::fmt::Debug for TranscriberBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriberBinding")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

pub struct PostBinding {
    pub descriptor: ComponentDescriptor,
    pub implementation: Box<dyn PostProcessor>,
}

impl std::fmt::Debug for PostBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostBinding")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// One entry of the discovery catalog. Implementations are not exposed.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
    pub description: String,
    pub options_schema: serde_json::Value,
}

impl From<&ComponentDescriptor> for CatalogEntry {
    fn from(d: &ComponentDescriptor) -> Self {
        Self {
            id: d.id.clone(),
            label: d.label.clone(),
            description: d.description.clone(),
            options_schema: d.options_schema.clone(),
        }
    }
}

/// Self-describing snapshot of registry contents, for a calling UI.
///
/// `schema_version` increments only on breaking shape changes; consumers
/// should tolerate unknown additional fields.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub schema_version: u32,
    pub transcribers: Vec<CatalogEntry>,
    pub postprocessors: Vec<CatalogEntry>,
}

pub const CATALOG_SCHEMA_VERSION: u32 = 1;

/// Holds named stage implementations in two independent namespaces.
///
/// Populated once at startup, append-only for the process lifetime.
/// Registration is not safe to interleave with lookups; finish registering
/// before the first lookup or `describe` call.
#[derive(Default)]
pub struct Registry {
    transcribers: BTreeMap<String, TranscriberBinding>,
    posts: BTreeMap<String, PostBinding>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_transcriber(
        &mut self,
        descriptor: ComponentDescriptor,
        implementation: Box<dyn Transcriber>,
    ) -> Result<()> {
        if self.transcribers.contains_key(&descriptor.id) {
            return Err(WordpipeError::DuplicateComponent {
                kind: ComponentKind::Transcriber,
                id: descriptor.id,
            });
        }
        self.transcribers.insert(
            descriptor.id.clone(),
            TranscriberBinding {
                descriptor,
                implementation,
            },
        );
        Ok(())
    }

    pub fn register_post(
        &mut self,
        descriptor: ComponentDescriptor,
        implementation: Box<dyn PostProcessor>,
    ) -> Result<()> {
        if self.posts.contains_key(&descriptor.id) {
            return Err(WordpipeError::DuplicateComponent {
                kind: ComponentKind::Post,
                id: descriptor.id,
            });
        }
        self.posts.insert(
            descriptor.id.clone(),
            PostBinding {
                descriptor,
                implementation,
            },
        );
        Ok(())
    }

    pub fn transcriber(&self, id: &str) -> Result<&TranscriberBinding> {
        self.transcribers
            .get(id)
            .ok_or_else(|| WordpipeError::UnknownComponent {
                kind: ComponentKind::Transcriber,
                id: id.to_string(),
            })
    }

    pub fn post(&self, id: &str) -> Result<&PostBinding> {
        self.posts
            .get(id)
            .ok_or_else(|| WordpipeError::UnknownComponent {
                kind: ComponentKind::Post,
                id: id.to_string(),
            })
    }

    /// Build the discovery snapshot. Entries are sorted by id within each
    /// kind, independent of registration order.
    pub fn describe(&self) -> Catalog {
        Catalog {
            schema_version: CATALOG_SCHEMA_VERSION,
            transcribers: self
                .transcribers
                .values()
                .map(|b| CatalogEntry::from(&b.descriptor))
                .collect(),
            postprocessors: self
                .posts
                .values()
                .map(|b| CatalogEntry::from(&b.descriptor))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NullTranscriber;

    impl Transcriber for NullTranscriber {
        fn transcribe(
            &self,
            _audio_path: &Path,
            _opts: &StageOpts,
            _ctx: &mut ExecutionContext,
        ) -> Result<StageOutput> {
            Ok(StageOutput::new(Vec::new()))
        }
    }

    struct IdentityPost;

    impl PostProcessor for IdentityPost {
        fn process(
            &self,
            words: Vec<Word>,
            _opts: &StageOpts,
            _ctx: &mut ExecutionContext,
        ) -> Result<StageOutput> {
            Ok(StageOutput::new(words))
        }
    }

    fn descriptor(id: &str, kind: ComponentKind) -> ComponentDescriptor {
        ComponentDescriptor::new(
            id,
            format!("{} (test)", id),
            kind,
            "test component",
            json!({"type": "object", "properties": {}, "additionalProperties": false}),
        )
    }

    #[test]
    fn test_duplicate_id_same_kind_fails() {
        let mut registry = Registry::new();
        registry
            .register_transcriber(
                descriptor("echo", ComponentKind::Transcriber),
                Box::new(NullTranscriber),
            )
            .unwrap();

        let err = registry
            .register_transcriber(
                descriptor("echo", ComponentKind::Transcriber),
                Box::new(NullTranscriber),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            WordpipeError::DuplicateComponent {
                kind: ComponentKind::Transcriber,
                ..
            }
        ));
    }

    #[test]
    fn test_same_id_across_kinds_is_fine() {
        let mut registry = Registry::new();
        registry
            .register_transcriber(
                descriptor("echo", ComponentKind::Transcriber),
                Box::new(NullTranscriber),
            )
            .unwrap();
        registry
            .register_post(descriptor("echo", ComponentKind::Post), Box::new(IdentityPost))
            .unwrap();

        assert!(registry.transcriber("echo").is_ok());
        assert!(registry.post("echo").is_ok());
    }

    #[test]
    fn test_lookup_unknown_names_id_and_kind() {
        let registry = Registry::new();
        let err = registry.post("nope").unwrap_err();
        assert_eq!(err.to_string(), "Unknown post-processor 'nope'");
    }

    #[test]
    fn test_describe_sorted_regardless_of_registration_order() {
        let mut registry = Registry::new();
        for id in ["zulu", "alpha", "mike"] {
            registry
                .register_transcriber(
                    descriptor(id, ComponentKind::Transcriber),
                    Box::new(NullTranscriber),
                )
                .unwrap();
        }

        let catalog = registry.describe();
        let ids: Vec<&str> = catalog.transcribers.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mike", "zulu"]);
        assert_eq!(catalog.schema_version, 1);
    }

    #[test]
    fn test_describe_empty_registry_is_valid() {
        let catalog = Registry::new().describe();
        assert!(catalog.transcribers.is_empty());
        assert!(catalog.postprocessors.is_empty());

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["postprocessors"], json!([]));
    }
}
