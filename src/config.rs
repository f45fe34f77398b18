use crate::error::{Result, WordpipeError};
use crate::pipeline::{PipelineSpec, StageSpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User configuration: the default pipeline used when `run` is invoked
/// without an explicit spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub default_transcriber: String,
    pub default_post: Vec<String>,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_transcriber: "words_json".to_string(),
            default_post: vec!["clean_word_timings".to_string()],
            show_progress: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(id) = std::env::var("WORDPIPE_TRANSCRIBER") {
            config.default_transcriber = id;
        }
        if let Ok(list) = std::env::var("WORDPIPE_POST") {
            config.default_post = list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(flag) = std::env::var("WORDPIPE_PROGRESS") {
            if let Ok(value) = flag.parse() {
                config.show_progress = value;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_transcriber.is_empty() {
            return Err(WordpipeError::Config(
                "default_transcriber must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the default pipeline spec, all stages with empty opts.
    pub fn default_spec(&self) -> PipelineSpec {
        PipelineSpec {
            transcriber: StageSpec::new(&self.default_transcriber),
            post: self.default_post.iter().map(StageSpec::new).collect(),
        }
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wordpipe").join("config.toml"))
    }
}
