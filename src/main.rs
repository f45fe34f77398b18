use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wordpipe::{builtin_registry, Config, ExecutionContext, PipelineSpec};

#[derive(Debug, Parser)]
#[command(name = "wordpipe")]
#[command(version, about = "Composable transcription pipelines")]
#[command(
    long_about = "Run a transcriber plus an ordered list of word-timing post-processors \
over an audio file. Machine-readable JSON goes to stdout; logs and PROGRESS:NN \
framing go to stderr."
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available transcribers and post-processors with option schemas
    List,

    /// Run a pipeline spec on an audio file
    Run {
        /// Path to input audio file
        #[arg(long)]
        audio: PathBuf,

        /// Pipeline spec as a JSON string
        #[arg(long, conflicts_with = "spec_file")]
        spec_json: Option<String>,

        /// Path to a pipeline spec JSON file
        #[arg(long)]
        spec_file: Option<PathBuf>,

        /// Emit {words, meta} instead of just the word list
        #[arg(long)]
        emit_meta: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    // stdout is reserved for machine-readable JSON
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Load the pipeline spec: explicit JSON or file, else the config default.
fn read_spec(
    spec_json: Option<&str>,
    spec_file: Option<&PathBuf>,
    config: &Config,
) -> Result<PipelineSpec> {
    if let Some(json) = spec_json {
        return serde_json::from_str(json).context("Failed to parse --spec-json");
    }
    if let Some(path) = spec_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read spec file {}", path.display()))?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse spec file {}", path.display()));
    }

    info!(
        "No spec given, using default pipeline: {} + {:?}",
        config.default_transcriber, config.default_post
    );
    Ok(config.default_spec())
}


fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let registry = builtin_registry().context("Failed to build component registry")?;

    match cli.command {
        Command::List => {
            let catalog = registry.describe();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Command::Run {
            audio,
            spec_json,
            spec_file,
            emit_meta,
        } => {
            if !audio.exists() {
                anyhow::bail!("Audio file not found: {}", audio.display());
            }

            let config = Config::load().context("Failed to load configuration")?;
            config.validate().context("Configuration validation failed")?;

            let spec = read_spec(spec_json.as_deref(), spec_file.as_ref(), &config)?;

            // PROGRESS:NN lines on stderr, easy for a host process to parse.
            let mut ctx = ExecutionContext::new();
            if config.show_progress {
                ctx = ctx.with_progress(Box::new(|pct: u8| eprintln!("PROGRESS:{pct}")));
            }

            let result = wordpipe::run_pipeline(&registry, &audio, &spec, &mut ctx)?;

            // Machine-readable JSON ONLY on stdout.
            let output = if emit_meta {
                serde_json::to_value(&result)?
            } else {
                let language = result
                    .meta
                    .transcriber
                    .meta
                    .get("language")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                serde_json::json!({
                    "words": result.words,
                    "language": language,
                })
            };
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    Ok(())
}
