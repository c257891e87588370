// Monster TTS Command Line Interface
// Drives the TTS.Monster integration the way a host automation platform would

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use monster_tts::{RequestTtsEffect, TtsMonsterConfig, TtsMonsterIntegration, Voice};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "monster")]
#[command(about = "TTS.Monster speech synthesis from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, TOML or YAML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// API key (overrides config file and TTS_MONSTER_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Working directory for generated audio
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available voices
    Voices {
        /// Only list custom voices
        #[arg(long)]
        custom_only: bool,
    },

    /// Show account usage and subscription status
    Status,

    /// Synthesize text into a WAV file
    Speak {
        /// Voice id to synthesize with
        #[arg(long)]
        voice_id: String,

        /// Text to synthesize
        #[arg(long)]
        text: String,

        /// Return the token immediately and await the job by token afterwards
        #[arg(long)]
        no_wait: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let integration = TtsMonsterIntegration::new(config).context("Invalid configuration")?;

    match cli.command {
        Commands::Voices { custom_only } => list_voices(&integration, custom_only).await,
        Commands::Status => show_status(&integration).await,
        Commands::Speak { voice_id, text, no_wait } => {
            speak(&integration, voice_id, text, !no_wait).await
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<TtsMonsterConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = TtsMonsterConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env();
            config
        }
        None => TtsMonsterConfig::from_env(),
    };

    if let Some(api_key) = &cli.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    debug!("Using endpoint {}", config.endpoint);
    Ok(config)
}

async fn list_voices(integration: &TtsMonsterIntegration, custom_only: bool) -> anyhow::Result<()> {
    let show_premade = !custom_only && integration.parameters().show_premade_voices;
    let response = integration.get_voices(show_premade).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.error {
        bail!("Unable to fetch voices");
    }
    Ok(())
}

async fn show_status(integration: &TtsMonsterIntegration) -> anyhow::Result<()> {
    let response = integration.get_subscription_data().await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.error {
        bail!("Unable to fetch subscription data");
    }
    Ok(())
}

async fn speak(
    integration: &TtsMonsterIntegration,
    voice_id: String,
    text: String,
    wait_for_generation: bool,
) -> anyhow::Result<()> {
    let effect = RequestTtsEffect {
        voice: Voice::new(voice_id, String::new()),
        text,
        wait_for_generation,
    };

    let errors = integration.validate_effect(&effect);
    if !errors.is_empty() {
        bail!(errors.join("\n"));
    }

    let outputs = match integration.request_tts(&effect).await {
        Some(outputs) => outputs,
        None => bail!("TTS request failed"),
    };
    println!("{}", outputs.tts_token);

    if !wait_for_generation {
        info!("Awaiting job {} by token", outputs.tts_token);
    }

    // The process must not exit while a background job is still streaming
    match integration.await_job(&outputs.tts_token).await {
        Some(Ok(Some(output))) => {
            println!("✅ Saved {}", output.file_name.display());
            integration.acknowledge_job(&outputs.tts_token);
            Ok(())
        }
        Some(Ok(None)) => bail!("Synthesis produced no audio"),
        Some(Err(e)) => bail!("Synthesis failed: {}", e),
        None => bail!("Unknown TTS token {}", outputs.tts_token),
    }
}
