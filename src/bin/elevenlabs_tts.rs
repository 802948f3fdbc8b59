//! elevenlabs-tts 命令行工具：列出语音、合成语音、管理语音配置
//!
//! Usage:
//!   elevenlabs-tts voices [--category <c>] [--search <text>]
//!   elevenlabs-tts speak <text> [--profile <name>] [--voice <id>] [-o <path>]
//!   elevenlabs-tts profiles list | add <name> --voice <id> | delete <name>
//!   elevenlabs-tts validate-key [--save]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use elevenlabs_custom_tts::config::{self, Settings};
use elevenlabs_custom_tts::flow::validate_api_key;
use elevenlabs_custom_tts::profile::{StoredProfile, TextNormalization};
use elevenlabs_custom_tts::services::{GenerateVoiceRequest, GetVoicesRequest};

#[derive(Parser)]
#[command(name = "elevenlabs-tts")]
#[command(about = "ElevenLabs text-to-speech with named voice profiles", long_about = None)]
struct Cli {
    /// Settings file (YAML or JSON)
    #[arg(short, long, env = "ELEVENLABS_CONFIG", default_value = "elevenlabs.yaml")]
    config: PathBuf,

    /// API key (overrides settings, keyring and ELEVENLABS_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available voices
    Voices {
        /// Exact category, e.g. premade, cloned, professional
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive text matched against name, category, description and labels
        #[arg(long)]
        search: Option<String>,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Synthesize text
    Speak(SpeakArgs),
    /// Manage voice profiles in the settings file
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Check the API key against the remote API
    ValidateKey {
        /// Store the key in the OS keyring once accepted
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
struct SpeakArgs {
    text: String,
    #[arg(long)]
    profile: Option<String>,
    #[arg(long)]
    voice: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    stability: Option<f32>,
    #[arg(long)]
    similarity_boost: Option<f32>,
    #[arg(long)]
    style: Option<f32>,
    #[arg(long)]
    speed: Option<f32>,
    #[arg(long)]
    speaker_boost: Option<bool>,
    #[arg(long, value_parser = parse_normalization)]
    normalization: Option<TextNormalization>,
    /// Write audio here; without it the response is printed with inline base64 audio
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ProfileCommands {
    List,
    Add {
        name: String,
        #[arg(long)]
        voice: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        stability: Option<f32>,
        #[arg(long)]
        similarity_boost: Option<f32>,
        #[arg(long)]
        style: Option<f32>,
        #[arg(long)]
        speed: Option<f32>,
        #[arg(long)]
        speaker_boost: Option<bool>,
        #[arg(long, value_parser = parse_normalization)]
        normalization: Option<TextNormalization>,
    },
    Delete {
        name: String,
    },
}

fn parse_normalization(s: &str) -> std::result::Result<TextNormalization, String> {
    TextNormalization::parse(s).ok_or_else(|| format!("expected on, off or auto, got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "warn,elevenlabs_custom_tts=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .with_env();
    if let Some(key) = cli.api_key.clone() {
        settings.api_key = Some(key);
    }
    settings.validate()?;

    match cli.command {
        Commands::Voices {
            category,
            search,
            json,
        } => cmd_voices(&settings, category, search, json).await,
        Commands::Speak(args) => cmd_speak(&settings, args).await,
        Commands::Profiles { command } => cmd_profiles(settings, &cli.config, command),
        Commands::ValidateKey { save } => cmd_validate_key(&settings, save).await,
    }
}

async fn cmd_voices(
    settings: &Settings,
    category: Option<String>,
    search: Option<String>,
    json: bool,
) -> Result<()> {
    let services = settings.services(settings.client()?);
    let response = services
        .get_voices(&GetVoicesRequest {
            voice_type: category,
            search_text: search,
        })
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    println!("Found {} voices", response.voices.len());
    for voice in &response.voices {
        println!("  - {} ({}) - {}", voice.name, voice.voice_id, voice.category);
    }
    Ok(())
}

async fn cmd_speak(settings: &Settings, args: SpeakArgs) -> Result<()> {
    let services = settings.services(settings.client()?);
    let request = GenerateVoiceRequest {
        text: args.text,
        voice_id: args.voice,
        voice_profile: args.profile,
        model_id: args.model,
        stability: args.stability,
        similarity_boost: args.similarity_boost,
        style: args.style,
        speed: args.speed,
        use_speaker_boost: args.speaker_boost,
        text_normalization: args.normalization,
        output_path: args.output,
        playback_device: None,
    };
    let response = services.generate_voice(&request).await?;
    match &response.output_path {
        Some(path) => println!("Wrote {} bytes to {}", response.audio_size, path.display()),
        None => println!("{}", serde_json::to_string_pretty(&response)?),
    }
    Ok(())
}

fn cmd_profiles(mut settings: Settings, path: &Path, command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::List => {
            println!("{}", settings.voice_profiles.summary());
            return Ok(());
        }
        ProfileCommands::Add {
            name,
            voice,
            model,
            stability,
            similarity_boost,
            style,
            speed,
            speaker_boost,
            normalization,
        } => {
            let mut profile = StoredProfile::for_voice(voice);
            if let Some(v) = model {
                profile = profile.with_model(v);
            }
            if let Some(v) = stability {
                profile = profile.with_stability(v);
            }
            if let Some(v) = similarity_boost {
                profile = profile.with_similarity_boost(v);
            }
            if let Some(v) = style {
                profile = profile.with_style(v);
            }
            if let Some(v) = speed {
                profile = profile.with_speed(v);
            }
            if let Some(v) = speaker_boost {
                profile = profile.with_speaker_boost(v);
            }
            if let Some(v) = normalization {
                profile = profile.with_text_normalization(v);
            }
            settings.voice_profiles.add(&name, profile)?;
            println!("Added profile '{}'", name.trim());
        }
        ProfileCommands::Delete { name } => {
            if !settings.voice_profiles.delete(&name) {
                bail!("no profile named '{}'", name);
            }
            println!("Deleted profile '{}'", name);
        }
    }
    // Keep the key out of the file unless it came from there.
    let mut on_disk = Settings::load_or_default(path)?;
    on_disk.voice_profiles = settings.voice_profiles;
    on_disk.save(path)?;
    Ok(())
}

async fn cmd_validate_key(settings: &Settings, save: bool) -> Result<()> {
    let client = settings.client()?;
    validate_api_key(&client).await?;
    println!("API key accepted");
    if save {
        let key = settings
            .api_key
            .clone()
            .or_else(config::lookup_api_key)
            .context("no API key to store")?;
        config::store_api_key(&key)?;
        println!("API key stored in keyring");
    }
    Ok(())
}
