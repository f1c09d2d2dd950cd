use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use mediagen::config::GenerationConfig;
use mediagen::gen::{Orchestrator, DEFAULT_VIDEO_SECONDS};

/// Parse and validate a video duration (1-300 seconds)
fn parse_seconds(s: &str) -> Result<u32, String> {
    let seconds: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid duration", s))?;
    if !(1..=300).contains(&seconds) {
        return Err(format!(
            "Duration must be between 1 and 300 seconds, got {}",
            seconds
        ));
    }
    Ok(seconds)
}

#[derive(Parser)]
#[command(
    name = "mediagen",
    about = "AI media generation with deterministic placeholder fallback"
)]
struct Cli {
    /// Force placeholder-only behavior, bypassing all network calls
    #[arg(long)]
    mock: bool,

    /// Override the artifact output directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Override the provider API key
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate text for a prompt
    Text { prompt: String },
    /// Generate an image for a prompt
    Image { prompt: String },
    /// Generate a placeholder video for a prompt
    Video {
        prompt: String,
        /// Video duration in seconds
        #[arg(long, value_parser = parse_seconds, default_value_t = DEFAULT_VIDEO_SECONDS)]
        seconds: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    // Environment first, flags override.
    let mut config = GenerationConfig::from_env();
    if cli.mock {
        config.mock_enabled = true;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }

    let orchestrator = match Orchestrator::new() {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("Failed to initialize provider client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Text { prompt } => {
            let text = orchestrator.generate_text(&config, &prompt).await;
            println!("{}", text);
        }
        Command::Image { prompt } => match orchestrator.generate_image(&config, &prompt).await {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                eprintln!("Image generation failed: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Command::Video { prompt, seconds } => {
            match orchestrator.generate_video(&config, &prompt, seconds).await {
                Ok(path) => println!("{}", path.display()),
                Err(e) => {
                    eprintln!("Video generation failed: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
