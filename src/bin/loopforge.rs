use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use loopforge::{
    GeneratorConfig, PublishConfig, TikTokCredentials, YouTubeCredentials, generate, interpret,
};

#[derive(Parser, Debug)]
#[command(name = "loopforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dry-run a prompt to its interpretation (JSON, no rendering).
    Interpret(InterpretArgs),
    /// Generate a loop video end to end (requires `ffmpeg` on PATH).
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct InterpretArgs {
    /// Prompt text describing the ASMR trigger.
    #[arg(long)]
    prompt: String,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Prompt text describing the ASMR trigger.
    #[arg(long)]
    prompt: String,

    /// Directory for per-run temporary workspaces.
    #[arg(long, default_value = "tmp")]
    temp_dir: PathBuf,

    /// Directory finalized assets are published into.
    #[arg(long, default_value = "public/generated")]
    out_dir: PathBuf,

    /// URL prefix corresponding to --out-dir.
    #[arg(long, default_value = "/generated")]
    base_url: String,

    /// Per-platform HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    publish_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.cmd {
        Command::Interpret(args) => cmd_interpret(args),
        Command::Generate(args) => cmd_generate(args).await,
    };
    std::process::exit(code);
}

fn cmd_interpret(args: InterpretArgs) -> i32 {
    if args.prompt.trim().is_empty() {
        eprintln!("error: prompt is required");
        return 2;
    }
    let interpretation = interpret(&args.prompt);
    match serde_json::to_string_pretty(&interpretation) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

async fn cmd_generate(args: GenerateArgs) -> i32 {
    let mut config = GeneratorConfig::new(args.temp_dir, args.out_dir, args.base_url);
    config.publish = publish_config_from_env(Duration::from_secs(args.publish_timeout_secs));

    match generate(&args.prompt, &config).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{json}");
                eprintln!("wrote {}", result.assets.video_url);
                0
            }
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
        // Validation errors are caller mistakes; everything else is a
        // pipeline failure.
        Err(e) if e.is_validation() => {
            eprintln!("error: {e}");
            2
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Credentials come from the environment at the binary boundary only; the
/// library takes them as explicit config.
fn publish_config_from_env(request_timeout: Duration) -> PublishConfig {
    PublishConfig {
        tiktok: std::env::var("LOOPFORGE_TIKTOK_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(|access_token| TikTokCredentials { access_token }),
        youtube: std::env::var("LOOPFORGE_YOUTUBE_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(|access_token| YouTubeCredentials { access_token }),
        request_timeout,
    }
}
