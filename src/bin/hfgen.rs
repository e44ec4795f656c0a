//! CLI for hfgen - prompt-to-media via hosted inference.

use clap::{Args, Parser, Subcommand};
use hfgen::media::Placeholder;
use hfgen::{
    ClampTable, Credential, GeneratedMedia, Generation, GenerationRequest, MediaKind, ModelId,
    RequestDispatcher, Settings,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hfgen")]
#[command(about = "Generate images and videos from a text prompt via hosted inference")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Inference API token (demo mode when unset)
    #[arg(long, global = true, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from a text prompt
    Image(ImageArgs),

    /// Generate a video from a text prompt
    Video(VideoArgs),

    /// List supported models and their parameter limits
    Models,
}

#[derive(Args)]
struct CommonArgs {
    /// The text prompt describing the media
    prompt: String,

    /// Output file path (extension added from the media type when missing)
    #[arg(short, long)]
    output: PathBuf,

    /// Provider routing hint (e.g. novita, fal-ai, replicate)
    #[arg(short, long)]
    provider: Option<String>,

    /// Number of inference steps
    #[arg(long)]
    steps: Option<u32>,

    /// Width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Guidance scale
    #[arg(long)]
    guidance: Option<f32>,

    /// Seed for deterministic generation (-1 = random)
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<i64>,

    /// What the model should avoid
    #[arg(long)]
    negative_prompt: Option<String>,

    /// Write the placeholder instead of exiting when generation fails
    #[arg(long)]
    fallback_on_error: bool,

    /// Include a data URL of the media in JSON output
    #[arg(long)]
    inline: bool,
}

#[derive(Args)]
struct ImageArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Model id or short name
    #[arg(short, long, default_value = "FLUX.1-schnell")]
    model: String,
}

#[derive(Args)]
struct VideoArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Model id or short name
    #[arg(short, long, default_value = "LTX-Video")]
    model: String,

    /// Number of frames
    #[arg(long)]
    frames: Option<u32>,
}

/// Where the written media came from.
#[derive(Debug, Clone, Copy)]
enum Source {
    Live,
    Demo,
    Fallback,
}

impl Source {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Demo => "demo",
            Self::Fallback => "fallback",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` stands in for the platform secret store; load it before clap
    // resolves `env = ...` arguments.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Image(args) => {
            generate(
                MediaKind::Image,
                &args.model,
                args.common,
                None,
                cli.token,
                cli.json,
            )
            .await?;
        }
        Commands::Video(args) => {
            generate(
                MediaKind::Video,
                &args.model,
                args.common,
                args.frames,
                cli.token,
                cli.json,
            )
            .await?;
        }
        Commands::Models => {
            list_models(cli.json)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_model(raw: &str, expected: MediaKind) -> anyhow::Result<ModelId> {
    let model: ModelId = raw.parse()?;
    if model.kind() != expected {
        anyhow::bail!(
            "{model} is a {} model; use the `{}` subcommand",
            model.kind(),
            model.kind()
        );
    }
    Ok(model)
}

fn build_request(model: ModelId, args: &CommonArgs, frames: Option<u32>) -> GenerationRequest {
    let mut request = GenerationRequest::new(args.prompt.trim(), model);

    if let Some(provider) = &args.provider {
        request = request.with_provider(provider);
    }
    if let Some(steps) = args.steps {
        request = request.with_steps(steps);
    }
    request.parameters.width = args.width;
    request.parameters.height = args.height;
    if let Some(guidance) = args.guidance {
        request = request.with_guidance_scale(guidance);
    }
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }
    if let Some(neg) = &args.negative_prompt {
        request = request.with_negative_prompt(neg);
    }
    if let Some(frames) = frames {
        request = request.with_frames(frames);
    }

    request
}

async fn generate(
    kind: MediaKind,
    model: &str,
    args: CommonArgs,
    frames: Option<u32>,
    token: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    if args.prompt.trim().is_empty() {
        anyhow::bail!("prompt must not be empty");
    }
    let model = resolve_model(model, kind)?;

    let mut settings = Settings::from_env();
    if let Some(token) = token {
        settings.credential = Credential::new(token);
    }
    let placeholder = settings
        .placeholder_path
        .clone()
        .map(Placeholder::from_path)
        .unwrap_or_default();

    let dispatcher = RequestDispatcher::builder().settings(settings).build()?;
    let request = build_request(model, &args, frames);

    let (media, source) = match dispatcher.dispatch(&request).await {
        Ok(Generation::Live(media)) => (media, Source::Live),
        Ok(Generation::Demo(media)) => {
            eprintln!("Demo mode: set HF_TOKEN to generate with a real model.");
            (media, Source::Demo)
        }
        Err(e) if args.fallback_on_error => {
            tracing::error!(model = %model, "generation failed: {e}");
            eprintln!("Generation failed: {e} (showing placeholder)");
            (placeholder.load(model.as_str()), Source::Fallback)
        }
        Err(e) => return Err(e.into()),
    };

    let output = if args.output.extension().is_none() {
        args.output.with_extension(media.format.extension())
    } else {
        args.output.clone()
    };
    media.save(&output)?;

    report(&media, source, &output, args.inline, json_output)
}

fn report(
    media: &GeneratedMedia,
    source: Source,
    output: &std::path::Path,
    inline: bool,
    json_output: bool,
) -> anyhow::Result<()> {
    if json_output {
        let mut result = serde_json::json!({
            "type": media.kind().to_string(),
            "source": source.as_str(),
            "output": output.display().to_string(),
            "size_bytes": media.size(),
            "mime_type": media.mime_type(),
            "model": media.metadata.model,
            "provider": media.metadata.provider,
            "duration_ms": media.metadata.duration_ms,
            "clamped": media.metadata.clamped,
            "retried_without_provider": media.metadata.retried_without_provider,
        });
        if inline {
            result["data_url"] = serde_json::Value::String(media.to_data_url());
        }
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated {} ({}): {} ({} bytes, {})",
            media.kind(),
            source.as_str(),
            output.display(),
            media.size(),
            media.mime_type()
        );
        if !media.metadata.clamped.is_empty() {
            println!("Clamped to model limits: {}", media.metadata.clamped.join(", "));
        }
        if media.metadata.retried_without_provider {
            println!("Provider rejected the route; served without a provider hint.");
        }
        if let Some(duration) = media.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModelInfo {
        id: &'static str,
        short_name: &'static str,
        kind: MediaKind,
        limits: Vec<LimitInfo>,
    }

    #[derive(serde::Serialize)]
    struct LimitInfo {
        parameter: &'static str,
        max: f64,
    }

    let table = ClampTable::builtin();
    let models: Vec<ModelInfo> = ModelId::ALL
        .into_iter()
        .map(|model| ModelInfo {
            id: model.as_str(),
            short_name: model.short_name(),
            kind: model.kind(),
            limits: table
                .rules_for(model)
                .map(|rule| LimitInfo {
                    parameter: rule.parameter.as_str(),
                    max: rule.max_value,
                })
                .collect(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        for kind in [MediaKind::Image, MediaKind::Video] {
            println!("{}:", kind.to_string().to_uppercase());
            for m in models.iter().filter(|m| m.kind == kind) {
                println!("  {} ({})", m.id, m.short_name);
                let limits: Vec<String> = m
                    .limits
                    .iter()
                    .map(|l| format!("{} <= {}", l.parameter, l.max))
                    .collect();
                if !limits.is_empty() {
                    println!("    limits: {}", limits.join(", "));
                }
            }
            println!();
        }
    }

    Ok(())
}
