use angle_studio::{
    logger::{self, LogLevel, LoggerConfig},
    AspectRatio, BatchRequest, ImageClient, ImagePayload, QualityTier, StudioConfig,
};
use std::env;

const USAGE: &str = "usage:
  angle-studio generate <prompt> [--aspect 1:1|3:4|16:9|4:3|9:16] [--quality standard|high|ultra] [--upscale]
  angle-studio angles <image-path> [instruction] [--aspect ...] [--upscale]";

struct Args {
    command: String,
    positional: Vec<String>,
    aspect_ratio: AspectRatio,
    quality: QualityTier,
    upscale: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut raw = env::args().skip(1);
    let command = raw.next().ok_or_else(|| USAGE.to_string())?;

    let mut args = Args {
        command,
        positional: Vec::new(),
        aspect_ratio: AspectRatio::default(),
        quality: QualityTier::High,
        upscale: false,
    };

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--aspect" => {
                let value = raw.next().ok_or("--aspect needs a value")?;
                args.aspect_ratio = AspectRatio::from_ratio(&value)
                    .ok_or_else(|| format!("unknown aspect ratio: {}", value))?;
            }
            "--quality" => {
                let value = raw.next().ok_or("--quality needs a value")?;
                args.quality = match value.as_str() {
                    "standard" => QualityTier::Standard,
                    "high" => QualityTier::High,
                    "ultra" => QualityTier::Ultra,
                    other => return Err(format!("unknown quality tier: {}", other)),
                };
            }
            "--upscale" => args.upscale = true,
            _ => args.positional.push(arg),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = env::var("RUST_LOG")
        .ok()
        .and_then(|value| LogLevel::parse(&value))
        .unwrap_or(LogLevel::Info);
    logger::init_with_config(LoggerConfig::development().with_level(level))?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let config = StudioConfig::from_env();
    logger::log_config_info(&config);

    log::info!("🖼️  Available image models:");
    for model in ImageClient::supported_models() {
        log::info!("  {} - {} ({:?})", model.id, model.name, model.role);
    }

    let mut studio = angle_studio::studio_from_config(&config)?;
    if !studio.init().await? && !studio.authorize().await? {
        log::error!("❌ No API key selected; set GEMINI_API_KEY and retry");
        return Ok(());
    }

    let request = match args.command.as_str() {
        "generate" => BatchRequest::generate(args.positional.join(" "))
            .with_quality(args.quality)
            .with_aspect_ratio(args.aspect_ratio),
        "angles" => {
            let path = args.positional.first().ok_or(USAGE)?;
            let image = ImagePayload::from_file(path).await?;
            let mut request =
                BatchRequest::edit_by_angle(image).with_aspect_ratio(args.aspect_ratio);
            let instruction = args.positional[1..].join(" ");
            if !instruction.trim().is_empty() {
                request = request.with_instruction(instruction);
            }
            request
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    match studio.submit(&request).await {
        Ok(results) => log::info!("✅ Received {} image(s)", results.len()),
        Err(e) => {
            if e.is_authorization() {
                log::warn!("💡 The selected key lacks access to this model; select a billed key");
            }
            return Err(e.into());
        }
    }

    if args.upscale {
        if let Some(first) = studio.results().first().map(|a| a.id.clone()) {
            if studio.can_upscale(&first) {
                let upscaled = studio.upscale(&first).await?;
                log::info!("🔍 Upscaled {} -> {}", first, upscaled.id);
            }
        }
    }

    for artifact in studio.results().iter() {
        let path = artifact.save_to(&config.output_dir).await?;
        log::info!(
            "💾 {} [{}] saved to {}",
            artifact.source_prompt,
            artifact.producing_model,
            path.display()
        );
    }

    Ok(())
}
