//! `remux` command-line entry point.
//!
//! ```text
//! remux <file>                    print a JSON summary of the probed file
//! remux <input> <output> [crf]    write <input> to <output>, re-encoding only what the output needs
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remux_core::{
    load_config, validate_config, ConfigError, MediaFile, PlanSettings, RemuxConfig, Remuxer,
};

const USAGE: &str = "usage: remux <file> | remux <input> <output> [crf]";

#[tokio::main]
async fn main() -> Result<()> {
    // REMUX_LOG_FORMAT=json switches to structured log lines.
    let json = std::env::var("REMUX_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = resolve_config()?;
    let remuxer = Remuxer::from_config(config);

    match args.as_slice() {
        [path] => summarize(&remuxer, Path::new(path)).await,
        [input, output] => remux(&remuxer, Path::new(input), Path::new(output), None).await,
        [input, output, crf] => {
            let crf = crf
                .parse::<u8>()
                .with_context(|| format!("Invalid crf value: {}", crf))?;
            remux(&remuxer, Path::new(input), Path::new(output), Some(crf)).await
        }
        _ => bail!(USAGE),
    }
}

/// Loads `REMUX_CONFIG` (or `remux.toml`), falling back to defaults when absent.
fn resolve_config() -> Result<RemuxConfig> {
    let config_path = std::env::var("REMUX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("remux.toml"));

    let config = match load_config(&config_path) {
        Ok(config) => {
            info!("Loaded configuration from {:?}", config_path);
            config
        }
        Err(ConfigError::FileNotFound(_)) => RemuxConfig::default(),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load config from {:?}", config_path))
        }
    };
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn summarize(remuxer: &Remuxer, path: &Path) -> Result<()> {
    let file = remuxer
        .open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let json = match &file {
        MediaFile::Container(container) => {
            info!("{}", container);
            serde_json::to_string_pretty(container)?
        }
        MediaFile::Stream(stream) => serde_json::to_string_pretty(stream)?,
    };
    println!("{}", json);
    Ok(())
}

async fn remux(remuxer: &Remuxer, input: &Path, output: &Path, crf: Option<u8>) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping encoder");
            on_signal.cancel();
        }
    });

    let settings = PlanSettings { crf };
    let file = remuxer
        .open(input)
        .await
        .with_context(|| format!("Failed to open {}", input.display()))?;

    let outcome = match file {
        MediaFile::Container(mut container) => {
            remuxer
                .save_container_as_with_cancel(&mut container, output, settings, &cancel)
                .await
        }
        MediaFile::Stream(mut stream) => {
            remuxer
                .save_stream_as_with_cancel(&mut stream, output, settings, &cancel)
                .await
        }
    }
    .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote {} (replaced existing: {})",
        outcome.path.display(),
        outcome.replaced_existing()
    );
    Ok(())
}
