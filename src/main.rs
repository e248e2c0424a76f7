use std::{env, process, sync::Arc};

use anyhow::Context;
use gd_explorer::{explore, service, ExplorerConfig, Request};
use log::info;
use tokio::{io, signal};
use tokio_util::sync::CancellationToken;

/// Path of an optional JSON file overriding [`ExplorerConfig`] defaults.
const CONFIG_VAR: &str = "GD_EXPLORER_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = load_config()?;

    match args.get(1).map(String::as_str) {
        None | Some("serve") => serve(config).await,
        Some("demo") => demo(&config, args.get(2).map(String::as_str).unwrap_or("slope")),
        Some(mode) => {
            eprintln!("Unknown mode: {mode}.");
            eprintln!("Usage: {} [serve | demo <slope|line>]", args[0]);
            process::exit(1);
        }
    }
}

fn load_config() -> anyhow::Result<ExplorerConfig> {
    match env::var(CONFIG_VAR) {
        Ok(path) => {
            info!("loading config from {path}");
            ExplorerConfig::from_path(&path)
                .with_context(|| format!("failed to load config {path}"))
        }
        Err(env::VarError::NotPresent) => Ok(ExplorerConfig::default()),
        Err(e) => Err(e).with_context(|| format!("invalid {CONFIG_VAR}")),
    }
}

async fn serve(config: ExplorerConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    let token = shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("received SIGINT");
            token.cancel();
        }
    });

    service::serve(io::stdin(), io::stdout(), Arc::new(config), shutdown).await?;
    Ok(())
}

fn demo(config: &ExplorerConfig, model: &str) -> anyhow::Result<()> {
    let request = match model {
        "slope" => Request::slope_demo(),
        "line" => Request::line_demo(),
        other => anyhow::bail!("unknown demo model {other:?}, expected slope or line"),
    };

    let report = explore(&request, config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
