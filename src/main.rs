use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

mod cli;
mod config;
mod errors;
mod linker;
mod llm;
mod pace;
mod rater;
#[cfg(test)]
mod tests;
mod vault;

use config::Config;
use linker::LinkerPipeline;
use llm::OllamaClient;
use rater::RatePipeline;

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env().context("invalid configuration")?;
    let vault_path = PathBuf::from(&config.vault_directory);
    let client =
        OllamaClient::new(config.ollama.clone()).context("failed to build ollama client")?;

    if args.mode.note_linker {
        let mut pipeline = LinkerPipeline::new(&client, config.linker.clone());
        let outcome = pipeline.run(&vault_path)?;
        log::debug!("linker stopped in state {:?}", pipeline.state());
        println!("{outcome}");
    } else if args.mode.note_quality {
        let outcome = RatePipeline::new(&client).run(&vault_path);
        println!("{outcome}");
    }

    Ok(())
}
