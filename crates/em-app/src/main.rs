use anyhow::Result;
use clap::Parser;

pub mod cli;
pub mod pipeline;

use cli::Command;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Dispatcher
    match &cli.command {
        Command::BuildPalette { manifest, output } => {
            let build = pipeline::build_palette_command(manifest, output)?;
            if !build.skipped.is_empty() {
                log::warn!(
                    "{} entrée(s) ignorée(s) sur {}",
                    build.skipped.len(),
                    build.skipped.len() + build.palette.len()
                );
            }
            Ok(())
        }
        Command::Run { config } => {
            let config = em_core::config::load_config(config)?;
            pipeline::run(&config)
        }
        command => match command.to_config() {
            Some(config) => pipeline::run(&config),
            None => anyhow::bail!("Sous-commande sans pipeline de rendu"),
        },
    }
}
