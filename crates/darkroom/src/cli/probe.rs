//! The `darkroom probe` command: show what the engine reports about a file.

use clap::Args;
use darkroom_core::{Config, PhotoLoader};
use std::path::PathBuf;

/// Arguments for the `probe` command.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Image file to inspect
    #[arg(required = true)]
    pub file: PathBuf,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Execute the probe command.
pub async fn execute(args: ProbeArgs, config: &Config) -> anyhow::Result<()> {
    if !args.file.is_file() {
        anyhow::bail!("Not a file: {:?}", args.file);
    }

    let loader = PhotoLoader::from_config(config);
    let info = loader.probe(&args.file).await?;

    let json = if args.compact {
        serde_json::to_string(&info)?
    } else {
        serde_json::to_string_pretty(&info)?
    };
    println!("{json}");
    Ok(())
}
