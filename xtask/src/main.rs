//! Workspace maintenance tasks: `cargo run -p viso-postfx-xtask -- <task>`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use viso_postfx::options::Options;

#[derive(Parser)]
#[command(about = "Build tasks for viso-postfx")]
struct Cli {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Write the options JSON schema consumed by settings UIs.
    Schema {
        /// Output file.
        #[arg(long, default_value = "assets/options.schema.json")]
        out: PathBuf,
    },
    /// Write a preset TOML containing every option at its default.
    Preset {
        /// Output file.
        #[arg(long, default_value = "assets/presets/default.toml")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().task {
        Task::Schema { out } => {
            let schema = serde_json::to_string_pretty(&Options::json_schema())
                .context("serializing options schema")?;
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&out, schema)
                .with_context(|| format!("writing {}", out.display()))?;
        }
        Task::Preset { out } => {
            Options::default()
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
        }
    }
    Ok(())
}
