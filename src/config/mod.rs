pub mod toml_config;

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sms-dispatch")]
#[command(about = "Dispatch SMS messages in bulk through the configured gateway")]
pub struct CliConfig {
    #[arg(long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Message body to send")]
    pub message: String,

    #[arg(long, conflicts_with_all = ["numbers", "file"], help = "Single recipient number")]
    pub to: Option<String>,

    #[arg(long, help = "Comma-separated recipient numbers")]
    pub numbers: Option<String>,

    #[arg(long, conflicts_with = "numbers", help = "CSV file with a recipient column")]
    pub file: Option<PathBuf>,

    #[arg(long, default_value = "10", help = "Credit balance for the demo account")]
    pub credits: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON-formatted logs")]
    pub log_json: bool,
}
