use clap::Parser;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "KUSSX_CONFIG";

#[derive(Debug, Parser)]
#[command(name = "kussx", version, about = "URL shortener HTTP server")]
pub struct CLI {
    /// Base JSON config document. Environment variables override its values.
    #[arg(long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,
}
