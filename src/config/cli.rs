use crate::config::ClientParams;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "obj-accel")]
#[command(about = "Object storage transfers through the accelerated client tier")]
pub struct CliConfig {
    /// Client parameter file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extra parameters as key=value, applied over the file
    #[arg(short, long = "param", value_delimiter = ',')]
    pub params: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check whether an object exists
    Exists { key: String },

    /// Upload a local file as an object
    Put { key: String, file: PathBuf },

    /// Download a byte range of an object into a local file
    Get {
        key: String,
        file: PathBuf,

        #[arg(long, default_value = "0")]
        offset: u64,

        #[arg(long)]
        len: usize,
    },
}

impl CliConfig {
    pub fn client_params(&self) -> Result<ClientParams> {
        let mut params = match &self.config {
            Some(path) => ClientParams::from_file(path)?,
            None => ClientParams::new(),
        };
        for assignment in &self.params {
            params.apply_override(assignment)?;
        }
        Ok(params)
    }
}
