use ebmlcast_media::StreamConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Segmenting options shared by `split` and `listen`.
    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub listen: ListenConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port encoders connect to (default: 9001)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    9001
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory segment files are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Bytes read from the input per write (default: 64 KiB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_chunk_size() -> usize {
    64 * 1024
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            chunk_size: default_chunk_size(),
        }
    }
}
