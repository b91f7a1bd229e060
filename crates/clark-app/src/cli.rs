//! CLI argument definitions for the Clark server.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Clark - a voice assistant backend with email and calendar tools.
#[derive(Parser, Debug)]
#[command(name = "clark", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Directory where synthesized audio is written and served from.
    #[arg(short = 'a', long = "audio-dir")]
    pub audio_dir: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CLARK_CONFIG env var > ~/.clark/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.config_path_from(std::env::var("CLARK_CONFIG").ok())
    }

    fn config_path_from(&self, env_value: Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env_value.filter(|p| !p.is_empty()) {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > CLARK_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.port_from(std::env::var("CLARK_PORT").ok(), config_port)
    }

    fn port_from(&self, env_value: Option<String>, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Some(p) = env_value.and_then(|v| v.parse::<u16>().ok()) {
            return p;
        }
        config_port
    }

    /// --log-level override, if given.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// --audio-dir override, if given.
    pub fn resolve_audio_dir(&self) -> Option<String> {
        self.audio_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".clark").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".clark").join("config.toml");
    }
    PathBuf::from("config.toml")
}
