use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uartdeck_core::{FrameSize, LineSettings, Parity, StopBits};

/// One channel used by the demo and, optionally, the host port behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub channel: u8,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub settings: LineSettings,
}

impl Binding {
    fn simulated(channel: u8, settings: LineSettings) -> Self {
        Self {
            channel,
            port: None,
            settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub console: Binding,
    pub link_out: Binding,
    pub link_in: Binding,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            console: Binding::simulated(
                0,
                LineSettings::new(12_345, FrameSize::Eight, Parity::Odd, StopBits::Two),
            ),
            link_out: Binding::simulated(2, LineSettings::default()),
            link_in: Binding::simulated(3, LineSettings::default()),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uartdeck").join("config.json"))
    }

    /// Reads `path` when given; otherwise the default location if a file
    /// exists there, else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn bindings(&self) -> [&Binding; 3] {
        [&self.console, &self.link_out, &self.link_in]
    }
}
