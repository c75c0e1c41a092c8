//! Parses config file
use std::{fs::OpenOptions, io::Read, path::Path};

use eyre::eyre;
use serde::Deserialize;
use slp::{
    constants::{DEFAULT_PLAYER, DEFAULT_VERSION},
    Palette, RenderOptions, SlpEncoderOptions,
};

/// Every table and field can be left out.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub encoder: EncoderConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EncoderConfig {
    /// Written into the 4 byte version field
    pub version: String,
    /// Written into the 24 byte comment field
    pub comment: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            comment: String::new(),
        }
    }
}

impl EncoderConfig {
    pub fn to_options(&self, palette: Option<Palette>) -> SlpEncoderOptions {
        SlpEncoderOptions {
            palette,
            version: self.version.clone(),
            comment: self.comment.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// 1 to 8
    pub player: u8,
    pub draw_outline: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            player: DEFAULT_PLAYER,
            draw_outline: false,
        }
    }
}

impl RenderConfig {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions {
            player: Some(self.player),
            draw_outline: self.draw_outline,
        }
    }
}

pub fn parse_config_from_str(s: &str) -> eyre::Result<Config> {
    toml::from_str(s).map_err(|op| eyre!("Cannot parse config: {}", op))
}

pub fn parse_config_from_file(path: &Path) -> eyre::Result<Config> {
    let mut file = OpenOptions::new().read(true).open(path.as_os_str())?;
    let mut buffer = String::new();

    file.read_to_string(&mut buffer)?;

    parse_config_from_str(&buffer)
}
