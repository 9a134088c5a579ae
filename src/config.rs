// src/config.rs
//
// loading config.toml

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::backdrop::Backdrop;
use crate::error::Error;
use crate::types::RenderParameters;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub font: FontConfig,
    pub backdrop: BackdropConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub device_pixel_ratio: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 960, height: 600, device_pixel_ratio: 1.0 }
    }
}

/// Starting values for the live parameters.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub text: String,
    pub weight: f32,
    pub dither: f32,
    pub size: f32,
    pub spacing: u32,
    pub leading: f32,
    pub mouse_control: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let p = RenderParameters::default();
        Self {
            text: p.text,
            weight: p.weight,
            dither: p.dither,
            size: p.size,
            spacing: p.spacing,
            leading: p.leading,
            mouse_control: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub fallback: String,
    pub path: Option<PathBuf>, // extra font file loaded before the system fonts are searched
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { family: "Roboto Flex".into(), fallback: "sans-serif".into(), path: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackdropConfig {
    pub mode: Backdrop,
}

impl Config {
    /// Resolve the config: explicit path, then next to the executable, then the
    /// working directory, then built-in defaults. Returns where it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), Error> {
        if let Some(path) = explicit {
            return Ok((Self::load_from_path(path)?, Some(path.to_path_buf())));
        }

        let candidates = [Self::exe_dir_path(), Some(PathBuf::from(CONFIG_FILE))];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                let config = Self::load_from_path(&path)?;
                return Ok((config, Some(path)));
            }
        }

        info!("no {CONFIG_FILE} found, using defaults");
        Ok((Self::default(), None))
    }

    fn exe_dir_path() -> Option<PathBuf> {
        let exe_path = std::env::current_exe().ok()?;
        Some(exe_path.parent()?.join(CONFIG_FILE))
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn initial_parameters(&self) -> RenderParameters {
        RenderParameters {
            text: self.render.text.clone(),
            weight: self.render.weight,
            dither: self.render.dither,
            size: self.render.size,
            spacing: self.render.spacing,
            leading: self.render.leading,
        }
    }
}
