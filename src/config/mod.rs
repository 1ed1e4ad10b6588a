use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::domain::abi::{DecodeOptions, FeltStringPolicy, DEFAULT_MAX_BYTE_ARRAY_WORDS};
use crate::modules::export::OutputFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct DecodeConfig {
    /// Read bare felts as packed byte arrays when the layout fits
    #[serde(default = "default_true")]
    pub felt_byte_arrays: bool,

    #[serde(default = "default_max_words")]
    pub max_byte_array_words: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub decode: DecodeConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Named ABI files, usable as `--abi @name`
    #[serde(default)]
    pub abis: BTreeMap<String, PathBuf>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            felt_byte_arrays: true,
            max_byte_array_words: DEFAULT_MAX_BYTE_ARRAY_WORDS,
        }
    }
}

impl DecodeConfig {
    pub fn to_options(&self) -> DecodeOptions {
        DecodeOptions {
            felt_strings: if self.felt_byte_arrays {
                FeltStringPolicy::Heuristic
            } else {
                FeltStringPolicy::Strict
            },
            max_byte_array_words: self.max_byte_array_words,
        }
    }
}

impl Config {
    /// Resolve an `--abi` argument: `@name` looks up the `[abis]` table,
    /// anything else is a path
    pub fn resolve_abi(&self, arg: &str) -> Result<PathBuf> {
        match arg.strip_prefix('@') {
            Some(name) => self
                .abis
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("no ABI named `{name}` in config")),
            None => Ok(PathBuf::from(arg)),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_words() -> usize {
    DEFAULT_MAX_BYTE_ARRAY_WORDS
}

/// Load the config file, falling back to defaults when it is absent or broken
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "ignoring config file");
            Config::default()
        }
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    parse(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("STRK_DECODE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("strk-decode").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("strk-decode").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "strk-decode", "strk-decode")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
