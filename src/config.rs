use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

const CONFIG_CANDIDATES: [&str; 3] = ["config.json", "config.yaml", "config.yml"];

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub year: Option<i32>,
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load_explicit(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        parse_config(path, &raw)
    }

    pub fn discover(dir: &Path) -> Self {
        let mut config = Self::default();

        for name in CONFIG_CANDIDATES {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))
                .and_then(|raw| parse_config(&path, &raw));

            match parsed {
                Ok(found) => {
                    info!(path = %path.display(), "loaded config");
                    config.overlay(found);
                }
                Err(err) => warn!(path = %path.display(), error = %err, "ignoring config file"),
            }
        }

        config
    }

    fn overlay(&mut self, other: FileConfig) {
        if other.year.is_some() {
            self.year = other.year;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
    }
}

fn parse_config(path: &Path, raw: &str) -> Result<FileConfig> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_str(raw).with_context(|| format!("failed to parse {}", path.display()))
    } else {
        serde_yaml::from_str(raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}

pub fn resolve_year(flag: Option<i32>, config: &FileConfig) -> Result<i32> {
    let Some(year) = flag.or(config.year) else {
        bail!("--year is required (or set it in config.json / config.yaml / EBAY_YEAR)");
    };
    if year <= 0 {
        bail!("year must be positive, got {year}");
    }
    Ok(year)
}

pub fn resolve_output_dir(flag: Option<PathBuf>, config: &FileConfig) -> PathBuf {
    flag.or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}
