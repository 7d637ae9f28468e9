use providers::embedded::DEFAULT_MAX_IMAGE_PIXELS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub scan: ScanConfig,
    pub ignore: IgnoreConfig,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the per-root index files.
    pub index_dir: String,
    /// Path of the append-only manifest.
    pub manifest: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: ".".to_string(),
            manifest: "rummage_manifest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Glob patterns of paths that are neither walked nor classified.
    pub exclude: Vec<String>,
}

/// File-name rules that mark a file `Ignored` before any metadata is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    pub substrings: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        let strings =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            prefixes: strings(&["."]),
            suffixes: strings(&[".db", ".info", ".docx", ".exe", ".pdf", ".url"]),
            substrings: strings(&[".txt"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// External metadata tool; `None` or empty disables the fallback.
    pub exiftool: Option<String>,
    pub max_image_pixels: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            exiftool: Some("exiftool".to_string()),
            max_image_pixels: DEFAULT_MAX_IMAGE_PIXELS,
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("rummage").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("RUMMAGE").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
