use crate::error::{GuideError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 環境変数のAPIキー（設定ファイルより優先）
pub const API_KEY_ENV: &str = "GOOGLE_CLOUD_VISION_API_KEY";

pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// 信号抽出方式の選択
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// APIキーがあればVision、なければヒューリスティック
    #[default]
    Auto,
    Vision,
    Heuristic,
}

impl std::str::FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ExtractorKind::Auto),
            "vision" => Ok(ExtractorKind::Vision),
            "heuristic" | "offline" => Ok(ExtractorKind::Heuristic),
            _ => Err(format!("Unknown extractor: {}. Use auto, vision, or heuristic", s)),
        }
    }
}

impl std::fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractorKind::Auto => write!(f, "auto"),
            ExtractorKind::Vision => write!(f, "vision"),
            ExtractorKind::Heuristic => write!(f, "heuristic"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vision_api_key: Option<String>,
    pub vision_endpoint: String,
    pub language_hint: String,
    pub timeout_seconds: u64,
    pub max_image_bytes: usize,
    pub extractor: ExtractorKind,
    pub catalog_path: Option<PathBuf>,
    pub catalog_limit: usize,
    pub voice: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vision_api_key: None,
            vision_endpoint: DEFAULT_VISION_ENDPOINT.into(),
            language_hint: "en".into(),
            timeout_seconds: 10,
            max_image_bytes: 10 * 1024 * 1024,
            extractor: ExtractorKind::Auto,
            catalog_path: None,
            catalog_limit: 10,
            voice: "en-US-Standard-A".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GuideError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("landmark-guide").join("config.json"))
    }

    /// APIキー（環境変数を優先、空文字は未設定扱い）
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.vision_api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn get_api_key(&self) -> Result<String> {
        self.api_key().ok_or(GuideError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.vision_api_key = Some(key);
        self.save()
    }

    /// カタログファイルのパス（未設定なら data/catalog.json）
    pub fn catalog_path(&self) -> PathBuf {
        self.catalog_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/catalog.json"))
    }
}
