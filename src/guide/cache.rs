//! ガイドキャッシュ
//!
//! 同じサイト・言語・長さ・音声の組み合わせなら台本と音声を再生成しない。

use crate::error::Result;
use chrono::{DateTime, Utc};
use landmark_guide_common::NarrationOptions;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".guide-cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// キャッシュキー → エントリ
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub site_id: String,
    pub script: String,
    /// base64エンコード済み音声
    pub audio_base64: String,
    pub audio_mime_type: String,
    pub duration_seconds: u32,
    pub created_at: DateTime<Utc>,
}

impl GuideCache {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(folder: &Path) -> PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// 読み込み（存在しない・壊れている・バージョン違いは空扱い）
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %cache_path.display(), "キャッシュを開けません: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_reader::<_, GuideCache>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(cache) => {
                tracing::info!(found = cache.version, "キャッシュバージョン不一致、再生成します");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %cache_path.display(), "キャッシュ破損、無視します: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, folder: &Path) -> Result<()> {
        let file = File::create(Self::cache_path(folder))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（削除した場合 true）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if cache_path.exists() {
            std::fs::remove_file(cache_path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GuideCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// キャッシュキー: sha256(サイトID, 言語, 長さ, 音声)
pub fn cache_key(site_id: &str, options: &NarrationOptions, voice: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(site_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(options.language.code().as_bytes());
    hasher.update([0u8]);
    hasher.update([options.duration_minutes]);
    hasher.update([0u8]);
    hasher.update(voice.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_guide_common::Language;

    #[test]
    fn test_cache_key_is_stable() {
        let options = NarrationOptions::default();
        assert_eq!(
            cache_key("1", &options, "en-US-Standard-A"),
            cache_key("1", &options, "en-US-Standard-A")
        );
        assert_eq!(cache_key("1", &options, "v").len(), 64);
    }

    #[test]
    fn test_cache_key_varies_by_inputs() {
        let base = NarrationOptions::default();
        let spanish = NarrationOptions {
            language: Language::Spanish,
            ..base
        };
        let short = NarrationOptions {
            duration_minutes: 1,
            ..base
        };
        let key = cache_key("1", &base, "v");
        assert_ne!(key, cache_key("2", &base, "v"));
        assert_ne!(key, cache_key("1", &spanish, "v"));
        assert_ne!(key, cache_key("1", &short, "v"));
        assert_ne!(key, cache_key("1", &base, "w"));
    }

    #[test]
    fn test_default_cache_is_empty() {
        let cache = GuideCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }
}
