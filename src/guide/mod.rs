//! ガイド生成
//!
//! 認識 → ナレーション台本 → 音声 を順に実行する。
//! 台本・音声の失敗は認識結果を変えない（エラーとして併記するだけ）。

pub mod cache;

pub use cache::{cache_key, CacheEntry, GuideCache};

use crate::audio::{AudioClip, SpeechSynthesizer};
use crate::recognizer::Recognizer;
use base64::Engine;
use chrono::Utc;
use landmark_guide_common::{generate_script, CulturalSite, MatchResult, NarrationOptions};
use std::path::PathBuf;
use std::sync::Arc;

/// ガイド1件分の結果
#[derive(Debug, Clone)]
pub struct Tour {
    pub recognition: MatchResult,
    pub script: Option<String>,
    pub audio: Option<AudioClip>,
    /// キャッシュから取得した場合 true
    pub cached: bool,
    /// 台本・音声生成のエラー
    pub error: Option<String>,
}

impl Tour {
    fn recognition_only(recognition: MatchResult) -> Self {
        Self {
            recognition,
            script: None,
            audio: None,
            cached: false,
            error: None,
        }
    }
}

pub struct Guide {
    recognizer: Arc<Recognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    voice: String,
    cache_dir: Option<PathBuf>,
}

impl Guide {
    pub fn new(
        recognizer: Arc<Recognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            recognizer,
            synthesizer,
            voice: voice.into(),
            cache_dir: None,
        }
    }

    /// キャッシュフォルダを指定
    pub fn with_cache(mut self, folder: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(folder.into());
        self
    }

    pub async fn run(&self, image: &[u8], options: &NarrationOptions) -> Tour {
        let recognition = self.recognizer.recognize(image).await;

        let site = match (&recognition.site, recognition.success) {
            (Some(site), true) => site.clone(),
            _ => return Tour::recognition_only(recognition),
        };

        let mut tour = Tour::recognition_only(recognition);
        self.narrate(&site, options, &mut tour).await;
        tour
    }

    async fn narrate(&self, site: &CulturalSite, options: &NarrationOptions, tour: &mut Tour) {
        let key = cache_key(&site.id, options, &self.voice);

        if let Some(folder) = &self.cache_dir {
            let cache = GuideCache::load(folder);
            if let Some(entry) = cache.get(&key) {
                if let Some(audio) = decode_cached_audio(entry) {
                    tracing::info!(site = %site.name, "guide cache hit");
                    tour.script = Some(entry.script.clone());
                    tour.audio = Some(audio);
                    tour.cached = true;
                    return;
                }
            }
        }

        // 1. 台本
        let script = match generate_script(site, options) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(site = %site.name, "narration failed: {}", e);
                tour.error = Some(e.to_string());
                return;
            }
        };
        tour.script = Some(script.clone());

        // 2. 音声
        let audio = match self
            .synthesizer
            .synthesize(&script, &self.voice, options.language)
            .await
        {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(site = %site.name, "audio synthesis failed: {}", e);
                tour.error = Some(e.to_string());
                return;
            }
        };

        if let Some(folder) = &self.cache_dir {
            let mut cache = GuideCache::load(folder);
            cache.insert(
                key,
                CacheEntry {
                    site_id: site.id.clone(),
                    script,
                    audio_base64: base64::engine::general_purpose::STANDARD.encode(&audio.data),
                    audio_mime_type: audio.mime_type.clone(),
                    duration_seconds: audio.duration_seconds,
                    created_at: Utc::now(),
                },
            );
            if let Err(e) = cache.save(folder) {
                tracing::warn!(folder = %folder.display(), "guide cache save failed: {}", e);
            }
        }

        tour.audio = Some(audio);
    }
}

fn decode_cached_audio(entry: &CacheEntry) -> Option<AudioClip> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(entry.audio_base64.as_bytes())
        .ok()?;
    Some(AudioClip {
        mime_type: entry.audio_mime_type.clone(),
        data,
        duration_seconds: entry.duration_seconds,
    })
}
