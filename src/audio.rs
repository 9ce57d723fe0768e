//! 音声合成
//!
//! 本番のTTSは外部サービス差し替え前提。ここではスタブ実装のみ持つ。

use crate::error::{GuideError, Result};
use async_trait::async_trait;
use base64::Engine;
use landmark_guide_common::Language;

/// 読み上げ速度（語/分）
pub const WORDS_PER_MINUTE: f64 = 150.0;

const AUDIO_MIME_TYPE: &str = "audio/wav";

/// 合成済み音声
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub mime_type: String,
    pub data: Vec<u8>,
    pub duration_seconds: u32,
}

impl AudioClip {
    /// ブラウザにそのまま渡せる `data:audio/wav;base64,...`
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// 台本から音声を生成する
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, script: &str, voice: &str, language: Language) -> Result<AudioClip>;
}

/// 再生時間の見積もり（秒、切り上げ）
pub fn estimate_duration_seconds(script: &str) -> u32 {
    let words = script.split_whitespace().count() as f64;
    (words / WORDS_PER_MINUTE * 60.0).ceil() as u32
}

/// 音声の代わりに識別用のバイト列を返すスタブ
#[derive(Debug, Clone, Copy, Default)]
pub struct StubSynthesizer;

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    async fn synthesize(&self, script: &str, voice: &str, language: Language) -> Result<AudioClip> {
        if script.trim().is_empty() {
            return Err(GuideError::Synthesis("台本が空です".into()));
        }

        let head: String = script.chars().take(50).collect();
        let data = format!("MOCK_AUDIO_DATA_{}_{}_{}", language, voice, head).into_bytes();
        let duration_seconds = estimate_duration_seconds(script);

        tracing::debug!(%language, voice, duration_seconds, bytes = data.len(), "stub audio generated");

        Ok(AudioClip {
            mime_type: AUDIO_MIME_TYPE.into(),
            data,
            duration_seconds,
        })
    }
}
