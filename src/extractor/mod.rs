//! 視覚信号抽出
//!
//! 2つの実装を `SignalExtractor` として同じ形で扱う:
//! - VisionExtractor: Google Cloud Vision API
//! - HeuristicExtractor: バイト統計による決定的なフォールバック
//!
//! どちらを使うかは起動時に設定から一度だけ決める。

mod heuristic;
mod vision;

pub use heuristic::HeuristicExtractor;
pub use vision::VisionExtractor;

use crate::config::{Config, ExtractorKind};
use crate::error::Result;
use async_trait::async_trait;
use landmark_guide_common::{AnalysisMethod, ImageAnnotations};
use std::time::Duration;
use thiserror::Error;

/// 抽出失敗（「ランドマーク0件」の成功とは区別する）
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Vision service unreachable: {0}")]
    Unreachable(String),

    #[error("Vision request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Vision API error {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Vision provider error {code}: {message}")]
    Provider { code: i32, message: String },

    #[error("Vision response parse error: {0}")]
    Parse(String),
}

/// 画像バイト列から視覚信号を抽出する
#[async_trait]
pub trait SignalExtractor: Send + Sync {
    /// ログ・診断用の名前
    fn name(&self) -> &'static str;

    async fn extract(&self, image: &[u8]) -> std::result::Result<ImageAnnotations, ExtractionError>;
}

/// 設定から抽出器を選ぶ
///
/// - heuristic: 常にヒューリスティック
/// - vision: APIキー必須
/// - auto: APIキーがあればVision、なければヒューリスティック
pub fn from_config(config: &Config, method: AnalysisMethod) -> Result<Box<dyn SignalExtractor>> {
    let extractor: Box<dyn SignalExtractor> = match config.extractor {
        ExtractorKind::Heuristic => Box::new(HeuristicExtractor::new(method)),
        ExtractorKind::Vision => Box::new(VisionExtractor::from_config(config)?),
        ExtractorKind::Auto => {
            if config.api_key().is_some() {
                Box::new(VisionExtractor::from_config(config)?)
            } else {
                tracing::info!("Vision APIキー未設定のためヒューリスティック抽出を使用 (method={})", method);
                Box::new(HeuristicExtractor::new(method))
            }
        }
    };

    tracing::debug!(extractor = extractor.name(), "signal extractor selected");
    Ok(extractor)
}
