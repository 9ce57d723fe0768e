use super::{ExtractionError, SignalExtractor};
use async_trait::async_trait;
use landmark_guide_common::{analyze_bytes, AnalysisMethod, ImageAnnotations};

/// バイト統計による構造特徴抽出（ネットワーク不要）
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor {
    method: AnalysisMethod,
}

impl HeuristicExtractor {
    pub fn new(method: AnalysisMethod) -> Self {
        Self { method }
    }

    /// 同期版（同じバイト列なら常に同じ結果）
    pub fn annotate(&self, image: &[u8]) -> Result<ImageAnnotations, ExtractionError> {
        if image.is_empty() {
            return Err(ExtractionError::InvalidImage("image is empty".into()));
        }

        let features = analyze_bytes(image, self.method);
        tracing::debug!(
            method = %self.method,
            byte_len = features.byte_len,
            present = ?features.present(),
            "heuristic features"
        );

        Ok(ImageAnnotations {
            features: Some(features),
            ..Default::default()
        })
    }
}

#[async_trait]
impl SignalExtractor for HeuristicExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn extract(&self, image: &[u8]) -> Result<ImageAnnotations, ExtractionError> {
        self.annotate(image)
    }
}
