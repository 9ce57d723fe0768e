//! フォルダ一括認識

use crate::input::read_image_file;
use crate::recognizer::Recognizer;
use crate::scanner::ImageInfo;
use landmark_guide_common::{Diagnostics, MatchResult, Outcome};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub file_name: String,
    pub taken_at: Option<String>,
    pub result: MatchResult,
}

/// 画像を順に認識する（1枚ごとに `on_done` を呼ぶ）
pub async fn recognize_images<F>(
    recognizer: &Recognizer,
    images: &[ImageInfo],
    mut on_done: F,
) -> Vec<BatchEntry>
where
    F: FnMut(&BatchEntry),
{
    let mut entries = Vec::with_capacity(images.len());

    for image in images {
        let result = match read_image_file(&image.path) {
            Ok(bytes) => recognizer.recognize(&bytes).await,
            Err(e) => {
                tracing::warn!(file = %image.file_name, "読み込み失敗: {}", e);
                MatchResult::unmatched(
                    Outcome::ExtractionFailed,
                    format!("Could not read {}: {}", image.file_name, e),
                    Diagnostics {
                        error: Some(e.to_string()),
                        ..Default::default()
                    },
                )
            }
        };

        let entry = BatchEntry {
            file_name: image.file_name.clone(),
            taken_at: image.taken_at.clone(),
            result,
        };
        on_done(&entry);
        entries.push(entry);
    }

    entries
}

/// 認識できた件数
pub fn matched_count(entries: &[BatchEntry]) -> usize {
    entries.iter().filter(|e| e.result.success).count()
}
