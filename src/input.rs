//! 入力アダプタ
//!
//! Webクライアントが送るデータURL、JSONリクエスト本文、アップロードされた
//! 画像ファイルを、認識コアに渡すバイト列へ変換する。

use crate::error::{GuideError, Result};
use base64::Engine;
use landmark_guide_common::AnalysisMethod;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

lazy_static! {
    /// `data:image/jpeg;base64,` 形式のヘッダ
    static ref DATA_URL_HEADER: Regex = Regex::new(r"^data:([^;,]+)?(;base64)?,").unwrap();
}

/// デコード済み画像
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// データURLに書かれていたMIMEタイプ（裸のbase64なら None）
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// 認識リクエスト本文
///
/// `{"image": "data:image/jpeg;base64,...", "method": "secondary"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeRequest {
    pub image: String,
    #[serde(default)]
    pub method: AnalysisMethod,
}

impl RecognizeRequest {
    pub fn decode(&self) -> Result<DecodedImage> {
        decode_data_url(&self.image)
    }
}

/// データURL（または裸のbase64）をデコード
pub fn decode_data_url(input: &str) -> Result<DecodedImage> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GuideError::InvalidImageData("画像データが空です".into()));
    }

    let (mime_type, payload) = match DATA_URL_HEADER.captures(trimmed) {
        Some(caps) => {
            if caps.get(2).is_none() {
                return Err(GuideError::InvalidImageData(
                    "base64以外のデータURLには対応していません".into(),
                ));
            }
            let header_len = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let mime = caps.get(1).map(|m| m.as_str().to_string());
            (mime, &trimmed[header_len..])
        }
        None => (None, trimmed),
    };

    // 改行入りのbase64も受け付ける
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| GuideError::InvalidImageData(format!("base64デコード失敗: {}", e)))?;

    if bytes.is_empty() {
        return Err(GuideError::InvalidImageData("画像データが空です".into()));
    }

    Ok(DecodedImage { mime_type, bytes })
}

/// JSONリクエスト本文をパース
pub fn parse_request(body: &str) -> Result<RecognizeRequest> {
    let request: RecognizeRequest = serde_json::from_str(body)?;
    Ok(request)
}

/// アップロードされた画像ファイルを読む
pub fn read_image_file(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(GuideError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read(path)?)
}
