use crate::catalog::CatalogError;
use crate::extractor::ExtractionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuideError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("Vision APIキーが設定されていません。`landmark-guide config --set-api-key YOUR_KEY` で設定するか GOOGLE_CLOUD_VISION_API_KEY を指定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像データが不正: {0}")]
    InvalidImageData(String),

    #[error("画像解析エラー: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("カタログエラー: {0}")]
    Catalog(#[from] CatalogError),

    #[error("音声合成エラー: {0}")]
    Synthesis(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] landmark_guide_common::Error),
}

pub type Result<T> = std::result::Result<T, GuideError>;
