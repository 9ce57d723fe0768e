use crate::config::ExtractorKind;
use clap::{Parser, Subcommand};
use landmark_guide_common::{AnalysisMethod, Language};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "landmark-guide")]
#[command(about = "写真から文化遺産を認識し、音声ガイドを生成するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 信号抽出方式 (auto/vision/heuristic)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub extractor: Option<ExtractorKind>,

    /// カタログJSONファイル。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真1枚を認識
    Recognize {
        /// 画像ファイルのパス
        #[arg(required_unless_present = "request")]
        image: Option<PathBuf>,

        /// Webクライアント形式のJSONリクエスト本文ファイル
        #[arg(long, conflicts_with = "image")]
        request: Option<PathBuf>,

        /// 解析方式 (primary/secondary/tertiary)
        #[arg(short, long)]
        method: Option<AnalysisMethod>,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        /// 認識結果が正しいか確認する
        #[arg(long)]
        feedback: bool,
    },

    /// フォルダ内の写真を一括認識してJSONを出力
    Batch {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（デフォルト: 入力フォルダ/recognition.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 解析方式 (primary/secondary/tertiary)
        #[arg(short, long, default_value = "primary")]
        method: AnalysisMethod,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 認識からナレーション・音声まで一括生成
    Guide {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 解析方式 (primary/secondary/tertiary)
        #[arg(short, long, default_value = "primary")]
        method: AnalysisMethod,

        /// ナレーション言語 (english/spanish)
        #[arg(short, long, default_value = "english")]
        language: Language,

        /// 再生時間（分）
        #[arg(short, long, default_value = "3")]
        duration: u8,

        /// 音声名（省略時は設定ファイルの値）
        #[arg(long)]
        voice: Option<String>,

        /// 音声の出力先
        #[arg(long)]
        audio_out: Option<PathBuf>,

        /// キャッシュを使わない
        #[arg(long)]
        no_cache: bool,
    },

    /// カタログを表示
    Catalog {
        /// 表示件数
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 設定を表示/編集
    Config {
        /// Vision APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// ガイドキャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
