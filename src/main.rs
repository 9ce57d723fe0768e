use anyhow::{bail, Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use landmark_guide::audio::StubSynthesizer;
use landmark_guide::catalog::{CatalogProvider, JsonCatalog};
use landmark_guide::cli::{Cli, Commands};
use landmark_guide::config::Config;
use landmark_guide::feedback::{record_feedback, Feedback};
use landmark_guide::guide::{Guide, GuideCache};
use landmark_guide::recognizer::Recognizer;
use landmark_guide::{batch, extractor, input, scanner};
use landmark_guide_common::{AnalysisMethod, MatchResult, NarrationOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn build_recognizer(config: &Config, method: AnalysisMethod) -> Result<Recognizer> {
    let extractor = extractor::from_config(config, method).context("信号抽出器の初期化に失敗")?;
    let catalog = Arc::new(JsonCatalog::new(config.catalog_path()));
    Ok(Recognizer::new(extractor, catalog, config.catalog_limit))
}

fn print_result(result: &MatchResult) {
    if result.success {
        println!("✔ {}", result.message);
    } else {
        println!("✘ {}", result.message);
    }

    if let Some(site) = &result.site {
        println!("  名称: {}", site.name);
        let location = site.location();
        if !location.is_empty() {
            println!("  場所: {}", location);
        }
        if !site.site_type.is_empty() {
            println!("  種別: {}", site.site_type);
        }
        if !site.description.is_empty() {
            println!("  概要: {}", site.description);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load().context("設定ファイルの読み込みに失敗")?;
    if let Some(kind) = cli.extractor {
        config.extractor = kind;
    }
    if let Some(path) = cli.catalog {
        config.catalog_path = Some(path);
    }

    match cli.command {
        Commands::Recognize { image, request, method, json, feedback } => {
            let (bytes, method) = match (request, image) {
                (Some(request_path), _) => {
                    let body = std::fs::read_to_string(&request_path)
                        .with_context(|| format!("リクエストを読めません: {}", request_path.display()))?;
                    let request = input::parse_request(&body)?;
                    let decoded = request.decode()?;
                    (decoded.bytes, method.unwrap_or(request.method))
                }
                (None, Some(image_path)) => {
                    (input::read_image_file(&image_path)?, method.unwrap_or_default())
                }
                (None, None) => bail!("画像ファイルか --request を指定してください"),
            };

            let recognizer = build_recognizer(&config, method)?;
            if !json {
                println!("🏛 landmark-guide - 認識 ({}, method={})\n", recognizer.extractor_name(), method);
            }

            let result = recognizer.recognize(&bytes).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
                if !result.success && result.diagnostics.outcome.is_error() {
                    println!("\n  別の方式で再試行: --method {}", method.next());
                }
            }

            if feedback && result.success {
                let is_correct = Confirm::new()
                    .with_prompt("この認識結果は正しいですか？")
                    .default(true)
                    .interact()
                    .context("入力の取得に失敗")?;
                let receipt = record_feedback(&Feedback {
                    is_correct,
                    site_id: None,
                    recognized_site_id: result.site.as_ref().map(|s| s.id.clone()),
                    confidence: Some(result.confidence),
                });
                println!("{}", receipt.message);
            }
        }

        Commands::Batch { folder, output, method, recursive } => {
            println!("📸 landmark-guide - 一括認識\n");

            println!("[1/3] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder, recursive)?;
            if images.is_empty() {
                bail!("画像が見つかりません: {}", folder.display());
            }
            println!("✔ {}枚の写真を検出\n", images.len());

            println!("[2/3] 認識中...");
            let recognizer = build_recognizer(&config, method)?;
            let progress = ProgressBar::new(images.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
                    .progress_chars("=>-"),
            );
            let entries = batch::recognize_images(&recognizer, &images, |entry| {
                progress.set_message(entry.file_name.clone());
                progress.inc(1);
            })
            .await;
            progress.finish_and_clear();
            println!("✔ {}/{}枚を認識\n", batch::matched_count(&entries), entries.len());

            println!("[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| folder.join("recognition.json"));
            std::fs::write(&output, serde_json::to_string_pretty(&entries)?)
                .with_context(|| format!("保存に失敗: {}", output.display()))?;
            println!("✔ 結果を保存: {}", output.display());
        }

        Commands::Guide { image, method, language, duration, voice, audio_out, no_cache } => {
            println!("🎧 landmark-guide - 音声ガイド生成\n");

            let bytes = input::read_image_file(&image)?;
            let recognizer = Arc::new(build_recognizer(&config, method)?);
            let voice = voice.unwrap_or_else(|| config.voice.clone());
            let mut guide = Guide::new(recognizer, Box::new(StubSynthesizer), voice);
            if !no_cache {
                let folder = image
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                guide = guide.with_cache(folder);
            }

            let options = NarrationOptions {
                language,
                duration_minutes: duration,
            };
            let tour = guide.run(&bytes, &options).await;
            print_result(&tour.recognition);

            if let Some(script) = &tour.script {
                println!("\n--- ナレーション{} ---", if tour.cached { " (キャッシュ)" } else { "" });
                println!("{}", script);
            }

            if let Some(audio) = &tour.audio {
                println!("\n音声: {} ({}秒, {} bytes)", audio.mime_type, audio.duration_seconds, audio.data.len());
                if let Some(path) = audio_out {
                    std::fs::write(&path, &audio.data)
                        .with_context(|| format!("音声の保存に失敗: {}", path.display()))?;
                    println!("✔ 音声を保存: {}", path.display());
                }
            }

            if let Some(error) = &tour.error {
                println!("\n⚠ ガイド生成エラー: {}", error);
            }
        }

        Commands::Catalog { limit } => {
            let catalog = JsonCatalog::new(config.catalog_path());
            let sites = catalog.list_sites(limit)?;
            println!("カタログ: {} ({}件)", catalog.path().display(), sites.len());
            for site in &sites {
                println!("  [{}] {} - {}", site.id, site.name, site.location());
            }
        }

        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  抽出方式: {}", config.extractor);
                println!("  Vision API: {}", config.vision_endpoint);
                println!("  APIキー: {}", if config.api_key().is_some() { "設定済み" } else { "未設定" });
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  最大画像サイズ: {} bytes", config.max_image_bytes);
                println!("  カタログ: {} (最大{}件)", config.catalog_path().display(), config.catalog_limit);
                println!("  音声: {}", config.voice);
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = GuideCache::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = GuideCache::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match GuideCache::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
