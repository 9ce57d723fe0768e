use super::{take_limited, CatalogError, CatalogProvider, CatalogResult};
use landmark_guide_common::CulturalSite;
use std::path::{Path, PathBuf};

/// JSONファイルのカタログ
///
/// 管理者が随時編集できるよう、読み出しのたびにファイルを読む。
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> CatalogResult<Vec<CulturalSite>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CatalogError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            CatalogError::Unavailable(format!("{}: JSONパースエラー: {}", self.path.display(), e))
        })
    }
}

impl CatalogProvider for JsonCatalog {
    fn list_sites(&self, limit: Option<usize>) -> CatalogResult<Vec<CulturalSite>> {
        let sites = self.read_all()?;
        tracing::debug!(path = %self.path.display(), total = sites.len(), ?limit, "catalog read");
        Ok(take_limited(&sites, limit))
    }
}
