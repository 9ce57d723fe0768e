//! 文化遺産カタログ
//!
//! 認識コアからは読み取り専用。件数上限つきで一覧を返す。

mod json;

pub use json::JsonCatalog;

use landmark_guide_common::CulturalSite;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// カタログの読み出し口
pub trait CatalogProvider: Send + Sync {
    /// サイト一覧（`limit` 件まで、カタログ順）
    fn list_sites(&self, limit: Option<usize>) -> CatalogResult<Vec<CulturalSite>>;
}

/// 起動時に渡された固定リスト
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    sites: Vec<CulturalSite>,
}

impl InMemoryCatalog {
    pub fn new(sites: Vec<CulturalSite>) -> Self {
        Self { sites }
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn list_sites(&self, limit: Option<usize>) -> CatalogResult<Vec<CulturalSite>> {
        Ok(take_limited(&self.sites, limit))
    }
}

fn take_limited(sites: &[CulturalSite], limit: Option<usize>) -> Vec<CulturalSite> {
    let n = limit.unwrap_or(sites.len()).min(sites.len());
    sites[..n].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(n: usize) -> Vec<CulturalSite> {
        (0..n)
            .map(|i| CulturalSite {
                id: i.to_string(),
                name: format!("Site {}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_in_memory_limit() {
        let catalog = InMemoryCatalog::new(sites(15));
        assert_eq!(catalog.list_sites(Some(10)).unwrap().len(), 10);
        assert_eq!(catalog.list_sites(None).unwrap().len(), 15);
        assert_eq!(catalog.list_sites(Some(100)).unwrap().len(), 15);
    }

    #[test]
    fn test_in_memory_keeps_order() {
        let catalog = InMemoryCatalog::new(sites(3));
        let listed = catalog.list_sites(Some(2)).unwrap();
        assert_eq!(listed[0].id, "0");
        assert_eq!(listed[1].id, "1");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = InMemoryCatalog::default();
        assert!(catalog.list_sites(Some(10)).unwrap().is_empty());
    }
}
