//! Chain file discovery for an assembly pair
//!
//! Looks for `<from>To<To>.over.chain.gz`, then `<from>To<To>.over.chain`, in
//! the search directory, then for the gzipped name in the cache directory.
//! Nothing is downloaded; a miss reports the UCSC URL instead.

use crate::core::error::{LiftoverError, Result};
use std::path::{Path, PathBuf};

const UCSC_LIFTOVER_BASE: &str = "http://hgdownload.cse.ucsc.edu/goldenPath";

/// Where to look for chain files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainLocator {
    pub search_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl ChainLocator {
    pub fn new(search_dir: Option<PathBuf>, cache_dir: Option<PathBuf>) -> Self {
        Self { search_dir, cache_dir }
    }

    /// Resolve the chain file for `from_db -> to_db`
    pub fn locate(&self, from_db: &str, to_db: &str) -> Result<PathBuf> {
        let base = chain_file_stem(from_db, to_db);
        let gz_name = format!("{}.gz", base);

        let mut candidates: Vec<PathBuf> = Vec::with_capacity(3);
        if let Some(dir) = &self.search_dir {
            candidates.push(dir.join(&gz_name));
            candidates.push(dir.join(&base));
        }
        if let Some(dir) = &self.cache_dir {
            candidates.push(dir.join(&gz_name));
        }

        for path in candidates {
            if is_file(&path) {
                log::info!("Using chain file {}", path.display());
                return Ok(path);
            }
            log::debug!("Chain file candidate {} not found", path.display());
        }

        Err(LiftoverError::ChainNotFound {
            from_db: from_db.to_string(),
            to_db: to_db.to_string(),
            url: download_url(from_db, to_db),
        })
    }
}

/// `hg19`, `hg38` -> `hg19ToHg38.over.chain`
pub fn chain_file_stem(from_db: &str, to_db: &str) -> String {
    format!("{}To{}.over.chain", from_db, capitalize(to_db))
}

/// UCSC download location of the gzipped chain file
pub fn download_url(from_db: &str, to_db: &str) -> String {
    format!(
        "{}/{}/liftOver/{}.gz",
        UCSC_LIFTOVER_BASE,
        from_db,
        chain_file_stem(from_db, to_db)
    )
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_chain_file_naming() {
        assert_eq!(chain_file_stem("hg19", "hg38"), "hg19ToHg38.over.chain");
        assert_eq!(chain_file_stem("mm9", "Mm10"), "mm9ToMm10.over.chain");
        assert_eq!(
            download_url("hg19", "hg38"),
            "http://hgdownload.cse.ucsc.edu/goldenPath/hg19/liftOver/hg19ToHg38.over.chain.gz"
        );
    }

    #[test]
    fn test_search_dir_prefers_gzip() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("hg19ToHg38.over.chain")).unwrap();
        File::create(dir.path().join("hg19ToHg38.over.chain.gz")).unwrap();

        let locator = ChainLocator::new(Some(dir.path().to_path_buf()), None);
        let path = locator.locate("hg19", "hg38").unwrap();
        assert_eq!(path, dir.path().join("hg19ToHg38.over.chain.gz"));
    }

    #[test]
    fn test_falls_back_to_plain_then_cache() {
        let search = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        File::create(cache.path().join("hg19ToHg38.over.chain.gz")).unwrap();

        let locator = ChainLocator::new(Some(search.path().to_path_buf()), Some(cache.path().to_path_buf()));
        assert_eq!(
            locator.locate("hg19", "hg38").unwrap(),
            cache.path().join("hg19ToHg38.over.chain.gz")
        );

        File::create(search.path().join("hg19ToHg38.over.chain")).unwrap();
        assert_eq!(
            locator.locate("hg19", "hg38").unwrap(),
            search.path().join("hg19ToHg38.over.chain")
        );
    }

    #[test]
    fn test_missing_chain_names_url() {
        let dir = TempDir::new().unwrap();
        let locator = ChainLocator::new(Some(dir.path().to_path_buf()), None);

        match locator.locate("mm9", "mm10") {
            Err(LiftoverError::ChainNotFound { url, .. }) => {
                assert!(url.ends_with("/mm9/liftOver/mm9ToMm10.over.chain.gz"));
            }
            other => panic!("expected ChainNotFound, got {:?}", other),
        }
    }
}
