use super::{ArchiveDecoder, DatasetSource, SourceData};
use crate::{
    download::{resolve_cache_dir, ArchiveCache},
    next_state::NextStateMode,
    registry::dataset_url,
};
use anyhow::{Context, Result};
use std::path::Path;

/// Archive downloaded from the dataset registry.
///
/// No environment is involved, hence no spec is available and the dtypes of
/// the archive are kept.
pub struct DirectDownloadSource<'a> {
    url: String,
    cache: ArchiveCache,
    decoder: &'a dyn ArchiveDecoder,
}

impl<'a> DirectDownloadSource<'a> {
    /// Looks up the url of `name` and opens the cache directory.
    pub fn new(name: &str, cache_dir: Option<&Path>, decoder: &'a dyn ArchiveDecoder) -> Result<Self> {
        let url = dataset_url(name)?;
        let cache = ArchiveCache::new(resolve_cache_dir(cache_dir)?)?;
        Ok(Self {
            url,
            cache,
            decoder,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<'a> DatasetSource for DirectDownloadSource<'a> {
    fn describe(&self) -> String {
        format!("direct download ({})", self.url)
    }

    fn load(&self) -> Result<SourceData> {
        let path = self.cache.fetch(&self.url)?;
        let table = self
            .decoder
            .decode(&path)
            .with_context(|| format!("Failed to decode {:?}", path))?;
        Ok(SourceData {
            table,
            spec: None,
            mode: NextStateMode::Derived,
        })
    }
}
