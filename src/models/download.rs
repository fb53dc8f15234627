// Hub artifact access
// Thin wrapper over the HuggingFace Hub sync API with cache handling

use anyhow::{Context, Result};
use hf_hub::api::sync::{Api, ApiBuilder, ApiError};
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;

/// Synchronous hub client.
///
/// Each fetch resolves a single file within a model repository, downloading
/// it into the shared on-disk cache on first use. Caching, resume, and
/// concurrent-download locking are the hub library's concern; this wrapper
/// adds nothing on top.
pub struct HubClient {
    api: Api,
    cache_dir: Option<PathBuf>,
}

impl HubClient {
    /// Create a client using the default cache (`~/.cache/huggingface/`).
    pub fn new() -> Result<Self> {
        let api = Api::new().context("Failed to initialize HuggingFace Hub API")?;
        Ok(Self {
            api,
            cache_dir: None,
        })
    }

    /// Create a client with a custom cache directory.
    pub fn with_cache_dir(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        let api = ApiBuilder::new()
            .with_cache_dir(cache_dir.clone())
            .build()
            .context("Failed to initialize HuggingFace Hub API")?;

        Ok(Self {
            api,
            cache_dir: Some(cache_dir),
        })
    }

    /// Fetch one file from a model repository, returning its cached path.
    ///
    /// This is a blocking operation - spawn in a thread if you need async.
    pub fn fetch(&self, repo_id: &str, filename: &str) -> Result<PathBuf, ApiError> {
        let repo = self
            .api
            .repo(Repo::new(repo_id.to_string(), RepoType::Model));

        tracing::debug!("Fetching {} from {}", filename, repo_id);
        let path = repo.get(filename)?;
        tracing::debug!("Resolved {} to {:?}", filename, path);

        Ok(path)
    }

    /// Get cache directory path
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_default()
                .join(".cache")
                .join("huggingface")
        })
    }
}
