// Tokenizer loading from the HuggingFace Hub
// Fetches the serialized fast tokenizer (tokenizer.json) for a repository

use std::path::PathBuf;
use tokenizers::Tokenizer;

use super::download::HubClient;
use super::loader::TokenizerLoader;
use crate::errors::LoadError;

/// Loads fast tokenizers from hub repositories.
///
/// Only the fast (`tokenizer.json`) implementation is available: the
/// `tokenizers` crate *is* the fast variant, and sentencepiece/BPE legacy
/// formats are not supported here.
pub struct HubTokenizerLoader {
    hub: HubClient,
}

impl HubTokenizerLoader {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            hub: HubClient::new()?,
        })
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> anyhow::Result<Self> {
        Ok(Self {
            hub: HubClient::with_cache_dir(cache_dir)?,
        })
    }
}

impl TokenizerLoader for HubTokenizerLoader {
    type Tokenizer = Tokenizer;

    fn load_tokenizer(&self, model_id: &str, use_fast: bool) -> Result<Tokenizer, LoadError> {
        if !use_fast {
            return Err(LoadError::tokenizer(
                model_id,
                "only the fast tokenizer implementation is available".to_string(),
            ));
        }

        // A missing tokenizer.json almost always means the repository itself
        // does not resolve; report it as such.
        let path = self
            .hub
            .fetch(model_id, "tokenizer.json")
            .map_err(|e| LoadError::resolution(model_id, e))?;

        tracing::debug!("Loading tokenizer from {:?}", path);

        let tokenizer =
            Tokenizer::from_file(&path).map_err(|e| LoadError::tokenizer(model_id, e))?;

        tracing::debug!(
            "Loaded tokenizer with vocab size: {}",
            tokenizer.get_vocab_size(true)
        );

        Ok(tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_variant_is_rejected_before_any_fetch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let loader = HubTokenizerLoader::with_cache_dir(temp_dir.path().to_path_buf()).unwrap();

        let err = loader
            .load_tokenizer("org/model-GPTQ", false)
            .expect_err("slow tokenizers are unsupported");
        assert!(matches!(err, LoadError::Tokenizer { .. }));
    }

    #[test]
    #[ignore] // Requires network - run with: cargo test -- --ignored
    fn test_load_real_tokenizer() {
        tracing_subscriber::fmt().try_init().ok();
        let loader = HubTokenizerLoader::new().unwrap();
        let tokenizer = loader.load_tokenizer("bert-base-uncased", true).unwrap();
        assert!(tokenizer.get_vocab_size(true) > 0);
    }
}
