// Load failure taxonomy
//
// Every variant is surfaced to the caller unmodified: the loader performs no
// retries, no fallback, and leaves no partial state of its own behind.

use thiserror::Error;

/// Boxed source error from a collaborator (hub client, tokenizer runtime).
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure modes of a quantized checkpoint load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The model repository could not be found or reached on the hub.
    #[error("could not resolve model repository '{model_id}'")]
    Resolution {
        model_id: String,
        #[source]
        source: BoxedSource,
    },

    /// The requested basename does not match any artifact in the repository.
    #[error("no artifact matching '{artifact}' in repository '{model_id}'")]
    ArtifactMismatch {
        model_id: String,
        artifact: String,
        #[source]
        source: BoxedSource,
    },

    /// The checkpoint is not in the expected GPTQ safetensors layout.
    #[error("checkpoint '{model_id}' is not a valid GPTQ safetensors checkpoint: {reason}")]
    Format { model_id: String, reason: String },

    /// The checkpoint ships custom model code and the caller disabled
    /// remote code execution.
    #[error("checkpoint '{model_id}' requires remote model code, but remote code execution is not trusted")]
    TrustPolicy { model_id: String },

    /// The tokenizer could not be constructed for this repository.
    #[error("failed to load tokenizer for '{model_id}'")]
    Tokenizer {
        model_id: String,
        #[source]
        source: BoxedSource,
    },
}

impl LoadError {
    pub fn resolution(model_id: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::Resolution {
            model_id: model_id.into(),
            source: source.into(),
        }
    }

    pub fn artifact_mismatch(
        model_id: impl Into<String>,
        artifact: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Self::ArtifactMismatch {
            model_id: model_id.into(),
            artifact: artifact.into(),
            source: source.into(),
        }
    }

    pub fn format(model_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            model_id: model_id.into(),
            reason: reason.into(),
        }
    }

    pub fn trust_policy(model_id: impl Into<String>) -> Self {
        Self::TrustPolicy {
            model_id: model_id.into(),
        }
    }

    pub fn tokenizer(model_id: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::Tokenizer {
            model_id: model_id.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_message_names_repository() {
        let err = LoadError::resolution("org/missing-model", "404 Not Found".to_string());
        assert!(err.to_string().contains("org/missing-model"));
        assert!(err.to_string().contains("resolve"));
    }

    #[test]
    fn test_artifact_mismatch_names_both_parts() {
        let err = LoadError::artifact_mismatch(
            "org/model-GPTQ",
            "gptq-4bit.safetensors",
            "404 Not Found".to_string(),
        );
        let msg = err.to_string();
        assert!(msg.contains("org/model-GPTQ"));
        assert!(msg.contains("gptq-4bit.safetensors"));
    }

    #[test]
    fn test_trust_policy_mentions_remote_code() {
        let err = LoadError::trust_policy("org/custom-arch-GPTQ");
        assert!(err.to_string().contains("remote"));
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error;
        let err = LoadError::tokenizer("org/model", "bad tokenizer.json".to_string());
        assert!(err.source().is_some());
    }
}
