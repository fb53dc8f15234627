// GPTQ checkpoint loading from the HuggingFace Hub
// Resolves config + weight artifacts and validates quantization metadata

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use safetensors::tensor::Metadata;

use super::download::HubClient;
use super::loader::QuantizedModelLoader;
use crate::config::GptqLoadOptions;
use crate::errors::LoadError;

/// Safetensors caps its JSON header at 100MB; anything larger is corrupt.
const MAX_HEADER_BYTES: u64 = 100_000_000;

/// GPTQ quantization parameters, as serialized in a checkpoint's
/// `quantization_config` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GptqConfig {
    /// Weight bit-width (4 or lower for the schemes this loader targets).
    pub bits: u32,

    /// Quantization group size; -1 means per-column.
    #[serde(default = "default_group_size")]
    pub group_size: i64,

    /// Activation-order (desc_act) quantization.
    #[serde(default)]
    pub desc_act: bool,

    /// Symmetric quantization.
    #[serde(default = "default_sym")]
    pub sym: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damp_percent: Option<f64>,
}

fn default_group_size() -> i64 {
    128
}

fn default_sym() -> bool {
    true
}

/// Loaded GPTQ checkpoint handle.
///
/// Owns the resolved artifact paths and quantization metadata; the caller
/// takes full ownership on return and the loader keeps nothing behind.
#[derive(Debug)]
pub struct GptqModel {
    model_id: String,
    weights: PathBuf,
    quantize_config: GptqConfig,
    device_map: String,
}

impl GptqModel {
    /// Hub repository this checkpoint was loaded from.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Local path of the cached safetensors weight artifact.
    pub fn weights_path(&self) -> &Path {
        &self.weights
    }

    /// Quantization parameters in effect for this checkpoint.
    pub fn quantize_config(&self) -> &GptqConfig {
        &self.quantize_config
    }

    /// Placement strategy the checkpoint was loaded with.
    pub fn device_map(&self) -> &str {
        &self.device_map
    }
}

/// Subset of `config.json` this loader inspects.
#[derive(Debug, Deserialize)]
struct CheckpointConfig {
    /// Present when the repository ships custom model-definition code.
    #[serde(default)]
    auto_map: Option<serde_json::Value>,

    #[serde(default)]
    quantization_config: Option<serde_json::Value>,
}

/// Loads GPTQ checkpoints from hub repositories.
pub struct GptqHubLoader {
    hub: HubClient,
}

impl GptqHubLoader {
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

impl QuantizedModelLoader for GptqHubLoader {
    type Model = GptqModel;

    fn from_quantized(
        &self,
        model_id: &str,
        model_basename: Option<&str>,
        options: &GptqLoadOptions,
    ) -> Result<GptqModel, LoadError> {
        // config.json doubles as the repository existence check.
        let config_path = self
            .hub
            .fetch(model_id, "config.json")
            .map_err(|e| LoadError::resolution(model_id, e))?;

        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| LoadError::resolution(model_id, e))?;
        let config = parse_checkpoint_config(model_id, &raw)?;

        // Trust policy and metadata selection happen before touching the
        // (much larger) weights.
        let quantize_config = resolve_quantize_config(model_id, &config, options)?;

        let artifact = artifact_name(model_basename, options.use_safetensors);
        let weights = self
            .hub
            .fetch(model_id, &artifact)
            .map_err(|e| LoadError::artifact_mismatch(model_id, artifact.as_str(), e))?;

        if options.use_safetensors {
            validate_safetensors_header(&weights)
                .map_err(|reason| LoadError::format(model_id, reason))?;
        }

        tracing::info!(
            "Loaded GPTQ checkpoint {} ({}-bit, group size {}, device map '{}')",
            model_id,
            quantize_config.bits,
            quantize_config.group_size,
            options.device_map
        );

        Ok(GptqModel {
            model_id: model_id.to_string(),
            weights,
            quantize_config,
            device_map: options.device_map.clone(),
        })
    }
}

/// Derive the weight artifact filename from a (pre-stripped) basename.
/// An absent basename means "auto-detect the default artifact".
fn artifact_name(basename: Option<&str>, use_safetensors: bool) -> String {
    let stem = basename.unwrap_or("model");
    if use_safetensors {
        format!("{}.safetensors", stem)
    } else {
        format!("{}.bin", stem)
    }
}

fn parse_checkpoint_config(model_id: &str, raw: &str) -> Result<CheckpointConfig, LoadError> {
    serde_json::from_str(raw)
        .map_err(|e| LoadError::format(model_id, format!("config.json did not parse: {}", e)))
}

/// Apply the trust policy and pick the quantization parameters for a parsed
/// checkpoint config. An `auto_map` block means the checkpoint ships custom
/// model code; without `trust_remote_code` the load stops here, before any
/// weight download.
fn resolve_quantize_config(
    model_id: &str,
    config: &CheckpointConfig,
    options: &GptqLoadOptions,
) -> Result<GptqConfig, LoadError> {
    if config.auto_map.is_some() && !options.trust_remote_code {
        return Err(LoadError::trust_policy(model_id));
    }

    match &options.quantize_config {
        Some(overridden) => Ok(overridden.clone()),
        None => {
            let section = config.quantization_config.as_ref().ok_or_else(|| {
                LoadError::format(model_id, "config.json carries no quantization_config block")
            })?;
            quantize_config_from(section).map_err(|reason| LoadError::format(model_id, reason))
        }
    }
}

/// Extract GPTQ parameters from a `quantization_config` JSON block.
fn quantize_config_from(value: &serde_json::Value) -> Result<GptqConfig, String> {
    // AutoGPTQ-era checkpoints omit quant_method; transformers-era ones
    // carry it and may name a different scheme entirely.
    if let Some(method) = value.get("quant_method").and_then(|m| m.as_str()) {
        if !method.eq_ignore_ascii_case("gptq") {
            return Err(format!(
                "quantization method is '{}', expected 'gptq'",
                method
            ));
        }
    }

    serde_json::from_value(value.clone())
        .map_err(|e| format!("malformed quantization_config: {}", e))
}

/// Check that a weight artifact actually parses as safetensors, without
/// reading the (multi-gigabyte) tensor payload.
///
/// Only the length prefix and the JSON header are read; the header is
/// deserialized through the safetensors metadata types, which validate
/// dtypes, shapes, and the offset layout. Payload completeness is the
/// inference runtime's concern.
fn validate_safetensors_header(path: &Path) -> Result<(), String> {
    let mut file =
        File::open(path).map_err(|e| format!("could not open weight artifact: {}", e))?;

    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes)
        .map_err(|_| "weight artifact is too short to be safetensors".to_string())?;

    let header_len = u64::from_le_bytes(len_bytes);
    if header_len == 0 || header_len > MAX_HEADER_BYTES {
        return Err(format!(
            "implausible safetensors header length: {}",
            header_len
        ));
    }

    let mut header = vec![0u8; header_len as usize];
    file.read_exact(&mut header)
        .map_err(|_| "weight artifact truncated inside the header".to_string())?;

    serde_json::from_slice::<Metadata>(&header)
        .map_err(|e| format!("safetensors header did not parse: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use safetensors::tensor::{Dtype, TensorView};
    use serde_json::json;

    #[test]
    fn test_quantize_config_parses_transformers_style() {
        let block = json!({
            "quant_method": "gptq",
            "bits": 4,
            "group_size": 128,
            "desc_act": true,
            "sym": true,
            "damp_percent": 0.01
        });
        let config = quantize_config_from(&block).unwrap();
        assert_eq!(config.bits, 4);
        assert_eq!(config.group_size, 128);
        assert!(config.desc_act);
    }

    #[test]
    fn test_quantize_config_fills_autogptq_defaults() {
        // quantize_config.json style: no quant_method, minimal fields
        let block = json!({ "bits": 4 });
        let config = quantize_config_from(&block).unwrap();
        assert_eq!(config.group_size, 128);
        assert!(config.sym);
        assert!(!config.desc_act);
    }

    #[test]
    fn test_quantize_config_rejects_other_schemes() {
        let block = json!({ "quant_method": "awq", "bits": 4 });
        let err = quantize_config_from(&block).unwrap_err();
        assert!(err.contains("awq"));
    }

    fn remote_code_config() -> CheckpointConfig {
        serde_json::from_value(json!({
            "auto_map": {
                "AutoModelForCausalLM": "modeling_custom.CustomForCausalLM"
            },
            "quantization_config": { "bits": 4 }
        }))
        .unwrap()
    }

    #[test]
    fn test_trust_policy_blocks_remote_code_checkpoints() {
        let config = remote_code_config();
        let options = GptqLoadOptions {
            trust_remote_code: false,
            ..Default::default()
        };

        let err = resolve_quantize_config("org/custom-GPTQ", &config, &options).unwrap_err();
        assert!(matches!(err, LoadError::TrustPolicy { .. }));
    }

    #[test]
    fn test_default_trust_admits_remote_code_checkpoints() {
        let config = remote_code_config();

        let quantize =
            resolve_quantize_config("org/custom-GPTQ", &config, &GptqLoadOptions::default())
                .unwrap();
        assert_eq!(quantize.bits, 4);
    }

    #[test]
    fn test_missing_quantization_block_is_a_format_error() {
        let config: CheckpointConfig = serde_json::from_value(json!({})).unwrap();

        let err = resolve_quantize_config("org/not-quantized", &config, &GptqLoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Format { .. }));
    }

    #[test]
    fn test_quantize_config_override_skips_checkpoint_metadata() {
        // No quantization_config in the checkpoint at all; the caller's
        // override must win without producing a format error.
        let config: CheckpointConfig = serde_json::from_value(json!({})).unwrap();
        let options = GptqLoadOptions {
            quantize_config: Some(GptqConfig {
                bits: 3,
                group_size: -1,
                desc_act: false,
                sym: true,
                damp_percent: None,
            }),
            ..Default::default()
        };

        let quantize = resolve_quantize_config("org/model-GPTQ", &config, &options).unwrap();
        assert_eq!(quantize.bits, 3);
        assert_eq!(quantize.group_size, -1);
    }

    #[test]
    fn test_malformed_config_json_is_a_format_error() {
        let err = parse_checkpoint_config("org/model-GPTQ", "not json at all").unwrap_err();
        assert!(matches!(err, LoadError::Format { .. }));
    }

    #[test]
    fn test_artifact_name_defaults_to_model() {
        assert_eq!(artifact_name(None, true), "model.safetensors");
        assert_eq!(artifact_name(None, false), "model.bin");
    }

    #[test]
    fn test_artifact_name_appends_extension_once() {
        // Basenames reach this point already stripped of .safetensors
        assert_eq!(
            artifact_name(Some("gptq_model-4bit-128g"), true),
            "gptq_model-4bit-128g.safetensors"
        );
    }

    #[test]
    fn test_valid_safetensors_header_passes() {
        let payload = [0u8; 4];
        let view = TensorView::new(Dtype::F32, vec![1], &payload).unwrap();
        let bytes = safetensors::serialize(vec![("w".to_string(), view)], &None).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, bytes).unwrap();

        assert!(validate_safetensors_header(&path).is_ok());
    }

    #[test]
    fn test_header_validation_never_needs_the_payload() {
        // Multiple tensors with real payload bytes; validation must succeed
        // from the length prefix and header alone.
        let a = [0u8; 8];
        let b = [0u8; 4];
        let tensors = vec![
            (
                "a".to_string(),
                TensorView::new(Dtype::F32, vec![2], &a).unwrap(),
            ),
            (
                "b".to_string(),
                TensorView::new(Dtype::F32, vec![1], &b).unwrap(),
            ),
        ];
        let bytes = safetensors::serialize(tensors, &None).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, bytes).unwrap();

        assert!(validate_safetensors_header(&path).is_ok());
    }

    #[test]
    fn test_header_with_wrong_field_types_is_rejected() {
        let header = br#"{"w":{"dtype":123,"shape":[1],"data_offsets":[0,4]}}"#;
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header);
        bytes.extend_from_slice(&[0u8; 4]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, bytes).unwrap();

        let reason = validate_safetensors_header(&path).unwrap_err();
        assert!(reason.contains("parse"));
    }

    #[test]
    fn test_garbage_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, b"this is a pytorch pickle, honest").unwrap();

        let reason = validate_safetensors_header(&path).unwrap_err();
        assert!(reason.contains("header"));
    }

    #[test]
    fn test_truncated_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, [8u8, 0, 0]).unwrap();

        let reason = validate_safetensors_header(&path).unwrap_err();
        assert!(reason.contains("too short"));
    }

    #[test]
    #[ignore] // Requires network and a large download - run with: cargo test -- --ignored
    fn test_load_real_gptq_checkpoint() {
        tracing_subscriber::fmt().try_init().ok();
        let loader = GptqHubLoader::new().unwrap();
        let model = loader
            .from_quantized(
                "TheBloke/Llama-2-7B-Chat-GPTQ",
                None,
                &GptqLoadOptions::default(),
            )
            .unwrap();
        assert_eq!(model.quantize_config().bits, 4);
        assert!(model.weights_path().exists());
    }
}
