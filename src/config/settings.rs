// Generation defaults and load options

use serde::{Deserialize, Serialize};

use crate::models::GptqConfig;

/// Prompt-plus-completion window the surrounding pipeline budgets for.
pub const CONTEXT_WINDOW_SIZE: usize = 4096;

/// Upper bound on tokens generated per request.
pub const MAX_NEW_TOKENS: usize = CONTEXT_WINDOW_SIZE;

/// Layers offloaded to the accelerator by the GGUF/llama.cpp path.
pub const N_GPU_LAYERS: usize = 100;

/// Prompt evaluation batch size.
pub const N_BATCH: usize = 512;

/// Options marshaled to the quantized checkpoint loader.
///
/// The defaults reproduce the loader's historical fixed behavior: safetensors
/// format forced on, remote model code trusted, automatic layer placement,
/// fused Triton kernels off, and quantization parameters taken from the
/// checkpoint's own metadata. They are a struct rather than constants so
/// callers (and tests) can override individual flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GptqLoadOptions {
    /// Request the safetensors serialization of the weights. Always on by
    /// default; the artifact basename must therefore not carry the
    /// `.safetensors` extension itself.
    pub use_safetensors: bool,

    /// Allow model-definition code shipped inside the checkpoint repository.
    pub trust_remote_code: bool,

    /// Placement strategy handed to the runtime. `"auto"` lets it spread
    /// layers across available devices.
    pub device_map: String,

    /// Enable fused Triton kernels. Off by default.
    pub use_triton: bool,

    /// Override the checkpoint's quantization parameters. `None` means use
    /// whatever metadata ships with the checkpoint.
    pub quantize_config: Option<GptqConfig>,
}

impl Default for GptqLoadOptions {
    fn default() -> Self {
        Self {
            use_safetensors: true,
            trust_remote_code: true,
            device_map: "auto".to_string(),
            use_triton: false,
            quantize_config: None,
        }
    }
}
