// Backend configuration - target device selection

use serde::{Deserialize, Serialize};

/// Device class the caller intends to run inference on.
///
/// The GPTQ loading path accepts this for interface symmetry with the
/// full-precision loaders but always hands the checkpoint to the automatic
/// device map; see [`crate::models::load_gptq_model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// CPU fallback (slow, works everywhere)
    Cpu,

    /// Single NVIDIA CUDA GPU
    Cuda,

    /// Spread layers across whatever accelerators are available
    Auto,
}

impl DeviceKind {
    /// Get short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            DeviceKind::Cpu => "CPU",
            DeviceKind::Cuda => "CUDA (GPU)",
            DeviceKind::Auto => "Auto",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            DeviceKind::Cpu => "CPU - Slow, works everywhere",
            DeviceKind::Cuda => "NVIDIA CUDA GPU - Very fast",
            DeviceKind::Auto => "Auto-detect best available",
        }
    }
}

impl Default for DeviceKind {
    fn default() -> Self {
        DeviceKind::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_auto() {
        assert_eq!(DeviceKind::default(), DeviceKind::Auto);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DeviceKind::Cuda).unwrap();
        assert_eq!(json, "\"cuda\"");
        let parsed: DeviceKind = serde_json::from_str("\"cpu\"").unwrap();
        assert_eq!(parsed, DeviceKind::Cpu);
    }
}
