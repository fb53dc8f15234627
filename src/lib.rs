// gptq-loader - GPTQ checkpoint loading from the HuggingFace Hub
// Library exports

pub mod config;
pub mod errors;
pub mod models;

pub use config::{
    DeviceKind, GptqLoadOptions, CONTEXT_WINDOW_SIZE, MAX_NEW_TOKENS, N_BATCH, N_GPU_LAYERS,
};
pub use errors::LoadError;
pub use models::{
    load_from_hub, load_gptq_model, load_gptq_model_with_options, GptqConfig, GptqHubLoader,
    GptqModel, HubClient, HubTokenizerLoader, LogSink, QuantizedModelLoader, TokenizerLoader,
    TracingSink,
};
