// Quantized checkpoint loading
// Orchestration plus the hub-backed tokenizer and GPTQ loader implementations

pub mod download;
pub mod gptq;
pub mod loader;
pub mod tokenizer;

pub use download::HubClient;
pub use gptq::{GptqConfig, GptqHubLoader, GptqModel};
pub use loader::{
    load_from_hub, load_gptq_model, load_gptq_model_with_options, LogSink, QuantizedModelLoader,
    TokenizerLoader, TracingSink,
};
pub use tokenizer::HubTokenizerLoader;
