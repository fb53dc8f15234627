// Configuration module
// Device selection and generation defaults

mod backend;
mod settings;

pub use backend::DeviceKind;
pub use settings::{
    GptqLoadOptions, CONTEXT_WINDOW_SIZE, MAX_NEW_TOKENS, N_BATCH, N_GPU_LAYERS,
};
