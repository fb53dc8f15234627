// GPTQ load orchestration
// Normalizes the artifact basename, marshals the load options, and sequences
// the tokenizer and checkpoint loads (tokenizer first, fail-fast).

use crate::config::{DeviceKind, GptqLoadOptions};
use crate::errors::LoadError;

use super::gptq::{GptqHubLoader, GptqModel};
use super::tokenizer::HubTokenizerLoader;

const SAFETENSORS_SUFFIX: &str = ".safetensors";

/// Capability for emitting informational progress messages.
///
/// Injected by the caller so the orchestration stays decoupled from any
/// concrete logging framework.
pub trait LogSink {
    fn info(&self, message: &str);
}

/// Forwards capability messages to the active `tracing` subscriber.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

impl<F> LogSink for F
where
    F: Fn(&str),
{
    fn info(&self, message: &str) {
        self(message)
    }
}

/// Loads the tokenizer belonging to a hub repository.
pub trait TokenizerLoader {
    type Tokenizer;

    /// `use_fast` selects the throughput-optimized tokenizer implementation.
    fn load_tokenizer(&self, model_id: &str, use_fast: bool)
        -> Result<Self::Tokenizer, LoadError>;
}

/// Loads a quantized checkpoint given a repository and a pre-normalized
/// artifact basename.
pub trait QuantizedModelLoader {
    type Model;

    fn from_quantized(
        &self,
        model_id: &str,
        model_basename: Option<&str>,
        options: &GptqLoadOptions,
    ) -> Result<Self::Model, LoadError>;
}

/// Load a GPTQ checkpoint and its tokenizer with the default options.
///
/// The defaults reproduce the fixed historical flags: safetensors on, remote
/// code trusted, automatic device map, Triton kernels off, quantization
/// metadata taken from the checkpoint. Either both handles are returned or
/// the call fails before constructing the second one.
pub fn load_gptq_model<T, M, L>(
    model_id: &str,
    model_basename: Option<&str>,
    device: DeviceKind,
    log: &L,
    tokenizers: &T,
    models: &M,
) -> Result<(M::Model, T::Tokenizer), LoadError>
where
    T: TokenizerLoader,
    M: QuantizedModelLoader,
    L: LogSink + ?Sized,
{
    load_gptq_model_with_options(
        model_id,
        model_basename,
        device,
        &GptqLoadOptions::default(),
        log,
        tokenizers,
        models,
    )
}

/// As [`load_gptq_model`], with caller-supplied options.
#[allow(clippy::too_many_arguments)]
pub fn load_gptq_model_with_options<T, M, L>(
    model_id: &str,
    model_basename: Option<&str>,
    device: DeviceKind,
    options: &GptqLoadOptions,
    log: &L,
    tokenizers: &T,
    models: &M,
) -> Result<(M::Model, T::Tokenizer), LoadError>
where
    T: TokenizerLoader,
    M: QuantizedModelLoader,
    L: LogSink + ?Sized,
{
    log.info("Using the GPTQ loader for quantized checkpoints");

    // The checkpoint loader takes an explicit safetensors flag and derives
    // the filename itself; a basename still carrying the extension would
    // double-apply it. Strip the trailing suffix only, exactly once.
    let basename = model_basename
        .map(strip_safetensors_suffix)
        .filter(|b| !b.is_empty());

    // Accepted for parity with the sibling full-precision loaders; the GPTQ
    // path always self-places via the automatic device map.
    let _ = device;

    let tokenizer = tokenizers.load_tokenizer(model_id, true)?;
    log.info("Tokenizer loaded");

    let model = models.from_quantized(model_id, basename, options)?;

    Ok((model, tokenizer))
}

/// Convenience entry point wired to the real hub backends, logging through
/// `tracing`.
pub fn load_from_hub(
    model_id: &str,
    model_basename: Option<&str>,
    device: DeviceKind,
) -> anyhow::Result<(GptqModel, tokenizers::Tokenizer)> {
    let tokenizer_loader = HubTokenizerLoader::new()?;
    let model_loader = GptqHubLoader::new()?;
    let pair = load_gptq_model(
        model_id,
        model_basename,
        device,
        &TracingSink,
        &tokenizer_loader,
        &model_loader,
    )?;
    Ok(pair)
}

fn strip_safetensors_suffix(basename: &str) -> &str {
    basename
        .strip_suffix(SAFETENSORS_SUFFIX)
        .unwrap_or(basename)
}
