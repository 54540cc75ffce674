//! llama.cpp backend for text generation via the llama-cpp-2 crate
//! Loads any GGUF architecture supported by llama.cpp

use crate::config::GenerationOptions;
use crate::llm::backend::TextGenerator;
use anyhow::{Context, Result};
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::token::LlamaToken;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;

/// Context window allocated per generation call
const CONTEXT_SIZE: u32 = 4096;

/// llama.cpp backend implementation
pub struct LlamaCppBackend {
    backend: Arc<LlamaBackend>,
    model: Arc<LlamaModel>,
}

impl LlamaCppBackend {
    /// Load a GGUF model with llama.cpp
    pub fn new(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!(
                "Model not found at {:?}. Check model_id in config.json or run 'mermaid setup'.",
                model_path
            );
        }

        let backend = LlamaBackend::init().context("Failed to initialize llama.cpp backend")?;

        let model_params = LlamaModelParams::default();
        let model = LlamaModel::load_from_file(&backend, model_path, &model_params)
            .context("Failed to load model with llama.cpp")?;

        tracing::info!("llama.cpp backend loaded: {:?}", model_path);

        Ok(Self {
            backend: Arc::new(backend),
            model: Arc::new(model),
        })
    }

    fn sampler(options: &GenerationOptions) -> LlamaSampler {
        if options.do_sample {
            LlamaSampler::chain_simple([
                LlamaSampler::temp(options.temperature),
                LlamaSampler::top_p(options.top_p, 1),
                LlamaSampler::dist(options.sampling_seed()),
            ])
        } else {
            LlamaSampler::greedy()
        }
    }

    /// Generate text completion
    fn generate_completion(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let ctx_params = LlamaContextParams::default().with_n_ctx(NonZeroU32::new(CONTEXT_SIZE));

        let mut ctx = self
            .model
            .new_context(&self.backend, ctx_params)
            .context("Failed to create llama.cpp context")?;

        let tokens = self
            .model
            .str_to_token(prompt, AddBos::Always)
            .context("Failed to tokenize prompt")?;

        let n_ctx = ctx.n_ctx() as usize;
        let tokens_len = tokens.len();
        let max_new_tokens = options.max_new_tokens as usize;

        if tokens_len + max_new_tokens > n_ctx {
            tracing::warn!(
                "Prompt ({} tokens) + max_new_tokens ({}) exceeds context size ({})",
                tokens_len,
                max_new_tokens,
                n_ctx
            );
        }

        let mut batch = LlamaBatch::new(n_ctx, 1);

        // Only the last prompt token needs logits
        let last_idx = tokens_len.saturating_sub(1);
        for (i, token) in tokens.iter().enumerate() {
            batch
                .add(*token, i as i32, &[0], i == last_idx)
                .context("Failed to add token to batch")?;
        }

        ctx.decode(&mut batch).context("Failed to decode prompt batch")?;

        let mut sampler = Self::sampler(options);
        let mut output_tokens: Vec<LlamaToken> = Vec::new();
        let mut n_cur = tokens_len;

        for _ in 0..max_new_tokens {
            let new_token = sampler.sample(&ctx, batch.n_tokens() as i32 - 1);

            if self.model.is_eog_token(new_token) {
                break;
            }

            output_tokens.push(new_token);

            batch.clear();
            batch
                .add(new_token, n_cur as i32, &[0], true)
                .context("Failed to add generated token to batch")?;

            n_cur += 1;

            ctx.decode(&mut batch)
                .context("Failed to decode generated token")?;
        }

        tracing::debug!("llama.cpp generated {} tokens", output_tokens.len());

        // Multi-byte characters can straddle token boundaries, so decode once at the end
        let mut bytes = Vec::new();
        for token in output_tokens {
            let piece = self
                .model
                .token_to_bytes(token, Special::Tokenize)
                .context("Failed to detokenize generated token")?;
            bytes.extend_from_slice(&piece);
        }
        let output = String::from_utf8_lossy(&bytes).into_owned();

        Ok(output)
    }
}

impl TextGenerator for LlamaCppBackend {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        self.generate_completion(prompt, options)
    }

    fn name(&self) -> &'static str {
        "llama.cpp"
    }
}
