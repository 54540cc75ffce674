//! mistral.rs backend for text generation
//! Enabled with the `mistralrs` cargo feature

use crate::config::GenerationOptions;
use crate::llm::backend::TextGenerator;
use crate::runtime;
use anyhow::{Context, Result};
use mistralrs::{GgufModelBuilder, Model, RequestBuilder, TextMessageRole, TextMessages};
use std::path::Path;
use std::sync::Arc;

/// mistral.rs backend implementation
pub struct MistralRsBackend {
    model: Arc<Model>,
}

impl MistralRsBackend {
    /// Load a GGUF model with mistral.rs (async)
    pub async fn new_async(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!(
                "Model not found at {:?}. Check model_id in config.json or run 'mermaid setup'.",
                model_path
            );
        }

        let model_dir = model_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_string_lossy()
            .to_string();
        let model_file = model_path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .context("Model path has no file name")?;

        let model = GgufModelBuilder::new(model_dir, vec![model_file])
            .with_logging()
            .build()
            .await
            .context("Failed to load model with mistral.rs")?;

        tracing::info!("mistral.rs backend loaded: {:?}", model_path);

        Ok(Self {
            model: Arc::new(model),
        })
    }

    /// Load a GGUF model with mistral.rs (blocking)
    pub fn new(model_path: &Path) -> Result<Self> {
        runtime::block_on(Self::new_async(model_path))
    }

    /// Generate text (async)
    pub async fn generate_async(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let messages = TextMessages::new()
            .enable_thinking(false)
            .add_message(TextMessageRole::User, prompt);

        // A zero temperature makes the sampler pick the argmax token
        let temperature = if options.do_sample {
            options.temperature as f64
        } else {
            0.0
        };

        let request = RequestBuilder::from(messages)
            .set_sampler_max_len(options.max_new_tokens as usize)
            .set_sampler_temperature(temperature)
            .set_sampler_topp(options.top_p as f64);

        let response = self
            .model
            .send_chat_request(request)
            .await
            .context("mistral.rs inference failed")?;

        let output = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(output)
    }
}

impl TextGenerator for MistralRsBackend {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        runtime::block_on(self.generate_async(prompt, options))
    }

    fn name(&self) -> &'static str {
        "mistral.rs"
    }
}
