//! Inference invoker: formats contextual requests and runs them through a generator

use crate::config::{Config, GenerationOptions};
use crate::llm::{self, prompts, TextGenerator};
use anyhow::Result;
use std::time::Instant;

/// A loaded model plus the fixed sampling parameters used for every call
pub struct Mermaid {
    generator: Box<dyn TextGenerator>,
    options: GenerationOptions,
}

impl Mermaid {
    /// Wrap a generator with the default sampling parameters
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self::with_options(generator, GenerationOptions::default())
    }

    pub fn with_options(generator: Box<dyn TextGenerator>, options: GenerationOptions) -> Self {
        Self { generator, options }
    }

    /// Load the configured model, or `None` when no model id is set
    ///
    /// Load failures are returned as-is.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(model_path) = config.model_path()? else {
            return Ok(None);
        };
        let generator = llm::load_generator(config, &model_path)?;
        Ok(Some(Self::new(generator)))
    }

    /// Build the contextual-request prompt
    pub fn generate_markdown_template(
        &self,
        context: &str,
        input_text: &str,
        instruction: &str,
    ) -> String {
        prompts::format_contextual_prompt(context, input_text, instruction)
    }

    /// Run `template` through the model and return the trimmed continuation
    pub fn generate_response(&self, template: &str) -> Result<String> {
        let started = Instant::now();
        tracing::debug!(
            "Generating with {} (prompt: {} chars)",
            self.generator.name(),
            template.len()
        );

        let continuation = self.generator.generate(template, &self.options)?;

        let response = if self.options.return_full_text {
            format!("{}{}", template, continuation).trim().to_string()
        } else {
            continuation.trim().to_string()
        };

        tracing::debug!(
            "Generated {} chars in {}ms",
            response.len(),
            started.elapsed().as_millis()
        );

        Ok(response)
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn backend_name(&self) -> &'static str {
        self.generator.name()
    }
}
