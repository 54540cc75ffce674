//! Text generator trait for a unified interface across inference engines

use crate::config::{Backend, Config, GenerationOptions};
use anyhow::Result;
use std::path::Path;

/// Trait for text-generation backends
/// Allows switching between llama.cpp and mistral.rs transparently
pub trait TextGenerator: Send + Sync {
    /// Continue `prompt` with the given sampling parameters
    ///
    /// Returns only the generated continuation, untrimmed.
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Get the backend name for logging
    fn name(&self) -> &'static str;
}

/// Load the model at `model_path` with the backend selected in `config`
pub fn load_generator(config: &Config, model_path: &Path) -> Result<Box<dyn TextGenerator>> {
    tracing::info!(
        "Loading model {:?} with {}",
        model_path,
        config.backend.display_name()
    );

    if config.backend.wraps_prompt_in_chat_template() {
        tracing::warn!(
            "{} wraps the prompt in the model's chat template; output can differ from raw continuation",
            config.backend.display_name()
        );
    }

    match config.backend {
        #[cfg(feature = "llama-cpp")]
        Backend::LlamaCpp => Ok(Box::new(super::LlamaCppBackend::new(model_path)?)),
        #[cfg(feature = "mistralrs")]
        Backend::MistralRs => Ok(Box::new(super::MistralRsBackend::new(model_path)?)),
        #[allow(unreachable_patterns)]
        other => anyhow::bail!(
            "{} support is not compiled in. Rebuild with the matching cargo feature.",
            other.display_name()
        ),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Prompts and options seen by a [`StubGenerator`]
    pub type CallLog = Arc<Mutex<Vec<(String, GenerationOptions)>>>;

    /// Generator returning a canned reply and recording every call
    pub struct StubGenerator {
        reply: Result<String, String>,
        calls: CallLog,
    }

    impl StubGenerator {
        pub fn replying(reply: &str) -> (Self, CallLog) {
            let calls = CallLog::default();
            let stub = Self {
                reply: Ok(reply.to_string()),
                calls: Arc::clone(&calls),
            };
            (stub, calls)
        }

        pub fn failing(message: &str) -> (Self, CallLog) {
            let calls = CallLog::default();
            let stub = Self {
                reply: Err(message.to_string()),
                calls: Arc::clone(&calls),
            };
            (stub, calls)
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a thread-local subscriber and return everything it logged
    pub fn capture_logs<F: FnOnce()>(f: F) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    impl TextGenerator for StubGenerator {
        fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), *options));
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }
}
