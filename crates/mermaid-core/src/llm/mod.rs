//! Text generation
//!
//! Supports two inference backends behind [`TextGenerator`]:
//! - llama.cpp (default `llama-cpp` feature): any GGUF architecture llama.cpp knows
//! - mistral.rs (`mistralrs` feature): GGUF models with mistral.rs' own kernels

mod backend;
#[cfg(feature = "llama-cpp")]
mod llamacpp_backend;
#[cfg(feature = "mistralrs")]
mod mistralrs_backend;
pub mod prompts;

pub use backend::{load_generator, TextGenerator};
#[cfg(feature = "llama-cpp")]
pub use llamacpp_backend::LlamaCppBackend;
#[cfg(feature = "mistralrs")]
pub use mistralrs_backend::MistralRsBackend;
pub use prompts::{contains_marker, format_contextual_prompt, ContextualRequest};

#[cfg(test)]
pub(crate) use backend::testing;

/// Describe the compiled-in hardware acceleration
pub fn detect_hardware() -> &'static str {
    #[cfg(feature = "metal")]
    {
        "Metal"
    }
    #[cfg(all(feature = "cuda", not(feature = "metal")))]
    {
        "CUDA (NVIDIA GPU)"
    }
    #[cfg(not(any(feature = "cuda", feature = "metal")))]
    {
        "CPU"
    }
}
