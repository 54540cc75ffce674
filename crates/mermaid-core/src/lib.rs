//! Mermaid Core - contextual prompt formatting and local text generation
//!
//! This library provides:
//! - The contextual-request prompt template
//! - An inference invoker with fixed sampling parameters
//! - llama.cpp and mistral.rs text generators behind one trait
//! - JSON configuration with a disabled fallback
//! - Form logic shared by the console and desktop front-ends

pub mod config;
pub mod llm;
#[cfg(feature = "mistralrs")]
pub mod runtime;
pub mod session;

mod mermaid;

pub use config::{Backend, Config, ConfigError, GenerationOptions};
pub use llm::{format_contextual_prompt, ContextualRequest, TextGenerator};
pub use mermaid::Mermaid;
pub use session::{Page, Session, NO_MODEL_MESSAGE};

