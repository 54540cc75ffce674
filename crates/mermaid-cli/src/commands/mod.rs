pub mod config;
pub mod contextual;
pub mod example;
pub mod flow;
pub mod interactive;
pub mod setup;
pub mod template;
