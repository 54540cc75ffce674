//! Config command - manage configuration

use anyhow::Result;
use console::{style, Term};
use mermaid_core::config::resolve_model_path;
use mermaid_core::llm::detect_hardware;
use mermaid_core::{Backend, Config, GenerationOptions};

pub fn show(config: &Config, path: Option<&str>) -> Result<()> {
    let term = Term::stdout();

    term.write_line(&format!("{}", style("Mermaid Configuration").bold()))?;
    term.write_line("")?;

    term.write_line(&format!(
        "Config file:      {}",
        style(Config::config_path(path).display()).cyan()
    ))?;
    term.write_line(&format!(
        "Model id:         {}",
        style(config.model_id().unwrap_or("None")).cyan()
    ))?;

    if let Some(model_id) = config.model_id() {
        let model_path = resolve_model_path(model_id)?;
        let status = if model_path.exists() {
            style("found").green()
        } else {
            style("missing").red()
        };
        term.write_line(&format!("  Path:           {:?} ({})", model_path, status))?;
    }

    term.write_line(&format!(
        "Backend:          {}",
        style(config.backend.display_name()).cyan()
    ))?;
    term.write_line(&format!("Acceleration:     {}", style(detect_hardware()).cyan()))?;

    let options = GenerationOptions::default();
    term.write_line("")?;
    term.write_line(&format!("{}", style("Sampling (fixed):").dim()))?;
    term.write_line(&format!("  Max new tokens: {}", options.max_new_tokens))?;
    term.write_line(&format!("  Sampling:       {}", options.do_sample))?;
    term.write_line(&format!("  Temperature:    {}", options.temperature))?;
    term.write_line(&format!("  Top-p:          {}", options.top_p))?;

    Ok(())
}

pub fn set_model(config: &mut Config, path: Option<&str>, model_id: &str) -> Result<()> {
    let term = Term::stdout();

    config.model_id = Some(model_id.to_string());
    config.save(path)?;

    term.write_line(&format!(
        "{} Model set to: {}",
        style("✓").green(),
        model_id
    ))?;

    let model_path = resolve_model_path(model_id)?;
    if !model_path.exists() {
        term.write_line(&format!(
            "{} No file at {:?}. Run: mermaid setup --repo <REPO> --file <FILE>",
            style("⚠").yellow(),
            model_path
        ))?;
    }

    Ok(())
}

pub fn set_backend(config: &mut Config, path: Option<&str>, name: &str) -> Result<()> {
    let term = Term::stdout();

    let Some(backend) = Backend::from_name(name) else {
        term.write_line(&format!(
            "{} Unknown backend '{}'. Available: llama-cpp, mistral-rs",
            style("✗").red(),
            name
        ))?;
        return Ok(());
    };

    config.backend = backend;
    config.save(path)?;

    term.write_line(&format!(
        "{} Backend set to: {}",
        style("✓").green(),
        backend.display_name()
    ))?;

    if backend == Backend::MistralRs && !cfg!(feature = "mistralrs") {
        term.write_line(&format!(
            "{} This build has no mistral.rs support. Rebuild with --features mistralrs",
            style("⚠").yellow()
        ))?;
    }

    Ok(())
}

pub fn show_path(path: Option<&str>) -> Result<()> {
    let term = Term::stdout();
    let config_path = Config::config_path(path);

    term.write_line(&format!("Config file: {:?}", config_path))?;

    if config_path.exists() {
        term.write_line(&format!("{} File exists", style("✓").green()))?;
    } else {
        term.write_line(&format!(
            "{} File does not exist (generation disabled)",
            style("ℹ").blue()
        ))?;
    }

    term.write_line(&format!("Models directory: {:?}", Config::models_dir()?))?;

    Ok(())
}
