//! Setup command - download a GGUF model and select it

use anyhow::{Context, Result};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use mermaid_core::config::{hub_model_id, resolve_model_path};
use mermaid_core::Config;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

pub fn run(config_path: Option<&str>, repo: &str, file: &str) -> Result<()> {
    let term = Term::stdout();

    term.write_line(&format!("{} Mermaid Setup", style("🚀").green()))?;
    term.write_line("")?;

    let model_id = hub_model_id(repo, file);
    let model_path = resolve_model_path(&model_id)?;

    if model_path.exists() {
        term.write_line(&format!(
            "{} {} already downloaded",
            style("✓").green(),
            file
        ))?;
    } else {
        if let Some(parent) = model_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let url = download_url(repo, file);
        term.write_line(&format!("{} Downloading {}...", style("⬇").cyan(), file))?;
        term.write_line(&format!("  From: {}", url))?;

        download_file(&url, &model_path)?;

        term.write_line(&format!("{} {} downloaded", style("✓").green(), file))?;
    }

    let mut config = Config::load(config_path)?;
    config.model_id = Some(model_id.clone());
    config.save(config_path)?;

    term.write_line("")?;
    term.write_line(&format!(
        "{} Setup complete! model_id = {}. Try {}",
        style("✓").green(),
        model_id,
        style("mermaid example").cyan()
    ))?;

    Ok(())
}

fn download_url(repo: &str, file: &str) -> String {
    format!(
        "https://huggingface.co/{}/resolve/main/{}",
        repo.trim_matches('/'),
        file
    )
}

fn download_file(url: &str, path: &Path) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    spinner.set_message("downloading");
    spinner.enable_steady_tick(Duration::from_millis(120));

    // Download to a partial file so an interrupted transfer never looks complete
    let partial = path.with_extension("part");
    let output = Command::new("curl")
        .arg("-fL")
        .arg("-o")
        .arg(&partial)
        .arg(url)
        .output()
        .context("Failed to run curl")?;

    spinner.finish_and_clear();

    if !output.status.success() {
        let _ = std::fs::remove_file(&partial);
        anyhow::bail!(
            "Download failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    std::fs::rename(&partial, path)
        .with_context(|| format!("Failed to move download to {:?}", path))?;

    Ok(())
}
