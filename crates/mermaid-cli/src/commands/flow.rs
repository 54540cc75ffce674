//! Flow command - the free-text "Mermaid Flow" page

use anyhow::{Context, Result};
use console::{style, Term};
use mermaid_core::{Config, Session};
use std::io::Read;
use std::time::Instant;

pub fn run(config: &Config, text: Option<&str>) -> Result<()> {
    let term = Term::stdout();

    let input = match text {
        Some(text) => text.to_string(),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read input from stdin")?;
            tracing::debug!("Read {} chars from stdin", buffer.len());
            buffer
        }
    };

    let session = Session::from_config(config)?;
    term.write_line(&format!("{}", style(session.model_label()).dim()))?;

    let started = Instant::now();
    let output = session.generate_simple(&input)?;

    term.write_line("")?;
    term.write_line(&output)?;

    if let Some(mermaid) = session.mermaid() {
        term.write_line("")?;
        term.write_line(&format!(
            "{} Generation ({}): {}ms",
            style("⏱").dim(),
            mermaid.backend_name(),
            started.elapsed().as_millis()
        ))?;
    }

    Ok(())
}
