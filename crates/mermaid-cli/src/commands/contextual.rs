//! Contextual command - the three-field contextual page

use anyhow::Result;
use console::{style, Term};
use mermaid_core::{Config, ContextualRequest, Session};
use std::time::Instant;

pub fn run(
    config: &Config,
    context: &str,
    input: &str,
    instruction: &str,
    show_template: bool,
) -> Result<()> {
    let term = Term::stdout();
    let request = ContextualRequest::new(context, input, instruction);

    let session = Session::from_config(config)?;
    term.write_line(&format!("{}", style(session.model_label()).dim()))?;

    if show_template {
        term.write_line("")?;
        term.write_line(&format!("{}", style("Template:").bold()))?;
        term.write_str(&request.to_prompt())?;
    }

    let started = Instant::now();
    let output = session.generate_contextual(&request)?;

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
