//! Template command - print the contextual prompt without generating

use anyhow::Result;
use console::Term;
use mermaid_core::format_contextual_prompt;

pub fn run(context: &str, input: &str, instruction: &str) -> Result<()> {
    let term = Term::stdout();
    term.write_str(&format_contextual_prompt(context, input, instruction))?;
    term.flush()?;
    Ok(())
}
