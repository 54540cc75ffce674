//! Example command - one hard-coded contextual request, template and response

use anyhow::Result;
use console::{style, Term};
use mermaid_core::{Config, ContextualRequest, Session};

const EXAMPLE_CONTEXT: &str = "date: 2021-01-01\nurl: https://web.site/123";

const EXAMPLE_INPUT: &str = "Pandemic Warning Notice: health officials have confirmed a \
rapidly spreading respiratory virus in several regions. Residents are advised to wash \
their hands frequently, avoid large gatherings and stay home when feeling unwell.";

const EXAMPLE_INSTRUCTION: &str = "What is the pandemic about? Cite your sources.";

pub fn example_request() -> ContextualRequest {
    ContextualRequest::new(EXAMPLE_CONTEXT, EXAMPLE_INPUT, EXAMPLE_INSTRUCTION)
}

pub fn run(config: &Config) -> Result<()> {
    let term = Term::stdout();
    let request = example_request();

    term.write_line(&format!("{}", style("Template:").bold()))?;
    term.write_str(&request.to_prompt())?;
    term.write_line("")?;

    let session = Session::from_config(config)?;
    term.write_line(&format!("{}", style(session.model_label()).dim()))?;

    let output = session.generate_contextual(&request)?;
    term.write_line(&format!("{}", style("Generated response:").bold()))?;
    term.write_line(&output)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_prompt_layout() {
        let prompt = example_request().to_prompt();
        assert!(prompt.starts_with("Contextual-Request:\nBEGININPUT\nBEGINCONTEXT\ndate: 2021-01-01\n"));
        assert!(prompt.contains("ENDCONTEXT\nPandemic Warning Notice:"));
        assert!(prompt.ends_with(
            "BEGININSTRUCTION\nWhat is the pandemic about? Cite your sources.\nENDINSTRUCTION\n\n### Contextual Response:\n"
        ));
    }

    #[test]
    fn test_example_without_model_uses_fixed_message() {
        let session = Session::from_config(&Config::default()).unwrap();
        let output = session.generate_contextual(&example_request()).unwrap();
        assert_eq!(output, mermaid_core::NO_MODEL_MESSAGE);
    }
}
