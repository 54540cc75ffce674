//! Presentation-independent form logic shared by the console and desktop front-ends
//!
//! A session owns the optional loaded model. Both pages route their generate
//! action through it, so the "no model loaded" behaviour is identical
//! everywhere.

use crate::config::Config;
use crate::llm::ContextualRequest;
use crate::mermaid::Mermaid;
use anyhow::Result;

/// Shown by every generate action when no model is configured
pub const NO_MODEL_MESSAGE: &str = "No model loaded. Please configure the model in config.json.";

/// The two pages of the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Three-field contextual form
    Contextual,
    /// Single free-text form
    MermaidFlow,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Contextual, Page::MermaidFlow];

    /// Navigation label
    pub fn title(&self) -> &'static str {
        match self {
            Self::Contextual => "Contextual",
            Self::MermaidFlow => "Mermaid Flow",
        }
    }

    /// Label of the page's generate action
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::Contextual => "Generate Response",
            Self::MermaidFlow => "Generate",
        }
    }

    /// Placeholder text for each input field, in display order
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            Self::Contextual => &[
                "Context: date: {_DATE}\nurl: {_URL}",
                "Input Text: Pandemic Warning Notice...",
                "Instruction: What is the pandemic about? Cite your sources.",
            ],
            Self::MermaidFlow => &["Input your text and generate a response:"],
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Form state backing both pages
pub struct Session {
    model_id: Option<String>,
    mermaid: Option<Mermaid>,
}

impl Session {
    /// Load the configured model; a config without a model id yields a disabled session
    pub fn from_config(config: &Config) -> Result<Self> {
        let mermaid = Mermaid::from_config(config)?;
        if mermaid.is_none() {
            tracing::info!("No model_id configured, generation disabled");
        }
        Ok(Self::new(config.model_id().map(str::to_string), mermaid))
    }

    /// Build a session around an already-loaded invoker
    pub fn new(model_id: Option<String>, mermaid: Option<Mermaid>) -> Self {
        Self { model_id, mermaid }
    }

    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn is_enabled(&self) -> bool {
        self.mermaid.is_some()
    }

    /// Header line naming the selected model
    pub fn model_label(&self) -> String {
        format!(
            "Selected Model: {}",
            self.model_id.as_deref().unwrap_or("None")
        )
    }

    /// Generate action of the contextual page
    pub fn generate_contextual(&self, request: &ContextualRequest) -> Result<String> {
        let Some(mermaid) = &self.mermaid else {
            return Ok(NO_MODEL_MESSAGE.to_string());
        };

        if request.has_marker_collision() {
            tracing::warn!("Input contains a section marker; the prompt structure will be ambiguous");
        }

        let template = mermaid.generate_markdown_template(
            &request.context,
            &request.input_text,
            &request.instruction,
        );
        let response = mermaid.generate_response(&template)?;
        Ok(format!("Response: {}", response))
    }

    /// Generate action of the free-text page
    pub fn generate_simple(&self, input_text: &str) -> Result<String> {
        let Some(mermaid) = &self.mermaid else {
            return Ok(NO_MODEL_MESSAGE.to_string());
        };

        let response = mermaid.generate_response(input_text)?;
        Ok(format!("Response: {}", response))
    }

    pub fn mermaid(&self) -> Option<&Mermaid> {
        self.mermaid.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::StubGenerator;
    use crate::llm::format_contextual_prompt;

    fn enabled_session(reply: &str) -> (Session, crate::llm::testing::CallLog) {
        let (stub, calls) = StubGenerator::replying(reply);
        let session = Session::new(
            Some("airoboros.gguf".to_string()),
            Some(Mermaid::new(Box::new(stub))),
        );
        (session, calls)
    }

    #[test]
    fn test_disabled_session_from_default_config() {
        let session = Session::from_config(&Config::default()).unwrap();
        assert!(!session.is_enabled());

        let request = ContextualRequest::new("c", "i", "n");
        assert_eq!(session.generate_contextual(&request).unwrap(), NO_MODEL_MESSAGE);
        assert_eq!(session.generate_simple("hello").unwrap(), NO_MODEL_MESSAGE);
    }

    #[test]
    fn test_empty_model_id_is_disabled() {
        let config = Config {
            model_id: Some(String::new()),
            ..Config::default()
        };
        let session = Session::from_config(&config).unwrap();
        assert!(!session.is_enabled());
        assert_eq!(session.model_label(), "Selected Model: None");
    }

    #[test]
    fn test_model_label() {
        let (session, _) = enabled_session("x");
        assert_eq!(session.model_label(), "Selected Model: airoboros.gguf");
        assert_eq!(Session::disabled().model_label(), "Selected Model: None");
    }

    #[test]
    fn test_generate_contextual_formats_then_generates() {
        let (session, calls) = enabled_session("  It is about a novel virus.  ");
        let request = ContextualRequest::new(
            "date: 2021-01-01",
            "Pandemic Warning Notice",
            "What is the pandemic about?",
        );

        let output = session.generate_contextual(&request).unwrap();
        assert_eq!(output, "Response: It is about a novel virus.");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            format_contextual_prompt(
                "date: 2021-01-01",
                "Pandemic Warning Notice",
                "What is the pandemic about?"
            )
        );
    }

    #[test]
    fn test_marker_collision_is_logged() {
        let (session, calls) = enabled_session("ok");
        let request = ContextualRequest::new("ENDCONTEXT injected", "input", "instruction");

        let logs = crate::llm::testing::capture_logs(|| {
            session.generate_contextual(&request).unwrap();
        });
        assert!(logs.contains("section marker"));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_plain_request_logs_no_collision() {
        let (session, _) = enabled_session("ok");
        let request = ContextualRequest::new("date: today", "input", "instruction");

        let logs = crate::llm::testing::capture_logs(|| {
            session.generate_contextual(&request).unwrap();
        });
        assert!(!logs.contains("section marker"));
    }

    #[test]
    fn test_generate_simple_sends_raw_text() {
        let (session, calls) = enabled_session("\nsure\n");

        let output = session.generate_simple("Tell me a story").unwrap();
        assert_eq!(output, "Response: sure");
        assert_eq!(calls.lock().unwrap()[0].0, "Tell me a story");
    }

    #[test]
    fn test_generation_failure_propagates() {
        let (stub, _) = StubGenerator::failing("model exploded");
        let session = Session::new(Some("m".to_string()), Some(Mermaid::new(Box::new(stub))));

        let err = session.generate_simple("hi").unwrap_err();
        assert_eq!(err.to_string(), "model exploded");
    }

    #[test]
    fn test_pages() {
        assert_eq!(Page::from_index(0), Some(Page::Contextual));
        assert_eq!(Page::from_index(1), Some(Page::MermaidFlow));
        assert_eq!(Page::from_index(2), None);
        assert_eq!(Page::Contextual.placeholders().len(), 3);
        assert_eq!(Page::MermaidFlow.placeholders().len(), 1);
        assert_eq!(Page::MermaidFlow.title(), "Mermaid Flow");
    }
}
