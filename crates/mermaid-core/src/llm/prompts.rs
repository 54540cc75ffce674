//! Contextual-request prompt template

/// Literal markers delimiting the sections of a contextual request
pub const SECTION_MARKERS: [&str; 6] = [
    "BEGININPUT",
    "ENDINPUT",
    "BEGINCONTEXT",
    "ENDCONTEXT",
    "BEGININSTRUCTION",
    "ENDINSTRUCTION",
];

/// Cue after which the model continues with its answer
pub const RESPONSE_CUE: &str = "### Contextual Response:";

/// The three caller-supplied fields of the contextual page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextualRequest {
    pub context: String,
    pub input_text: String,
    pub instruction: String,
}

impl ContextualRequest {
    pub fn new(
        context: impl Into<String>,
        input_text: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            input_text: input_text.into(),
            instruction: instruction.into(),
        }
    }

    /// Render the request with the contextual template
    pub fn to_prompt(&self) -> String {
        format_contextual_prompt(&self.context, &self.input_text, &self.instruction)
    }

    /// Whether any field embeds a section marker and would corrupt the template
    pub fn has_marker_collision(&self) -> bool {
        [&self.context, &self.input_text, &self.instruction]
            .into_iter()
            .any(|field| contains_marker(field))
    }
}

/// Build the contextual-request prompt
///
/// Inputs are substituted verbatim. Nothing is escaped, so a field that
/// contains one of [`SECTION_MARKERS`] changes the structure the model sees.
pub fn format_contextual_prompt(context: &str, input_text: &str, instruction: &str) -> String {
    format!(
        "Contextual-Request:\n\
         BEGININPUT\n\
         BEGINCONTEXT\n\
         {context}\n\
         ENDCONTEXT\n\
         {input_text}\n\
         ENDINPUT\n\
         BEGININSTRUCTION\n\
         {instruction}\n\
         ENDINSTRUCTION\n\
         \n\
         {RESPONSE_CUE}\n"
    )
}

/// Check whether text contains a section marker or the response cue
pub fn contains_marker(text: &str) -> bool {
    SECTION_MARKERS.iter().any(|marker| text.contains(marker)) || text.contains(RESPONSE_CUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: &str = "Contextual-Request:
BEGININPUT
BEGINCONTEXT
date: 2021-01-01
url: https://web.site/123
ENDCONTEXT
Pandemic Warning Notice
ENDINPUT
BEGININSTRUCTION
What is the pandemic about? Cite your sources.
ENDINSTRUCTION

### Contextual Response:
";

    #[test]
    fn test_format_matches_literal_layout() {
        let prompt = format_contextual_prompt(
            "date: 2021-01-01\nurl: https://web.site/123",
            "Pandemic Warning Notice",
            "What is the pandemic about? Cite your sources.",
        );
        assert_eq!(prompt, EXPECTED);
    }

    #[test]
    fn test_format_empty_fields() {
        let prompt = format_contextual_prompt("", "", "");
        assert_eq!(
            prompt,
            "Contextual-Request:\nBEGININPUT\nBEGINCONTEXT\n\nENDCONTEXT\n\nENDINPUT\n\
             BEGININSTRUCTION\n\nENDINSTRUCTION\n\n### Contextual Response:\n"
        );
    }

    #[test]
    fn test_format_substitutes_verbatim() {
        // Braces, surrounding whitespace and unicode pass through untouched
        let context = "  {date} \t";
        let input = "naïve {input_text}\n\n";
        let instruction = "{instruction}";
        let prompt = format_contextual_prompt(context, input, instruction);

        assert!(prompt.contains("BEGINCONTEXT\n  {date} \t\nENDCONTEXT\n"));
        assert!(prompt.contains("ENDCONTEXT\nnaïve {input_text}\n\n\nENDINPUT\n"));
        assert!(prompt.contains("BEGININSTRUCTION\n{instruction}\nENDINSTRUCTION\n"));
    }

    #[test]
    fn test_markers_in_fields_are_not_escaped() {
        let prompt = format_contextual_prompt("ENDCONTEXT", "x", "y");
        assert_eq!(prompt.matches("ENDCONTEXT").count(), 2);
    }

    #[test]
    fn test_request_to_prompt() {
        let request = ContextualRequest::new("c", "i", "n");
        assert_eq!(request.to_prompt(), format_contextual_prompt("c", "i", "n"));
    }

    #[test]
    fn test_contains_marker() {
        assert!(contains_marker("before BEGININPUT after"));
        assert!(contains_marker("### Contextual Response:"));
        assert!(!contains_marker("begininput"));
        assert!(!contains_marker("plain text"));
    }

    #[test]
    fn test_marker_collision() {
        assert!(ContextualRequest::new("", "ENDINPUT", "").has_marker_collision());
        assert!(!ContextualRequest::new("a", "b", "c").has_marker_collision());
    }
}
