use intentor_core::IntentLabel;

/// A demonstration pair embedded in every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkedExample {
    pub query: &'static str,
    pub response: &'static str,
}

pub const WORKED_EXAMPLES: [WorkedExample; 3] = [
    WorkedExample {
        query: "What is the height of Mount Everest?",
        response: r#"{"internet": false, "intent": "ANSWER_QUESTION", "action": "The official elevation of Mount Everest is 8,848.86 meters (29,031.7 feet) above sea level."}"#,
    },
    WorkedExample {
        query: "What is the latest news about the Mars rover?",
        response: r#"{"internet": true, "intent": "SEARCH_WEB", "action": "https://www.google.com/search?q=latest+news+about+Mars+rover"}"#,
    },
    WorkedExample {
        query: "Wake me up at 7 AM",
        response: r#"{"internet": false, "intent": "SET_ALARM", "action": "set alarm for 7:00 AM"}"#,
    },
];

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instructions: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            instructions: classification_instructions(),
        }
    }

    /// Instruction block followed by the query, verbatim, and a response cue.
    pub fn build_classification_prompt(&self, query: &str) -> String {
        format!(
            "{instructions}\n--- USER QUERY ---\nQuery: \"{query}\"\nResponse:\n",
            instructions = self.instructions,
            query = query,
        )
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

pub fn build_prompt(query: &str) -> String {
    PromptBuilder::new().build_classification_prompt(query)
}

fn label_list() -> String {
    let labels = IntentLabel::ALL
        .iter()
        .map(|label| format!("\"{}\"", label.as_str()))
        .collect::<Vec<_>>();
    format!("[{}]", labels.join(", "))
}

fn classification_instructions() -> String {
    let mut prompt = format!(
        r#"You are an intelligent assistant that functions as an expert intent classifier.
Your task is to analyze a user's query and provide a structured JSON output.
Your response MUST be a valid JSON object and nothing else.
The JSON object must have the following three fields:
1. "internet": A boolean (`true` or `false`). Set to `false` for direct answers or local actions, and `true` for web searches.
2. "intent": A string. It must be one of the intents from this list: {labels}.
3. "action": A string.
   - If 'intent' is 'ANSWER_QUESTION', this field MUST contain the direct, concise answer.
   - If 'intent' is 'SEARCH_WEB', 'GET_WEATHER', or 'OPEN_YOUTUBE', this field MUST contain a complete, well-formed search URL (e.g., https://www.google.com/search?q=your+query).
   - For other intents, it should contain a description of the action.

--- EXAMPLES ---
"#,
        labels = label_list(),
    );

    for example in WORKED_EXAMPLES {
        prompt.push_str(&format!(
            "Query: \"{}\"\nResponse: {}\n",
            example.query, example.response
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_complete(prompt: &str) {
        for label in IntentLabel::ALL {
            assert!(prompt.contains(label.as_str()), "missing label {}", label);
        }
        for example in WORKED_EXAMPLES {
            assert!(prompt.contains(&format!("Query: \"{}\"", example.query)));
            assert!(prompt.contains(&format!("Response: {}", example.response)));
        }
    }

    #[test]
    fn embeds_query_verbatim_after_examples() {
        let query = "What is the capital of India?";
        let prompt = build_prompt(query);

        assert_complete(&prompt);
        let query_at = prompt.find("--- USER QUERY ---").unwrap();
        let examples_at = prompt.find("--- EXAMPLES ---").unwrap();
        assert!(examples_at < query_at);
        assert!(prompt.ends_with(&format!("Query: \"{}\"\nResponse:\n", query)));
    }

    #[test]
    fn query_is_not_trimmed_or_escaped() {
        let query = "  tabs\tand \"quotes\" and\nnewlines\u{7}  ";
        let prompt = build_prompt(query);
        assert!(prompt.contains(query));
        assert_complete(&prompt);
    }

    #[test]
    fn query_repeating_an_example_still_yields_full_template() {
        let query = WORKED_EXAMPLES[2].query;
        let prompt = build_prompt(query);
        assert_complete(&prompt);
        assert_eq!(prompt.matches(query).count(), 2);
    }

    #[test]
    fn empty_query_is_accepted() {
        let prompt = build_prompt("");
        assert!(prompt.ends_with("Query: \"\"\nResponse:\n"));
    }

    #[test]
    fn output_is_deterministic() {
        let builder = PromptBuilder::new();
        assert_eq!(
            builder.build_classification_prompt("play some jazz"),
            build_prompt("play some jazz")
        );
    }

    #[test]
    fn lists_exactly_three_examples() {
        let prompt = build_prompt("hello");
        assert_eq!(prompt.matches("Response: {").count(), 3);
    }

    #[test]
    fn states_url_rule_for_web_intents() {
        let builder = PromptBuilder::new();
        assert!(builder
            .instructions()
            .contains("'SEARCH_WEB', 'GET_WEATHER', or 'OPEN_YOUTUBE'"));
    }
}
