// crates/nlu/src/interpreter.rs

use intentor_core::{
    is_web_url, ClassificationResult, Intent, IntentLabel, IntentorError, IntentorResult,
    ERROR_INTENT,
};
use intentor_llm_connector::CompletionResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use tracing::{debug, warn};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FenceStripping {
    /// Remove every fence marker wherever it occurs.
    #[default]
    Anywhere,
    /// Remove a fence only where it opens or closes the reply.
    Anchored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// `internet` must be a boolean and `intent` one of the known labels.
    #[default]
    Strict,
    /// Accept any `intent` string and a null `internet`.
    Passthrough,
}

impl std::str::FromStr for FenceStripping {
    type Err = IntentorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anywhere" => Ok(FenceStripping::Anywhere),
            "anchored" => Ok(FenceStripping::Anchored),
            other => Err(IntentorError::Config(format!("unknown fence stripping mode: {}", other))),
        }
    }
}

impl std::str::FromStr for SchemaPolicy {
    type Err = IntentorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(SchemaPolicy::Strict),
            "passthrough" => Ok(SchemaPolicy::Passthrough),
            other => Err(IntentorError::Config(format!("unknown schema policy: {}", other))),
        }
    }
}

/// Turns a completion (or its failure) into a classification result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterpreter {
    fences: FenceStripping,
    schema: SchemaPolicy,
}

impl ResponseInterpreter {
    pub fn new(fences: FenceStripping, schema: SchemaPolicy) -> Self {
        Self { fences, schema }
    }

    /// Never fails: any error becomes the uniform error record.
    pub fn interpret(
        &self,
        completion: IntentorResult<CompletionResponse>,
    ) -> ClassificationResult {
        let response = match completion {
            Ok(response) => response,
            Err(e) => return ClassificationResult::failure(e.to_string()),
        };

        match self.parse(&response.content) {
            Ok(result) => result,
            Err(e) => {
                debug!(raw = %response.content, "model reply rejected: {}", e);
                ClassificationResult::failure(e.to_string())
            }
        }
    }

    pub fn clean<'a>(&self, raw: &'a str) -> std::borrow::Cow<'a, str> {
        let trimmed = raw.trim();
        match self.fences {
            FenceStripping::Anywhere => {
                if trimmed.contains(FENCE) {
                    trimmed.replace(JSON_FENCE, "").replace(FENCE, "").into()
                } else {
                    trimmed.into()
                }
            }
            FenceStripping::Anchored => {
                let body = trimmed
                    .strip_prefix(JSON_FENCE)
                    .or_else(|| trimmed.strip_prefix(FENCE))
                    .unwrap_or(trimmed);
                body.strip_suffix(FENCE).unwrap_or(body).trim().into()
            }
        }
    }

    pub fn parse(&self, raw: &str) -> IntentorResult<ClassificationResult> {
        let cleaned = self.clean(raw);
        let value: Value = serde_json::from_str(&cleaned)
            .map_err(|e| IntentorError::Parse(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| IntentorError::Parse("expected a JSON object".to_string()))?;

        let result = ClassificationResult {
            internet: self.internet(object)?,
            intent: self.intent(object)?,
            action: required(object, "action")?
                .as_str()
                .ok_or_else(|| wrong_type("action", "a string"))?
                .to_string(),
        };

        if let Some(label) = result.intent.label() {
            if label.expects_url() && !is_web_url(&result.action) {
                warn!(intent = %label, action = %result.action, "expected a search URL in action");
            }
        }

        Ok(result)
    }

    fn internet(&self, object: &JsonMap<String, Value>) -> IntentorResult<Option<bool>> {
        match (required(object, "internet")?, self.schema) {
            (Value::Bool(flag), _) => Ok(Some(*flag)),
            (Value::Null, SchemaPolicy::Passthrough) => Ok(None),
            (_, SchemaPolicy::Strict) => Err(IntentorError::Schema(
                "field `internet` must be a boolean".to_string(),
            )),
            (_, SchemaPolicy::Passthrough) => Err(wrong_type("internet", "a boolean or null")),
        }
    }

    fn intent(&self, object: &JsonMap<String, Value>) -> IntentorResult<Intent> {
        let raw = required(object, "intent")?
            .as_str()
            .ok_or_else(|| wrong_type("intent", "a string"))?;

        // Reserved for failure records under every policy.
        if raw == ERROR_INTENT {
            return Err(IntentorError::Schema(format!("intent `{}` is reserved", ERROR_INTENT)));
        }

        match (raw.parse::<IntentLabel>(), self.schema) {
            (Ok(label), _) => Ok(Intent::Label(label)),
            (Err(e), SchemaPolicy::Strict) => Err(IntentorError::Schema(e)),
            (Err(_), SchemaPolicy::Passthrough) => Ok(Intent::Unlisted(raw.to_string())),
        }
    }
}

fn required<'a>(object: &'a JsonMap<String, Value>, field: &str) -> IntentorResult<&'a Value> {
    object
        .get(field)
        .ok_or_else(|| IntentorError::Parse(format!("missing field `{}`", field)))
}

fn wrong_type(field: &str, expected: &str) -> IntentorError {
    IntentorError::Parse(format!("field `{}` must be {}", field, expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVEREST: &str =
        r#"{"internet": false, "intent": "ANSWER_QUESTION", "action": "8,848.86 meters"}"#;

    fn strict() -> ResponseInterpreter {
        ResponseInterpreter::default()
    }

    fn reply(text: &str) -> IntentorResult<CompletionResponse> {
        Ok(CompletionResponse::text(text))
    }

    #[test]
    fn parses_well_formed_reply() {
        let result = strict().interpret(reply(EVEREST));
        assert_eq!(
            result,
            ClassificationResult::new(false, IntentLabel::AnswerQuestion, "8,848.86 meters")
        );
    }

    #[test]
    fn interpretation_is_idempotent() {
        let interpreter = strict();
        assert_eq!(interpreter.interpret(reply(EVEREST)), interpreter.interpret(reply(EVEREST)));
    }

    #[test]
    fn fenced_and_bare_replies_agree_in_both_modes() {
        let fenced = format!("```json\n{}\n```", EVEREST);
        let plain_fence = format!("```\n{}\n```", EVEREST);
        for fences in [FenceStripping::Anywhere, FenceStripping::Anchored] {
            let interpreter = ResponseInterpreter::new(fences, SchemaPolicy::Strict);
            let bare = interpreter.interpret(reply(EVEREST));
            assert!(!bare.is_error());
            assert_eq!(interpreter.interpret(reply(&fenced)), bare);
            assert_eq!(interpreter.interpret(reply(&plain_fence)), bare);
        }
    }

    #[test]
    fn anywhere_mode_strips_fences_inside_values() {
        let raw = r#"{"internet": false, "intent": "TELL_JOKE", "action": "use ```json blocks"}"#;
        let loose = ResponseInterpreter::new(FenceStripping::Anywhere, SchemaPolicy::Strict);
        let anchored = ResponseInterpreter::new(FenceStripping::Anchored, SchemaPolicy::Strict);

        assert_eq!(loose.interpret(reply(raw)).action, "use  blocks");
        assert_eq!(anchored.interpret(reply(raw)).action, "use ```json blocks");
    }

    #[test]
    fn transport_failure_yields_error_record() {
        let result = strict().interpret(Err(IntentorError::Auth("API key not valid".to_string())));
        assert_eq!(
            result,
            ClassificationResult::failure("Authorization error: API key not valid")
        );
        assert_eq!(result.internet, None);
    }

    #[test]
    fn truncated_json_is_rejected_whole() {
        let result = strict().interpret(reply(r#"{"internet": true, "intent": "SEARCH_WEB""#));
        assert!(result.is_error());
        assert_eq!(result.internet, None);
        assert!(result.action.starts_with("Parse error:"));
    }

    #[test]
    fn free_text_reply_is_a_parse_failure() {
        let result = strict().interpret(reply("Sure! The answer is 42."));
        assert!(result.is_error());
    }

    #[test]
    fn non_object_json_is_rejected() {
        let result = strict().interpret(reply("[1, 2, 3]"));
        assert_eq!(result.action, "Parse error: expected a JSON object");
    }

    #[test]
    fn missing_field_is_reported() {
        let result = strict().interpret(reply(r#"{"internet": false, "intent": "UNKNOWN"}"#));
        assert_eq!(result.action, "Parse error: missing field `action`");
    }

    #[test]
    fn non_string_action_is_rejected() {
        let result = strict().interpret(reply(
            r#"{"internet": false, "intent": "UNKNOWN", "action": 7}"#,
        ));
        assert_eq!(result.action, "Parse error: field `action` must be a string");
    }

    #[test]
    fn strict_policy_rejects_unknown_labels_and_null_internet() {
        let unknown = strict().interpret(reply(
            r#"{"internet": false, "intent": "BOOK_FLIGHT", "action": "x"}"#,
        ));
        assert!(unknown.is_error());
        assert!(unknown.action.contains("BOOK_FLIGHT"));

        let null_internet = strict().interpret(reply(
            r#"{"internet": null, "intent": "UNKNOWN", "action": "x"}"#,
        ));
        assert_eq!(
            null_internet.action,
            "Schema error: field `internet` must be a boolean"
        );

        let model_says_error = strict().interpret(reply(
            r#"{"internet": false, "intent": "error", "action": "x"}"#,
        ));
        assert_eq!(
            model_says_error.action,
            "Schema error: intent `error` is reserved"
        );
    }

    #[test]
    fn passthrough_policy_keeps_unlisted_labels() {
        let interpreter =
            ResponseInterpreter::new(FenceStripping::Anywhere, SchemaPolicy::Passthrough);
        let result = interpreter.interpret(reply(
            r#"{"internet": null, "intent": "BOOK_FLIGHT", "action": "book it"}"#,
        ));

        assert_eq!(result.internet, None);
        assert_eq!(result.intent, Intent::Unlisted("BOOK_FLIGHT".to_string()));
        assert_eq!(result.action, "book it");

        let wrong = interpreter.interpret(reply(
            r#"{"internet": "yes", "intent": "UNKNOWN", "action": "x"}"#,
        ));
        assert!(wrong.is_error());
    }

    #[test]
    fn passthrough_policy_still_rejects_the_error_token() {
        let interpreter =
            ResponseInterpreter::new(FenceStripping::Anywhere, SchemaPolicy::Passthrough);
        let result = interpreter.interpret(reply(
            r#"{"internet": false, "intent": "error", "action": "pretend failure"}"#,
        ));

        assert!(result.is_error());
        assert_eq!(result.internet, None);
        assert_eq!(result.action, "Schema error: intent `error` is reserved");
    }

    #[test]
    fn url_intent_without_url_is_kept() {
        let result = strict().interpret(reply(
            r#"{"internet": true, "intent": "GET_WEATHER", "action": "check the weather"}"#,
        ));
        assert_eq!(result.intent, Intent::Label(IntentLabel::GetWeather));
        assert_eq!(result.action, "check the weather");
    }

    #[test]
    fn anchored_mode_handles_prose_free_fences_only() {
        let interpreter = ResponseInterpreter::new(FenceStripping::Anchored, SchemaPolicy::Strict);
        assert_eq!(interpreter.clean("  ```json\n{}\n```  "), "{}");
        assert_eq!(interpreter.clean("{}"), "{}");
        assert_eq!(interpreter.clean("note ```json {} ```"), "note ```json {}");
    }
}
