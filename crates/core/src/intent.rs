// crates/core/src/intent.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel intent reported when a request could not be classified.
pub const ERROR_INTENT: &str = "error";

/// Closed set of labels the model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentLabel {
    GetWeather,
    SearchWeb,
    SetAlarm,
    PlayMusic,
    OpenYoutube,
    TellJoke,
    GetNews,
    AnswerQuestion,
    AddReminder,
    Unknown,
}

impl IntentLabel {
    pub const ALL: [IntentLabel; 10] = [
        IntentLabel::GetWeather,
        IntentLabel::SearchWeb,
        IntentLabel::SetAlarm,
        IntentLabel::PlayMusic,
        IntentLabel::OpenYoutube,
        IntentLabel::TellJoke,
        IntentLabel::GetNews,
        IntentLabel::AnswerQuestion,
        IntentLabel::AddReminder,
        IntentLabel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::GetWeather => "GET_WEATHER",
            IntentLabel::SearchWeb => "SEARCH_WEB",
            IntentLabel::SetAlarm => "SET_ALARM",
            IntentLabel::PlayMusic => "PLAY_MUSIC",
            IntentLabel::OpenYoutube => "OPEN_YOUTUBE",
            IntentLabel::TellJoke => "TELL_JOKE",
            IntentLabel::GetNews => "GET_NEWS",
            IntentLabel::AnswerQuestion => "ANSWER_QUESTION",
            IntentLabel::AddReminder => "ADD_REMINDER",
            IntentLabel::Unknown => "UNKNOWN",
        }
    }

    /// Labels whose `action` must be a complete search URL.
    pub fn expects_url(&self) -> bool {
        matches!(
            self,
            IntentLabel::SearchWeb | IntentLabel::GetWeather | IntentLabel::OpenYoutube
        )
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown intent label '{}'", s))
    }
}

/// Intent carried by a classification result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Intent {
    Label(IntentLabel),
    /// A label outside the closed set, passed through unchanged.
    Unlisted(String),
    Error,
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Intent::Label(label) => label.as_str(),
            Intent::Unlisted(raw) => raw,
            Intent::Error => ERROR_INTENT,
        }
    }

    pub fn label(&self) -> Option<IntentLabel> {
        match self {
            Intent::Label(label) => Some(*label),
            _ => None,
        }
    }
}

impl From<IntentLabel> for Intent {
    fn from(label: IntentLabel) -> Self {
        Intent::Label(label)
    }
}

impl From<String> for Intent {
    fn from(raw: String) -> Self {
        if raw == ERROR_INTENT {
            return Intent::Error;
        }
        match raw.parse::<IntentLabel>() {
            Ok(label) => Intent::Label(label),
            Err(_) => Intent::Unlisted(raw),
        }
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.as_str().to_string()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reply for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub internet: Option<bool>,
    pub intent: Intent,
    pub action: String,
}

impl ClassificationResult {
    pub fn new(internet: bool, intent: impl Into<Intent>, action: impl Into<String>) -> Self {
        Self {
            internet: Some(internet),
            intent: intent.into(),
            action: action.into(),
        }
    }

    /// The uniform error record shared by transport and parse failures.
    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            internet: None,
            intent: Intent::Error,
            action: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.intent == Intent::Error
    }

    pub fn view(&self) -> ResultView<'_> {
        match &self.intent {
            Intent::Error => ResultView::Failure {
                message: &self.action,
            },
            Intent::Label(IntentLabel::AnswerQuestion) => ResultView::Answer {
                intent: &self.intent,
                answer: &self.action,
            },
            intent if self.internet == Some(true) => ResultView::WebAction {
                intent,
                url: &self.action,
            },
            intent => ResultView::LocalAction {
                intent,
                description: &self.action,
            },
        }
    }
}

/// How a result should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView<'a> {
    Failure { message: &'a str },
    Answer { intent: &'a Intent, answer: &'a str },
    WebAction { intent: &'a Intent, url: &'a str },
    LocalAction { intent: &'a Intent, description: &'a str },
}

/// Whether `action` is something a browser can safely follow.
pub fn is_web_url(action: &str) -> bool {
    let action = action.trim();
    action.starts_with("https://") || action.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_round_trip_through_their_tokens() {
        for label in IntentLabel::ALL {
            assert_eq!(label.as_str().parse::<IntentLabel>().unwrap(), label);
        }
        assert!("get_weather".parse::<IntentLabel>().is_err());
    }

    #[test]
    fn serde_names_match_prompt_tokens() {
        for label in IntentLabel::ALL {
            assert_eq!(serde_json::to_value(label).unwrap(), json!(label.as_str()));
        }
    }

    #[test]
    fn intent_from_string_separates_sentinel_and_unlisted() {
        assert_eq!(Intent::from("error".to_string()), Intent::Error);
        assert_eq!(
            Intent::from("SET_ALARM".to_string()),
            Intent::Label(IntentLabel::SetAlarm)
        );
        assert_eq!(
            Intent::from("BOOK_FLIGHT".to_string()),
            Intent::Unlisted("BOOK_FLIGHT".to_string())
        );
    }

    #[test]
    fn failure_serializes_with_null_internet() {
        let result = ClassificationResult::failure("quota exhausted");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"internet": null, "intent": "error", "action": "quota exhausted"})
        );
    }

    #[test]
    fn view_prefers_answer_over_web_action() {
        let result = ClassificationResult::new(true, IntentLabel::AnswerQuestion, "8,848.86 m");
        assert!(matches!(result.view(), ResultView::Answer { answer: "8,848.86 m", .. }));
    }

    #[test]
    fn view_selects_web_and_local_actions() {
        let web = ClassificationResult::new(
            true,
            IntentLabel::SearchWeb,
            "https://www.google.com/search?q=mars+rover",
        );
        assert!(matches!(web.view(), ResultView::WebAction { .. }));

        let local = ClassificationResult::new(false, IntentLabel::SetAlarm, "set alarm for 7:00 AM");
        assert!(matches!(
            local.view(),
            ResultView::LocalAction {
                description: "set alarm for 7:00 AM",
                ..
            }
        ));

        let failed = ClassificationResult::failure("boom");
        assert_eq!(failed.view(), ResultView::Failure { message: "boom" });
    }

    #[test]
    fn only_http_urls_are_web_urls() {
        assert!(is_web_url("https://www.youtube.com/results?search_query=cats"));
        assert!(is_web_url(" http://example.com "));
        assert!(!is_web_url("javascript:alert(1)"));
        assert!(!is_web_url("set alarm"));
    }
}
