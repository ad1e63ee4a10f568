//! HTML front page.
//!
//! Rendered with `handlebars`, whose default escaping covers every value the
//! model or the user supplies.

use handlebars::Handlebars;
use intentor_core::{is_web_url, ClassificationResult, IntentorError, IntentorResult, ResultView};
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");
const INDEX: &str = "index";

pub struct PageRenderer {
    registry: Handlebars<'static>,
}

#[derive(Debug, Default, Serialize)]
struct PageData<'a> {
    query: &'a str,
    config_error: Option<&'a str>,
    result: Option<ResultData<'a>>,
}

#[derive(Debug, Default, Serialize)]
struct ResultData<'a> {
    intent: &'a str,
    text: &'a str,
    failure: bool,
    answer: bool,
    web: bool,
    local: bool,
    linkable: bool,
}

impl<'a> From<&'a ClassificationResult> for ResultData<'a> {
    fn from(result: &'a ClassificationResult) -> Self {
        let intent = result.intent.as_str();
        match result.view() {
            ResultView::Failure { message } => Self {
                intent,
                text: message,
                failure: true,
                ..Default::default()
            },
            ResultView::Answer { answer, .. } => Self {
                intent,
                text: answer,
                answer: true,
                ..Default::default()
            },
            ResultView::WebAction { url, .. } => Self {
                intent,
                text: url,
                web: true,
                linkable: is_web_url(url),
                ..Default::default()
            },
            ResultView::LocalAction { description, .. } => Self {
                intent,
                text: description,
                local: true,
                ..Default::default()
            },
        }
    }
}

impl PageRenderer {
    pub fn new() -> IntentorResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry
            .register_template_string(INDEX, INDEX_TEMPLATE)
            .map_err(|e| IntentorError::Server(format!("Invalid page template: {}", e)))?;

        Ok(Self { registry })
    }

    /// `config_error` is shown as a banner above the form.
    pub fn render(
        &self,
        query: &str,
        config_error: Option<&str>,
        result: Option<&ClassificationResult>,
    ) -> IntentorResult<String> {
        let data = PageData {
            query,
            config_error,
            result: result.map(ResultData::from),
        };

        self.registry
            .render(INDEX, &data)
            .map_err(|e| IntentorError::Server(format!("Failed to render page: {}", e)))
    }
}
