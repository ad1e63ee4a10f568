//! Plain-text rendering of a classification for the terminal.

use std::fmt::Write;

use intentor_core::{is_web_url, ClassificationResult, ResultView};

pub fn render(result: &ClassificationResult) -> String {
    let mut out = String::from("Classification Result\n");

    // fmt::Write into a String cannot fail
    let _ = match result.view() {
        ResultView::Failure { message } => writeln!(out, "An error occurred: {}", message),
        ResultView::Answer { intent, answer } => {
            writeln!(out, "Intent: {}\nDirect Answer: {}", intent, answer)
        }
        ResultView::WebAction { intent, url } if is_web_url(url) => writeln!(
            out,
            "Intent: {}\nWeb Action Required\nClick here to perform the search: {}",
            intent,
            url.trim()
        ),
        ResultView::WebAction { intent, url } => {
            writeln!(out, "Intent: {}\nWeb Action Required\nAction: {}", intent, url)
        }
        ResultView::LocalAction { intent, description } => {
            writeln!(out, "Intent: {}\nLocal Action: {}", intent, description)
        }
    };

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use intentor_core::IntentLabel;

    #[test]
    fn renders_each_view() {
        let answer = ClassificationResult::new(false, IntentLabel::AnswerQuestion, "8,848 meters.");
        assert_eq!(
            render(&answer),
            "Classification Result\nIntent: ANSWER_QUESTION\nDirect Answer: 8,848 meters.\n"
        );

        let web = ClassificationResult::new(true, IntentLabel::GetNews, "https://news.google.com/search?q=mars");
        assert!(render(&web).ends_with("Click here to perform the search: https://news.google.com/search?q=mars\n"));

        let local = ClassificationResult::new(false, IntentLabel::AddReminder, "Remind me to call mom.");
        assert!(render(&local).contains("Local Action: Remind me to call mom."));

        let failure = ClassificationResult::failure("Authorization error: API key not valid");
        assert_eq!(
            render(&failure),
            "Classification Result\nAn error occurred: Authorization error: API key not valid\n"
        );
    }

    #[test]
    fn non_url_web_action_is_not_offered_as_a_link() {
        let odd = ClassificationResult::new(true, IntentLabel::SearchWeb, "search for mars news");
        let text = render(&odd);
        assert!(text.contains("Action: search for mars news"));
        assert!(!text.contains("Click here"));
    }
}
