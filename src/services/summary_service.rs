use crate::core::{Scope, Session};
use crate::error::{PipelineError, Result};
use crate::providers::{InferenceClient, InferenceTransport};
use tracing::{error, info};

/// Outcome of a summarization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub scope: Scope,
    pub summary: String,
}

impl SummaryReport {
    pub fn message(&self) -> String {
        format!("Summary: {}", self.summary)
    }
}

/// Service producing one summary per scope
pub struct SummaryService;

impl SummaryService {
    /// Summarize all comments in `scope` with a single call and store the
    /// result as the scope summary. Failures leave the dataset unchanged.
    pub fn summarize<T: InferenceTransport>(
        session: &mut Session,
        client: &InferenceClient<T>,
        scope: Scope,
    ) -> Result<SummaryReport> {
        let dataset = session.dataset_mut()?;
        let comments = dataset.scope_comments(scope)?;
        if comments.is_empty() {
            return Err(PipelineError::precondition("No comments to summarize"));
        }
        info!("Summarizing {} {}", comments.len(), scope);

        let summary = client
            .summarize(&comments)
            .inspect_err(|e| error!("Summarization of {} failed: {}", scope, e))?
            .into_text();

        dataset.set_summary(scope, summary.clone());
        Ok(SummaryReport { scope, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;
    use crate::error::InferenceError;
    use crate::providers::testing::{client, ScriptedTransport};
    use crate::providers::SUMMARY_UNAVAILABLE;
    use crate::services::ThemeService;
    use pretty_assertions::assert_eq;

    fn session_with(comments: &[&str]) -> Session {
        let mut session = Session::new();
        session.replace(Dataset::from_comments(comments).unwrap());
        session
    }

    #[test]
    fn test_summarize_all_comments_single_call() {
        let mut session = session_with(&["great service", "bad wifi", "great food"]);
        let client = client(ScriptedTransport::new().ok(r#"[{"summary_text":"Mixed feedback."}]"#));

        let report = SummaryService::summarize(&mut session, &client, Scope::AllComments).unwrap();

        assert_eq!(report.summary, "Mixed feedback.");
        assert_eq!(report.message(), "Summary: Mixed feedback.");
        assert_eq!(client.transport().inputs(), vec!["great service bad wifi great food"]);
        assert_eq!(session.dataset().unwrap().summary(Scope::AllComments), Some("Mixed feedback."));
        assert_eq!(session.dataset().unwrap().summary(Scope::ThemeMatched), None);
    }

    #[test]
    fn test_summarize_theme_scope() {
        let mut session = session_with(&["great service", "bad wifi", "great food"]);
        ThemeService::apply(&mut session, "Praise", "great").unwrap();
        let client = client(ScriptedTransport::new().ok(r#"[{"summary_text":"Praise."}]"#));

        SummaryService::summarize(&mut session, &client, Scope::ThemeMatched).unwrap();

        assert_eq!(client.transport().inputs(), vec!["great service great food"]);
        assert_eq!(session.dataset().unwrap().summary(Scope::ThemeMatched), Some("Praise."));
        assert_eq!(session.dataset().unwrap().summary(Scope::AllComments), None);
    }

    #[test]
    fn test_missing_summary_field_degrades_to_sentinel() {
        let mut session = session_with(&["a"]);
        let client = client(ScriptedTransport::new().ok(r#"[{"unexpected":"field"}]"#));

        let report = SummaryService::summarize(&mut session, &client, Scope::AllComments).unwrap();
        assert_eq!(report.summary, SUMMARY_UNAVAILABLE);
        assert_eq!(session.dataset().unwrap().summary(Scope::AllComments), Some(SUMMARY_UNAVAILABLE));
    }

    #[test]
    fn test_transport_error_leaves_summary_unset() {
        let mut session = session_with(&["a"]);
        let client = client(ScriptedTransport::new().status(429, "rate limited"));

        let err = SummaryService::summarize(&mut session, &client, Scope::AllComments).unwrap_err();
        assert_eq!(err.to_string(), "API Error: 429\nrate limited");
        assert!(matches!(err, PipelineError::Inference(InferenceError::Status { .. })));
        assert_eq!(session.dataset().unwrap().summary(Scope::AllComments), None);
    }

    #[test]
    fn test_network_failure_keeps_previous_summary() {
        let mut session = session_with(&["a", "b"]);
        let ok = client(ScriptedTransport::new().ok(r#"[{"summary_text":"First pass."}]"#));
        SummaryService::summarize(&mut session, &ok, Scope::AllComments).unwrap();

        let down = client(ScriptedTransport::new().network_failure("dns lookup failed"));
        let err = SummaryService::summarize(&mut session, &down, Scope::AllComments).unwrap_err();

        assert!(matches!(err, PipelineError::Inference(InferenceError::Network(_))));
        assert_eq!(down.transport().call_count(), 1);
        assert_eq!(session.dataset().unwrap().summary(Scope::AllComments), Some("First pass."));
    }

    #[test]
    fn test_empty_scope_is_precondition_error() {
        let mut session = session_with(&["a"]);
        ThemeService::apply(&mut session, "t", "zzz").unwrap();
        let client = client(ScriptedTransport::new());

        assert!(matches!(
            SummaryService::summarize(&mut session, &client, Scope::ThemeMatched),
            Err(PipelineError::Precondition(_))
        ));
        assert_eq!(client.transport().call_count(), 0);
    }
}
