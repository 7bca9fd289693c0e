use crate::core::{LabelCounts, Scope, Session};
use crate::error::Result;
use crate::providers::{InferenceClient, InferenceTransport};
use tracing::{error, info};

/// Outcome of a sentiment classification run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentReport {
    pub scope: Scope,
    pub counts: LabelCounts,
}

impl SentimentReport {
    pub fn message(&self) -> String {
        format!("Results:\n{}", self.counts)
    }
}

/// Service for per-comment sentiment classification
pub struct SentimentService;

impl SentimentService {
    /// Classify every comment in `scope`, one call at a time.
    ///
    /// The label column for `scope` is written only after every call has
    /// succeeded; the first failure aborts the run and leaves the dataset
    /// untouched.
    pub fn classify<T: InferenceTransport>(
        session: &mut Session,
        client: &InferenceClient<T>,
        scope: Scope,
    ) -> Result<SentimentReport> {
        let dataset = session.dataset_mut()?;
        let rows = dataset.scope_rows(scope)?;
        info!("Classifying {} {}", rows.len(), scope);

        let mut labels: Vec<Option<String>> = vec![None; dataset.row_count()];
        let mut counts = LabelCounts::new();
        for (n, &row) in rows.iter().enumerate() {
            let comment = dataset.comment(row).unwrap_or_default();
            let result = client.classify(comment).inspect_err(|e| {
                error!("Classification aborted at comment {} of {}: {}", n + 1, rows.len(), e);
            })?;
            counts.add(&result.label);
            labels[row] = Some(result.label);
        }

        dataset.set_labels(scope, labels);
        info!("Classified {} {}: {}", rows.len(), scope, counts);
        Ok(SentimentReport { scope, counts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;
    use crate::error::{InferenceError, PipelineError};
    use crate::providers::testing::{client, ScriptedTransport};
    use crate::services::ThemeService;
    use pretty_assertions::assert_eq;

    const POSITIVE: &str = r#"[[{"label":"POSITIVE","score":0.99}]]"#;
    const NEGATIVE: &str = r#"[[{"label":"NEGATIVE","score":0.97}]]"#;

    fn session_with(comments: &[&str]) -> Session {
        let mut session = Session::new();
        session.replace(Dataset::from_comments(comments).unwrap());
        session
    }

    #[test]
    fn test_classify_all_comments() {
        let mut session = session_with(&["great food", "bad wifi"]);
        let client = client(ScriptedTransport::new().ok(POSITIVE).ok(NEGATIVE));

        let report = SentimentService::classify(&mut session, &client, Scope::AllComments).unwrap();

        assert_eq!(report.counts.get("POSITIVE"), 1);
        assert_eq!(report.counts.get("NEGATIVE"), 1);
        let ds = session.dataset().unwrap();
        assert_eq!(ds.label(Scope::AllComments, 0), Some("POSITIVE"));
        assert_eq!(ds.label(Scope::AllComments, 1), Some("NEGATIVE"));
        assert_eq!(client.transport().inputs(), vec!["great food", "bad wifi"]);
    }

    #[test]
    fn test_classify_theme_scope_only_sends_matched_rows() {
        let mut session = session_with(&["great service", "bad wifi", "great food"]);
        ThemeService::apply(&mut session, "Praise", "great").unwrap();
        let client = client(ScriptedTransport::new().ok(POSITIVE).ok(POSITIVE));

        let report = SentimentService::classify(&mut session, &client, Scope::ThemeMatched).unwrap();

        assert_eq!(report.counts.get("POSITIVE"), 2);
        assert_eq!(client.transport().inputs(), vec!["great service", "great food"]);
        let ds = session.dataset().unwrap();
        assert_eq!(ds.label(Scope::ThemeMatched, 1), None);
        assert_eq!(ds.label(Scope::ThemeMatched, 2), Some("POSITIVE"));
        assert!(!ds.results(Scope::AllComments).has_labels());
    }

    #[test]
    fn test_failure_midway_writes_nothing() {
        let mut session = session_with(&["one", "two", "three"]);
        let client = client(
            ScriptedTransport::new()
                .ok(POSITIVE)
                .status(500, "internal error")
                .ok(NEGATIVE),
        );

        let err = SentimentService::classify(&mut session, &client, Scope::AllComments).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Inference(InferenceError::Status { status: 500, .. })
        ));
        assert_eq!(client.transport().call_count(), 2, "no call after the failure");
        assert!(!session.dataset().unwrap().results(Scope::AllComments).has_labels());
    }

    #[test]
    fn test_network_failure_aborts_without_writing() {
        let mut session = session_with(&["one", "two", "three"]);
        let client = client(
            ScriptedTransport::new()
                .ok(POSITIVE)
                .ok(NEGATIVE)
                .network_failure("connection reset by peer")
                .ok(POSITIVE),
        );

        let err = SentimentService::classify(&mut session, &client, Scope::AllComments).unwrap_err();

        assert!(matches!(err, PipelineError::Inference(InferenceError::Network(_))));
        assert_eq!(client.transport().call_count(), 3);
        assert!(!session.dataset().unwrap().results(Scope::AllComments).has_labels());
    }

    #[test]
    fn test_failure_keeps_previous_labels() {
        let mut session = session_with(&["one"]);
        let ok = client(ScriptedTransport::new().ok(POSITIVE));
        SentimentService::classify(&mut session, &ok, Scope::AllComments).unwrap();

        let bad = client(ScriptedTransport::new().ok("[]"));
        let err = SentimentService::classify(&mut session, &bad, Scope::AllComments).unwrap_err();

        assert!(matches!(err, PipelineError::Inference(InferenceError::Format(_))));
        assert_eq!(session.dataset().unwrap().label(Scope::AllComments, 0), Some("POSITIVE"));
    }

    #[test]
    fn test_empty_scope_makes_no_calls() {
        let mut session = session_with(&["great service"]);
        ThemeService::apply(&mut session, "None", "zzz").unwrap();
        let client = client(ScriptedTransport::new());

        let report = SentimentService::classify(&mut session, &client, Scope::ThemeMatched).unwrap();
        assert!(report.counts.is_empty());
        assert_eq!(client.transport().call_count(), 0);
    }

    #[test]
    fn test_theme_scope_requires_theme_search() {
        let mut session = session_with(&["a"]);
        let client = client(ScriptedTransport::new());
        assert!(matches!(
            SentimentService::classify(&mut session, &client, Scope::ThemeMatched),
            Err(PipelineError::Precondition(_))
        ));
    }

    #[test]
    fn test_report_message() {
        let report = SentimentReport {
            scope: Scope::AllComments,
            counts: LabelCounts::from_labels(["POSITIVE", "NEGATIVE"]),
        };
        assert_eq!(report.message(), "Results:\n{\"NEGATIVE\": 1, \"POSITIVE\": 1}");
    }
}
