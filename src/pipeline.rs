use std::path::Path;

use crate::core::{Scope, Session};
use crate::error::Result;
use crate::providers::{InferenceClient, InferenceTransport};
use crate::services::export_service::ExportReport;
use crate::services::sentiment_service::SentimentReport;
use crate::services::summary_service::SummaryReport;
use crate::services::theme_service::ThemeReport;
use crate::services::{ExportService, SentimentService, SummaryService, ThemeService};

/// A session bound to an inference client.
///
/// Each method runs one operation to completion before returning.
pub struct Pipeline<T: InferenceTransport> {
    pub session: Session,
    pub client: InferenceClient<T>,
}

impl<T: InferenceTransport> Pipeline<T> {
    pub fn new(client: InferenceClient<T>) -> Self {
        Self {
            session: Session::new(),
            client,
        }
    }

    pub fn load(&mut self, path: &Path) -> Result<usize> {
        self.session.load(Some(path))
    }

    pub fn theme_search(&mut self, theme: &str, keywords: &str) -> Result<ThemeReport> {
        ThemeService::apply(&mut self.session, theme, keywords)
    }

    pub fn classify(&mut self, scope: Scope) -> Result<SentimentReport> {
        SentimentService::classify(&mut self.session, &self.client, scope)
    }

    pub fn summarize(&mut self, scope: Scope) -> Result<SummaryReport> {
        SummaryService::summarize(&mut self.session, &self.client, scope)
    }

    pub fn export(&self, scope: Scope, path: &Path) -> Result<ExportReport> {
        ExportService::export(&self.session, scope, path)
    }

    pub fn export_scopes(&self, scopes: &[Scope], path: &Path) -> Result<ExportReport> {
        ExportService::export_scopes(&self.session, scopes, path)
    }
}
