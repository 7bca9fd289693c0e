#![allow(clippy::collapsible_if)]

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod providers;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Dataset, DatasetId, LabelCounts, Scope, Session, SourceType};
pub use crate::error::{PipelineError, Result};
pub use crate::pipeline::Pipeline;
pub use crate::providers::{HuggingFaceTransport, InferenceClient, InferenceTransport};
pub use crate::services::{DataService, ExportService, SentimentService, SummaryService, ThemeService};
