pub mod data_service;
pub mod export_service;
pub mod sentiment_service;
pub mod summary_service;
pub mod theme_service;

pub use data_service::DataService;
pub use export_service::ExportService;
pub use sentiment_service::SentimentService;
pub use summary_service::SummaryService;
pub use theme_service::ThemeService;
