pub mod dataset;
pub mod session;
pub mod types;

pub use dataset::{Dataset, ScopeResults, ThemeMatch, COMMENT_COLUMN};
pub use session::Session;
pub use types::*;
