// Library surface for the CLI binary and integration tests.
// The counting and goal modules are pure; `session` is the one mutable owner.
pub mod app_dirs;
pub mod config;
pub mod document;
pub mod error;
pub mod goal;
pub mod language;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod store;
pub mod time_series;
pub mod timer;
pub mod util;

pub use document::{export, DocumentRecord, DocumentSummary, ExportFormat};
pub use error::{EngineError, StoreError};
pub use goal::{compute_progress, GoalConfig, GoalUnit, ProgressSnapshot};
pub use language::{classify, CountingFamily, LanguageTag};
pub use metrics::{compute_metrics, TextMetrics};
pub use session::DocumentSession;
