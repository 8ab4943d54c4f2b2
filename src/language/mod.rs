pub mod core;
pub mod profile;

// Re-export the main types for convenience
pub use core::{classify, reading_speed, CountingFamily, LanguageTag};
pub use profile::{untitled_placeholder, LanguageProfile};
