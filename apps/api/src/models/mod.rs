pub mod content;
pub mod context;
pub mod guideline;
