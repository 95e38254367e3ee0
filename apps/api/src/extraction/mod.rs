pub mod confidence;
pub mod document;
pub mod fields;
pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod sections;
