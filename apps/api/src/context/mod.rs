pub mod aggregator;
pub mod assembler;
pub mod handlers;
pub mod tracker;
