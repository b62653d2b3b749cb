pub mod context;
pub mod engine;
pub mod grouping;
pub mod harness;
pub mod registry;
