pub mod context;
pub mod prompt;
