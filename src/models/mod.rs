// Core models
pub mod match_model;
pub mod tournament;

// Re-export commonly used types
pub use match_model::*;
pub use tournament::*;
