pub mod api_error;
pub mod bracket;
pub mod config;
pub mod http;
pub mod middleware;
pub mod models;
pub mod service;
pub mod telemetry;

pub use bracket::{generate_bracket, Bracket, BracketError, GenerateOptions};
pub use service::BracketService;
