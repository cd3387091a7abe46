// Service layer module for ArenaX brackets
pub mod bracket_service;

pub use bracket_service::BracketService;
