pub mod bracket_handler;
pub mod health;
