use serde::Deserialize;
use std::env;

use crate::bracket::GenerateOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub bracket: BracketConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BracketConfig {
    pub match_number_offset: i32,
    pub grand_final_reset: bool,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            match_number_offset: 1,
            grand_final_reset: false,
        }
    }
}

impl BracketConfig {
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            match_number_offset: self.match_number_offset,
            grand_final_reset: self.grand_final_reset,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let port: u16 = env::var("PORT")?.parse()?;
        let host = env::var("HOST")?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let defaults = BracketConfig::default();
        let match_number_offset = match env::var("BRACKET_MATCH_NUMBER_OFFSET") {
            Ok(value) => parse_offset(&value)?,
            Err(_) => defaults.match_number_offset,
        };
        let grand_final_reset = match env::var("BRACKET_GRAND_FINAL_RESET") {
            Ok(value) => parse_flag(&value)?,
            Err(_) => defaults.grand_final_reset,
        };

        Ok(Config {
            server: ServerConfig {
                port,
                host,
                rust_log,
            },
            bracket: BracketConfig {
                match_number_offset,
                grand_final_reset,
            },
        })
    }
}

fn parse_offset(value: &str) -> Result<i32, anyhow::Error> {
    let offset: i32 = value.trim().parse()?;
    if offset < 1 {
        anyhow::bail!("BRACKET_MATCH_NUMBER_OFFSET must be at least 1, got {offset}");
    }
    Ok(offset)
}

fn parse_flag(value: &str) -> Result<bool, anyhow::Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("invalid boolean flag: {other}")),
    }
}
