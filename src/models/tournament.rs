use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Elimination format requested when a tournament leaves registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentFormat {
    SingleElimination,
    DoubleElimination,
}

impl std::fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentFormat::SingleElimination => write!(f, "single_elimination"),
            TournamentFormat::DoubleElimination => write!(f, "double_elimination"),
        }
    }
}

/// Which ladder of the event a match belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketType {
    Winners,
    Losers,
    GrandFinal,
}

impl std::fmt::Display for BracketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketType::Winners => write!(f, "winners"),
            BracketType::Losers => write!(f, "losers"),
            BracketType::GrandFinal => write!(f, "grand_final"),
        }
    }
}

/// A registered entrant. Seeds are 1-based, lower is stronger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Participant {
    pub id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(range(min = 1))]
    pub seed: i32,
}

impl Participant {
    pub fn new(id: Uuid, display_name: impl Into<String>, seed: i32) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            seed,
        }
    }
}

// ===== API DTOs =====

/// Generate Bracket Request DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateBracketRequest {
    pub format: TournamentFormat,
    #[validate(length(min = 1, max = 1024), nested)]
    pub participants: Vec<Participant>,
}

/// Match Result Request DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResultRequest {
    pub winner_id: Uuid,
    pub loser_id: Uuid,
}
