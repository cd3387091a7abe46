use crate::api_error::ApiError;
use crate::bracket::{generate_bracket, Bracket, GenerateOptions};
use crate::models::{GenerateBracketRequest, Match, MatchResultRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Bracket Service - owns generated brackets and serializes their mutation.
///
/// Generation for a tournament runs under a per-tournament lock and is
/// refused once a bracket exists. Results lock only the owning bracket, so
/// one mutation per match is in flight while other tournaments proceed.
pub struct BracketService {
    options: GenerateOptions,
    brackets: RwLock<HashMap<Uuid, Arc<Mutex<Bracket>>>>,
    generation_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    match_index: RwLock<HashMap<Uuid, Uuid>>,
}

impl BracketService {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            brackets: RwLock::new(HashMap::new()),
            generation_locks: Mutex::new(HashMap::new()),
            match_index: RwLock::new(HashMap::new()),
        }
    }

    // =============================================================================
    // GENERATE BRACKET
    // =============================================================================

    /// Build and store the bracket for a tournament leaving registration.
    pub async fn generate_bracket(
        &self,
        tournament_id: Uuid,
        request: GenerateBracketRequest,
    ) -> Result<Bracket, ApiError> {
        request.validate()?;

        let lock = self.generation_lock(tournament_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.generate_locked(tournament_id, request).await
        };
        self.release_generation_lock(tournament_id, lock).await;
        result
    }

    async fn generate_locked(
        &self,
        tournament_id: Uuid,
        request: GenerateBracketRequest,
    ) -> Result<Bracket, ApiError> {
        if self.brackets.read().await.contains_key(&tournament_id) {
            return Err(ApiError::conflict(format!(
                "Bracket already generated for tournament {}",
                tournament_id
            )));
        }

        info!(
            tournament_id = %tournament_id,
            format = %request.format,
            participants = request.participants.len(),
            "Generating bracket"
        );

        let bracket = generate_bracket(
            tournament_id,
            request.format,
            &request.participants,
            &self.options,
        )
        .map_err(|e| {
            warn!(tournament_id = %tournament_id, error = %e, "Bracket generation rejected");
            ApiError::from(e)
        })?;

        {
            let mut index = self.match_index.write().await;
            for m in &bracket.matches {
                index.insert(m.id, tournament_id);
            }
        }
        self.brackets
            .write()
            .await
            .insert(tournament_id, Arc::new(Mutex::new(bracket.clone())));

        Ok(bracket)
    }

    // =============================================================================
    // ADVANCE MATCH
    // =============================================================================

    /// Apply a completed match and return the matches it made playable.
    pub async fn advance_match(
        &self,
        match_id: Uuid,
        result: MatchResultRequest,
    ) -> Result<Vec<Match>, ApiError> {
        let tournament_id = self.tournament_of(match_id).await?;
        let entry = self.bracket_entry(tournament_id).await?;
        let mut bracket = entry.lock().await;

        bracket
            .advance_by_id(match_id, result.winner_id, result.loser_id)
            .map_err(|e| {
                warn!(
                    tournament_id = %tournament_id,
                    match_id = %match_id,
                    error = %e,
                    "Match result rejected"
                );
                ApiError::from(e)
            })
    }

    // =============================================================================
    // QUERY METHODS
    // =============================================================================

    pub async fn get_bracket(&self, tournament_id: Uuid) -> Result<Bracket, ApiError> {
        let entry = self.bracket_entry(tournament_id).await?;
        let bracket = entry.lock().await;
        Ok(bracket.clone())
    }

    pub async fn get_match(&self, match_id: Uuid) -> Result<Match, ApiError> {
        let tournament_id = self.tournament_of(match_id).await?;
        let entry = self.bracket_entry(tournament_id).await?;
        let bracket = entry.lock().await;
        bracket
            .get_by_id(match_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Match {} not found", match_id)))
    }

    // =============================================================================
    // TEARDOWN
    // =============================================================================

    /// Drop a tournament's bracket and every match in it.
    pub async fn teardown(&self, tournament_id: Uuid) -> Result<(), ApiError> {
        let lock = self.generation_lock(tournament_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.teardown_locked(tournament_id).await
        };
        self.release_generation_lock(tournament_id, lock).await;
        result
    }

    async fn teardown_locked(&self, tournament_id: Uuid) -> Result<(), ApiError> {
        let entry = self
            .brackets
            .write()
            .await
            .remove(&tournament_id)
            .ok_or_else(|| {
                ApiError::not_found(format!("No bracket for tournament {}", tournament_id))
            })?;

        let bracket = entry.lock().await;
        let mut index = self.match_index.write().await;
        for m in &bracket.matches {
            index.remove(&m.id);
        }

        info!(
            tournament_id = %tournament_id,
            matches = bracket.matches.len(),
            "Bracket torn down"
        );
        Ok(())
    }

    // =============================================================================
    // HELPER METHODS
    // =============================================================================

    async fn generation_lock(&self, tournament_id: Uuid) -> Arc<Mutex<()>> {
        self.generation_locks
            .lock()
            .await
            .entry(tournament_id)
            .or_default()
            .clone()
    }

    /// Forget the tournament's generation lock unless another caller still
    /// holds a handle to it. Handles are only cloned under the map lock, so
    /// a count of two (map + ours) means nobody else can be waiting.
    async fn release_generation_lock(&self, tournament_id: Uuid, lock: Arc<Mutex<()>>) {
        let mut locks = self.generation_locks.lock().await;
        let unshared = locks
            .get(&tournament_id)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if unshared {
            locks.remove(&tournament_id);
        }
    }

    #[cfg(test)]
    pub(crate) async fn generation_lock_count(&self) -> usize {
        self.generation_locks.lock().await.len()
    }

    async fn tournament_of(&self, match_id: Uuid) -> Result<Uuid, ApiError> {
        self.match_index
            .read()
            .await
            .get(&match_id)
            .copied()
            .ok_or_else(|| ApiError::not_found(format!("Match {} not found", match_id)))
    }

    async fn bracket_entry(&self, tournament_id: Uuid) -> Result<Arc<Mutex<Bracket>>, ApiError> {
        self.brackets
            .read()
            .await
            .get(&tournament_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::not_found(format!("No bracket for tournament {}", tournament_id))
            })
    }
}
