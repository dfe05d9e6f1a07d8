//! Read side of the catalog: a game with its reports and verdict.

use tracing::debug;

use crate::domain::{GameRecord, WorkStatus};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::{games, reports};
use crate::state::Session;
use crate::store::DocumentStore;

/// Load a game and all of its reports. `page_size` bounds each report query.
pub async fn load_game(
    store: &dyn DocumentStore,
    session: &Session,
    game_id: &str,
    page_size: usize,
) -> Result<GameRecord, DomainError> {
    let info = games::find_game(store, game_id)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Game, format!("game {game_id} not found")))?;
    let tests = reports::reports_for_game(store, game_id, page_size).await?;
    debug!(game_id, reports = tests.len(), "game loaded");

    let mut record = GameRecord::new(info, tests);
    record.is_favorite = session.is_favorite(game_id);
    Ok(record)
}

/// Aggregate verdict of a game's reports. Works for ids without a game
/// document too; no reports means `UNTESTED`.
pub async fn game_status(
    store: &dyn DocumentStore,
    game_id: &str,
    page_size: usize,
) -> Result<WorkStatus, DomainError> {
    let tests = reports::reports_for_game(store, game_id, page_size).await?;
    Ok(crate::domain::resolve(&tests))
}
