//! Game catalog repository functions.

use super::codec::{decode, encode};
use crate::domain::GameInfo;
use crate::errors::domain::DomainError;
use crate::store::{Collection, DocumentStore};
use crate::utils::clock::now_millis;

const COLLECTION: Collection = Collection::Games;

pub async fn find_game(store: &dyn DocumentStore, id: &str) -> Result<Option<GameInfo>, DomainError> {
    store
        .get(COLLECTION, id)
        .await?
        .map(|doc| decode(COLLECTION, doc))
        .transpose()
}

/// Add a game to the catalog. `createdAtMillis` is set when missing.
pub async fn create_game(store: &dyn DocumentStore, info: &GameInfo) -> Result<GameInfo, DomainError> {
    let mut info = info.clone();
    if info.created_at_millis == 0 {
        info.created_at_millis = now_millis();
    }
    let doc = store.insert(COLLECTION, encode(&info)?).await?;
    decode(COLLECTION, doc)
}
