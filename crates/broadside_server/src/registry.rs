use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use thiserror::Error;
use tokio::sync::RwLock;

use broadside_common::game::PlayerID;
use broadside_common::script::ItemCatalog;

use crate::config_provider::GameConfig;
use crate::game::session::MatchSession;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("room {0} already exists")]
    RoomExists(String),
    #[error("a player cannot face themselves")]
    SamePlayer,
}

/// Live rooms by id. Rooms never share state; the registry lock only guards the map.
#[derive(Debug)]
pub struct RoomRegistry {
    config: Arc<GameConfig>,
    items: Arc<ItemCatalog>,
    rooms: RwLock<HashMap<String, Arc<MatchSession>>>,
}

impl RoomRegistry {
    pub fn new(config: Arc<GameConfig>, items: Arc<ItemCatalog>) -> Self {
        RoomRegistry {
            config,
            items,
            rooms: Default::default(),
        }
    }

    pub async fn create_room(
        &self,
        room_id: &str,
        player1: PlayerID,
        player2: PlayerID,
    ) -> Result<Arc<MatchSession>, RegistryError> {
        if player1 == player2 {
            return Err(RegistryError::SamePlayer);
        }

        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(room_id) {
            return Err(RegistryError::RoomExists(room_id.to_string()));
        }

        info!("room {}: {} vs {}", room_id, player1, player2);
        let session = Arc::new(MatchSession::new(
            room_id,
            player1,
            player2,
            self.config.clone(),
            self.items.clone(),
        ));
        rooms.insert(room_id.to_string(), session.clone());
        Ok(session)
    }

    pub async fn get(&self, room_id: &str) -> Option<Arc<MatchSession>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn remove(&self, room_id: &str) -> Option<Arc<MatchSession>> {
        self.rooms.write().await.remove(room_id)
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }
}
