use std::sync::Arc;

use futures::future::join_all;
use log::{error, info};

use broadside_common::script::ItemCatalog;
use broadside_server::config_provider::config_provider_from_env;
use broadside_server::registry::RoomRegistry;

use crate::demo::DemoPlayer;

mod demo;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    info!("Broadside server startup");

    let cfg = match config_provider_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let items = match &cfg.server_config().item_catalog_path {
        Some(path) => match ItemCatalog::load(path) {
            Ok(items) => items,
            Err(e) => {
                error!("{}", e);
                return;
            }
        },
        None => ItemCatalog::default(),
    };
    let first_item = items.ids().first().copied();

    let registry = RoomRegistry::new(cfg.game_config(), Arc::new(items));
    let room_id = cfg.server_config().demo_room_id.clone();
    let session = match registry
        .create_room(&room_id, "player1".to_string(), "player2".to_string())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let players = [
        DemoPlayer::new("player1", false, first_item),
        DemoPlayer::new("player2", true, None),
    ];
    let results = join_all(
        players
            .into_iter()
            .map(|player| demo::play(session.clone(), player)),
    )
    .await;
    for e in results.into_iter().filter_map(Result::err) {
        error!("demo player failed: {}", e);
    }

    info!(
        "room {} finished in phase {}, winner: {}",
        room_id,
        session.phase().await,
        session.winner().await.unwrap_or_else(|| "none".to_string())
    );
    for player in session.players().await {
        if let Some(grid) = session.grid(&player).await {
            info!("board of {}:\n{}", player, grid);
        }
    }

    registry.remove(&room_id).await;
}
