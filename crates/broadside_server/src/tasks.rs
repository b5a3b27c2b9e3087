use std::sync::Arc;

use log::{debug, trace};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use broadside_common::game::PlayerID;

use crate::game::events::Connection;
use crate::game::operations::{Operation, SessionError};
use crate::game::session::MatchSession;

#[derive(Debug)]
pub struct TaskControl(oneshot::Sender<()>, JoinHandle<()>);

impl TaskControl {
    pub fn new(stop: oneshot::Sender<()>, handle: JoinHandle<()>) -> TaskControl {
        TaskControl(stop, handle)
    }

    pub async fn stop(self) {
        if !self.1.is_finished() && self.0.send(()).is_ok() {
            let _ = self.1.await;
        }
    }

    pub async fn wait(self) {
        let _ = self.1.await;
    }
}

/// Attaches `outbound` to the player's slot and spawns the receive loop of the
/// connection, which feeds `inbound` operations into the session until the
/// stream ends or the task is stopped.
///
/// Replies travel through `outbound`, so the loop itself ignores the results.
pub async fn spawn_connection(
    session: Arc<MatchSession>,
    player_id: PlayerID,
    outbound: Connection,
    mut inbound: mpsc::UnboundedReceiver<Operation>,
) -> Result<TaskControl, SessionError> {
    session.attach(&player_id, outbound).await?;

    let (stop_tx, mut stop_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    debug!("[{}] connection of {} stopped", session.room_id(), player_id);
                    break;
                }
                operation = inbound.recv() => match operation {
                    Some(operation) => {
                        trace!("[{}] {} -> {}", session.room_id(), player_id, operation.name());
                        let _ = session.handle(&player_id, operation).await;
                    }
                    None => {
                        debug!("[{}] connection of {} closed", session.room_id(), player_id);
                        break;
                    }
                },
            }
        }
    });

    Ok(TaskControl::new(stop_tx, handle))
}
