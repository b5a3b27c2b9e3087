use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::Mutex;

use broadside_common::game::command::Command;
use broadside_common::game::grid::{CellState, Coordinate, GridState};
use broadside_common::game::ship::{ShipID, ShipRequest};
use broadside_common::game::transaction::Transaction;
use broadside_common::game::{PlayerID, StateError, ValidationError};
use broadside_common::script::expr::Params;
use broadside_common::script::interpreter::ScriptInterpreter;
use broadside_common::script::rng::ScriptRng;
use broadside_common::script::{ItemCatalog, ItemID};

use crate::config_provider::{FirstTurn, GameConfig};
use crate::game::events::{Connection, ServerEvent};
use crate::game::operations::{FireOutcome, Operation, OperationResult, SessionError};
use crate::game::states::Phase;

#[derive(Debug)]
pub struct PlayerSlot {
    pub(crate) id: PlayerID,
    pub(crate) grid: GridState,
    pub(crate) is_ready: bool,
    pub(crate) connection: Option<Connection>,
}

impl PlayerSlot {
    pub fn new(id: PlayerID) -> Self {
        PlayerSlot {
            id,
            grid: GridState::new(),
            is_ready: false,
            connection: None,
        }
    }
}

/// Everything guarded by the room lock.
#[derive(Debug)]
pub struct MatchState {
    pub(crate) players: [PlayerSlot; 2],
    pub(crate) phase: Phase,
    pub(crate) turn: Option<PlayerID>,
    pub(crate) winner: Option<PlayerID>,
    pub(crate) interpreter: ScriptInterpreter,
}

impl MatchState {
    pub fn new(player1: PlayerID, player2: PlayerID, interpreter: ScriptInterpreter) -> Self {
        MatchState {
            players: [PlayerSlot::new(player1), PlayerSlot::new(player2)],
            phase: Phase::Waiting,
            turn: None,
            winner: None,
            interpreter,
        }
    }

    fn slot_index(&self, player_id: &str) -> Result<usize, SessionError> {
        self.players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(player_id.to_string()))
    }

    fn all_ready(&self) -> bool {
        self.players.iter().all(|p| p.is_ready)
    }

    fn check_turn(&self, player_id: &str) -> Result<(), StateError> {
        match &self.turn {
            Some(turn) if turn == player_id => Ok(()),
            _ => Err(StateError::NotYourTurn),
        }
    }

    fn advance(&mut self, next: Phase) {
        if self.phase.can_advance_to(next) {
            self.phase = next;
        } else {
            error!("illegal phase change {} -> {}", self.phase, next);
        }
    }

    /// Validates and applies `operation` for `player_id`.
    ///
    /// Guards run before anything is touched and every board change goes through a
    /// [`Transaction`], so a rejected operation leaves the match exactly as it was.
    /// On success the result for the actor is returned together with the events
    /// to broadcast to both players.
    pub fn apply(
        &mut self,
        player_id: &str,
        operation: &Operation,
        config: &GameConfig,
        items: &ItemCatalog,
    ) -> Result<(OperationResult, Vec<ServerEvent>), SessionError> {
        let actor = self.slot_index(player_id)?;
        let opponent = 1 - actor;
        self.phase.check_operation(operation)?;

        match operation {
            Operation::PlaceShip { ship } => {
                let slot = &mut self.players[actor];
                if slot.is_ready {
                    return Err(StateError::AlreadyReady.into());
                }
                if slot.grid.ship_count() >= config.max_ships_per_player {
                    return Err(ValidationError::PlacementCap {
                        max: config.max_ships_per_player,
                    }
                    .into());
                }

                let mut tx = Transaction::from(Command::place_ship(ship.clone()));
                tx.execute(&mut slot.grid)?;

                let placed = tx
                    .commands()
                    .first()
                    .and_then(Command::placed_ship)
                    .ok_or_else(|| {
                        SessionError::InconsistentState(format!(
                            "placement for {player_id} committed without a ship"
                        ))
                    })?;
                debug!("{} placed {} as ship {}", player_id, placed.ship_type, placed.id);

                Ok((
                    OperationResult::ShipPlaced {
                        ship_id: placed.id,
                        ship_type: placed.ship_type,
                    },
                    vec![],
                ))
            }
            Operation::Ready => {
                let slot = &mut self.players[actor];
                if !slot.is_ready {
                    let missing = config
                        .ships_required_for_ready
                        .saturating_sub(slot.grid.ship_count());
                    if missing > 0 {
                        return Err(StateError::NotEnoughShips { missing }.into());
                    }
                    slot.is_ready = true;
                }

                let all_ready = self.all_ready();
                let mut broadcast = vec![];
                if all_ready && self.phase == Phase::Waiting {
                    let first = match config.first_turn {
                        FirstTurn::Player1 => &self.players[0].id,
                        FirstTurn::Player2 => &self.players[1].id,
                    }
                    .clone();
                    self.advance(Phase::Playing);
                    self.turn = Some(first.clone());
                    info!("game started, {} goes first", first);
                    broadcast.push(ServerEvent::GameStart { first_turn: first });
                }

                Ok((OperationResult::ReadyConfirmed { all_ready }, broadcast))
            }
            Operation::RemoveShip { ship_id } => {
                let slot = &mut self.players[actor];
                if slot.is_ready {
                    return Err(StateError::AlreadyReady.into());
                }

                Transaction::from(Command::remove_ship(*ship_id)).execute(&mut slot.grid)?;
                Ok((OperationResult::ShipRemoved { ship_id: *ship_id }, vec![]))
            }
            Operation::Fire { x, y } => {
                self.check_turn(player_id)?;

                let target = &mut self.players[opponent];
                Transaction::from(Command::shoot(*x, *y)).execute(&mut target.grid)?;

                let hit = target.grid.cell(Coordinate::new(*x, *y)) == Some(CellState::Hit);
                let game_over = target.grid.surviving_ship_cells() == 0;
                let outcome = FireOutcome {
                    x: *x,
                    y: *y,
                    hit,
                    next_turn: target.id.clone(),
                    game_over,
                };
                debug!("{} fired at ({}, {}), hit: {}", player_id, x, y, hit);

                let mut broadcast = vec![ServerEvent::FireResult(outcome.clone())];
                if game_over {
                    broadcast.push(self.finish(actor));
                } else {
                    self.turn = Some(outcome.next_turn.clone());
                }

                Ok((OperationResult::Fired(outcome), broadcast))
            }
            Operation::UseItem { item_id, params } => {
                self.check_turn(player_id)?;

                let target = &mut self.players[opponent];
                let result =
                    items.use_item(*item_id, &mut self.interpreter, &mut target.grid, params)?;
                let game_over = target.grid.surviving_ship_cells() == 0;
                debug!("{} used item {}", player_id, item_id);

                let mut broadcast = vec![ServerEvent::ItemUsed {
                    item_id: *item_id,
                    user: player_id.to_string(),
                    result,
                }];
                if game_over {
                    broadcast.push(self.finish(actor));
                }

                Ok((
                    OperationResult::ItemUsed {
                        item_id: *item_id,
                        result,
                        game_over,
                    },
                    broadcast,
                ))
            }
        }
    }

    fn finish(&mut self, winner: usize) -> ServerEvent {
        let winner = self.players[winner].id.clone();
        self.advance(Phase::Ended);
        self.winner = Some(winner.clone());
        info!("game over, {} wins", winner);
        ServerEvent::GameEnd { winner }
    }
}

/// A live two-player match. All operations are serialized by one lock per room.
#[derive(Debug)]
pub struct MatchSession {
    room_id: String,
    config: Arc<GameConfig>,
    items: Arc<ItemCatalog>,
    state: Mutex<MatchState>,
}

impl MatchSession {
    pub fn new(
        room_id: impl Into<String>,
        player1: impl Into<PlayerID>,
        player2: impl Into<PlayerID>,
        config: Arc<GameConfig>,
        items: Arc<ItemCatalog>,
    ) -> Self {
        let interpreter = ScriptInterpreter::new(ScriptRng::new(config.script_seed));
        MatchSession {
            room_id: room_id.into(),
            state: Mutex::new(MatchState::new(player1.into(), player2.into(), interpreter)),
            config,
            items,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Binds the outbound half of a player's connection to their slot.
    pub async fn attach(&self, player_id: &str, connection: Connection) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        let idx = state.slot_index(player_id)?;
        state.players[idx].connection = Some(connection);
        debug!("[{}] {} attached", self.room_id, player_id);
        Ok(())
    }

    /// Runs `operation` for `player_id` and notifies the connections afterwards.
    ///
    /// The lock is released before anything is sent. Sends are best-effort: a
    /// failed send is logged and the committed state stays as it is.
    pub async fn handle(
        &self,
        player_id: &str,
        operation: Operation,
    ) -> Result<OperationResult, SessionError> {
        let mut deliveries: Vec<(PlayerID, Connection, ServerEvent)> = vec![];

        let outcome = {
            let mut state = self.state.lock().await;
            let outcome = state.apply(player_id, &operation, &self.config, &self.items);

            let actor = state
                .players
                .iter()
                .find(|p| p.id == player_id)
                .and_then(|p| p.connection.clone());

            match &outcome {
                Ok((result, broadcast)) => {
                    if let (Some(conn), Some(ack)) = (&actor, ServerEvent::acknowledgment(result)) {
                        deliveries.push((player_id.to_string(), conn.clone(), ack));
                    }
                    for event in broadcast {
                        for p in state.players.iter() {
                            if let Some(conn) = &p.connection {
                                deliveries.push((p.id.clone(), conn.clone(), event.clone()));
                            }
                        }
                    }
                }
                Err(e) => {
                    debug!(
                        "[{}] rejected {} from {}: {}",
                        self.room_id,
                        operation.name(),
                        player_id,
                        e
                    );
                    if let Some(conn) = actor {
                        let reply = ServerEvent::rejection(&operation, e);
                        deliveries.push((player_id.to_string(), conn, reply));
                    }
                }
            }

            outcome
        };

        for (recipient, conn, event) in deliveries {
            let name = event.name();
            if conn.send(event).is_err() {
                warn!(
                    "[{}] unable to deliver {} to {}",
                    self.room_id, name, recipient
                );
            }
        }

        outcome.map(|(result, _)| result)
    }

    pub async fn place_ship(
        &self,
        player_id: &str,
        ship: ShipRequest,
    ) -> Result<OperationResult, SessionError> {
        self.handle(player_id, Operation::PlaceShip { ship }).await
    }

    pub async fn ready(&self, player_id: &str) -> Result<OperationResult, SessionError> {
        self.handle(player_id, Operation::Ready).await
    }

    pub async fn remove_ship(
        &self,
        player_id: &str,
        ship_id: ShipID,
    ) -> Result<OperationResult, SessionError> {
        self.handle(player_id, Operation::RemoveShip { ship_id }).await
    }

    pub async fn fire(&self, player_id: &str, x: i32, y: i32) -> Result<OperationResult, SessionError> {
        self.handle(player_id, Operation::Fire { x, y }).await
    }

    pub async fn use_item(
        &self,
        player_id: &str,
        item_id: ItemID,
        params: Params,
    ) -> Result<OperationResult, SessionError> {
        self.handle(player_id, Operation::UseItem { item_id, params })
            .await
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub async fn turn(&self) -> Option<PlayerID> {
        self.state.lock().await.turn.clone()
    }

    pub async fn winner(&self) -> Option<PlayerID> {
        self.state.lock().await.winner.clone()
    }

    pub async fn players(&self) -> [PlayerID; 2] {
        let state = self.state.lock().await;
        [state.players[0].id.clone(), state.players[1].id.clone()]
    }

    /// A copy of the board owned by `player_id`.
    pub async fn grid(&self, player_id: &str) -> Option<GridState> {
        let state = self.state.lock().await;
        state
            .players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.grid.clone())
    }

    pub async fn is_ready(&self, player_id: &str) -> Option<bool> {
        let state = self.state.lock().await;
        state
            .players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.is_ready)
    }
}
