use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::game::command::Command;
use crate::game::grid::{CellState, Coordinate, GridState};
use crate::game::transaction::Transaction;
use crate::game::{StateError, ValidationError};
use crate::script::expr::{EvalContext, Expression, Params};
use crate::script::rng::ScriptRng;
use crate::script::{ExpressionError, ScriptError};

pub const ITEM_USED: &str = "item_used_successfully";

/// A raw argument value: a literal number or the source of an expression.
///
/// Numbers may arrive as floats (`5.0`); only integral values are usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Number(serde_json::Number),
    Text(String),
}

fn integral(number: &serde_json::Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// One step of an item script, e.g. `{"Name":"open_cell","Args":{"x":"$x","y":"$y+1"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Args", alias = "args", default)]
    pub args: HashMap<String, Argument>,
}

impl Action {
    fn coordinate(&self, argument: &str, ctx: &mut EvalContext<'_>) -> Result<i32, ExpressionError> {
        let value = match self.args.get(argument) {
            None => return Err(self.missing(argument)),
            Some(Argument::Number(number)) => {
                integral(number).ok_or_else(|| self.invalid(argument))?
            }
            Some(Argument::Text(source)) => source.parse::<Expression>()?.evaluate(ctx)?,
        };
        i32::try_from(value).map_err(|_| ExpressionError::Overflow)
    }

    fn text(&self, argument: &str) -> Result<&str, ExpressionError> {
        match self.args.get(argument) {
            None => Err(self.missing(argument)),
            Some(Argument::Text(text)) => Ok(text),
            Some(Argument::Number(_)) => Err(self.invalid(argument)),
        }
    }

    fn invalid(&self, argument: &str) -> ExpressionError {
        ExpressionError::InvalidArgument {
            action: self.name.clone(),
            argument: argument.to_string(),
        }
    }

    fn missing(&self, argument: &str) -> ExpressionError {
        ExpressionError::MissingArgument {
            action: self.name.clone(),
            argument: argument.to_string(),
        }
    }
}

fn cell_status(status: &str) -> Result<CellState, ExpressionError> {
    match status.to_ascii_lowercase().as_str() {
        "water" => Ok(CellState::Empty),
        "ship" => Ok(CellState::ShipCell),
        "shipwreck" => Ok(CellState::Hit),
        _ => Err(ExpressionError::UnknownCellStatus(status.to_string())),
    }
}

/// Turns item scripts into transactions and runs them.
///
/// Draws for `RAND` come from the interpreter's own [`ScriptRng`]; the value
/// behind `PREV_RAND` starts over with every compiled script.
#[derive(Debug, Clone, Default)]
pub struct ScriptInterpreter {
    rng: ScriptRng,
}

impl ScriptInterpreter {
    pub fn new(rng: ScriptRng) -> Self {
        ScriptInterpreter { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(ScriptRng::seeded(seed))
    }

    pub fn parse(script: &str) -> Result<Vec<Action>, ScriptError> {
        Ok(serde_json::from_str(script)?)
    }

    /// Builds one command per action, in script order, without touching `state`.
    pub fn compile(
        &mut self,
        actions: &[Action],
        state: &GridState,
        params: &Params,
    ) -> Result<Transaction, ScriptError> {
        let mut ctx = EvalContext::new(params, &mut self.rng);
        let mut tx = Transaction::new();

        for action in actions {
            trace!("compile {:?}", action);

            let command = match action.name.to_ascii_uppercase().as_str() {
                "OPEN_CELL" => {
                    let x = action.coordinate("x", &mut ctx)?;
                    let y = action.coordinate("y", &mut ctx)?;
                    Command::open_cell(x, y)
                }
                "MAKE_SHOT" => {
                    let x = action.coordinate("x", &mut ctx)?;
                    let y = action.coordinate("y", &mut ctx)?;
                    Command::shoot(x, y)
                }
                "SET_CELL_STATUS" => {
                    let x = action.coordinate("x", &mut ctx)?;
                    let y = action.coordinate("y", &mut ctx)?;
                    let status = cell_status(action.text("status")?)?;
                    Command::set_cell_status(x, y, status)
                }
                "SET_SHIP_COORDINATES" => {
                    let x = action.coordinate("x", &mut ctx)?;
                    let y = action.coordinate("y", &mut ctx)?;
                    let x2 = action.coordinate("x2", &mut ctx)?;
                    let y2 = action.coordinate("y2", &mut ctx)?;
                    relocate(state, Coordinate::new(x, y), Coordinate::new(x2, y2))?
                }
                // marks the end of the player's action, the rest of the script still runs
                "END_PLAYER_ACTION" => continue,
                _ => return Err(ExpressionError::UnknownAction(action.name.clone()).into()),
            };

            tx.add(command);
        }

        debug!(
            "compiled {} command(s) from {} action(s)",
            tx.len(),
            actions.len()
        );
        Ok(tx)
    }

    /// Parses, compiles and executes `script` against `state` as a single transaction.
    pub fn run_script(
        &mut self,
        script: &str,
        state: &mut GridState,
        params: &Params,
    ) -> Result<&'static str, ScriptError> {
        let actions = Self::parse(script)?;
        let mut tx = self.compile(&actions, state, params)?;
        tx.execute(state)?;
        Ok(ITEM_USED)
    }
}

/// Moves the ship covering `from` so that it starts at `to`, keeping its length.
fn relocate(state: &GridState, from: Coordinate, to: Coordinate) -> Result<Command, ScriptError> {
    let ship = state.ship_at(from).ok_or(StateError::NoShipAt(from))?;

    let length = ship.coords.len() as i32;
    let step = |i: i32| -> Option<Coordinate> {
        if to.x == from.x {
            Some(Coordinate::new(to.x, to.y.checked_add(i)?))
        } else {
            Some(Coordinate::new(to.x.checked_add(i)?, to.y))
        }
    };
    if to.x != from.x && to.y != from.y {
        return Err(ValidationError::InvalidOrientation.into());
    }
    // a run that leaves the i32 range starts far off the board
    let new_coords = (0..length)
        .map(|i| step(i).ok_or(ValidationError::OutOfBounds(to)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Command::move_ship(ship.id, ship.coords.clone(), new_coords))
}
