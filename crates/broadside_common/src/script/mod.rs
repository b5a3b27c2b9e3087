use std::collections::HashMap;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::grid::GridState;
use crate::game::transaction::TransactionError;
use crate::game::{StateError, ValidationError};
use crate::script::expr::Params;
use crate::script::interpreter::ScriptInterpreter;

pub mod expr;
pub mod interpreter;
pub mod rng;

pub type ItemID = u32;

/// Malformed or unknown script content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("malformed expression {expression:?}: {reason}")]
    Malformed { expression: String, reason: String },
    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("missing argument {argument:?} for {action}")]
    MissingArgument { action: String, argument: String },
    #[error("invalid argument {argument:?} for {action}")]
    InvalidArgument { action: String, argument: String },
    #[error("unknown cell status: {0}")]
    UnknownCellStatus(String),
    #[error("value does not fit a board coordinate")]
    Overflow,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error("item with id {0} not found")]
    UnknownItem(ItemID),
}

impl ScriptError {
    pub fn code(&self) -> &'static str {
        match self {
            ScriptError::Parse(_) | ScriptError::Expression(_) => "invalid_script",
            ScriptError::Validation(ValidationError::OutOfBounds(_)) => "out_of_bounds",
            ScriptError::Validation(_) => "invalid_placement",
            ScriptError::State(e) => e.code(),
            ScriptError::Transaction(e) => e.code(),
            ScriptError::UnknownItem(_) => "unknown_item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemID,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub script: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to read item catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to decode item catalog: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Item definitions by id, as delivered by the item service.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemID, Item>,
}

impl ItemCatalog {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        ItemCatalog {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    /// Decodes a JSON array of items.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_str(raw)?;
        Ok(Self::new(items))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let catalog = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("loaded {} item(s) from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, id: ItemID) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Item ids in ascending order.
    pub fn ids(&self) -> Vec<ItemID> {
        let mut ids: Vec<_> = self.items.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Runs the script of item `id` against `state` as one transaction.
    pub fn use_item(
        &self,
        id: ItemID,
        interpreter: &mut ScriptInterpreter,
        state: &mut GridState,
        params: &Params,
    ) -> Result<&'static str, ScriptError> {
        let item = self.get(id).ok_or(ScriptError::UnknownItem(id))?;
        interpreter.run_script(&item.script, state, params)
    }
}
