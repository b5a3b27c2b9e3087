use log::debug;
use thiserror::Error;

use crate::game::command::Command;
use crate::game::grid::GridState;
use crate::game::CommandError;

/// The first failing command of a transaction, reported after the rollback finished.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction failed at command #{index} ({command}): {source}")]
pub struct TransactionError {
    pub index: usize,
    pub command: &'static str,
    #[source]
    pub source: CommandError,
}

impl TransactionError {
    pub fn code(&self) -> &'static str {
        self.source.code()
    }
}

/// An ordered batch of commands applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    commands: Vec<Command>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Applies the commands in order. On the first failure every command applied
    /// so far is undone in reverse order, leaving `state` as it was before.
    pub fn execute(&mut self, state: &mut GridState) -> Result<(), TransactionError> {
        for index in 0..self.commands.len() {
            if let Err(source) = self.commands[index].apply(state) {
                let command = self.commands[index].name();
                debug!("{command} #{index} failed ({source}), rolling back {index} command(s)");

                self.commands[..index]
                    .iter_mut()
                    .rev()
                    .for_each(|applied| applied.undo(state));

                return Err(TransactionError {
                    index,
                    command,
                    source,
                });
            }
        }

        Ok(())
    }
}

impl From<Command> for Transaction {
    fn from(command: Command) -> Self {
        Transaction {
            commands: vec![command],
        }
    }
}

impl FromIterator<Command> for Transaction {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Transaction {
            commands: iter.into_iter().collect(),
        }
    }
}
