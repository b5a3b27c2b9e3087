pub const BOARD_SIZE: i32 = 10;

pub mod game;
pub mod script;
