pub mod events;
pub mod operations;
pub mod session;
pub mod states;
