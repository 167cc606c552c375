pub mod game;
pub mod message;
