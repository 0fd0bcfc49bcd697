//////////////////////////
// lib.rs
//////////////////////////

pub mod board;
pub mod rules;
pub mod server;
pub mod session;
pub mod types;

pub use board::Board;
pub use server::{start_server, Registry, SeatPolicy};
pub use session::GameSession;
pub use types::*;
