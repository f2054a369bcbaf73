//! bwilcd interactive shell
//!
//! Browse data stocks and process datasets on ILCD-Network / SODA4LCA
//! nodes. [`Session`] holds the navigation state, [`Command`] parses what
//! the user types and [`display`] renders the results.

pub mod command;
pub mod display;
pub mod session;

pub use command::Command;
pub use session::{ConnectTarget, Level, Outcome, Session, SessionError, SessionResult};
