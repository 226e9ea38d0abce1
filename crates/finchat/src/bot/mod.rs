//! Conversational front-end
//!
//! - [`Session`]: append-only message history of one run
//! - [`Dispatcher`]: runs a user turn through the model and the stock functions
//! - [`Command`]: REPL input parsing
//!
//! # Example
//!
//! ```rust,ignore
//! use finchat::bot::{Dispatcher, Session, TurnOutcome};
//!
//! let mut session = Session::new();
//! match dispatcher.handle_turn(&mut session, "What is the RSI of AAPL?").await? {
//!     TurnOutcome::Text(text) => println!("{text}"),
//!     TurnOutcome::Chart(chart) => println!("Chart saved to {}", chart.path.display()),
//! }
//! ```

pub mod commands;
pub mod dispatcher;
pub mod session;

pub use commands::Command;
pub use dispatcher::{Dispatcher, TurnOutcome, TurnState};
pub use session::Session;
