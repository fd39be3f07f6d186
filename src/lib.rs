pub mod aggregator;
pub mod api;
pub mod comparison;
pub mod completion;
pub mod config;
pub mod errors;
pub mod flex;
pub mod game;
pub mod prompt;
pub mod reference;
pub mod render;
pub mod report;
pub mod resolver;
pub mod scoring;
pub mod service;
pub mod session;
pub mod synthesizer;

pub use errors::{ErrorKind, Result, ScoutError};
pub use game::Game;
pub use service::{ScoutOutcome, ScoutService};
