//! Post-processing and plotting for the outputs of a kima radial-velocity
//! sampler run.

pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod interaction;
pub mod keplerian;
pub mod physics;
pub mod plots;
pub mod postprocess;
pub mod results;
pub mod setup;
pub mod state;
pub mod stats;
pub mod tips;
pub mod ui;

pub use cli::{parse_args, ParseOutcome, ParsedArguments};
pub use dispatch::showresults;
pub use error::KimaError;
pub use results::KimaResults;
