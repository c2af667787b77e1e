//! Library side of the `php2js` command: argument parsing, config
//! resolution and batch processing.

pub mod batch;
pub mod cli;

pub use batch::{Job, Summary, run};
pub use cli::Cli;
