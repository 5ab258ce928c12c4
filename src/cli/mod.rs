pub mod interaction;
pub mod io;
pub mod output;
pub mod script;
mod shell;
pub mod wizard;

pub use shell::{run_cli, SCRIPT_ENV};
