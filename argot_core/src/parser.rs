mod base;
mod cli;
mod engine;
pub(crate) mod interface;
pub(crate) mod printer;
mod subcommand;

pub use cli::{CommandLineInterface, InterfaceConfig};
pub use printer::{ColumnPrinter, HelpPrinter};
pub use subcommand::Subcommand;
