//! Core of `argot`: the tokenizer, the dispatch engine and the typed declaration layer.
//! See the `argot` crate for an overview.
#![deny(missing_docs)]
mod constant;
mod descriptor;
mod entity;
mod error;
mod model;
mod parser;
pub mod prelude;
mod tokens;
mod types;

pub use descriptor::DefaultValue;
pub use entity::*;
pub use error::*;
pub use model::{OptionPrefixStyle, ValueOrigin};
pub use parser::{ColumnPrinter, CommandLineInterface, HelpPrinter, InterfaceConfig, Subcommand};
pub use tokens::TokenCursor;
pub use types::*;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
