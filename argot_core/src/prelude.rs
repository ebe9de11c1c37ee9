//! Everything needed to declare and parse an interface: `use argot_core::prelude::*`.

pub use crate::descriptor::DefaultValue;
pub use crate::entity::{
    ArgumentValue, CliArgument, CliOption, Entity, MultipleArgument, MultipleOption,
    SingleArgument, SingleNullableArgument, SingleNullableOption, SingleOption, ValueRef,
    ValueSource,
};
pub use crate::error::{ConfigError, ConversionError, ParseError, UnsetValueError};
pub use crate::model::{OptionPrefixStyle, ValueOrigin};
pub use crate::parser::{ColumnPrinter, CommandLineInterface, HelpPrinter, InterfaceConfig, Subcommand};
pub use crate::tokens::TokenCursor;
pub use crate::types::{ArgType, BooleanType, Choice, DoubleType, IntType, StringType};
