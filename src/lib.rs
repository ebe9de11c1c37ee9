//! `argot` is a declarative command line parser for Rust.
//!
//! An interface is described up front: options, positional arguments, flags and sub-commands are declared on a
//! [`CommandLineInterface`], and each declaration hands back a typed handle.
//! After a successful parse every handle holds its value, so the program never converts `&str` itself.
//!
//! The parser aims for the following:
//! * *Typed handles*:
//! An option declared with [`IntType`] reads back as `i64`; a repeated option reads back as `Vec<i64>`.
//! The shape of a handle (single, nullable, collected) follows the modifiers applied to it.
//! * *Option vs. argument paradigm*:
//! Options are introduced by a flag (`--name` or `-n`) and may be optional, defaulted, required or repeated.
//! Arguments are matched by position, with an arity from exactly one to unbounded.
//! * *Familiar syntax*:
//! POSIX style bundles (`-abc`), attached values (`-ofile`, `--out=file`) and the `--` terminator are supported.
//! * *Sub-commands*:
//! A parent interface hands the remaining input to a nested interface, which parses and reports on its own.
//! * *Detailed help*:
//! The help screen and error output are generated from the declarations, including defaults and value descriptions.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/demo_summer.rs")]
//! ```
//!
//! ```console
//! $ summer -v 1 2 3
//! + 1
//! + 2
//! + 3
//! Sum: 6
//!
//! $ summer --help
//! Usage: summer [-h] [--verbose] item...
//!
//! Sum the given numbers.
//!
//!   -h, --help                Prints help
//!   --verbose, -v             Print each term before the sum [false]
//!   item                      The numbers to sum { Int }
//! ```
//!
//! # Options
//! [`CommandLineInterface::option`] declares an optional, single valued option.
//! Modifiers reshape the handle:
//!
//! | Modifier | Handle | Behaviour |
//! |---|---|---|
//! | none | `SingleNullableOption<T>` | `None` when absent |
//! | `default(v)` | `SingleOption<T>` | `v` when absent |
//! | `required()` | `SingleOption<T>` | absence fails the parse |
//! | `multiple()` | `MultipleOption<T>` | every occurrence collected |
//! | `multiple().delimiter(",")` | `MultipleOption<T>` | occurrences split and collected |
//!
//! A [`BooleanType`] option is a presence flag: `--verbose` alone sets it to `true`.
//!
//! # Arguments
//! [`CommandLineInterface::argument`] declares a required positional argument.
//! `optional()`, `default(v)`, `multiple(n)` and `vararg()` change its arity.
//! Only the last declared positional may be optional, and at most one may take a variable number of values.
//!
//! # Defaults
//! A default is either a constant or a [`DefaultValue::pattern`] computed from other declarations
//! once the command line has been read.
//! Every handle records where its value came from as a [`ValueOrigin`].
//! Assigning a value after the parse marks it [`ValueOrigin::Redefined`].
//!
//! ```
//! use argot::prelude::*;
//!
//! let mut cli = CommandLineInterface::new("convert");
//! let input = cli.argument(StringType, "input").unwrap();
//! let output = cli
//!     .option(StringType, "output", Some("o"))
//!     .unwrap()
//!     .default_pattern(DefaultValue::pattern(&[&input], |v: &[String]| format!("{}.out", v[0])).unwrap())
//!     .unwrap();
//!
//! cli.parse(&["notes.txt"]).unwrap();
//! assert_eq!(output.value(), "notes.txt.out");
//! assert_eq!(output.origin(), ValueOrigin::SetDefaultValue);
//! ```
//!
//! # Sub-commands
//! ```no_run
#![doc = include_str!("../demos/demo_sub_command.rs")]
//! ```
//!
//! # Errors
//! Mistakes in the declarations are reported as a [`ConfigError`] when the declaration is made.
//! Mistakes on the command line are reported as a [`ParseError`]; by then the message and the help screen have been printed.
//! [`ParseError::HelpPrinted`] signals a successful `--help`, which callers usually treat as a clean exit.
//!
//! # Features
//! * `tracing_debug`: emit `tracing` debug events while declaring and parsing.
#![deny(missing_docs)]

pub use argot_core::*;
