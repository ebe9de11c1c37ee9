use crate::error::{ConfigError, ParseError};
use crate::parser::base::Action;
use crate::parser::cli::CommandLineInterface;
use crate::parser::printer::{HelpEntry, UsageEntry};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

type Completion<'a> = Box<dyn FnMut() -> Result<(), ParseError> + 'a>;

/// A nested command: its own interface plus a callback run once it has parsed successfully.
///
/// ### Example
/// ```
/// use argot_core::prelude::*;
/// use std::cell::Cell;
///
/// let ran = Cell::new(false);
/// let mut add = CommandLineInterface::new("add");
/// let path = add.argument(StringType, "path").unwrap();
///
/// let mut cli = CommandLineInterface::new("git");
/// cli.subcommands(
///     "add ...",
///     "Commands:",
///     vec![Subcommand::new(add, "Add a file", || {
///         ran.set(true);
///         Ok(())
///     })],
/// )
/// .unwrap();
///
/// cli.parse(&["add", "README.md"]).unwrap();
/// assert!(ran.get());
/// assert_eq!(path.value(), "README.md");
/// ```
pub struct Subcommand<'a> {
    cli: CommandLineInterface<'a>,
    help: String,
    action: Completion<'a>,
}

impl<'a> Subcommand<'a> {
    /// Wrap `cli`, which is invoked under its own name.
    pub fn new(
        cli: CommandLineInterface<'a>,
        help: impl Into<String>,
        action: impl FnMut() -> Result<(), ParseError> + 'a,
    ) -> Self {
        Self {
            cli,
            help: help.into(),
            action: Box::new(action),
        }
    }

    /// The name the sub-command is invoked by.
    pub fn name(&self) -> &str {
        self.cli.name()
    }

    fn help_entry(&self) -> (String, String) {
        (format!("{} ...", self.name()), self.help.clone())
    }

    fn into_action(self) -> (String, Action<'a>) {
        let Subcommand {
            mut cli,
            mut action,
            ..
        } = self;
        let name = cli.name().to_string();

        (
            name,
            Action::Subcommand(Box::new(move |cursor| {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Parsing sub-command '{}'.", cli.name());
                }
                cli.parse_tokenized(cursor)?;
                action()
            })),
        )
    }
}

impl<'a> CommandLineInterface<'a> {
    /// Register a group of sub-commands.
    ///
    /// `usage` stands in for the group in the usage line; the help document lists each
    /// sub-command as `name ...` under `caption`.
    pub fn subcommands(
        &mut self,
        usage: &str,
        caption: &str,
        subcommands: Vec<Subcommand<'a>>,
    ) -> Result<(), ConfigError> {
        let names: Vec<String> = subcommands.iter().map(|s| s.name().to_string()).collect();
        self.actions.check(&names)?;
        let entries = subcommands.iter().map(Subcommand::help_entry).collect();

        for subcommand in subcommands {
            let (name, action) = subcommand.into_action();
            self.actions.register(vec![name], action)?;
        }

        self.document
            .usage_entries
            .push(UsageEntry::Text(usage.to_string()));
        self.document.entries.push(HelpEntry::Subcommands {
            caption: caption.to_string(),
            entries,
        });
        Ok(())
    }

    /// Register a single sub-command, listed among the other help entries.
    pub fn command(&mut self, subcommand: Subcommand<'a>) -> Result<(), ConfigError> {
        let (syntax, description) = subcommand.help_entry();
        let (name, action) = subcommand.into_action();
        self.actions.register(vec![name.clone()], action)?;
        self.document.usage_entries.push(UsageEntry::Text(name));
        self.document.entries.push(HelpEntry::Entry {
            syntax,
            description,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;
    use crate::model::ValueOrigin;
    use crate::parser::cli::InterfaceConfig;
    use crate::parser::printer::util::column_printer;
    use crate::types::{BooleanType, IntType, StringType};
    use std::cell::RefCell;

    #[test]
    fn subcommand_delegation() {
        // Setup
        let calls = RefCell::new(Vec::default());
        let mut foo = CommandLineInterface::new("foo");
        let foo_x = foo.argument(IntType, "x").unwrap();
        let foo_y = foo.argument(IntType, "y").unwrap().default(0).unwrap();
        let mut bar = CommandLineInterface::new("bar");
        let bar_x = bar.argument(StringType, "x").unwrap();
        let bar_flag = bar
            .option(BooleanType, "flag", None)
            .unwrap()
            .default(false);
        let mut cli = CommandLineInterface::new("prog");
        let common = cli
            .option(BooleanType, "common", None)
            .unwrap()
            .default(false);
        cli.subcommands(
            "[foo|bar] ...",
            "Commands:",
            vec![
                Subcommand::new(foo, "Foo things", || {
                    calls.borrow_mut().push("foo");
                    Ok(())
                }),
                Subcommand::new(bar, "Bar things", || {
                    calls.borrow_mut().push("bar");
                    Ok(())
                }),
            ],
        )
        .unwrap();

        // Execute
        cli.parse(&["--common", "foo", "42"]).unwrap();

        // Verify
        drop(cli);
        assert_eq!(calls.into_inner(), vec!["foo"]);
        assert!(common.value());
        assert_eq!(foo_x.value(), 42);
        assert_eq!(foo_y.value(), 0);
        assert_eq!(foo_y.origin(), ValueOrigin::SetDefaultValue);
        assert_eq!(bar_x.origin(), ValueOrigin::Undefined);
        assert_eq!(bar_flag.origin(), ValueOrigin::Undefined);
    }

    #[test]
    fn subcommand_takes_remainder() {
        // Setup
        let mut child = CommandLineInterface::new("run");
        let late = child.option(BooleanType, "late", None).unwrap().default(false);
        let mut cli = CommandLineInterface::new("prog");
        let parent_late = cli.flag_argument(&["--late"], "", false, true).unwrap();
        cli.command(Subcommand::new(child, "Run it", || Ok(())))
            .unwrap();

        // Execute
        cli.parse(&["run", "--late"]).unwrap();

        // Verify
        assert!(late.value());
        assert!(!parent_late.value());
    }

    #[test]
    fn subcommand_parent_checked_first() {
        // Setup
        let (printer, interface) = column_printer(24);
        let mut cli =
            CommandLineInterface::with_config("prog", InterfaceConfig::default().help_printer(printer));
        let _level = cli.option(IntType, "level", None).unwrap().required();
        cli.command(Subcommand::new(CommandLineInterface::new("run"), "", || Ok(())))
            .unwrap();

        // Execute
        let result = cli.parse(&["run"]);

        // Verify
        assert_matches!(result, Err(ParseError::MissingRequiredOption(name)) if name == "level");
        assert_contains!(interface.consume_message(), "Usage: prog [-h] --level LEVEL run");
    }

    #[test]
    fn subcommand_reports_own_errors() {
        // Setup
        let (parent_printer, parent_interface) = column_printer(24);
        let (child_printer, child_interface) = column_printer(24);
        let mut child = CommandLineInterface::with_config(
            "run",
            InterfaceConfig::default().help_printer(child_printer),
        );
        let _count = child.argument(IntType, "count").unwrap();
        let mut cli = CommandLineInterface::with_config(
            "prog",
            InterfaceConfig::default().help_printer(parent_printer),
        );
        cli.command(Subcommand::new(child, "", || Ok(()))).unwrap();

        // Execute
        let result = cli.parse(&["run", "many"]);

        // Verify
        assert_matches!(result, Err(ParseError::Conversion(_)));
        assert!(parent_interface.lines().is_empty());
        let message = child_interface.consume_message();
        assert_contains!(message, "Option count is expected to be integer number. many is provided.");
        assert_contains!(message, "Usage: run [-h] count");
    }

    #[test]
    fn subcommand_help() {
        // Setup
        let (printer, interface) = column_printer(24);
        let mut cli =
            CommandLineInterface::with_config("prog", InterfaceConfig::default().help_printer(printer));
        cli.subcommands(
            "command ...",
            "Commands:",
            vec![
                Subcommand::new(CommandLineInterface::new("foo"), "Foo things", || Ok(())),
                Subcommand::new(CommandLineInterface::new("bar"), "Bar things", || Ok(())),
            ],
        )
        .unwrap();

        // Execute
        let result = cli.parse(&["--help"]);

        // Verify
        assert_matches!(result, Err(ParseError::HelpPrinted));
        assert_eq!(
            interface.lines(),
            vec![
                "Usage: prog [-h] command ...",
                "",
                "  -h, --help                Prints help",
                "Commands:",
                "  foo ...                   Foo things",
                "  bar ...                   Bar things",
                "",
            ]
        );
    }

    #[test]
    fn subcommand_duplicate() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        cli.flag_action(&["foo"], "", || Ok(())).unwrap();

        // Execute
        let result = cli.subcommands(
            "command ...",
            "Commands:",
            vec![
                Subcommand::new(CommandLineInterface::new("bar"), "", || Ok(())),
                Subcommand::new(CommandLineInterface::new("foo"), "", || Ok(())),
            ],
        );

        // Verify
        assert_eq!(result, Err(ConfigError::DuplicateFlag("foo".to_string())));
        assert_eq!(cli.actions.kind("bar"), None);
    }

    #[test]
    fn subcommand_completion_error() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        cli.command(Subcommand::new(CommandLineInterface::new("run"), "", || {
            Err(ParseError::callback("Nothing to run."))
        }))
        .unwrap();

        // Execute
        let result = cli.parse(&["run"]);

        // Verify
        assert_eq!(result, Err(ParseError::Callback("Nothing to run.".to_string())));
    }
}
