use std::fmt::Display;
use std::rc::Rc;

use crate::constant::{HELP_LONG, HELP_MESSAGE, HELP_SHORT};
use crate::descriptor::Descriptor;
use crate::entity::{
    ArgumentValue, CliArgument, CliOption, Entity, Owner, SingleArgument, SingleNullableOption,
};
use crate::error::{ConfigError, ParseError};
use crate::model::{OptionPrefixStyle, PositionalLedger};
use crate::parser::base::{Action, ActionTable, Positional};
use crate::parser::printer::{ColumnPrinter, HelpDocument, HelpEntry, HelpPrinter, UsageEntry};
use crate::types::ArgType;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Construction-time settings of a [`CommandLineInterface`].
///
/// ### Example
/// ```
/// use argot_core::prelude::*;
///
/// let config = InterfaceConfig::default()
///     .description("Copies files.")
///     .posix_tags()
///     .print_help_by_default(true);
/// let cli = CommandLineInterface::with_config("cp", config);
/// ```
pub struct InterfaceConfig<'a> {
    pub(crate) usage: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) epilogue: Option<String>,
    pub(crate) add_help: bool,
    pub(crate) print_help_by_default: bool,
    pub(crate) arguments_after_double_dash_are_positional: bool,
    pub(crate) short_tag_prefix: Option<String>,
    pub(crate) long_tag_prefixes: Vec<String>,
    pub(crate) long_tag_value_delimiter: Option<String>,
    pub(crate) prefix_style: OptionPrefixStyle,
    pub(crate) help_printer: Option<Box<dyn HelpPrinter + 'a>>,
}

impl<'a> Default for InterfaceConfig<'a> {
    fn default() -> Self {
        Self {
            usage: None,
            description: None,
            epilogue: None,
            add_help: true,
            print_help_by_default: false,
            arguments_after_double_dash_are_positional: true,
            short_tag_prefix: None,
            long_tag_prefixes: Vec::default(),
            long_tag_value_delimiter: None,
            prefix_style: OptionPrefixStyle::default(),
            help_printer: None,
        }
    }
}

impl<'a> InterfaceConfig<'a> {
    /// Replace the generated usage line.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Text printed after the usage line.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Text printed after every help entry.
    pub fn epilogue(mut self, epilogue: impl Into<String>) -> Self {
        self.epilogue = Some(epilogue.into());
        self
    }

    /// Whether `-h`/`--help` are registered (default: `true`).
    pub fn add_help(mut self, add_help: bool) -> Self {
        self.add_help = add_help;
        self
    }

    /// Whether an empty command line prints help instead of parsing (default: `false`).
    pub fn print_help_by_default(mut self, print_help_by_default: bool) -> Self {
        self.print_help_by_default = print_help_by_default;
        self
    }

    /// Whether every token after `--` is treated as positional (default: `true`).
    pub fn arguments_after_double_dash_are_positional(mut self, enabled: bool) -> Self {
        self.arguments_after_double_dash_are_positional = enabled;
        self
    }

    /// The prefix introducing short-tag bundles such as `-abc`.
    pub fn short_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.short_tag_prefix = Some(prefix.into());
        self
    }

    /// The prefixes of long tags which may carry a joined value, such as `--name=value`.
    pub fn long_tag_prefixes<S: Into<String>>(
        mut self,
        prefixes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.long_tag_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// The delimiter joining a long tag to its value.
    pub fn long_tag_value_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.long_tag_value_delimiter = Some(delimiter.into());
        self
    }

    /// Short prefix `-`, long prefix `--` and the `=` delimiter.
    pub fn posix_tags(self) -> Self {
        self.short_tag_prefix("-")
            .long_tag_prefixes(["--"])
            .long_tag_value_delimiter("=")
    }

    /// How declared options spell their names.
    pub fn prefix_style(mut self, prefix_style: OptionPrefixStyle) -> Self {
        self.prefix_style = prefix_style;
        self
    }

    /// Send help and error output to `printer` instead of the console.
    pub fn help_printer(mut self, printer: impl HelpPrinter + 'a) -> Self {
        self.help_printer = Some(Box::new(printer));
        self
    }
}

/// The declaration tables of one command, and its parse entry points.
///
/// Declare everything first, then call [`CommandLineInterface::parse`].
/// Values are read afterwards through the returned handles.
///
/// ### Example
/// ```
/// use argot_core::prelude::*;
///
/// let mut cli = CommandLineInterface::new("sum");
/// let verbose = cli.flag_argument(&["-v", "--verbose"], "Talk more", false, true).unwrap();
/// let numbers = cli.argument(IntType, "numbers").unwrap().vararg().unwrap();
///
/// cli.parse(&["-v", "1", "2", "3"]).unwrap();
/// assert!(verbose.value());
/// assert_eq!(numbers.value(), vec![1, 2, 3]);
/// ```
pub struct CommandLineInterface<'a> {
    pub(crate) name: String,
    pub(crate) config: InterfaceConfig<'a>,
    pub(crate) printer: Box<dyn HelpPrinter + 'a>,
    pub(crate) document: HelpDocument,
    pub(crate) actions: ActionTable<'a>,
    pub(crate) positionals: Vec<Positional<'a>>,
    pub(crate) entities: Vec<Owner>,
    ledger: PositionalLedger,
}

fn to_flags(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|flag| flag.to_string()).collect()
}

fn positional_usage(name: &str, min: usize, max: usize) -> String {
    let repeated = if max > 1 { "..." } else { "" };

    if min == 0 {
        format!("[{name}{repeated}]")
    } else {
        format!("{name}{repeated}")
    }
}

impl<'a> CommandLineInterface<'a> {
    /// An interface with the default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, InterfaceConfig::default())
    }

    /// An interface with the given configuration.
    pub fn with_config(name: impl Into<String>, mut config: InterfaceConfig<'a>) -> Self {
        let name = name.into();
        let printer = config
            .help_printer
            .take()
            .unwrap_or_else(|| Box::new(ColumnPrinter::default()));
        let document = HelpDocument {
            name: name.clone(),
            usage: config.usage.clone(),
            description: config.description.clone(),
            epilogue: config.epilogue.clone(),
            ..HelpDocument::default()
        };
        let mut cli = Self {
            name,
            config,
            printer,
            document,
            actions: ActionTable::default(),
            positionals: Vec::default(),
            entities: Vec::default(),
            ledger: PositionalLedger::default(),
        };

        if cli.config.add_help {
            cli.register_flags(&[HELP_SHORT, HELP_LONG], None, HELP_MESSAGE, Action::Help)
                .expect("internal error - the help flags must register on an empty table");
        }

        cli
    }

    /// The command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn register_flags(
        &mut self,
        flags: &[&str],
        value_syntax: Option<&str>,
        help: &str,
        action: Action<'a>,
    ) -> Result<(), ConfigError> {
        self.actions.register(to_flags(flags), action)?;
        let (usage, syntax) = match value_syntax {
            Some(value_syntax) => (
                format!("[{} {value_syntax}]", flags[0]),
                format!("{} {value_syntax}", flags.join(", ")),
            ),
            None => (format!("[{}]", flags[0]), flags.join(", ")),
        };
        self.document.usage_entries.push(UsageEntry::Text(usage));
        self.document.entries.push(HelpEntry::Entry {
            syntax,
            description: help.to_string(),
        });
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Registered flags {flags:?} on '{}'.", self.name);
        }
        Ok(())
    }

    fn register_entity(&mut self, owner: &Owner) {
        self.document
            .usage_entries
            .push(UsageEntry::Entity(owner.clone()));
        self.document.entries.push(HelpEntry::Entity(owner.clone()));
        self.entities.push(owner.clone());
    }

    /// Consume between `min` and `max` positional tokens, handing each to `action`.
    pub fn positional_action(
        &mut self,
        name: &str,
        help: &str,
        min: usize,
        max: usize,
        action: impl FnMut(&str) -> Result<(), ParseError> + 'a,
    ) -> Result<(), ConfigError> {
        let positional = Positional::action(name, min, max, Box::new(action))?;
        self.ledger.declare(name, min)?;
        self.positionals.push(positional);
        self.document
            .usage_entries
            .push(UsageEntry::Text(positional_usage(name, min, max)));
        self.document.entries.push(HelpEntry::Entry {
            syntax: name.to_string(),
            description: help.to_string(),
        });
        Ok(())
    }

    /// Consume at most one positional token (`min` of 0 or 1), storing its mapped value.
    pub fn positional_argument<T: 'a>(
        &mut self,
        name: &str,
        help: &str,
        min: usize,
        mapping: impl Fn(&str) -> Result<T, ParseError> + 'a,
    ) -> Result<ArgumentValue<Option<T>>, ConfigError> {
        let value = ArgumentValue::new(None);
        let target = value.clone();
        self.positional_action(name, help, min, 1, move |raw| {
            target.set(Some(mapping(raw)?));
            Ok(())
        })?;
        Ok(value)
    }

    /// Consume between `min` and `max` positional tokens, collecting their mapped values.
    pub fn positional_arguments_list<T: 'a>(
        &mut self,
        name: &str,
        help: &str,
        min: usize,
        max: usize,
        mapping: impl Fn(&str) -> Result<T, ParseError> + 'a,
    ) -> Result<ArgumentValue<Vec<T>>, ConfigError> {
        let value = ArgumentValue::new(Vec::default());
        let target = value.clone();
        self.positional_action(name, help, min, max, move |raw| {
            let item = mapping(raw)?;
            target.update(|items| items.push(item));
            Ok(())
        })?;
        Ok(value)
    }

    /// Consume between `min` and `max` positional tokens, folding each into an accumulated value.
    pub fn fold_positional_arguments<T: Clone + 'a>(
        &mut self,
        name: &str,
        help: &str,
        initial: T,
        min: usize,
        max: usize,
        fold: impl Fn(T, &str) -> Result<T, ParseError> + 'a,
    ) -> Result<ArgumentValue<T>, ConfigError> {
        let value = ArgumentValue::new(initial);
        let target = value.clone();
        self.positional_action(name, help, min, max, move |raw| {
            target.set(fold(target.value(), raw)?);
            Ok(())
        })?;
        Ok(value)
    }

    /// Invoke `action` every time one of `flags` appears.
    pub fn flag_action(
        &mut self,
        flags: &[&str],
        help: &str,
        action: impl FnMut() -> Result<(), ParseError> + 'a,
    ) -> Result<(), ConfigError> {
        self.register_flags(flags, None, help, Action::Flag(Box::new(action)))
    }

    /// A value starting at `initial` which becomes `flag_value` when one of `flags` appears.
    pub fn flag_argument<T: Clone + 'a>(
        &mut self,
        flags: &[&str],
        help: &str,
        initial: T,
        flag_value: T,
    ) -> Result<ArgumentValue<T>, ConfigError> {
        let value = ArgumentValue::new(initial);
        let target = value.clone();
        self.flag_action(flags, help, move || {
            target.set(flag_value.clone());
            Ok(())
        })?;
        Ok(value)
    }

    /// A value starting at `initial`, folded every time one of `flags` appears.
    pub fn fold_flag_arguments<T: Clone + 'a>(
        &mut self,
        flags: &[&str],
        help: &str,
        initial: T,
        fold: impl Fn(T) -> T + 'a,
    ) -> Result<ArgumentValue<T>, ConfigError> {
        let value = ArgumentValue::new(initial);
        let target = value.clone();
        self.flag_action(flags, help, move || {
            target.set(fold(target.value()));
            Ok(())
        })?;
        Ok(value)
    }

    /// Invoke `action` with the token following any of `flags`.
    ///
    /// `value_syntax` is the placeholder shown in usage and help, e.g. `FILE`.
    pub fn flag_value_action(
        &mut self,
        flags: &[&str],
        value_syntax: &str,
        help: &str,
        action: impl FnMut(&str) -> Result<(), ParseError> + 'a,
    ) -> Result<(), ConfigError> {
        self.register_flags(flags, Some(value_syntax), help, Action::Value(Box::new(action)))
    }

    /// A value starting at `initial`, replaced by the mapped token following any of `flags`.
    pub fn flag_value_argument<T: 'a>(
        &mut self,
        flags: &[&str],
        value_syntax: &str,
        help: &str,
        initial: T,
        mapping: impl Fn(&str) -> Result<T, ParseError> + 'a,
    ) -> Result<ArgumentValue<T>, ConfigError> {
        let value = ArgumentValue::new(initial);
        let target = value.clone();
        self.flag_value_action(flags, value_syntax, help, move |raw| {
            target.set(mapping(raw)?);
            Ok(())
        })?;
        Ok(value)
    }

    /// Declare an option answering to `full_name` and, optionally, `short_name`.
    ///
    /// The option starts out optional and single-valued; refine it with its modifiers.
    /// Pass an empty `full_name` for a short-only option.
    pub fn option<T: Clone + 'static>(
        &mut self,
        ty: impl ArgType<T> + 'static,
        full_name: &str,
        short_name: Option<&str>,
    ) -> Result<SingleNullableOption<T>, ConfigError> {
        let full_name = Some(full_name.to_string()).filter(|name| !name.is_empty());
        let descriptor = Descriptor::option(
            Rc::new(ty),
            full_name,
            short_name.map(str::to_string),
            self.config.prefix_style,
        )?;
        let entity = Entity::declare(descriptor);
        let owner = entity.owner().clone();
        let flags = owner.borrow().flags();
        self.actions
            .register(flags, Action::Entity(owner.clone()))?;
        self.register_entity(&owner);
        Ok(CliOption::new(entity))
    }

    /// Declare a positional argument.
    ///
    /// The argument starts out required and single-valued; refine it with its modifiers.
    pub fn argument<T: Clone + 'static>(
        &mut self,
        ty: impl ArgType<T> + 'static,
        name: &str,
    ) -> Result<SingleArgument<T>, ConfigError> {
        let descriptor = Descriptor::argument(Rc::new(ty), name.to_string());
        let slot = self.ledger.declare(name, descriptor.min_args())?;
        let entity = Entity::declare(descriptor);
        let owner = entity.owner().clone();
        self.positionals.push(Positional::Entity(owner.clone()));
        self.register_entity(&owner);
        Ok(CliArgument::new(entity, self.ledger.clone(), slot))
    }

    /// Add a line of free text to the help document, e.g. a caption.
    pub fn help_text(&mut self, text: impl Display) {
        self.document.entries.push(HelpEntry::Text(text.to_string()));
    }

    /// Add a blank line to the help document.
    pub fn help_separator(&mut self) {
        self.document.entries.push(HelpEntry::Separator);
    }

    /// Print the help document through the configured printer.
    pub fn print_help(&mut self) {
        self.document.render(self.printer.as_mut());
    }
}
