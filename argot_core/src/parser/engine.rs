use std::rc::Rc;

use crate::constant::{DOUBLE_DASH, FLAG_PRESENT, WARNING_PREFIX};
use crate::entity::{Bindable, Owner};
use crate::error::ParseError;
use crate::parser::base::{Action, Positional};
use crate::parser::cli::CommandLineInterface;
use crate::parser::printer::HelpPrinter;
use crate::tokens::{tokenize, TagSyntax, TokenCursor};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

// The positional slot currently receiving tokens, and how many it has taken.
#[derive(Debug, Default)]
struct PositionalCursor {
    index: usize,
    count: usize,
}

impl<'a> CommandLineInterface<'a> {
    /// Parse the program arguments of the current process (without the program name).
    pub fn parse_env(&mut self) -> Result<(), ParseError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.parse(&args)
    }

    /// Tokenize `args` and parse them.
    ///
    /// Every declared value is bound when this returns `Ok`.
    /// On failure the message and the help document have already been printed,
    /// except for [`ParseError::HelpPrinted`] and [`ParseError::Stopped`] which print nothing further.
    pub fn parse<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), ParseError> {
        let syntax = TagSyntax {
            short_prefix: self.config.short_tag_prefix.as_deref(),
            long_prefixes: &self.config.long_tag_prefixes,
            long_delimiter: self.config.long_tag_value_delimiter.as_deref(),
        };
        let tokens = tokenize(args, &syntax, |flag| self.actions.kind(flag));
        let mut cursor = TokenCursor::new(tokens);
        self.parse_tokenized(&mut cursor)
    }

    /// Parse already tokenized input, consuming the cursor to its end.
    pub fn parse_tokenized(&mut self, cursor: &mut TokenCursor) -> Result<(), ParseError> {
        if self.config.print_help_by_default && !cursor.has_next() {
            self.print_help();
            return Err(ParseError::HelpPrinted);
        }

        let mut delegated = false;

        match self.consume(cursor, &mut delegated) {
            Ok(()) => Ok(()),
            Err(error) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Parsing '{}' failed: {error:?}.", self.name);
                }

                // A sub-command reports its own failures.
                if !error.is_silent() && !delegated {
                    self.printer.print_text(&error.to_string());
                    self.print_help();
                }

                Err(error)
            }
        }
    }

    fn consume(
        &mut self,
        cursor: &mut TokenCursor,
        delegated: &mut bool,
    ) -> Result<(), ParseError> {
        for owner in &self.entities {
            owner.borrow().reset();
        }

        let mut slot = PositionalCursor::default();

        while let Some(token) = cursor.next() {
            if self.config.arguments_after_double_dash_are_positional && token == DOUBLE_DASH {
                while let Some(rest) = cursor.next() {
                    accept_positional(
                        &mut self.positionals,
                        &mut slot,
                        rest,
                        false,
                        self.printer.as_mut(),
                    )?;
                }

                break;
            }

            let Some(index) = self.actions.index_of(&token) else {
                let flag_shaped = self.is_flag_shaped(&token);
                accept_positional(
                    &mut self.positionals,
                    &mut slot,
                    token,
                    flag_shaped,
                    self.printer.as_mut(),
                )?;
                continue;
            };

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Matched flag '{token}' on '{}'.", self.name);
            }

            match self.actions.get_mut(index) {
                Action::Help => {
                    self.document.render(self.printer.as_mut());
                    return Err(ParseError::HelpPrinted);
                }
                Action::Flag(action) => action()?,
                Action::Value(action) => {
                    let value = cursor
                        .next()
                        .ok_or_else(|| ParseError::MissingFlagValue(token.clone()))?;
                    action(&value)?;
                }
                Action::Entity(owner) => {
                    let entity = owner.borrow().clone();
                    warn_deprecated(self.printer.as_mut(), &*entity);

                    if entity.has_parameter() {
                        let value = cursor
                            .next()
                            .ok_or_else(|| ParseError::MissingFlagValue(token.clone()))?;
                        entity.accept(&value)?;
                    } else {
                        entity.accept(FLAG_PRESENT)?;
                    }
                }
                Action::Subcommand(action) => {
                    // The parent is complete before the sub-command takes the remainder.
                    finish(&self.positionals, &slot, &self.entities)?;
                    *delegated = true;
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Delegating the remaining tokens to '{token}'.");
                    }
                    return action(cursor);
                }
            }
        }

        finish(&self.positionals, &slot, &self.entities)
    }

    fn is_flag_shaped(&self, token: &str) -> bool {
        let style = self.config.prefix_style;
        let mut prefixes = vec![style.short_prefix(), style.full_prefix()];
        prefixes.extend(self.config.short_tag_prefix.as_deref());
        prefixes.extend(self.config.long_tag_prefixes.iter().map(String::as_str));

        prefixes.iter().any(|prefix| {
            !prefix.is_empty() && token.len() > prefix.len() && token.starts_with(prefix)
        })
    }
}

fn warn_deprecated(printer: &mut dyn HelpPrinter, entity: &dyn Bindable) {
    if let Some(warning) = entity.deprecated_warning() {
        printer.print_text(&format!("{WARNING_PREFIX} {warning}"));
    }
}

fn accept_positional(
    positionals: &mut [Positional],
    slot: &mut PositionalCursor,
    token: String,
    flag_shaped: bool,
    printer: &mut dyn HelpPrinter,
) -> Result<(), ParseError> {
    let Some(positional) = positionals.get_mut(slot.index) else {
        return Err(if flag_shaped {
            ParseError::UnknownOption(token)
        } else {
            ParseError::UnexpectedPositional(token)
        });
    };

    if slot.count == 0 {
        if let Some(warning) = positional.deprecated_warning() {
            printer.print_text(&format!("{WARNING_PREFIX} {warning}"));
        }
    }

    positional.accept(&token)?;
    slot.count += 1;

    if slot.count >= positional.max_args() {
        slot.index += 1;
        slot.count = 0;
    }

    Ok(())
}

fn finish(
    positionals: &[Positional],
    slot: &PositionalCursor,
    entities: &[Owner],
) -> Result<(), ParseError> {
    for (index, positional) in positionals.iter().enumerate().skip(slot.index) {
        let actual = if index == slot.index { slot.count } else { 0 };
        let min = positional.min_args();

        if actual < min {
            return Err(ParseError::NotEnoughPositionals {
                name: positional.name(),
                actual,
                min,
            });
        }
    }

    let entities: Vec<Rc<dyn Bindable>> = entities
        .iter()
        .map(|owner| owner.borrow().clone())
        .collect();

    for entity in &entities {
        entity.finish()?;
    }

    // Patterns resolve in dependency order; a pass without progress can never succeed.
    let mut pending: Vec<Rc<dyn Bindable>> = entities
        .into_iter()
        .filter(|entity| !entity.origin().is_resolved())
        .collect();

    while !pending.is_empty() {
        let before = pending.len();
        let mut waiting = Vec::default();

        for entity in pending {
            if !entity.resolve_pattern()? {
                waiting.push(entity);
            }
        }

        if waiting.len() == before {
            return Err(ParseError::UnresolvedDefault(waiting[0].display_name()));
        }

        pending = waiting;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;
    use crate::descriptor::DefaultValue;
    use crate::error::ConfigError;
    use crate::model::ValueOrigin;
    use crate::parser::cli::InterfaceConfig;
    use crate::parser::interface::util::InMemoryInterface;
    use crate::parser::printer::util::column_printer;
    use crate::types::{Choice, IntType, StringType};
    use rstest::rstest;
    use std::cell::RefCell;

    fn nothing() -> &'static [&'static str] {
        empty::slice()
    }

    fn recorded(config: InterfaceConfig<'static>) -> (CommandLineInterface<'static>, InMemoryInterface) {
        let (printer, interface) = column_printer(24);
        (
            CommandLineInterface::with_config("prog", config.help_printer(printer)),
            interface,
        )
    }

    #[test]
    fn posix_bundle_dispatch() {
        // Setup
        let calls = RefCell::new(Vec::default());
        let mut cli = CommandLineInterface::with_config(
            "prog",
            InterfaceConfig::default().posix_tags(),
        );
        cli.flag_action(&["-a"], "", || {
            calls.borrow_mut().push("a".to_string());
            Ok(())
        })
        .unwrap();
        cli.flag_action(&["-b"], "", || {
            calls.borrow_mut().push("b".to_string());
            Ok(())
        })
        .unwrap();
        cli.flag_value_action(&["-c"], "C", "", |value| {
            calls.borrow_mut().push(format!("c={value}"));
            Ok(())
        })
        .unwrap();

        // Execute
        cli.parse(&["-aabbcabab"]).unwrap();

        // Verify
        drop(cli);
        assert_eq!(calls.into_inner(), vec!["a", "a", "b", "b", "c=abab"]);
    }

    #[test]
    fn double_dash_forces_positionals() {
        // Setup
        let foo_calls = RefCell::new(0);
        let mut cli = CommandLineInterface::new("prog");
        let x = cli
            .positional_arguments_list("X", "", 0, usize::MAX, |raw| Ok(raw.to_string()))
            .unwrap();
        cli.flag_action(&["--foo"], "", || {
            *foo_calls.borrow_mut() += 1;
            Ok(())
        })
        .unwrap();

        // Execute
        cli.parse(&["1", "--", "--foo", "--foo"]).unwrap();

        // Verify
        drop(cli);
        assert_eq!(x.value(), vec!["1", "--foo", "--foo"]);
        assert_eq!(foo_calls.into_inner(), 0);
    }

    #[test]
    fn double_dash_disabled() {
        // Setup
        let mut cli = CommandLineInterface::with_config(
            "prog",
            InterfaceConfig::default().arguments_after_double_dash_are_positional(false),
        );
        let x = cli
            .positional_arguments_list("X", "", 0, usize::MAX, |raw| Ok(raw.to_string()))
            .unwrap();

        // Execute
        cli.parse(&["--", "a"]).unwrap();

        // Verify
        assert_eq!(x.value(), vec!["--", "a"]);
    }

    #[test]
    fn long_tag_split() {
        // Setup
        let mut cli = CommandLineInterface::with_config(
            "prog",
            InterfaceConfig::default().posix_tags(),
        );
        let a = cli.option(StringType, "a", None).unwrap();
        let b = cli.option(StringType, "b", None).unwrap();

        // Execute
        cli.parse(&["--a=1=1", "--b=2"]).unwrap();

        // Verify
        assert_eq!(a.value(), Some("1=1".to_string()));
        assert_eq!(b.value(), Some("2".to_string()));
    }

    #[test]
    fn missing_positional() {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default());
        let _input = cli.argument(StringType, "input").unwrap();

        // Execute
        let result = cli.parse(nothing());

        // Verify
        assert_matches!(result, Err(ParseError::NotEnoughPositionals { ref name, actual: 0, min: 1 }) if name == "input");
        let error = result.unwrap_err().to_string();
        assert_contains!(error, "expected at least 1");
        let message = interface.consume_message();
        assert_contains!(message, &error);
        assert_contains!(message, "Usage: prog [-h] input");
    }

    #[test]
    fn missing_flag_value() {
        // Setup
        let (mut cli, _interface) = recorded(InterfaceConfig::default());
        let _output = cli.option(StringType, "output", Some("o")).unwrap();

        // Execute
        let result = cli.parse(&["-o"]);

        // Verify
        assert_matches!(result, Err(ParseError::MissingFlagValue(flag)) if flag == "-o");
    }

    #[rstest]
    #[case(vec!["a", "--nope"], ParseError::UnknownOption("--nope".to_string()))]
    #[case(vec!["a", "-n"], ParseError::UnknownOption("-n".to_string()))]
    #[case(vec!["a", "stray"], ParseError::UnexpectedPositional("stray".to_string()))]
    #[case(vec!["a", "-"], ParseError::UnexpectedPositional("-".to_string()))]
    fn unmatched_tokens(#[case] args: Vec<&str>, #[case] expected: ParseError) {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default());
        let item = cli
            .positional_argument("item", "", 0, |raw| Ok(raw.to_string()))
            .unwrap();

        // Execute
        let result = cli.parse(&args);

        // Verify
        assert_eq!(item.value(), Some("a".to_string()));
        assert_contains!(interface.consume_message(), &expected.to_string());
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn flag_shaped_absorbed_by_positional() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        let item = cli
            .positional_argument("item", "", 1, |raw| Ok(raw.to_string()))
            .unwrap();

        // Execute
        cli.parse(&["--nope"]).unwrap();

        // Verify
        assert_eq!(item.value(), Some("--nope".to_string()));
    }

    #[test]
    fn help_requested() {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default().description("Helpful."));
        let touched = cli.flag_argument(&["-t"], "Touch", false, true).unwrap();

        // Execute
        let result = cli.parse(&["-t", "--help", "extra"]);

        // Verify
        assert_matches!(result, Err(ref e) if e.is_help_printed());
        assert!(touched.value());
        let message = interface.consume_message();
        assert_contains!(message, "Usage: prog [-h] [-t]");
        assert_contains!(message, "Helpful.");
        assert!(!message.contains("Help was printed"));
    }

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    fn help_by_default(#[case] enabled: bool, #[case] printed: bool) {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default().print_help_by_default(enabled));

        // Execute
        let result = cli.parse(nothing());

        // Verify
        assert_eq!(result.is_err(), printed);
        assert_eq!(!interface.lines().is_empty(), printed);
    }

    #[test]
    fn defaults_and_redefined() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        let count = cli.option(IntType, "count", None).unwrap().default(5);

        // Execute
        cli.parse(nothing()).unwrap();
        let after_parse = (count.value(), count.origin());
        count.set_value(9);

        // Verify
        assert_eq!(after_parse, (5, ValueOrigin::SetDefaultValue));
        assert_eq!(count.value(), 9);
        assert_eq!(count.origin(), ValueOrigin::Redefined);
    }

    #[test]
    fn reparse_overwrites() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        let count = cli.option(IntType, "count", None).unwrap();

        // Execute
        cli.parse(&["--count", "1"]).unwrap();
        let first = count.value();
        cli.parse(nothing()).unwrap();

        // Verify
        assert_eq!(first, Some(1));
        assert_eq!(count.value(), None);
        assert_eq!(count.origin(), ValueOrigin::Unset);
    }

    #[test]
    fn repeated_option() {
        // Setup
        let (mut cli, _interface) = recorded(InterfaceConfig::default());
        let _count = cli.option(IntType, "count", Some("c")).unwrap();

        // Execute
        let result = cli.parse(&["-c", "1", "--count", "2"]);

        // Verify
        assert_matches!(result, Err(ParseError::RepeatedOption(name)) if name == "count");
    }

    #[test]
    fn required_option() {
        // Setup
        let (mut cli, _interface) = recorded(InterfaceConfig::default());
        let _count = cli.option(IntType, "count", None).unwrap().required();

        // Execute
        let result = cli.parse(nothing());

        // Verify
        assert_eq!(
            result.unwrap_err().to_string(),
            "Value for option count should be always provided in command line."
        );
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Fast,
        Slow,
    }

    impl std::fmt::Display for Mode {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    #[test]
    fn conversion_failure() {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default());
        let mode = cli
            .option(Choice::new([Mode::Fast, Mode::Slow]), "mode", None)
            .unwrap();
        let _count = cli.option(IntType, "count", None).unwrap();

        // Execute
        let result = cli.parse(&["--mode", "SLOW", "--count", "x"]);

        // Verify
        assert_matches!(result, Err(ParseError::Conversion(ref e)) if e.name() == "count" && e.value() == "x");
        // Values bound before the failure stay bound.
        assert_eq!(mode.value(), Some(Mode::Slow));
        assert_contains!(
            interface.consume_message(),
            "Option count is expected to be integer number. x is provided."
        );
    }

    #[test]
    fn positional_entities() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        let pair = cli.argument(IntType, "pair").unwrap().multiple(2).unwrap();
        let name = cli.argument(StringType, "name").unwrap();
        let rest = cli
            .argument(StringType, "rest")
            .unwrap()
            .vararg()
            .unwrap()
            .optional()
            .unwrap();

        // Execute
        cli.parse(&["1", "2", "bob"]).unwrap();

        // Verify
        assert_eq!(pair.value(), vec![1, 2]);
        assert_eq!(name.value(), "bob");
        assert_eq!(rest.value(), Vec::<String>::default());
        assert_eq!(rest.origin(), ValueOrigin::Unset);
    }

    #[test]
    fn positional_partial() {
        // Setup
        let (mut cli, _interface) = recorded(InterfaceConfig::default());
        let _pair = cli.argument(IntType, "pair").unwrap().multiple(3).unwrap();

        // Execute
        let result = cli.parse(&["1", "2"]);

        // Verify
        assert_eq!(
            result,
            Err(ParseError::NotEnoughPositionals {
                name: "pair".to_string(),
                actual: 2,
                min: 3,
            })
        );
    }

    #[test]
    fn default_pattern() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        let input = cli.argument(StringType, "input").unwrap();
        let output = cli
            .option(StringType, "output", None)
            .unwrap()
            .default_pattern(
                DefaultValue::pattern(&[&input], |values: &[String]| format!("{}.out", values[0]))
                    .unwrap(),
            )
            .unwrap();
        let backup = cli
            .option(StringType, "backup", None)
            .unwrap()
            .default_pattern(
                DefaultValue::pattern(&[&output], |values: &[String]| format!("{}.bak", values[0]))
                    .unwrap(),
            )
            .unwrap();

        // Execute
        cli.parse(&["data"]).unwrap();
        let defaulted = (output.value(), backup.value(), backup.origin());
        cli.parse(&["--output", "mine", "data"]).unwrap();

        // Verify
        assert_eq!(
            defaulted,
            (
                "data.out".to_string(),
                "data.out.bak".to_string(),
                ValueOrigin::SetDefaultValue
            )
        );
        assert_eq!(output.value(), "mine");
        assert_eq!(backup.value(), "mine.bak");
    }

    #[test]
    fn vararg_default_without_tokens() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        let numbers = cli
            .argument(IntType, "numbers")
            .unwrap()
            .default(3)
            .unwrap()
            .vararg()
            .unwrap();

        // Execute
        cli.parse(nothing()).unwrap();

        // Verify
        assert_eq!(numbers.value(), vec![3]);
        assert_eq!(numbers.origin(), ValueOrigin::SetDefaultValue);
    }

    #[test]
    fn pattern_source_stays_guaranteed() {
        // Setup
        let mut cli = CommandLineInterface::new("prog");
        let input = cli.argument(StringType, "input").unwrap();
        let count = cli.argument(IntType, "count").unwrap().default(1).unwrap();
        let _output = cli
            .option(StringType, "output", None)
            .unwrap()
            .default_pattern(
                DefaultValue::pattern(&[&input], |values: &[String]| values[0].clone()).unwrap(),
            )
            .unwrap();
        let _repeat = cli
            .option(IntType, "repeat", None)
            .unwrap()
            .default_pattern(DefaultValue::pattern(&[&count], |values: &[i64]| values[0]).unwrap())
            .unwrap();

        // Execute
        let input = input.help("The input");
        let unguaranteed = input.optional().err();
        let reshaped = count.vararg().err();

        // Verify
        assert_matches!(unguaranteed, Some(ConfigError::UnguaranteedSource(name)) if name == "input");
        assert_matches!(reshaped, Some(ConfigError::UnguaranteedSource(name)) if name == "count");
    }

    #[test]
    fn deprecated_warning() {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default());
        let _old = cli
            .option(StringType, "old", None)
            .unwrap()
            .deprecated("Use --new instead");
        let _legacy = cli
            .argument(StringType, "legacy")
            .unwrap()
            .deprecated("Positional is going away")
            .optional()
            .unwrap();

        // Execute
        cli.parse(&["--old", "x", "y"]).unwrap();

        // Verify
        assert_eq!(
            interface.lines(),
            vec!["Warning: Use --new instead", "Warning: Positional is going away"]
        );
    }

    #[test]
    fn callback_stop() {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default());
        let later = cli.flag_argument(&["-l"], "", false, true).unwrap();
        cli.flag_action(&["-s"], "", || Err(ParseError::stop())).unwrap();

        // Execute
        let result = cli.parse(&["-s", "-l"]);

        // Verify
        assert_eq!(result, Err(ParseError::Stopped));
        assert!(!later.value());
        assert!(interface.lines().is_empty());
    }

    #[test]
    fn callback_error() {
        // Setup
        let (mut cli, interface) = recorded(InterfaceConfig::default());
        cli.flag_value_action(&["-p"], "PORT", "", |raw| {
            if raw == "0" {
                Err(ParseError::callback("Port 0 is reserved."))
            } else {
                Ok(())
            }
        })
        .unwrap();

        // Execute
        let result = cli.parse(&["-p", "0"]);

        // Verify
        assert_eq!(result, Err(ParseError::Callback("Port 0 is reserved.".to_string())));
        assert_eq!(interface.lines()[0], "Port 0 is reserved.");
    }
}
