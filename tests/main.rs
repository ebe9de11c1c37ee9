use argot::prelude::*;
use assert_matches::assert_matches;
use rstest::rstest;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl HelpPrinter for Recorder {
    fn print_text(&mut self, text: &str) {
        self.0.borrow_mut().push(text.to_string());
    }

    fn print_separator(&mut self) {
        self.0.borrow_mut().push(String::default());
    }

    fn print_entry(&mut self, syntax: &str, description: &str) {
        self.0.borrow_mut().push(format!("{syntax} | {description}"));
    }
}

fn recorded(config: InterfaceConfig<'static>) -> (CommandLineInterface<'static>, Recorder) {
    let recorder = Recorder::default();
    let cli = CommandLineInterface::with_config("prog", config.help_printer(recorder.clone()));
    (cli, recorder)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Fast,
    Slow,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Fast => write!(f, "Fast"),
            Mode::Slow => write!(f, "Slow"),
        }
    }
}

#[test]
fn interface_compiles() {
    CommandLineInterface::new("organization");
}

#[test]
fn options_and_arguments() {
    // Setup
    let mut cli = CommandLineInterface::with_config("prog", InterfaceConfig::default().posix_tags());
    let verbose = cli
        .option(BooleanType, "verbose", Some("v"))
        .unwrap()
        .default(false);
    let level = cli.option(IntType, "level", Some("l")).unwrap();
    let tags = cli
        .option(StringType, "tag", Some("t"))
        .unwrap()
        .multiple()
        .delimiter(",")
        .unwrap();
    let input = cli.argument(StringType, "input").unwrap();
    let rest = cli
        .argument(DoubleType, "rest")
        .unwrap()
        .vararg()
        .unwrap()
        .optional()
        .unwrap();

    // Execute
    cli.parse(&["-vl3", "--tag=a,b", "-t", "c", "data.csv", "0.5", "1.5"])
        .unwrap();

    // Verify
    assert!(verbose.value());
    assert_eq!(verbose.origin(), ValueOrigin::SetByUser);
    assert_eq!(level.value(), Some(3));
    assert_eq!(tags.value(), vec!["a", "b", "c"]);
    assert_eq!(input.value(), "data.csv");
    assert_eq!(rest.value(), vec![0.5, 1.5]);
}

#[test]
fn sub_commands() {
    // Setup
    let calls = RefCell::new(Vec::default());
    let mut foo = CommandLineInterface::new("foo");
    let foo_x = foo.argument(IntType, "x").unwrap();
    let foo_y = foo.argument(IntType, "y").unwrap().default(0).unwrap();
    let mut bar = CommandLineInterface::new("bar");
    let bar_name = bar.argument(StringType, "name").unwrap();
    let mut cli = CommandLineInterface::new("prog");
    let common = cli
        .option(BooleanType, "common", None)
        .unwrap()
        .default(false);
    cli.subcommands(
        "{foo|bar} ...",
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
    cli.parse(&["--common", "bar", "alice"]).unwrap();

    // Verify
    drop(cli);
    assert_eq!(calls.into_inner(), vec!["bar"]);
    assert!(common.value());
    assert_eq!(bar_name.value(), "alice");
    assert_eq!(foo_x.origin(), ValueOrigin::Undefined);
    assert_eq!(foo_y.origin(), ValueOrigin::Undefined);
}

#[test]
fn double_dash() {
    // Setup
    let mut cli = CommandLineInterface::new("prog");
    let force = cli.flag_argument(&["--force"], "", false, true).unwrap();
    let files = cli
        .positional_arguments_list("FILE", "", 0, usize::MAX, |raw| Ok(raw.to_string()))
        .unwrap();

    // Execute
    cli.parse(&["a", "--", "--force", "-x"]).unwrap();

    // Verify
    assert!(!force.value());
    assert_eq!(files.value(), vec!["a", "--force", "-x"]);
}

#[test]
fn defaults_and_redefined() {
    // Setup
    let mut cli = CommandLineInterface::new("prog");
    let size = cli.option(IntType, "size", None).unwrap().default(10);
    let name = cli.option(StringType, "name", None).unwrap().default("x".to_string());

    // Execute
    cli.parse(&["--name", "y"]).unwrap();
    let parsed = (size.origin(), name.origin());
    size.set_value(20);

    // Verify
    assert_eq!(parsed, (ValueOrigin::SetDefaultValue, ValueOrigin::SetByUser));
    assert_eq!(size.value(), 20);
    assert_eq!(size.origin(), ValueOrigin::Redefined);
    assert_eq!(name.value(), "y");
}

#[test]
fn long_tag_value() {
    // Setup
    let mut cli = CommandLineInterface::with_config("prog", InterfaceConfig::default().posix_tags());
    let a = cli.option(StringType, "a", None).unwrap();

    // Execute
    cli.parse(&["--a=1=1"]).unwrap();

    // Verify
    assert_eq!(a.value(), Some("1=1".to_string()));
}

#[test]
fn short_tag_bundle() {
    // Setup
    let calls = RefCell::new(Vec::default());
    let mut cli = CommandLineInterface::with_config("prog", InterfaceConfig::default().posix_tags());
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
fn help_printed() {
    // Setup
    let (mut cli, recorder) = recorded(
        InterfaceConfig::default()
            .description("Does things.")
            .epilogue("Bye."),
    );
    let _count = cli
        .option(IntType, "count", Some("c"))
        .unwrap()
        .help("How many")
        .default(1);
    let _input = cli.argument(StringType, "input").unwrap().help("The input");

    // Execute
    let result = cli.parse(&["--help"]);

    // Verify
    assert_matches!(result, Err(ParseError::HelpPrinted));
    assert_eq!(
        recorder.lines(),
        vec![
            "Usage: prog [-h] [--count COUNT] input",
            "",
            "Does things.",
            "",
            "-h, --help | Prints help",
            "--count, -c | How many [1] { Int }",
            "input | The input { String }",
            "",
            "Bye.",
        ]
    );
}

#[rstest]
#[case(vec!["--nope"], ParseError::UnknownOption("--nope".to_string()))]
#[case(vec!["stray"], ParseError::UnexpectedPositional("stray".to_string()))]
fn unmatched_token(#[case] args: Vec<&str>, #[case] expected: ParseError) {
    // Setup
    let (mut cli, recorder) = recorded(InterfaceConfig::default());
    let _quiet = cli.flag_argument(&["-q"], "", false, true).unwrap();

    // Execute
    let result = cli.parse(&args);

    // Verify
    let lines = recorder.lines();
    assert_eq!(lines[0], expected.to_string());
    assert_eq!(lines[1], "Usage: prog [-h] [-q]");
    assert_eq!(result, Err(expected));
}

#[test]
fn choice_conversion_error() {
    // Setup
    let (mut cli, recorder) = recorded(InterfaceConfig::default());
    let mode = cli
        .option(Choice::new([Mode::Fast, Mode::Slow]), "mode", None)
        .unwrap()
        .default(Mode::Fast);

    // Execute
    let result = cli.parse(&["--mode", "medium"]);

    // Verify
    assert_matches!(result, Err(ParseError::Conversion(ref e)) if e.value() == "medium");
    assert_eq!(
        recorder.lines()[0],
        "Option mode is expected to be one of [fast, slow]. medium is provided."
    );
    assert_eq!(mode.origin(), ValueOrigin::Undefined);
}

#[test]
fn choice_case_insensitive() {
    // Setup
    let mut cli = CommandLineInterface::new("prog");
    let mode = cli
        .option(Choice::new([Mode::Fast, Mode::Slow]), "mode", Some("m"))
        .unwrap()
        .required();

    // Execute
    cli.parse(&["-m", "SLOW"]).unwrap();

    // Verify
    assert_eq!(mode.value(), Mode::Slow);
}

#[test]
fn declaration_errors() {
    let mut cli = CommandLineInterface::new("prog");
    let _first = cli.option(IntType, "count", Some("c")).unwrap();

    assert_matches!(
        cli.option(IntType, "", Some("c")),
        Err(ConfigError::DuplicateFlag(flag)) if flag == "-c"
    );
    assert_matches!(
        cli.option(IntType, "", None),
        Err(ConfigError::UnnamedOption)
    );
}
