use argot::prelude::*;
use std::cell::Cell;

#[derive(Debug, Clone, Copy)]
enum Command {
    Add,
    Greet,
}

fn main() -> Result<(), ConfigError> {
    let chosen = Cell::new(None);

    let mut add = CommandLineInterface::new("add");
    let left = add.argument(IntType, "left")?.help("First term");
    let right = add
        .argument(IntType, "right")?
        .help("Second term")
        .default(0)?;

    let mut greet = CommandLineInterface::new("greet");
    let name = greet.argument(StringType, "name")?.help("Who to greet");
    let shout = greet
        .option(BooleanType, "shout", Some("s"))?
        .help("Greet loudly")
        .default(false);

    let mut cli = CommandLineInterface::with_config(
        "tool",
        InterfaceConfig::default()
            .description("A small tool with two commands.")
            .epilogue("Run 'tool <command> --help' for the options of a command."),
    );
    cli.subcommands(
        "{add|greet} ...",
        "Commands:",
        vec![
            Subcommand::new(add, "Add two numbers", || {
                chosen.set(Some(Command::Add));
                Ok(())
            }),
            Subcommand::new(greet, "Say hello", || {
                chosen.set(Some(Command::Greet));
                Ok(())
            }),
        ],
    )?;

    match cli.parse_env() {
        Ok(()) => {}
        Err(error) if error.is_help_printed() => return Ok(()),
        Err(_) => std::process::exit(1),
    }

    match chosen.get() {
        Some(Command::Add) => println!("{}", left.value() + right.value()),
        Some(Command::Greet) if shout.value() => {
            println!("HELLO, {}!", name.value().to_uppercase())
        }
        Some(Command::Greet) => println!("Hello, {}!", name.value()),
        None => cli.print_help(),
    }

    Ok(())
}
