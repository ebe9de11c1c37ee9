use argot::prelude::*;

fn main() -> Result<(), ConfigError> {
    let mut cli = CommandLineInterface::with_config(
        "summer",
        InterfaceConfig::default()
            .description("Sum the given numbers.")
            .posix_tags(),
    );
    let verbose = cli
        .option(BooleanType, "verbose", Some("v"))?
        .help("Print each term before the sum")
        .default(false);
    let items = cli
        .argument(IntType, "item")?
        .help("The numbers to sum")
        .vararg()?;

    match cli.parse_env() {
        Ok(()) => {}
        Err(error) if error.is_help_printed() => return Ok(()),
        Err(_) => std::process::exit(1),
    }

    let items = items.value();

    if verbose.value() {
        for item in &items {
            println!("+ {item}");
        }
    }

    println!("Sum: {}", items.iter().sum::<i64>());
    Ok(())
}
