use thiserror::Error;

/// An invalid declaration.
///
/// Raised by declaration calls and modifiers; a parse is never attempted against a half-built interface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The flag string was already registered on this interface.
    #[error("Flag is already set: {0}")]
    DuplicateFlag(String),

    /// A flag action was declared with no aliases.
    #[error("At least one flag must be provided.")]
    NoFlags,

    /// An option declared without a full name or a short name.
    #[error("Option must have a full name or a short name.")]
    UnnamedOption,

    /// A positional declared with an impossible arity.
    #[error("Invalid arity for '{name}' (min={min}, max={max}).")]
    InvalidArity {
        /// The positional name.
        name: String,
        /// The declared minimum.
        min: usize,
        /// The declared maximum.
        max: usize,
    },

    /// `multiple(n)` with `n < 2`.
    #[error("multiple() modifier with value less than 2 is unavailable. It's already set to 1.")]
    MultipleTooFew(String),

    /// A required positional declared after an optional one.
    #[error("Required positional '{name}' can't follow the optional positional '{optional}'.")]
    MisorderedPositional {
        /// The positional being declared or modified.
        name: String,
        /// The earlier optional positional.
        optional: String,
    },

    /// A collection default without any values.
    #[error("Default value for '{0}' can't be an empty collection.")]
    EmptyDefault(String),

    /// A default pattern referencing an entity that may end up without a value.
    #[error("Default value pattern can only reference entities that are required or have a default, but '{0}' is neither.")]
    UnguaranteedSource(String),

    /// A default pattern whose sources eventually reference the entity it is attached to.
    #[error("Default value pattern for '{0}' introduces a dependency cycle.")]
    DefaultCycle(String),

    /// An empty delimiter string.
    #[error("Delimiter for '{0}' can't be empty.")]
    EmptyDelimiter(String),
}

/// A token that could not be converted into the declared type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConversionError {
    name: String,
    value: String,
    message: String,
}

impl ConversionError {
    /// Describe the failure to convert `value` for the option or argument called `name`.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// The option or argument the value was destined for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw token.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The outcome of a parse that did not bind every declaration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A token failed type conversion.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A value-consuming flag was the last token.
    #[error("No argument for flag {0}")]
    MissingFlagValue(String),

    /// A positional received fewer tokens than its minimum arity.
    #[error("Not enough positional arguments for {name}: {actual}, expected at least {min}")]
    NotEnoughPositionals {
        /// The positional name.
        name: String,
        /// Tokens received.
        actual: usize,
        /// Minimum arity.
        min: usize,
    },

    /// A plain token with no positional slot left to absorb it.
    #[error("Unexpected positional argument: '{0}'")]
    UnexpectedPositional(String),

    /// A flag-shaped token with no registered action and no positional slot to absorb it.
    #[error("Unknown option {0}")]
    UnknownOption(String),

    /// A single-valued option given more than once.
    #[error("Option {0} is used more than one time.")]
    RepeatedOption(String),

    /// A required option without a default that was never provided.
    #[error("Value for option {0} should be always provided in command line.")]
    MissingRequiredOption(String),

    /// A default pattern could not be evaluated from its sources.
    #[error("Default value for '{0}' could not be computed.")]
    UnresolvedDefault(String),

    /// Help was requested and has already been printed.
    #[error("Help was printed.")]
    HelpPrinted,

    /// A callback ended the parse early.
    #[error("Parsing was stopped.")]
    Stopped,

    /// An error raised by user code from inside a callback.
    #[error("{0}")]
    Callback(String),
}

impl ParseError {
    /// Signal from a callback that the parse should end here, without an error message or help.
    pub fn stop() -> Self {
        ParseError::Stopped
    }

    /// Fail the parse from inside a callback with the given message.
    pub fn callback(message: impl Into<String>) -> Self {
        ParseError::Callback(message.into())
    }

    /// Whether this outcome is the "help was printed" termination rather than a failure.
    pub fn is_help_printed(&self) -> bool {
        matches!(self, ParseError::HelpPrinted)
    }

    // Terminations that have nothing left to report to the user.
    pub(crate) fn is_silent(&self) -> bool {
        matches!(self, ParseError::HelpPrinted | ParseError::Stopped)
    }
}

/// Reading a value before any parse has bound it.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Value for {0} isn't set. The interface must be parsed before the value is read.")]
pub struct UnsetValueError(pub(crate) String);
