pub(crate) const HELP_SHORT: &str = "-h";
pub(crate) const HELP_LONG: &str = "--help";
pub(crate) const HELP_MESSAGE: &str = "Prints help";
pub(crate) const DOUBLE_DASH: &str = "--";
pub(crate) const USAGE_PREFIX: &str = "Usage:";
pub(crate) const WARNING_PREFIX: &str = "Warning:";
// A boolean-like option without a parameter is matched as if the user wrote this value.
pub(crate) const FLAG_PRESENT: &str = "true";
// Matches the syntax column of the classic `SimpleHelpPrinter(24)`.
pub(crate) const DEFAULT_SYNTAX_WIDTH: usize = 24;
