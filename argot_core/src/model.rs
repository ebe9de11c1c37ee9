use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ConfigError;

/// Provenance of the value bound to an option or argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOrigin {
    /// No parse has bound this entity yet.
    Undefined,
    /// The value came from the command line.
    SetByUser,
    /// The value came from the declared default.
    SetDefaultValue,
    /// The entity is optional and was never provided.
    Unset,
    /// The value was re-assigned programmatically after parsing.
    Redefined,
}

impl ValueOrigin {
    pub(crate) fn is_resolved(&self) -> bool {
        !matches!(self, ValueOrigin::Undefined)
    }
}

impl std::fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The prefixes used to spell the full and short names of declared options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionPrefixStyle {
    /// `--name` and `-n`.
    #[default]
    Linux,
    /// `-name` and `-n`.
    Jvm,
}

impl OptionPrefixStyle {
    pub(crate) fn full_prefix(&self) -> &'static str {
        match self {
            OptionPrefixStyle::Linux => "--",
            OptionPrefixStyle::Jvm => "-",
        }
    }

    pub(crate) fn short_prefix(&self) -> &'static str {
        "-"
    }
}

/// How a registered flag string behaves when the tokenizer or the dispatch engine meets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActionKind {
    Flag,
    Value,
    Subcommand,
    Help,
    Entity { has_parameter: bool },
}

impl ActionKind {
    pub(crate) fn consumes_value(&self) -> bool {
        matches!(
            self,
            ActionKind::Value
                | ActionKind::Entity {
                    has_parameter: true
                }
        )
    }

    // Sub-commands own the remainder of the stream, so they never take part in a short-tag bundle.
    pub(crate) fn is_bundleable(&self) -> bool {
        !matches!(self, ActionKind::Subcommand)
    }
}

/// The minimum arity of every positional, in declaration order.
///
/// A positional with a non-zero minimum can never follow one whose minimum is zero.
#[derive(Debug, Clone, Default)]
pub(crate) struct PositionalLedger(Rc<RefCell<Vec<(String, usize)>>>);

impl PositionalLedger {
    pub(crate) fn declare(&self, name: &str, min: usize) -> Result<usize, ConfigError> {
        let mut entries = self.0.borrow_mut();

        if min > 0 {
            if let Some((optional, _)) = entries.iter().find(|(_, m)| *m == 0) {
                return Err(ConfigError::MisorderedPositional {
                    name: name.to_string(),
                    optional: optional.clone(),
                });
            }
        }

        entries.push((name.to_string(), min));
        Ok(entries.len() - 1)
    }

    pub(crate) fn update(&self, slot: usize, min: usize) -> Result<(), ConfigError> {
        let mut entries = self.0.borrow_mut();
        let name = entries[slot].0.clone();

        if min > 0 {
            if let Some((optional, _)) = entries[..slot].iter().find(|(_, m)| *m == 0) {
                return Err(ConfigError::MisorderedPositional {
                    name,
                    optional: optional.clone(),
                });
            }
        } else if let Some((required, _)) = entries[slot + 1..].iter().find(|(_, m)| *m > 0) {
            return Err(ConfigError::MisorderedPositional {
                name: required.clone(),
                optional: name,
            });
        }

        entries[slot].1 = min;
        Ok(())
    }
}
