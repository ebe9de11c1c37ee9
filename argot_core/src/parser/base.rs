use std::collections::HashMap;
use std::rc::Rc;

use crate::entity::{Bindable, Owner};
use crate::error::{ConfigError, ParseError};
use crate::model::ActionKind;
use crate::tokens::TokenCursor;

pub(crate) type FlagCallback<'a> = Box<dyn FnMut() -> Result<(), ParseError> + 'a>;
pub(crate) type ValueCallback<'a> = Box<dyn FnMut(&str) -> Result<(), ParseError> + 'a>;
pub(crate) type SubcommandCallback<'a> =
    Box<dyn FnMut(&mut TokenCursor) -> Result<(), ParseError> + 'a>;

/// What happens when the engine meets a registered flag string.
pub(crate) enum Action<'a> {
    Flag(FlagCallback<'a>),
    Value(ValueCallback<'a>),
    Subcommand(SubcommandCallback<'a>),
    Help,
    Entity(Owner),
}

impl<'a> Action<'a> {
    fn kind(&self) -> ActionKind {
        match self {
            Action::Flag(_) => ActionKind::Flag,
            Action::Value(_) => ActionKind::Value,
            Action::Subcommand(_) => ActionKind::Subcommand,
            Action::Help => ActionKind::Help,
            Action::Entity(owner) => ActionKind::Entity {
                has_parameter: owner.borrow().has_parameter(),
            },
        }
    }
}

/// Maps every registered flag string to its action.
/// Aliases share a single action.
#[derive(Default)]
pub(crate) struct ActionTable<'a> {
    actions: Vec<Action<'a>>,
    flags: HashMap<String, usize>,
}

impl<'a> ActionTable<'a> {
    /// Fail unless every flag in `flags` is new, to this table and to the list itself.
    pub(crate) fn check(&self, flags: &[String]) -> Result<(), ConfigError> {
        if flags.is_empty() {
            return Err(ConfigError::NoFlags);
        }

        for (i, flag) in flags.iter().enumerate() {
            if self.flags.contains_key(flag) || flags[..i].contains(flag) {
                return Err(ConfigError::DuplicateFlag(flag.clone()));
            }
        }

        Ok(())
    }

    pub(crate) fn register(
        &mut self,
        flags: Vec<String>,
        action: Action<'a>,
    ) -> Result<(), ConfigError> {
        self.check(&flags)?;
        let index = self.actions.len();
        self.actions.push(action);

        for flag in flags {
            self.flags.insert(flag, index);
        }

        Ok(())
    }

    pub(crate) fn index_of(&self, flag: &str) -> Option<usize> {
        self.flags.get(flag).copied()
    }

    pub(crate) fn kind(&self, flag: &str) -> Option<ActionKind> {
        self.index_of(flag).map(|index| self.actions[index].kind())
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Action<'a> {
        &mut self.actions[index]
    }
}

pub(crate) struct PositionalAction<'a> {
    pub(crate) name: String,
    pub(crate) min: usize,
    pub(crate) max: usize,
    pub(crate) action: ValueCallback<'a>,
}

/// One slot in the positional queue.
pub(crate) enum Positional<'a> {
    Action(PositionalAction<'a>),
    // Arity is read from the owner at parse time, after every modifier has applied.
    Entity(Owner),
}

impl<'a> Positional<'a> {
    pub(crate) fn action(
        name: impl Into<String>,
        min: usize,
        max: usize,
        action: ValueCallback<'a>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();

        if max == 0 || min > max {
            return Err(ConfigError::InvalidArity { name, min, max });
        }

        Ok(Positional::Action(PositionalAction {
            name,
            min,
            max,
            action,
        }))
    }

    fn entity(&self) -> Option<Rc<dyn Bindable>> {
        match self {
            Positional::Action(_) => None,
            Positional::Entity(owner) => Some(owner.borrow().clone()),
        }
    }

    pub(crate) fn name(&self) -> String {
        match self {
            Positional::Action(positional) => positional.name.clone(),
            Positional::Entity(owner) => owner.borrow().display_name(),
        }
    }

    pub(crate) fn min_args(&self) -> usize {
        match self {
            Positional::Action(positional) => positional.min,
            Positional::Entity(owner) => owner.borrow().min_args(),
        }
    }

    pub(crate) fn max_args(&self) -> usize {
        match self {
            Positional::Action(positional) => positional.max,
            Positional::Entity(owner) => owner.borrow().max_args(),
        }
    }

    pub(crate) fn deprecated_warning(&self) -> Option<String> {
        self.entity().and_then(|entity| entity.deprecated_warning())
    }

    pub(crate) fn accept(&mut self, raw: &str) -> Result<(), ParseError> {
        match self {
            Positional::Action(positional) => (positional.action)(raw),
            Positional::Entity(owner) => {
                let entity = owner.borrow().clone();
                entity.accept(raw)
            }
        }
    }
}
