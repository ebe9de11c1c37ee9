use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::descriptor::{DefaultKind, Descriptor};
use crate::error::{ConfigError, ParseError};
use crate::model::ValueOrigin;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The slot holding whichever cell is current for one declaration.
///
/// Modifiers swap a new cell into the slot, so the engine always sees the last transformation.
pub(crate) type Owner = Rc<RefCell<Rc<dyn Bindable>>>;

/// The type-erased view of an entity the engine drives.
pub(crate) trait Bindable {
    fn as_any(&self) -> &dyn Any;
    fn display_name(&self) -> String;
    fn flags(&self) -> Vec<String>;
    fn min_args(&self) -> usize;
    fn max_args(&self) -> usize;
    fn has_parameter(&self) -> bool;
    fn is_guaranteed(&self) -> bool;
    fn deprecated_warning(&self) -> Option<String>;
    fn help_syntax(&self) -> String;
    fn help_description(&self) -> String;
    fn usage_entry(&self) -> String;
    fn origin(&self) -> ValueOrigin;
    fn dependencies(&self) -> Vec<Owner>;

    /// Forget any value bound by a previous parse.
    fn reset(&self);

    /// Convert and bind one raw token.
    fn accept(&self, raw: &str) -> Result<(), ParseError>;

    /// Apply constant defaults, required checks and the unset fallback.
    fn finish(&self) -> Result<(), ParseError>;

    /// Evaluate a pending default pattern.
    /// Returns `false` while some source is still unresolved.
    fn resolve_pattern(&self) -> Result<bool, ParseError>;
}

struct State<R> {
    value: Option<R>,
    origin: ValueOrigin,
}

pub(crate) struct EntityCell<T, R> {
    pub(crate) descriptor: Descriptor<T, R>,
    state: RefCell<State<R>>,
}

impl<T, R: Clone> EntityCell<T, R> {
    pub(crate) fn new(descriptor: Descriptor<T, R>) -> Self {
        Self {
            descriptor,
            state: RefCell::new(State {
                value: None,
                origin: ValueOrigin::Undefined,
            }),
        }
    }

    pub(crate) fn current(&self) -> Option<R> {
        self.state.borrow().value.clone()
    }

    pub(crate) fn redefine(&self, value: R) {
        let mut state = self.state.borrow_mut();
        state.value = Some(value);
        state.origin = ValueOrigin::Redefined;
    }

    fn missing(&self) -> ParseError {
        let name = self.descriptor.display_name();

        if self.descriptor.is_option() {
            ParseError::MissingRequiredOption(name)
        } else {
            ParseError::NotEnoughPositionals {
                name,
                actual: 0,
                min: std::cmp::max(self.descriptor.min_args(), 1),
            }
        }
    }
}

impl<T: 'static, R: Clone + 'static> Bindable for EntityCell<T, R> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display_name(&self) -> String {
        self.descriptor.display_name()
    }

    fn flags(&self) -> Vec<String> {
        self.descriptor.flags()
    }

    fn min_args(&self) -> usize {
        self.descriptor.min_args()
    }

    fn max_args(&self) -> usize {
        self.descriptor.max_args()
    }

    fn has_parameter(&self) -> bool {
        self.descriptor.ty.has_parameter()
    }

    fn is_guaranteed(&self) -> bool {
        self.descriptor.is_guaranteed()
    }

    fn deprecated_warning(&self) -> Option<String> {
        self.descriptor.deprecated_warning.clone()
    }

    fn help_syntax(&self) -> String {
        self.descriptor.help_syntax()
    }

    fn help_description(&self) -> String {
        self.descriptor.help_description()
    }

    fn usage_entry(&self) -> String {
        self.descriptor.usage_entry()
    }

    fn origin(&self) -> ValueOrigin {
        self.state.borrow().origin
    }

    fn dependencies(&self) -> Vec<Owner> {
        self.descriptor
            .default_value
            .as_ref()
            .map(|d| d.sources())
            .unwrap_or_default()
    }

    fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.value = None;
        state.origin = ValueOrigin::Undefined;
    }

    fn accept(&self, raw: &str) -> Result<(), ParseError> {
        let name = self.descriptor.display_name();
        let mut state = self.state.borrow_mut();

        if !self.descriptor.shape.collects && state.origin == ValueOrigin::SetByUser {
            return Err(ParseError::RepeatedOption(name));
        }

        let pieces: Vec<&str> = match self.descriptor.delimiter() {
            Some(delimiter) => raw.split(delimiter).collect(),
            None => vec![raw],
        };

        for piece in pieces {
            let value = self.descriptor.ty.convert(piece, &name)?;
            let previous = state.value.take();
            state.value = Some((self.descriptor.shape.fold)(previous, value));
        }

        state.origin = ValueOrigin::SetByUser;
        Ok(())
    }

    fn finish(&self) -> Result<(), ParseError> {
        let mut state = self.state.borrow_mut();

        if state.origin == ValueOrigin::SetByUser {
            return Ok(());
        }

        match self.descriptor.default_value.as_ref().map(|d| d.kind()) {
            Some(DefaultKind::Constant(value)) => {
                state.value = Some(value.clone());
                state.origin = ValueOrigin::SetDefaultValue;
            }
            // Patterns wait until every constant has landed.
            Some(DefaultKind::Pattern { .. }) => {}
            None => {
                if self.descriptor.required {
                    return Err(self.missing());
                }

                state.value = (self.descriptor.shape.unset)();
                state.origin = ValueOrigin::Unset;
            }
        }

        Ok(())
    }

    fn resolve_pattern(&self) -> Result<bool, ParseError> {
        if self.origin().is_resolved() {
            return Ok(true);
        }

        let Some(DefaultKind::Pattern { sources, evaluate }) =
            self.descriptor.default_value.as_ref().map(|d| d.kind())
        else {
            return Err(ParseError::UnresolvedDefault(self.display_name()));
        };

        if sources.iter().any(|s| !s.borrow().origin().is_resolved()) {
            return Ok(false);
        }

        let value =
            evaluate().ok_or_else(|| ParseError::UnresolvedDefault(self.display_name()))?;
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Resolved default pattern for '{}'.", self.display_name());
        }
        let mut state = self.state.borrow_mut();
        state.value = Some(value);
        state.origin = ValueOrigin::SetDefaultValue;
        Ok(true)
    }
}

/// Fail if any of `sources` (transitively) depends on `target`.
pub(crate) fn check_acyclic(target: &Owner, sources: &[Owner]) -> Result<(), ConfigError> {
    let mut seen: Vec<Owner> = Vec::default();

    for source in sources {
        if reaches(source, target, &mut seen) {
            return Err(ConfigError::DefaultCycle(target.borrow().display_name()));
        }
    }

    Ok(())
}

fn reaches(from: &Owner, target: &Owner, seen: &mut Vec<Owner>) -> bool {
    if Rc::ptr_eq(from, target) {
        return true;
    }

    if seen.iter().any(|s| Rc::ptr_eq(s, from)) {
        return false;
    }

    seen.push(from.clone());
    let dependencies = from.borrow().dependencies();
    dependencies.iter().any(|d| reaches(d, target, seen))
}
