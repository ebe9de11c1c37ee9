mod argument;
mod cell;
mod option;

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub use argument::*;
pub(crate) use cell::{check_acyclic, Bindable, EntityCell, Owner};
pub use option::*;

use crate::descriptor::Descriptor;
use crate::error::{ConfigError, UnsetValueError};
use crate::model::ValueOrigin;

/// A declared option or argument, holding the value bound by the most recent parse.
///
/// `R` is the result type: `T` for required or defaulted declarations, `Option<T>` for optional ones
/// and `Vec<T>` for repeatable ones.
pub struct Entity<T, R> {
    cell: Rc<EntityCell<T, R>>,
    owner: Owner,
    // Set once a default pattern reads this entity.
    referenced: Rc<Cell<bool>>,
}

impl<T: 'static, R: Clone + 'static> Entity<T, R> {
    pub(crate) fn declare(descriptor: Descriptor<T, R>) -> Self {
        let cell = Rc::new(EntityCell::new(descriptor));
        let erased: Rc<dyn Bindable> = cell.clone();
        Self {
            cell,
            owner: Rc::new(RefCell::new(erased)),
            referenced: Rc::new(Cell::new(false)),
        }
    }

    pub(crate) fn owner(&self) -> &Owner {
        &self.owner
    }

    pub(crate) fn descriptor(&self) -> &Descriptor<T, R> {
        &self.cell.descriptor
    }

    /// Fail unless `descriptor` may take the place of the current one.
    ///
    /// Any pattern default on the new descriptor must not lead back to this entity.
    /// An entity read by some pattern keeps its result type and must still always end up with a value.
    pub(crate) fn check_replacement<R2: 'static>(
        &self,
        descriptor: &Descriptor<T, R2>,
    ) -> Result<(), ConfigError> {
        if self.referenced.get()
            && (TypeId::of::<R>() != TypeId::of::<R2>() || !descriptor.is_guaranteed())
        {
            return Err(ConfigError::UnguaranteedSource(self.name()));
        }

        if let Some(default_value) = &descriptor.default_value {
            check_acyclic(&self.owner, &default_value.sources())?;
        }

        Ok(())
    }

    /// Swap a new descriptor into the owner slot.
    pub(crate) fn replace<R2: Clone + 'static>(
        self,
        descriptor: Descriptor<T, R2>,
    ) -> Result<Entity<T, R2>, ConfigError> {
        self.check_replacement(&descriptor)?;
        let cell = Rc::new(EntityCell::new(descriptor));
        let erased: Rc<dyn Bindable> = cell.clone();
        *self.owner.borrow_mut() = erased;
        Ok(Entity {
            cell,
            owner: self.owner,
            referenced: self.referenced,
        })
    }

    pub(crate) fn rebuild(
        self,
        change: impl FnOnce(&mut Descriptor<T, R>),
    ) -> Result<Self, ConfigError> {
        let mut descriptor = self.cell.descriptor.clone();
        change(&mut descriptor);
        self.replace(descriptor)
    }

    /// The value bound by the last parse, or an error if nothing has been bound yet.
    pub fn get(&self) -> Result<R, UnsetValueError> {
        self.cell
            .current()
            .ok_or_else(|| UnsetValueError(self.name()))
    }

    /// The value bound by the last parse.
    ///
    /// Panics when read before the interface has been parsed.
    pub fn value(&self) -> R {
        self.get().unwrap_or_else(|error| panic!("{error}"))
    }

    /// Overwrite the value programmatically, marking its origin as [`ValueOrigin::Redefined`].
    pub fn set_value(&self, value: R) {
        self.cell.redefine(value);
    }

    /// Where the current value came from.
    pub fn origin(&self) -> ValueOrigin {
        self.cell.origin()
    }

    /// The display name: the full name, falling back to the short name.
    pub fn name(&self) -> String {
        self.cell.descriptor.display_name()
    }

    /// A cloneable read-only view of this entity's value.
    pub fn value_ref(&self) -> ValueRef<R> {
        ValueRef {
            owner: self.owner.clone(),
            read: read_cell::<T, R>,
            referenced: self.referenced.clone(),
        }
    }
}

impl<T: 'static, R: Clone + 'static> std::fmt::Debug for Entity<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.cell.descriptor.display_name())
            .field("origin", &self.cell.origin())
            .finish()
    }
}

fn read_cell<T: 'static, R: Clone + 'static>(entity: &dyn Bindable) -> Option<R> {
    entity
        .as_any()
        .downcast_ref::<EntityCell<T, R>>()
        .and_then(|cell| cell.current())
}

/// A read-only view of an option or argument value.
///
/// Views may be cloned freely and moved into callbacks, unlike the declaration handles themselves.
pub struct ValueRef<R> {
    owner: Owner,
    read: fn(&dyn Bindable) -> Option<R>,
    referenced: Rc<Cell<bool>>,
}

impl<R> Clone for ValueRef<R> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            read: self.read,
            referenced: self.referenced.clone(),
        }
    }
}

impl<R> ValueRef<R> {
    /// The value bound by the last parse, or an error if nothing has been bound yet.
    pub fn get(&self) -> Result<R, UnsetValueError> {
        let entity = self.owner.borrow().clone();
        (self.read)(entity.as_ref()).ok_or_else(|| UnsetValueError(entity.display_name()))
    }

    /// The value bound by the last parse.
    ///
    /// Panics when read before the interface has been parsed.
    pub fn value(&self) -> R {
        self.get().unwrap_or_else(|error| panic!("{error}"))
    }

    /// Where the current value came from.
    pub fn origin(&self) -> ValueOrigin {
        self.owner.borrow().origin()
    }

    /// The display name of the viewed entity.
    pub fn name(&self) -> String {
        self.owner.borrow().display_name()
    }

    pub(crate) fn owner(&self) -> &Owner {
        &self.owner
    }

    pub(crate) fn is_guaranteed(&self) -> bool {
        self.owner.borrow().is_guaranteed()
    }

    // Pins the viewed entity's result type and guarantee for good.
    pub(crate) fn mark_referenced(&self) {
        self.referenced.set(true);
    }
}

/// Anything that can be read as a `ValueRef<S>`, e.g. a source for [`crate::DefaultValue::pattern`].
pub trait ValueSource<S> {
    /// A read-only view of the current value.
    fn value_ref(&self) -> ValueRef<S>;
}

impl<T: 'static, R: Clone + 'static> ValueSource<R> for Entity<T, R> {
    fn value_ref(&self) -> ValueRef<R> {
        Entity::value_ref(self)
    }
}

impl<R> ValueSource<R> for ValueRef<R> {
    fn value_ref(&self) -> ValueRef<R> {
        self.clone()
    }
}

/// A plain value written by a declaration callback, e.g. `flag_argument` or `positional_argument`.
pub struct ArgumentValue<T>(Rc<RefCell<T>>);

impl<T> Clone for ArgumentValue<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> ArgumentValue<T> {
    pub(crate) fn new(initial: T) -> Self {
        Self(Rc::new(RefCell::new(initial)))
    }

    pub(crate) fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub(crate) fn update(&self, change: impl FnOnce(&mut T)) {
        change(&mut self.0.borrow_mut());
    }

    /// Read the value through a borrow.
    pub fn with<O>(&self, read: impl FnOnce(&T) -> O) -> O {
        read(&self.0.borrow())
    }
}

impl<T: Clone> ArgumentValue<T> {
    /// The current value.
    pub fn value(&self) -> T {
        self.0.borrow().clone()
    }
}
