use std::fmt::Display;
use std::ops::Deref;

use crate::descriptor::{DefaultValue, Descriptor, DescriptorKind, Shape};
use crate::entity::{Entity, ValueRef, ValueSource};
use crate::error::ConfigError;
use crate::model::PositionalLedger;

/// A declared positional argument.
///
/// Arguments are required and take exactly one token until a modifier says otherwise.
pub struct CliArgument<T, R> {
    entity: Entity<T, R>,
    ledger: PositionalLedger,
    slot: usize,
}

/// A required (or defaulted) single-token argument.
pub type SingleArgument<T> = CliArgument<T, T>;
/// An optional single-token argument.
pub type SingleNullableArgument<T> = CliArgument<T, Option<T>>;
/// An argument taking a fixed or unbounded number of tokens.
pub type MultipleArgument<T> = CliArgument<T, Vec<T>>;

impl<T, R> Deref for CliArgument<T, R> {
    type Target = Entity<T, R>;

    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

impl<T: 'static, R: Clone + 'static> std::fmt::Debug for CliArgument<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliArgument")
            .field("entity", &self.entity)
            .field("slot", &self.slot)
            .finish()
    }
}

impl<T: 'static, R: Clone + 'static> ValueSource<R> for CliArgument<T, R> {
    fn value_ref(&self) -> ValueRef<R> {
        self.entity.value_ref()
    }
}

impl<T: 'static, R: Clone + 'static> CliArgument<T, R> {
    pub(crate) fn new(entity: Entity<T, R>, ledger: PositionalLedger, slot: usize) -> Self {
        Self {
            entity,
            ledger,
            slot,
        }
    }

    fn transform<R2: Clone + 'static>(
        self,
        descriptor: Descriptor<T, R2>,
    ) -> Result<CliArgument<T, R2>, ConfigError> {
        self.entity.check_replacement(&descriptor)?;
        self.ledger.update(self.slot, descriptor.min_args())?;
        Ok(CliArgument {
            entity: self.entity.replace(descriptor)?,
            ledger: self.ledger,
            slot: self.slot,
        })
    }

    /// Set the help text.
    pub fn help(self, description: impl Into<String>) -> Self {
        let description = description.into();
        let mut descriptor = self.entity.descriptor().clone();
        descriptor.description = Some(description);
        self.transform(descriptor)
            .expect("internal error - editing the help text must not fail")
    }

    /// Mark the argument as deprecated; using it prints `Warning: {warning}`.
    pub fn deprecated(self, warning: impl Into<String>) -> Self {
        let warning = warning.into();
        let mut descriptor = self.entity.descriptor().clone();
        descriptor.deprecated_warning = Some(warning);
        self.transform(descriptor)
            .expect("internal error - editing the warning must not fail")
    }
}

impl<T: Clone + 'static> CliArgument<T, T> {
    /// Tolerate the argument being absent.
    ///
    /// Only trailing positionals may be optional. A default already set is kept.
    pub fn optional(self) -> Result<SingleNullableArgument<T>, ConfigError> {
        let current = self.entity.descriptor();
        let default_value = current.default_value.as_ref().map(|d| d.map(Some));
        let mut descriptor = current.reshape(Shape::nullable(), default_value);
        descriptor.required = false;
        self.transform(descriptor)
    }

    /// Fall back to `value` when the argument is absent.
    pub fn default(self, value: T) -> Result<Self, ConfigError>
    where
        T: Display,
    {
        let descriptor = self
            .entity
            .descriptor()
            .reshape(Shape::single(), Some(DefaultValue::single(value)));
        self.transform(descriptor)
    }

    /// Fall back to a value computed from other declarations when the argument is absent.
    pub fn default_pattern(self, pattern: DefaultValue<T>) -> Result<Self, ConfigError> {
        let descriptor = self
            .entity
            .descriptor()
            .reshape(Shape::single(), Some(pattern));
        self.transform(descriptor)
    }

    /// Take exactly `number` tokens; `number` must be at least 2.
    pub fn multiple(self, number: usize) -> Result<MultipleArgument<T>, ConfigError> {
        if number < 2 {
            return Err(ConfigError::MultipleTooFew(self.name()));
        }

        self.with_number(Some(number))
    }

    /// Take every remaining token (at least one).
    pub fn vararg(self) -> Result<MultipleArgument<T>, ConfigError> {
        self.with_number(None)
    }

    fn with_number(self, number: Option<usize>) -> Result<MultipleArgument<T>, ConfigError> {
        let current = self.entity.descriptor();
        let default_value = current
            .default_value
            .as_ref()
            .map(|d| d.map(|value| vec![value]));
        let mut descriptor = current.reshape(Shape::collected(), default_value);
        descriptor.kind = DescriptorKind::Argument { number };
        self.transform(descriptor)
    }
}

impl<T: Clone + 'static> CliArgument<T, Option<T>> {
    /// Fall back to `value` when the argument is absent.
    pub fn default(self, value: T) -> Result<SingleArgument<T>, ConfigError>
    where
        T: Display,
    {
        let descriptor = self
            .entity
            .descriptor()
            .reshape(Shape::single(), Some(DefaultValue::single(value)));
        self.transform(descriptor)
    }
}

impl<T: Clone + 'static> CliArgument<T, Vec<T>> {
    /// Tolerate the argument receiving no tokens at all.
    pub fn optional(self) -> Result<Self, ConfigError> {
        let mut descriptor = self.entity.descriptor().clone();
        descriptor.required = false;
        self.transform(descriptor)
    }

    /// Fall back to `values` when the argument is absent; `values` must not be empty.
    pub fn default(self, values: Vec<T>) -> Result<Self, ConfigError>
    where
        T: Display,
    {
        if values.is_empty() {
            return Err(ConfigError::EmptyDefault(self.name()));
        }

        let descriptor = self
            .entity
            .descriptor()
            .reshape(Shape::collected(), Some(DefaultValue::collection(values)));
        self.transform(descriptor)
    }
}
