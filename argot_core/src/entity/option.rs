use std::fmt::Display;
use std::ops::Deref;

use crate::descriptor::{DefaultValue, Descriptor, DescriptorKind, Shape};
use crate::entity::{Entity, ValueRef, ValueSource};
use crate::error::ConfigError;

/// A declared option: a named flag, optionally followed by a value.
///
/// Read the bound value through [`Entity::value`] (available via `Deref`).
pub struct CliOption<T, R> {
    entity: Entity<T, R>,
}

/// An optional option that is never repeated.
pub type SingleNullableOption<T> = CliOption<T, Option<T>>;
/// A required or defaulted option.
pub type SingleOption<T> = CliOption<T, T>;
/// An option that may be repeated, collecting every occurrence.
pub type MultipleOption<T> = CliOption<T, Vec<T>>;

impl<T, R> Deref for CliOption<T, R> {
    type Target = Entity<T, R>;

    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

impl<T: 'static, R: Clone + 'static> std::fmt::Debug for CliOption<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CliOption").field(&self.entity).finish()
    }
}

impl<T: 'static, R: Clone + 'static> ValueSource<R> for CliOption<T, R> {
    fn value_ref(&self) -> ValueRef<R> {
        self.entity.value_ref()
    }
}

impl<T: 'static, R: Clone + 'static> CliOption<T, R> {
    pub(crate) fn new(entity: Entity<T, R>) -> Self {
        Self { entity }
    }

    fn rebuild(
        self,
        change: impl FnOnce(&mut Descriptor<T, R>),
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(self.entity.rebuild(change)?))
    }

    /// Set the help text.
    pub fn help(self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.swap(|d| d.description = Some(description))
    }

    /// Mark the option as deprecated; using it prints `Warning: {warning}`.
    pub fn deprecated(self, warning: impl Into<String>) -> Self {
        let warning = warning.into();
        self.swap(|d| d.deprecated_warning = Some(warning))
    }

    // Field edits that keep the default untouched can't introduce a cycle.
    fn swap(self, change: impl FnOnce(&mut Descriptor<T, R>)) -> Self {
        self.rebuild(change)
            .expect("internal error - a descriptor edit without a new default must not fail")
    }
}

impl<T: Clone + 'static> CliOption<T, Option<T>> {
    /// Fall back to `value` when the option is absent.
    pub fn default(self, value: T) -> SingleOption<T>
    where
        T: Display,
    {
        let descriptor = self
            .entity
            .descriptor()
            .reshape(Shape::single(), Some(DefaultValue::single(value)));
        CliOption::new(
            self.entity
                .replace(descriptor)
                .expect("internal error - a constant default must not introduce a cycle"),
        )
    }

    /// Fall back to a value computed from other declarations when the option is absent.
    pub fn default_pattern(self, pattern: DefaultValue<T>) -> Result<SingleOption<T>, ConfigError> {
        let descriptor = self
            .entity
            .descriptor()
            .reshape(Shape::single(), Some(pattern));
        Ok(CliOption::new(self.entity.replace(descriptor)?))
    }

    /// Fail the parse when the option is absent.
    pub fn required(self) -> SingleOption<T> {
        let mut descriptor = self.entity.descriptor().reshape(Shape::single(), None);
        descriptor.required = true;
        CliOption::new(
            self.entity
                .replace(descriptor)
                .expect("internal error - dropping the default must not introduce a cycle"),
        )
    }

    /// Allow the option to be repeated, collecting every value.
    pub fn multiple(self) -> MultipleOption<T> {
        let mut descriptor = self.entity.descriptor().reshape(Shape::collected(), None);
        if let DescriptorKind::Option { multiple, .. } = &mut descriptor.kind {
            *multiple = true;
        }
        CliOption::new(
            self.entity
                .replace(descriptor)
                .expect("internal error - dropping the default must not introduce a cycle"),
        )
    }
}

impl<T: Clone + 'static> CliOption<T, Vec<T>> {
    /// Fall back to `values` when the option is absent; `values` must not be empty.
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
        Ok(CliOption::new(self.entity.replace(descriptor)?))
    }

    /// Fail the parse when the option never appears.
    pub fn required(self) -> Self {
        self.swap(|d| d.required = true)
    }

    /// Split every occurrence on `delimiter`, converting each piece.
    pub fn delimiter(self, delimiter: impl Into<String>) -> Result<Self, ConfigError> {
        let delimiter = delimiter.into();

        if delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter(self.name()));
        }

        Ok(self.swap(|descriptor| {
            if let DescriptorKind::Option { delimiter: slot, .. } = &mut descriptor.kind {
                *slot = Some(delimiter);
            }
        }))
    }
}
