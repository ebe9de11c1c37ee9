use std::fmt::Display;
use std::rc::Rc;

use crate::entity::{Owner, ValueRef, ValueSource};
use crate::error::ConfigError;
use crate::model::OptionPrefixStyle;
use crate::types::ArgType;

/// How converted values accumulate into the result type `R`.
pub(crate) struct Shape<T, R> {
    pub(crate) fold: fn(Option<R>, T) -> R,
    pub(crate) unset: fn() -> Option<R>,
    pub(crate) collects: bool,
}

impl<T, R> Clone for Shape<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, R> Copy for Shape<T, R> {}

impl<T> Shape<T, T> {
    pub(crate) fn single() -> Self {
        Self {
            fold: |_, value| value,
            unset: || None,
            collects: false,
        }
    }
}

impl<T> Shape<T, Option<T>> {
    pub(crate) fn nullable() -> Self {
        Self {
            fold: |_, value| Some(value),
            unset: || Some(None),
            collects: false,
        }
    }
}

impl<T> Shape<T, Vec<T>> {
    pub(crate) fn collected() -> Self {
        Self {
            fold: |values, value| {
                let mut values = values.unwrap_or_default();
                values.push(value);
                values
            },
            unset: || Some(Vec::default()),
            collects: true,
        }
    }
}

/// The value an option or argument falls back to when the command line does not provide one.
pub struct DefaultValue<R> {
    kind: Rc<DefaultKind<R>>,
    help: Option<String>,
}

pub(crate) enum DefaultKind<R> {
    Constant(R),
    Pattern {
        sources: Vec<Owner>,
        evaluate: Box<dyn Fn() -> Option<R>>,
    },
}

impl<R> Clone for DefaultValue<R> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            help: self.help.clone(),
        }
    }
}

impl<R> std::fmt::Debug for DefaultValue<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultValue")
            .field("help", &self.help)
            .finish()
    }
}

impl<R: 'static> DefaultValue<R> {
    /// Compute the default from the final values of other options or arguments.
    ///
    /// Every source must always end up with a value: it has to be required or carry a default of its own.
    /// The expression receives the source values in the order given.
    ///
    /// ### Example
    /// ```ignore
    /// let input = cli.argument(StringType, "input")?;
    /// let output = cli
    ///     .option(StringType, "output", Some("o"))?
    ///     .default_pattern(DefaultValue::pattern(&[&input], |v| format!("{}.out", v[0]))?)?;
    /// ```
    pub fn pattern<S: Clone + 'static>(
        sources: &[&dyn ValueSource<S>],
        expression: impl Fn(&[S]) -> R + 'static,
    ) -> Result<Self, ConfigError> {
        let views: Vec<ValueRef<S>> = sources.iter().map(|s| s.value_ref()).collect();

        for view in &views {
            if !view.is_guaranteed() {
                return Err(ConfigError::UnguaranteedSource(view.name()));
            }
        }

        for view in &views {
            view.mark_referenced();
        }

        let owners = views.iter().map(|v| v.owner().clone()).collect();
        let help = format!(
            "[computed from {}]",
            views
                .iter()
                .map(|v| v.name())
                .collect::<Vec<String>>()
                .join(", ")
        );
        let evaluate = move || {
            let values = views
                .iter()
                .map(|v| v.get().ok())
                .collect::<Option<Vec<S>>>()?;
            Some(expression(&values))
        };

        Ok(Self {
            kind: Rc::new(DefaultKind::Pattern {
                sources: owners,
                evaluate: Box::new(evaluate),
            }),
            help: Some(help),
        })
    }

    /// Replace the text shown for this default in the help document.
    pub fn describe(mut self, help: impl Into<String>) -> Self {
        self.help = Some(format!("[{}]", help.into()));
        self
    }
}

impl<R: Clone + 'static> DefaultValue<R> {
    /// The same default, seen through another result shape.
    pub(crate) fn map<R2: 'static>(&self, convert: fn(R) -> R2) -> DefaultValue<R2> {
        let kind = match self.kind.as_ref() {
            DefaultKind::Constant(value) => DefaultKind::Constant(convert(value.clone())),
            DefaultKind::Pattern { sources, .. } => {
                let inner = self.kind.clone();
                DefaultKind::Pattern {
                    sources: sources.clone(),
                    evaluate: Box::new(move || match inner.as_ref() {
                        DefaultKind::Pattern { evaluate, .. } => evaluate().map(convert),
                        DefaultKind::Constant(value) => Some(convert(value.clone())),
                    }),
                }
            }
        };

        DefaultValue {
            kind: Rc::new(kind),
            help: self.help.clone(),
        }
    }
}

impl<R> DefaultValue<R> {
    pub(crate) fn kind(&self) -> &DefaultKind<R> {
        self.kind.as_ref()
    }

    pub(crate) fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub(crate) fn sources(&self) -> Vec<Owner> {
        match self.kind.as_ref() {
            DefaultKind::Constant(_) => Vec::default(),
            DefaultKind::Pattern { sources, .. } => sources.clone(),
        }
    }
}

impl<T: Display> DefaultValue<T> {
    pub(crate) fn single(value: T) -> Self {
        let help = format!("[{value}]");
        Self {
            kind: Rc::new(DefaultKind::Constant(value)),
            help: Some(help),
        }
    }
}

impl<T: Display> DefaultValue<Vec<T>> {
    pub(crate) fn collection(values: Vec<T>) -> Self {
        let help = format!(
            "[{}]",
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        );
        Self {
            kind: Rc::new(DefaultKind::Constant(values)),
            help: Some(help),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum DescriptorKind {
    Option {
        short_name: Option<String>,
        multiple: bool,
        delimiter: Option<String>,
        style: OptionPrefixStyle,
    },
    Argument {
        // Exact arity, unbounded when absent.
        number: Option<usize>,
    },
}

/// The immutable declaration of one option or argument.
pub(crate) struct Descriptor<T, R> {
    pub(crate) ty: Rc<dyn ArgType<T>>,
    pub(crate) shape: Shape<T, R>,
    pub(crate) full_name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default_value: Option<DefaultValue<R>>,
    pub(crate) required: bool,
    pub(crate) deprecated_warning: Option<String>,
    pub(crate) kind: DescriptorKind,
}

impl<T, R> Clone for Descriptor<T, R> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            shape: self.shape,
            full_name: self.full_name.clone(),
            description: self.description.clone(),
            default_value: self.default_value.clone(),
            required: self.required,
            deprecated_warning: self.deprecated_warning.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<T> Descriptor<T, Option<T>> {
    pub(crate) fn option(
        ty: Rc<dyn ArgType<T>>,
        full_name: Option<String>,
        short_name: Option<String>,
        style: OptionPrefixStyle,
    ) -> Result<Self, ConfigError> {
        if full_name.is_none() && short_name.is_none() {
            return Err(ConfigError::UnnamedOption);
        }

        Ok(Self {
            ty,
            shape: Shape::nullable(),
            full_name,
            description: None,
            default_value: None,
            required: false,
            deprecated_warning: None,
            kind: DescriptorKind::Option {
                short_name,
                multiple: false,
                delimiter: None,
                style,
            },
        })
    }
}

impl<T> Descriptor<T, T> {
    pub(crate) fn argument(ty: Rc<dyn ArgType<T>>, name: String) -> Self {
        Self {
            ty,
            shape: Shape::single(),
            full_name: Some(name),
            description: None,
            default_value: None,
            required: true,
            deprecated_warning: None,
            kind: DescriptorKind::Argument { number: Some(1) },
        }
    }
}

impl<T, R> Descriptor<T, R> {
    /// Copy every field into a descriptor with a different result shape.
    pub(crate) fn reshape<R2>(
        &self,
        shape: Shape<T, R2>,
        default_value: Option<DefaultValue<R2>>,
    ) -> Descriptor<T, R2> {
        Descriptor {
            ty: self.ty.clone(),
            shape,
            full_name: self.full_name.clone(),
            description: self.description.clone(),
            default_value,
            required: self.required,
            deprecated_warning: self.deprecated_warning.clone(),
            kind: self.kind.clone(),
        }
    }

    pub(crate) fn is_option(&self) -> bool {
        matches!(self.kind, DescriptorKind::Option { .. })
    }

    pub(crate) fn display_name(&self) -> String {
        match (&self.full_name, &self.kind) {
            (Some(full_name), _) => full_name.clone(),
            (
                None,
                DescriptorKind::Option {
                    short_name: Some(short_name),
                    ..
                },
            ) => short_name.clone(),
            _ => String::default(),
        }
    }

    pub(crate) fn delimiter(&self) -> Option<&str> {
        match &self.kind {
            DescriptorKind::Option { delimiter, .. } => delimiter.as_deref(),
            DescriptorKind::Argument { .. } => None,
        }
    }

    pub(crate) fn is_guaranteed(&self) -> bool {
        self.required || self.default_value.is_some()
    }

    /// The flag strings this option answers to, full name first.
    pub(crate) fn flags(&self) -> Vec<String> {
        match &self.kind {
            DescriptorKind::Option {
                short_name, style, ..
            } => {
                let mut flags = Vec::default();

                if let Some(full_name) = &self.full_name {
                    flags.push(format!("{}{full_name}", style.full_prefix()));
                }

                if let Some(short_name) = short_name {
                    flags.push(format!("{}{short_name}", style.short_prefix()));
                }

                flags
            }
            DescriptorKind::Argument { .. } => Vec::default(),
        }
    }

    pub(crate) fn min_args(&self) -> usize {
        match &self.kind {
            DescriptorKind::Option { .. } => 0,
            DescriptorKind::Argument { number } => {
                if self.required && self.default_value.is_none() {
                    number.unwrap_or(1)
                } else {
                    0
                }
            }
        }
    }

    pub(crate) fn max_args(&self) -> usize {
        match &self.kind {
            DescriptorKind::Option { multiple, .. } => {
                if *multiple {
                    usize::MAX
                } else {
                    1
                }
            }
            DescriptorKind::Argument { number } => number.unwrap_or(usize::MAX),
        }
    }

    pub(crate) fn help_syntax(&self) -> String {
        match &self.kind {
            DescriptorKind::Option { .. } => self.flags().join(", "),
            DescriptorKind::Argument { .. } => self.display_name(),
        }
    }

    pub(crate) fn help_description(&self) -> String {
        let mut parts: Vec<String> = Vec::default();

        if let Some(description) = &self.description {
            parts.push(description.clone());
        }

        if let Some(help) = self.default_value.as_ref().and_then(|d| d.help()) {
            parts.push(help.to_string());
        }

        if self.is_option() {
            if self.required && self.default_value.is_none() {
                parts.push("(always required)".to_string());
            }
        } else if !self.required {
            parts.push("(optional)".to_string());
        }

        parts.push(self.ty.description());

        if let Some(warning) = &self.deprecated_warning {
            parts.push(format!("Warning: {warning}"));
        }

        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<String>>()
            .join(" ")
    }

    pub(crate) fn usage_entry(&self) -> String {
        let repeated = if self.max_args() > 1 { "..." } else { "" };

        match &self.kind {
            DescriptorKind::Option { .. } => {
                let flag = self.flags().into_iter().next().unwrap_or_default();
                let syntax = if self.ty.has_parameter() {
                    format!("{flag} {}{repeated}", self.display_name().to_uppercase())
                } else {
                    format!("{flag}{repeated}")
                };

                if self.required && self.default_value.is_none() {
                    syntax
                } else {
                    format!("[{syntax}]")
                }
            }
            DescriptorKind::Argument { .. } => {
                let syntax = format!("{}{repeated}", self.display_name());

                if self.min_args() == 0 {
                    format!("[{syntax}]")
                } else {
                    syntax
                }
            }
        }
    }
}
