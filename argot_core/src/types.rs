use std::fmt::Display;

use crate::error::ConversionError;

/// Conversion from a raw command line token into a `T`.
///
/// `name` is the display name of the option or argument that owns the token, used in error messages.
pub trait ArgType<T> {
    /// Help text describing the accepted values, e.g. `{ Int }`.
    fn description(&self) -> String;

    /// Whether an option of this type consumes the following token as its value.
    ///
    /// Options whose type has no parameter are presence flags.
    fn has_parameter(&self) -> bool {
        true
    }

    /// Convert `value`, failing with a message that names both `name` and `value`.
    fn convert(&self, value: &str, name: &str) -> Result<T, ConversionError>;
}

/// Identity conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl ArgType<String> for StringType {
    fn description(&self) -> String {
        "{ String }".to_string()
    }

    fn convert(&self, value: &str, _name: &str) -> Result<String, ConversionError> {
        Ok(value.to_string())
    }
}

/// Signed integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntType;

impl ArgType<i64> for IntType {
    fn description(&self) -> String {
        "{ Int }".to_string()
    }

    fn convert(&self, value: &str, name: &str) -> Result<i64, ConversionError> {
        value.parse::<i64>().map_err(|_| {
            ConversionError::new(
                name,
                value,
                format!("Option {name} is expected to be integer number. {value} is provided."),
            )
        })
    }
}

/// Floating point numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleType;

impl ArgType<f64> for DoubleType {
    fn description(&self) -> String {
        "{ Double }".to_string()
    }

    fn convert(&self, value: &str, name: &str) -> Result<f64, ConversionError> {
        value.parse::<f64>().map_err(|_| {
            ConversionError::new(
                name,
                value,
                format!("Option {name} is expected to be double number. {value} is provided."),
            )
        })
    }
}

/// `true` or `false`, in any letter case.
///
/// As an option, a boolean is a presence flag: it takes no value and converts `"true"` when it appears.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl ArgType<bool> for BooleanType {
    fn description(&self) -> String {
        String::default()
    }

    fn has_parameter(&self) -> bool {
        false
    }

    fn convert(&self, value: &str, name: &str) -> Result<bool, ConversionError> {
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConversionError::new(
                name,
                value,
                format!("Option {name} is expected to be boolean value. {value} is provided."),
            ))
        }
    }
}

/// A closed set of values, each selected by its (case-insensitive) name.
#[derive(Debug, Clone)]
pub struct Choice<E> {
    variants: Vec<(String, E)>,
}

impl<E: Display> Choice<E> {
    /// Name each variant by its lower-cased `Display` text.
    pub fn new(variants: impl IntoIterator<Item = E>) -> Self {
        Self {
            variants: variants
                .into_iter()
                .map(|variant| (variant.to_string().to_lowercase(), variant))
                .collect(),
        }
    }
}

impl<E> Choice<E> {
    /// Name each variant explicitly.
    pub fn with_names<S: Into<String>>(variants: impl IntoIterator<Item = (S, E)>) -> Self {
        Self {
            variants: variants
                .into_iter()
                .map(|(name, variant)| (name.into().to_lowercase(), variant))
                .collect(),
        }
    }

    fn names(&self) -> String {
        let names: Vec<&str> = self.variants.iter().map(|(n, _)| n.as_str()).collect();
        format!("[{}]", names.join(", "))
    }
}

impl<E: Clone> ArgType<E> for Choice<E> {
    fn description(&self) -> String {
        format!("{{ Value should be one of {} }}", self.names())
    }

    fn convert(&self, value: &str, name: &str) -> Result<E, ConversionError> {
        let lowered = value.to_lowercase();
        self.variants
            .iter()
            .find(|(n, _)| *n == lowered)
            .map(|(_, variant)| variant.clone())
            .ok_or_else(|| {
                ConversionError::new(
                    name,
                    value,
                    format!(
                        "Option {name} is expected to be one of {}. {value} is provided.",
                        self.names()
                    ),
                )
            })
    }
}
