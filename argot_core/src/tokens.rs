use crate::model::ActionKind;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A cursor over an already tokenized command line.
///
/// Sub-commands receive the parent's cursor itself, so they continue from wherever the parent stopped.
#[derive(Debug, Clone, Default)]
pub struct TokenCursor {
    tokens: Vec<String>,
    position: usize,
}

impl TokenCursor {
    /// Wrap a token sequence, positioned at its first token.
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Whether any token remains.
    pub fn has_next(&self) -> bool {
        self.position < self.tokens.len()
    }

    /// The tokens not yet consumed.
    pub fn remaining(&self) -> &[String] {
        &self.tokens[self.position..]
    }
}

impl Iterator for TokenCursor {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.get(self.position).cloned();

        if token.is_some() {
            self.position += 1;
        }

        token
    }
}

/// The tag syntax the tokenizer recognizes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TagSyntax<'c> {
    pub(crate) short_prefix: Option<&'c str>,
    pub(crate) long_prefixes: &'c [String],
    pub(crate) long_delimiter: Option<&'c str>,
}

impl<'c> TagSyntax<'c> {
    fn is_long(&self, token: &str) -> bool {
        self.long_prefixes
            .iter()
            .any(|prefix| token.starts_with(prefix.as_str()))
    }
}

/// Normalize raw arguments: split `--tag=value` pairs and expand short-tag bundles like `-abc`.
pub(crate) fn tokenize<S: AsRef<str>>(
    args: &[S],
    syntax: &TagSyntax,
    lookup: impl Fn(&str) -> Option<ActionKind>,
) -> Vec<String> {
    let mut tokens = Vec::default();

    for arg in args {
        let arg = arg.as_ref();

        if lookup(arg).is_some() {
            tokens.push(arg.to_string());
            continue;
        }

        if let Some(delimiter) = syntax.long_delimiter {
            if syntax.is_long(arg) {
                if let Some((tag, value)) = arg.split_once(delimiter) {
                    tokens.push(tag.to_string());
                    tokens.push(value.to_string());
                    continue;
                }
            }
        }

        match syntax.short_prefix {
            Some(prefix) if arg.starts_with(prefix) && !syntax.is_long(arg) => {
                match expand_bundle(arg, prefix, &lookup) {
                    Some(expanded) => tokens.extend(expanded),
                    None => tokens.push(arg.to_string()),
                }
            }
            _ => tokens.push(arg.to_string()),
        }
    }

    #[cfg(feature = "tracing_debug")]
    {
        debug!("Tokenized {} arguments into {tokens:?}.", args.len());
    }

    tokens
}

// None means the bundle must be emitted verbatim.
fn expand_bundle(
    arg: &str,
    prefix: &str,
    lookup: &impl Fn(&str) -> Option<ActionKind>,
) -> Option<Vec<String>> {
    let rest = &arg[prefix.len()..];

    if rest.is_empty() {
        return None;
    }

    let mut expanded = Vec::default();

    for (index, c) in rest.char_indices() {
        let flag = format!("{prefix}{c}");

        match lookup(&flag) {
            Some(kind) if kind.is_bundleable() => {
                expanded.push(flag);

                if kind.consumes_value() {
                    let value = &rest[index + c.len_utf8()..];

                    if !value.is_empty() {
                        expanded.push(value.to_string());
                    }

                    return Some(expanded);
                }
            }
            _ => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Abandoning bundle '{arg}' at unrecognized '{flag}'.");
                }
                return None;
            }
        }
    }

    Some(expanded)
}
