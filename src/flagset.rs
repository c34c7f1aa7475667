//! Named option slots for one parser node.
//!
//! Accepted forms are `-name value`, `-name=value` and `--name`. Boolean
//! options need no value token, and a lone `--` ends the options.

use std::collections::BTreeMap;

use crate::binder::BindingKind;
use crate::error::{BindError, ConversionError, FlagError};

/// Storage behind a single option.
pub trait FlagValue {
    /// Current value, as it would be written on the command line.
    fn render(&self) -> String;

    fn set(&mut self, input: &str) -> Result<(), ConversionError>;

    /// The option is complete without a value token.
    fn is_bool_flag(&self) -> bool {
        false
    }
}

pub struct Flag<'a> {
    name: String,
    usage: String,
    default: String,
    kind: BindingKind,
    value: Box<dyn FlagValue + 'a>,
}

impl Flag<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Value rendered when the option was defined.
    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    pub fn current_value(&self) -> String {
        self.value.render()
    }

    pub fn is_bool_flag(&self) -> bool {
        self.value.is_bool_flag()
    }
}

pub struct FlagSet<'a> {
    name: String,
    prefix: String,
    flags: BTreeMap<String, Flag<'a>>,
}

impl<'a> FlagSet<'a> {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            flags: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn define(
        &mut self,
        name: impl Into<String>,
        usage: impl Into<String>,
        kind: BindingKind,
        value: Box<dyn FlagValue + 'a>,
    ) -> Result<(), BindError> {
        let name = name.into();
        if self.flags.contains_key(&name) {
            return Err(BindError::DuplicateOption { name });
        }
        let flag = Flag {
            name: name.clone(),
            usage: usage.into(),
            default: value.render(),
            kind,
            value,
        };
        self.flags.insert(name, flag);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag<'a>> {
        self.flags.get(name)
    }

    /// Options sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Flag<'a>> {
        self.flags.values()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn has_prefix(&self, token: &str) -> bool {
        token.starts_with(&self.prefix)
    }

    /// True for tokens that carry everything they need: `-name=value`, a
    /// boolean option, or the `--` terminator.
    pub fn is_self_contained(&self, token: &str) -> bool {
        if token == self.terminator() {
            return true;
        }
        match strip_prefix(token, &self.prefix) {
            Some(body) if !body.is_empty() => {
                body.contains('=')
                    || self
                        .flags
                        .get(body)
                        .is_some_and(|flag| flag.is_bool_flag())
            }
            _ => false,
        }
    }

    fn terminator(&self) -> String {
        self.prefix.repeat(2)
    }

    /// Consume `args`, which must contain only options and their values.
    pub fn parse(&mut self, args: &[String]) -> Result<(), FlagError> {
        let terminator = self.terminator();
        let mut rest = args;
        while let Some((token, tail)) = rest.split_first() {
            rest = tail;
            if token.as_str() == terminator {
                return match rest.first() {
                    Some(extra) => Err(FlagError::Unexpected(extra.clone())),
                    None => Ok(()),
                };
            }
            let body = match strip_prefix(token, &self.prefix) {
                Some(body) if !body.is_empty() => body,
                _ => return Err(FlagError::Unexpected(token.clone())),
            };
            if body.starts_with(self.prefix.as_str()) || body.starts_with('=') {
                return Err(FlagError::BadSyntax(token.clone()));
            }
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let shown = format!("{}{}", self.prefix, name);
            let Some(flag) = self.flags.get_mut(name) else {
                if name == "h" || name == "help" {
                    return Err(FlagError::Help);
                }
                return Err(FlagError::Unknown(shown));
            };
            let value = match inline {
                Some(value) => value,
                None if flag.is_bool_flag() => "true",
                None => {
                    let (value, tail) = rest
                        .split_first()
                        .ok_or_else(|| FlagError::MissingValue(shown.clone()))?;
                    rest = tail;
                    value.as_str()
                }
            };
            flag.value
                .set(value)
                .map_err(|source| FlagError::InvalidValue {
                    flag: shown.clone(),
                    value: value.to_string(),
                    source,
                })?;
            tracing::trace!(flag = %shown, value, set = %self.name, "option set");
        }
        Ok(())
    }
}

/// Strip the option prefix, and a second one if present (`--name`).
fn strip_prefix<'t>(token: &'t str, prefix: &str) -> Option<&'t str> {
    let body = token.strip_prefix(prefix)?;
    Some(body.strip_prefix(prefix).unwrap_or(body))
}
