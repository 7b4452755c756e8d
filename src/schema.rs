//! Declarations of options and positional arguments.
use std::fmt;

use crate::error::DefinitionError;
use crate::values::{Reviver, Value, ValueKind, cast};

/// A declared option.
///
/// ```
/// use argp::{OptionDef, ValueKind};
///
/// let verbose = OptionDef::flag().short('v').long("verbose").description("Talk more");
/// let jobs = OptionDef::valued("N").short('j').long("jobs").kind(ValueKind::Number);
/// # let _ = (verbose, jobs);
/// ```
///
/// The result key is derived at registration, so an unregistered definition has none:
///
/// ```compile_fail
/// let _ = argp::OptionDef::flag().id();
/// ```
pub struct OptionDef {
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) hidden: bool,
    pub(crate) description: Option<String>,
    pub(crate) kind: OptionKind,
}

#[derive(Debug)]
pub enum OptionKind {
    /// A boolean option taking no value.
    ///
    /// A negatable flag is displayed as `--no-<long>` and defaults to `true`.
    Flag { negatable: bool },
    Valued(ValueSpec),
}

/// How a value option converts and validates its value.
pub struct ValueSpec {
    pub(crate) metavar: String,
    pub(crate) kind: ValueKind,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
    pub(crate) choices: Option<Vec<Value>>,
    pub(crate) reviver: Option<Reviver>,
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("aliases", &self.aliases)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSpec")
            .field("metavar", &self.metavar)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("choices", &self.choices)
            .field("reviver", &self.reviver.is_some())
            .finish()
    }
}

impl OptionDef {
    fn new(kind: OptionKind) -> Self {
        Self {
            short: None,
            long: None,
            aliases: Vec::new(),
            hidden: false,
            description: None,
            kind,
        }
    }

    /// A boolean flag.
    #[must_use]
    pub fn flag() -> Self {
        Self::new(OptionKind::Flag { negatable: false })
    }

    /// An option taking a value, displayed as `metavar` in help.
    #[must_use]
    pub fn valued(metavar: impl Into<String>) -> Self {
        Self::new(OptionKind::Valued(ValueSpec {
            metavar: metavar.into(),
            kind: ValueKind::String,
            optional: false,
            default: None,
            choices: None,
            reviver: None,
        }))
    }

    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    #[must_use]
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// An extra long name resolving to this option.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Make a flag negatable. Ignored on value options.
    #[must_use]
    pub fn negatable(mut self) -> Self {
        if let OptionKind::Flag { negatable } = &mut self.kind {
            *negatable = true;
        }
        self
    }

    /// Set the value type. Ignored on flags.
    #[must_use]
    pub fn kind(mut self, kind: ValueKind) -> Self {
        if let OptionKind::Valued(spec) = &mut self.kind {
            spec.kind = kind;
        }
        self
    }

    /// Allow the option to appear without a value. Ignored on flags.
    #[must_use]
    pub fn optional(mut self) -> Self {
        if let OptionKind::Valued(spec) = &mut self.kind {
            spec.optional = true;
        }
        self
    }

    /// Ignored on flags.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        if let OptionKind::Valued(spec) = &mut self.kind {
            spec.default = Some(value.into());
        }
        self
    }

    /// Restrict the cast value to a set. Ignored on flags and optional options.
    #[must_use]
    pub fn choices<I>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item: Into<Value>>,
    {
        if let OptionKind::Valued(spec) = &mut self.kind {
            spec.choices = Some(choices.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Transform the value after casting and choice validation. Ignored on flags.
    #[must_use]
    pub fn reviver(mut self, reviver: impl Fn(Value) -> Value + 'static) -> Self {
        if let OptionKind::Valued(spec) = &mut self.kind {
            spec.reviver = Some(Box::new(reviver));
        }
        self
    }

    /// The key of this option in the result map: the long name, else the short name.
    ///
    /// Only called on registered options, which always have a name.
    pub(crate) fn id(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => unreachable!("registered options always have a name"),
        }
    }

    #[must_use]
    pub fn is_flag(&self) -> bool {
        matches!(self.kind, OptionKind::Flag { .. })
    }

    pub(crate) fn is_negatable(&self) -> bool {
        matches!(self.kind, OptionKind::Flag { negatable: true })
    }

    /// The value seeded into the result map before parsing.
    pub(crate) fn initial_value(&self) -> Value {
        match &self.kind {
            OptionKind::Flag { negatable } => Value::Bool(*negatable),
            OptionKind::Valued(spec) => spec.default_value(),
        }
    }

    pub(crate) fn validate(&mut self) -> Result<(), DefinitionError> {
        let invalid = |what, name: &str, reason| DefinitionError::InvalidName {
            what,
            name: name.to_owned(),
            reason,
        };

        if self.short.is_none() && self.long.is_none() {
            return Err(invalid("option", "", "at least a short or a long name is required"));
        }
        if let Some(short) = self.short {
            if !short.is_ascii_alphanumeric() {
                return Err(invalid(
                    "short name",
                    &short.to_string(),
                    "must be an alphanumeric character",
                ));
            }
        }
        for (what, name) in self
            .long
            .iter()
            .map(|l| ("long name", l))
            .chain(self.aliases.iter().map(|a| ("alias", a)))
        {
            if name.is_empty() {
                return Err(invalid(what, name, "must not be empty"));
            }
            if name.chars().any(char::is_whitespace) {
                return Err(invalid(what, name, "must not contain whitespace"));
            }
        }

        // Optional options never validate choices: there may be no value to check.
        if let OptionKind::Valued(spec) = &mut self.kind {
            if spec.optional {
                spec.choices = None;
            }
        }
        Ok(())
    }
}

impl ValueSpec {
    pub(crate) fn default_value(&self) -> Value {
        self.default.clone().unwrap_or_else(|| self.kind.zero())
    }

    /// Cast, validate and revive a raw value. `None` falls back to the default.
    ///
    /// `name` is the option name as typed, for error messages.
    pub(crate) fn resolve(&self, raw: Option<&str>, name: &str) -> crate::Result<Value> {
        use crate::error::ErrorKind;

        let value = match raw {
            None => self.default_value(),
            Some(raw) => cast(raw, self.kind)
                .ok_or_else(|| ErrorKind::TypeConversion.with_arg_input(name, self.kind.name()))?,
        };
        if let Some(choices) = &self.choices {
            if !choices.contains(&value) {
                return Err(ErrorKind::InvalidChoice.with_input(value.to_string()));
            }
        }
        Ok(match &self.reviver {
            Some(reviver) => reviver(value),
            None => value,
        })
    }
}

/// A declared positional argument.
#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub(crate) name: String,
    pub(crate) hidden: bool,
    pub(crate) description: Option<String>,
    pub(crate) help: Option<String>,
    pub(crate) trailing: Option<Trailing>,
    pub(crate) arity: Option<Arity>,
}

impl ArgumentDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            description: None,
            help: None,
            trailing: None,
            arity: None,
        }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Text shown in help instead of the name for trailing arguments, e.g. `install PKG...`.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Let this argument collect the following free tokens. Only valid inside a command.
    #[must_use]
    pub fn trailing(mut self, trailing: Trailing) -> Self {
        self.trailing = Some(trailing);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&mut self, in_command: bool) -> Result<(), DefinitionError> {
        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(DefinitionError::InvalidName {
                what: "argument",
                name: self.name.clone(),
                reason: "must be non-empty and contain no whitespace",
            });
        }
        if let Some(trailing) = &self.trailing {
            if !in_command {
                return Err(DefinitionError::InvalidTrailing(
                    "trailing arguments are only available inside commands",
                ));
            }
            self.arity = Some(trailing.validate()?);
        }
        Ok(())
    }
}

/// The number of free tokens a trailing argument collects.
///
/// ```
/// use argp::Trailing;
///
/// let exactly_two = Trailing::new().exactly(2);
/// let one_to_three = Trailing::new().min(1).max(3);
/// # let _ = (exactly_two, one_to_three);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Trailing {
    eq: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
}

impl Trailing {
    /// No bounds: collect every following free token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect exactly `eq` tokens.
    #[must_use]
    pub fn exactly(mut self, eq: usize) -> Self {
        self.eq = Some(eq);
        self
    }

    #[must_use]
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub(crate) fn validate(self) -> Result<Arity, DefinitionError> {
        let err = DefinitionError::InvalidTrailing;
        match (self.eq, self.min, self.max) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err(err("`eq` cannot be combined with `min` or `max`"))
            }
            (Some(0), ..) => Err(err("`eq` must be at least 1")),
            (Some(eq), ..) => Ok(Arity::Exact(eq)),
            (None, _, Some(0)) => Err(err("`max` must be at least 1")),
            (None, Some(min), Some(max)) if min > max => {
                Err(err("`max` must be greater than or equal to `min`"))
            }
            (None, Some(min), Some(max)) if min == max => Ok(Arity::Exact(min)),
            (None, min, max) => Ok(Arity::Range { min: min.unwrap_or(0), max }),
        }
    }
}

/// A validated [`Trailing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    Exact(usize),
    Range { min: usize, max: Option<usize> },
}

impl Arity {
    /// Whether a collection of `len` items stops accepting more.
    pub(crate) fn is_full(self, len: usize) -> bool {
        match self {
            Arity::Exact(n) => len == n,
            Arity::Range { max, .. } => max == Some(len),
        }
    }

    /// The arity message for a collection left open at the end of input, if it is short.
    pub(crate) fn shortfall(self, len: usize) -> Option<String> {
        match self {
            Arity::Exact(n) => Some(n.to_string()),
            Arity::Range { min, .. } if len < min => Some(format!("minimum {min}")),
            Arity::Range { .. } => None,
        }
    }
}
