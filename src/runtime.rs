use std::fmt;

use crate::body::{Body, Schema};
use crate::error::ErrorKind;
use crate::matches::{Matches, ResultBuilder};
use crate::schema::{Arity, OptionDef, OptionKind, ValueSpec};
use crate::values::auto_cast;
use crate::Result;

/// An option name as it was typed, after abbreviation expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Name {
    Short(char),
    Long(String),
}

impl Name {
    /// The result key of an undefined option, and the `name` shown to observers.
    pub(crate) fn key(&self) -> String {
        match self {
            Name::Short(c) => c.to_string(),
            Name::Long(s) => s.clone(),
        }
    }

    pub(crate) fn is_short(&self) -> bool {
        matches!(self, Name::Short(_))
    }

    pub(crate) fn is_long(&self) -> bool {
        matches!(self, Name::Long(_))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Short(c) => write!(f, "-{c}"),
            Name::Long(s) => write!(f, "--{s}"),
        }
    }
}

/// A fully tokenized option occurrence, ready for the result builder.
#[derive(Debug)]
pub(crate) struct Resolved<'a> {
    pub(crate) name: Name,
    pub(crate) resolution: Resolution<'a>,
}

#[derive(Debug)]
pub(crate) enum Resolution<'a> {
    /// A declared flag, or an undefined option that never got a value.
    Flag { def: Option<&'a OptionDef>, negated: bool },
    /// A declared value option. `None` means no value was given.
    Value { def: &'a OptionDef, spec: &'a ValueSpec, raw: Option<String> },
    /// An undefined option, auto-cast.
    Untyped { raw: Option<String> },
}

/// A value option waiting for its value in the next token.
#[derive(Debug)]
struct Pending<'a> {
    name: Name,
    target: Option<(&'a OptionDef, &'a ValueSpec)>,
}

impl<'a> Pending<'a> {
    fn with_value(self, raw: Option<String>) -> Resolved<'a> {
        let resolution = match self.target {
            Some((def, spec)) => Resolution::Value { def, spec, raw },
            None => Resolution::Untyped { raw },
        };
        Resolved { name: self.name, resolution }
    }

    /// Whether a token starting with `-` is taken as the value instead of an option.
    fn accepts_hyphen(&self) -> bool {
        self.target.is_some_and(|(_, spec)| spec.kind.accepts_hyphen())
    }
}

#[derive(Debug)]
enum State<'a> {
    Scanning,
    AwaitingValue(Pending<'a>),
    /// After `--`: every token is an argument.
    ArgumentsOnly,
}

/// The trailing argument currently collecting free tokens.
#[derive(Debug)]
struct Collector {
    name: String,
    arity: Arity,
}

#[derive(Debug)]
enum Arg<'t> {
    DashDash,
    Dash,
    Long(&'t str),
    Short(&'t str),
    Unnamed,
}

impl<'t> Arg<'t> {
    fn classify(token: &'t str) -> Self {
        if token == "--" {
            Arg::DashDash
        } else if token == "-" {
            Arg::Dash
        } else if let Some(rest) = token.strip_prefix("--") {
            Arg::Long(rest)
        } else if let Some(rest) = token.strip_prefix('-') {
            Arg::Short(rest)
        } else {
            Arg::Unnamed
        }
    }
}

/// Parse `tokens` against `body`.
///
/// `command` names the command being parsed along with the bounds of its own trailing
/// collection, if it has one.
pub(crate) fn parse(
    body: &mut Body,
    program: &str,
    command: Option<(&str, Option<Arity>)>,
    tokens: impl IntoIterator<Item = String>,
) -> Result<Matches> {
    let Body { schema, observers } = body;
    let schema = &*schema;

    let mut builder = ResultBuilder::new(schema, observers, program, command.map(|(name, _)| name));
    builder.start();
    let trailing = command
        .and_then(|(name, arity)| Some(Collector { name: name.to_owned(), arity: arity? }));

    let mut session = Session { schema, builder, state: State::Scanning, trailing };
    for token in tokens {
        session.feed(token)?;
    }
    session.finish()
}

struct Session<'a> {
    schema: &'a Schema,
    builder: ResultBuilder<'a>,
    state: State<'a>,
    trailing: Option<Collector>,
}

impl<'a> Session<'a> {
    fn feed(&mut self, token: String) -> Result<()> {
        tracing::trace!(%token, state = ?self.state, "token");
        if matches!(self.state, State::ArgumentsOnly) {
            return self.builder.argument(token);
        }

        match Arg::classify(&token) {
            Arg::DashDash => {
                self.free()?;
                self.state = State::ArgumentsOnly;
                Ok(())
            }
            Arg::Dash => match self.take_pending() {
                Some(pending) => self.builder.option(pending.with_value(Some(token))),
                None => self.argument(token),
            },
            Arg::Long(rest) => self.long(rest),
            // `--num -12.34` and `--list -1,x` carry a leading hyphen.
            Arg::Short(rest) => match self.take_pending() {
                Some(pending) if pending.accepts_hyphen() => {
                    self.builder.option(pending.with_value(Some(token)))
                }
                pending => {
                    if let Some(pending) = pending {
                        self.state = State::AwaitingValue(pending);
                    }
                    self.short(rest)
                }
            },
            Arg::Unnamed if matches!(self.state, State::AwaitingValue(_)) => self.value(token),
            Arg::Unnamed => self.argument(token),
        }
    }

    fn take_pending(&mut self) -> Option<Pending<'a>> {
        match std::mem::replace(&mut self.state, State::Scanning) {
            State::AwaitingValue(pending) => Some(pending),
            state => {
                self.state = state;
                None
            }
        }
    }

    /// Close a pending option that got no value.
    fn free(&mut self) -> Result<()> {
        let Some(pending) = self.take_pending() else {
            return Ok(());
        };
        match pending.target {
            Some((_, spec)) if !spec.optional => {
                Err(ErrorKind::MissingValue.with_arg(pending.name.to_string()))
            }
            Some(_) => self.builder.option(pending.with_value(None)),
            None => self.builder.option(Resolved {
                name: pending.name,
                resolution: Resolution::Flag { def: None, negated: false },
            }),
        }
    }

    /// A free token met while an option is pending.
    fn value(&mut self, token: String) -> Result<()> {
        // A declared argument is never swallowed: in `--a arg 1`, `1` is the value of `a`.
        if self.schema.registry.argument(&token).is_some() {
            return self.builder.argument(token);
        }
        match self.take_pending() {
            Some(pending) => self.builder.option(pending.with_value(Some(token))),
            None => self.argument(token),
        }
    }

    fn long(&mut self, rest: &str) -> Result<()> {
        self.free()?;
        let schema = self.schema;
        let registry = &schema.registry;
        let allow_undefined = schema.settings.allow_undefined_options;

        // A declared long name that happens to start with `no-` is not a negation.
        let negation = rest
            .strip_prefix("no-")
            .filter(|name| !name.is_empty() && registry.lookup_long(rest).is_none());
        if let Some(name) = negation {
            return match registry.resolve_long(name, true)? {
                Some((full, def)) => match def.kind {
                    OptionKind::Flag { negatable: true } => self.builder.option(Resolved {
                        name: Name::Long(full.to_owned()),
                        resolution: Resolution::Flag { def: Some(def), negated: true },
                    }),
                    // `--no-x` on a plain flag restates its default.
                    OptionKind::Flag { negatable: false } => Ok(()),
                    OptionKind::Valued(_) => {
                        Err(ErrorKind::UnrecognizedOption.with_arg(format!("--no-{full}")))
                    }
                },
                None if allow_undefined => self.builder.option(Resolved {
                    name: Name::Long(name.to_owned()),
                    resolution: Resolution::Flag { def: None, negated: true },
                }),
                None => Err(ErrorKind::UnrecognizedOption.with_arg(format!("--no-{name}"))),
            };
        }

        let (name, inline) = match rest.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (rest, None),
        };
        if name.is_empty() {
            // `--=value` names nothing, not even an undefined option.
            return Err(ErrorKind::UnrecognizedOption.with_arg(format!("--{rest}")));
        }
        match registry.resolve_long(name, false)? {
            Some((full, def)) => {
                let name = Name::Long(full.to_owned());
                match &def.kind {
                    OptionKind::Flag { .. } if inline.is_some() => {
                        Err(ErrorKind::UnexpectedValue.with_arg(name.to_string()))
                    }
                    // The positive form of a negatable flag restates its default.
                    OptionKind::Flag { negatable: true } => Ok(()),
                    OptionKind::Flag { negatable: false } => self.builder.option(Resolved {
                        name,
                        resolution: Resolution::Flag { def: Some(def), negated: false },
                    }),
                    OptionKind::Valued(spec) => {
                        self.open(Pending { name, target: Some((def, spec)) }, inline)
                    }
                }
            }
            None if allow_undefined => {
                self.open(Pending { name: Name::Long(name.to_owned()), target: None }, inline)
            }
            None => Err(ErrorKind::UnrecognizedOption.with_arg(format!("--{name}"))),
        }
    }

    /// Resolve with an inline value, or wait for the next token.
    fn open(&mut self, pending: Pending<'a>, inline: Option<&str>) -> Result<()> {
        match inline {
            // `--name=` carries no value: the default applies.
            Some(value) => {
                let raw = (!value.is_empty()).then(|| value.to_owned());
                self.builder.option(pending.with_value(raw))
            }
            None => {
                self.state = State::AwaitingValue(pending);
                Ok(())
            }
        }
    }

    /// A cluster of short options, `-abc`, or a short option with a glued value, `-ofile`.
    fn short(&mut self, cluster: &str) -> Result<()> {
        self.free()?;
        let schema = self.schema;
        let registry = &schema.registry;
        let chars: Vec<(usize, char)> = cluster.char_indices().collect();
        let last = chars.len().saturating_sub(1);

        for (i, &(pos, c)) in chars.iter().enumerate() {
            self.free()?;
            let name = Name::Short(c);
            let Some(def) = registry.lookup_short(c) else {
                if !schema.settings.allow_undefined_options {
                    return Err(ErrorKind::UnrecognizedOption.with_arg(name.to_string()));
                }
                self.state = State::AwaitingValue(Pending { name, target: None });
                continue;
            };
            let spec = match &def.kind {
                OptionKind::Flag { .. } => {
                    self.builder.option(Resolved {
                        name,
                        resolution: Resolution::Flag { def: Some(def), negated: false },
                    })?;
                    continue;
                }
                OptionKind::Valued(spec) => spec,
            };

            let pending = Pending { name, target: Some((def, spec)) };
            if i == last {
                self.state = State::AwaitingValue(pending);
            } else if i == 0 && !registry.has_short(chars[1].1) {
                // The rest of the token is the value.
                let value = &cluster[pos + c.len_utf8()..];
                return self.builder.option(pending.with_value(Some(value.to_owned())));
            } else if spec.optional {
                self.builder.option(pending.with_value(None))?;
            } else {
                return Err(ErrorKind::MissingValue.with_arg(pending.name.to_string()));
            }
        }
        Ok(())
    }

    fn argument(&mut self, token: String) -> Result<()> {
        if let Some(collector) = &self.trailing {
            let len = self.builder.push_trailing(&collector.name, auto_cast(&token));
            if collector.arity.is_full(len) {
                tracing::trace!(argument = %collector.name, len, "trailing arguments complete");
                self.trailing = None;
            }
            return Ok(());
        }

        let settings = &self.schema.settings;
        match self.schema.registry.argument(&token) {
            Some(def) => match def.arity {
                Some(arity) => {
                    self.trailing = Some(Collector { name: token, arity });
                    Ok(())
                }
                None => self.builder.argument(token),
            },
            None if settings.allow_undefined_arguments => self.builder.argument(token),
            None => Err(ErrorKind::UnrecognizedArgument.with_input(token)),
        }
    }

    fn finish(mut self) -> Result<Matches> {
        self.free()?;
        if let Some(collector) = &self.trailing {
            let len = self.builder.trailing_len(&collector.name);
            if let Some(expected) = collector.arity.shortfall(len) {
                let name = collector.name.clone();
                return Err(ErrorKind::CommandArity.with_arg_input(name, expected));
            }
        }
        self.builder.finish()
    }
}
