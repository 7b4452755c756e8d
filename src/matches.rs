use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;

use crate::body::Schema;
use crate::error::{Error, ErrorKind};
use crate::help::{self, Texts};
use crate::runtime::{Resolution, Resolved};
use crate::schema::{OptionDef, OptionKind};
use crate::values::{Value, ValueKind, auto_cast};
use crate::Result;

/// The parse result: option ids and argument names mapped to their values.
///
/// Every declared option and argument has an entry, seeded with its default. Iteration follows
/// insertion order: declared entries first, then undefined ones in the order they were met.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Matches {
    values: IndexMap<String, Value>,
}

impl Matches {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether `key` holds `true`. Missing and non-boolean entries are `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn array(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.values.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }
}

impl Index<&str> for Matches {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if `key` is absent.
    fn index(&self, key: &str) -> &Value {
        match self.values.get(key) {
            Some(v) => v,
            None => panic!("no value for '{key}'"),
        }
    }
}

impl IntoIterator for Matches {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Matches {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Renders like an object literal: `{ alpha: true, beta: 5, "--k": true }`.
impl fmt::Display for Matches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, (key, value)) in self.values.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            let bare = !key.is_empty()
                && !key.starts_with(|c: char| c.is_ascii_digit())
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if bare {
                f.write_str(key)?;
            } else {
                write!(f, "{key:?}")?;
            }
            f.write_str(": ")?;
            value.write_literal(f)?;
        }
        f.write_str(" }")
    }
}

/// What an observer wants done with the event it was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Store the value as usual.
    Continue,
    /// Skip the write into [`Matches`].
    Suppress,
}

pub(crate) type StartObserver = Box<dyn FnMut(&mut Matches)>;
pub(crate) type ArgumentObserver = Box<dyn FnMut(&mut Matches, &str) -> Result<Flow>>;
pub(crate) type OptionObserver = Box<dyn FnMut(&mut Matches, &str, &Value, bool) -> Result<Flow>>;
pub(crate) type EndObserver = Box<dyn FnMut(&mut Matches, &Texts<'_>) -> Result<()>>;

#[derive(Default)]
pub(crate) struct Observers {
    pub(crate) start: Option<StartObserver>,
    pub(crate) argument: Option<ArgumentObserver>,
    pub(crate) option: Option<OptionObserver>,
    pub(crate) end: Option<EndObserver>,
}

/// Builds [`Matches`] for one parse from resolved tokens.
pub(crate) struct ResultBuilder<'a> {
    schema: &'a Schema,
    observers: &'a mut Observers,
    program: &'a str,
    matches: Matches,
    /// Arguments held back until every option is applied, in sort mode.
    deferred: Option<Vec<String>>,
}

impl<'a> ResultBuilder<'a> {
    /// Seed defaults. `command` gets an empty collection ahead of everything else.
    pub(crate) fn new(
        schema: &'a Schema,
        observers: &'a mut Observers,
        program: &'a str,
        command: Option<&str>,
    ) -> Self {
        let mut matches = Matches::default();
        if let Some(command) = command {
            matches.insert(command, Value::Array(Vec::new()));
        }
        for def in schema.registry.options() {
            matches.insert(def.id(), def.initial_value());
        }
        for arg in schema.registry.arguments() {
            let initial =
                if arg.trailing.is_some() { Value::Array(Vec::new()) } else { Value::Bool(false) };
            matches.insert(arg.name.clone(), initial);
        }

        let deferred = schema.settings.sort.then(Vec::new);
        Self { schema, observers, program, matches, deferred }
    }

    pub(crate) fn start(&mut self) {
        if let Some(observer) = &mut self.observers.start {
            observer(&mut self.matches);
        }
    }

    pub(crate) fn option(&mut self, event: Resolved<'_>) -> Result<()> {
        let Resolved { name, resolution } = event;
        let key = name.key();
        let (def, value) = match resolution {
            Resolution::Flag { def, negated } => {
                // The short form of a negatable flag spells its `--no-` form.
                let value = if name.is_short() && def.is_some_and(OptionDef::is_negatable) {
                    false
                } else {
                    !negated
                };
                (def, Value::Bool(value))
            }
            Resolution::Value { def, spec, raw } => {
                (Some(def), spec.resolve(raw.as_deref(), &key)?)
            }
            Resolution::Untyped { raw } => (None, raw.as_deref().map_or(Value::Null, auto_cast)),
        };
        tracing::trace!(option = %key, %value, "resolved option");

        if let Some(observer) = &mut self.observers.option {
            if observer(&mut self.matches, &key, &value, name.is_long())? == Flow::Suppress {
                return Ok(());
            }
        }

        let Some(def) = def else {
            self.matches.insert(key, value);
            return Ok(());
        };
        let id = def.id();
        self.terminal(&id)?;

        let accumulates =
            matches!(&def.kind, OptionKind::Valued(spec) if spec.kind == ValueKind::Array);
        if !accumulates {
            self.matches.insert(id, value);
            return Ok(());
        }
        let slot = self.matches.values.entry(id).or_insert(Value::Null);
        match (slot, value) {
            (Value::Array(acc), Value::Array(items)) => acc.extend(items),
            (Value::Array(acc), other) => acc.push(other),
            (slot, value) => *slot = value,
        }
        Ok(())
    }

    /// Short-circuit with the rendered text if `id` is a declared help, usage or version option.
    fn terminal(&self, id: &str) -> Result<()> {
        let about = &self.schema.about;
        let (kind, text) = match id {
            "help" if about.show_help => {
                (ErrorKind::DisplayHelp, help::render_help(self.schema, self.program))
            }
            "usage" if about.show_usage => {
                (ErrorKind::DisplayUsage, help::render_usage(self.schema, self.program))
            }
            "version" if about.version.is_some() => (
                ErrorKind::DisplayVersion,
                help::render_version(self.schema).unwrap_or_default(),
            ),
            _ => return Ok(()),
        };
        tracing::debug!(?kind, program = self.program, "display requested");
        Err(Error::display(kind, text))
    }

    pub(crate) fn argument(&mut self, name: String) -> Result<()> {
        match &mut self.deferred {
            Some(deferred) => {
                deferred.push(name);
                Ok(())
            }
            None => self.emit_argument(name),
        }
    }

    fn emit_argument(&mut self, name: String) -> Result<()> {
        tracing::trace!(argument = %name, "resolved argument");
        if let Some(observer) = &mut self.observers.argument {
            if observer(&mut self.matches, &name)? == Flow::Suppress {
                return Ok(());
            }
        }
        self.matches.insert(name, true);
        Ok(())
    }

    /// Append to a trailing collection and return its new length.
    pub(crate) fn push_trailing(&mut self, name: &str, value: Value) -> usize {
        match self.matches.get_mut(name) {
            Some(Value::Array(items)) => {
                items.push(value);
                items.len()
            }
            _ => {
                self.matches.insert(name, Value::Array(vec![value]));
                1
            }
        }
    }

    pub(crate) fn trailing_len(&self, name: &str) -> usize {
        self.matches.array(name).map_or(0, <[Value]>::len)
    }

    pub(crate) fn finish(mut self) -> Result<Matches> {
        if let Some(deferred) = self.deferred.take() {
            for name in deferred {
                self.emit_argument(name)?;
            }
        }
        if let Some(observer) = &mut self.observers.end {
            observer(&mut self.matches, &Texts::new(self.schema, self.program))?;
        }
        Ok(self.matches)
    }
}
