use std::collections::HashMap;

use indexmap::IndexMap;

use crate::Result;
use crate::error::{DefinitionError, ErrorKind};
use crate::schema::{ArgumentDef, OptionDef};

/// Declared options and arguments of one parser or command.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// In declaration order.
    options: Vec<OptionDef>,
    by_short: HashMap<char, usize>,
    /// Long names and aliases, in declaration order so abbreviation scans are stable.
    by_long: IndexMap<String, usize>,
    arguments: IndexMap<String, ArgumentDef>,
}

impl Registry {
    pub(crate) fn define_option(&mut self, mut def: OptionDef) -> Result<usize, DefinitionError> {
        def.validate()?;

        let dup = |what, name: &str| DefinitionError::Duplicate { what, name: name.to_owned() };
        if let Some(short) = def.short {
            if self.by_short.contains_key(&short) {
                return Err(dup("short name", &short.to_string()));
            }
        }
        if let Some(long) = &def.long {
            if self.by_long.contains_key(long) {
                return Err(dup("long name", long));
            }
        }
        for (i, alias) in def.aliases.iter().enumerate() {
            if self.by_long.contains_key(alias)
                || def.long.as_ref() == Some(alias)
                || def.aliases[..i].contains(alias)
            {
                return Err(dup("alias", alias));
            }
        }
        let id = def.id();
        if self.options.iter().any(|o| o.id() == id) {
            return Err(dup("option", &id));
        }

        let idx = self.options.len();
        if let Some(short) = def.short {
            self.by_short.insert(short, idx);
        }
        for long in def.long.iter().chain(&def.aliases) {
            self.by_long.insert(long.clone(), idx);
        }
        self.options.push(def);
        Ok(idx)
    }

    pub(crate) fn define_argument(
        &mut self,
        mut def: ArgumentDef,
        in_command: bool,
    ) -> Result<(), DefinitionError> {
        def.validate(in_command)?;
        if self.arguments.contains_key(&def.name) {
            return Err(DefinitionError::Duplicate { what: "argument", name: def.name });
        }
        self.arguments.insert(def.name.clone(), def);
        Ok(())
    }

    pub(crate) fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub(crate) fn arguments(&self) -> impl Iterator<Item = &ArgumentDef> {
        self.arguments.values()
    }

    pub(crate) fn option(&self, idx: usize) -> &OptionDef {
        &self.options[idx]
    }

    pub(crate) fn has_short(&self, short: char) -> bool {
        self.by_short.contains_key(&short)
    }

    pub(crate) fn lookup_short(&self, short: char) -> Option<&OptionDef> {
        self.by_short.get(&short).map(|&idx| &self.options[idx])
    }

    pub(crate) fn lookup_long(&self, long: &str) -> Option<&OptionDef> {
        self.by_long.get(long).map(|&idx| &self.options[idx])
    }

    pub(crate) fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.arguments.get(name)
    }

    /// Resolve a possibly abbreviated long name into the declared name and its option.
    ///
    /// With `negated`, only flags are candidates for an abbreviation, since `--no-` never
    /// applies to value options.
    pub(crate) fn resolve_long(
        &self,
        prefix: &str,
        negated: bool,
    ) -> Result<Option<(&str, &OptionDef)>> {
        if let Some((name, &idx)) = self.by_long.get_key_value(prefix) {
            return Ok(Some((name, &self.options[idx])));
        }
        // An empty prefix would match everything.
        if prefix.is_empty() {
            return Ok(None);
        }

        let mut found: Option<(&str, usize)> = None;
        for (name, &idx) in &self.by_long {
            if !name.starts_with(prefix) || (negated && !self.options[idx].is_flag()) {
                continue;
            }
            match found {
                // A long name and its alias both matching is not ambiguous.
                Some((_, prev)) if prev == idx => {}
                Some(_) => {
                    let typed =
                        if negated { format!("--no-{prefix}") } else { format!("--{prefix}") };
                    return Err(ErrorKind::AmbiguousOption.with_arg(typed));
                }
                None => found = Some((name, idx)),
            }
        }
        tracing::trace!(prefix, resolved = ?found.map(|(name, _)| name), "abbreviation");
        Ok(found.map(|(name, idx)| (name, &self.options[idx])))
    }
}
