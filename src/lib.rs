#![forbid(unsafe_code)]
//! GNU-style command-line parsing into a dynamic map of values.
//!
//! ```
//! use argp::{Argp, Define, OptionDef, ValueKind};
//!
//! let mut argp = Argp::new();
//! argp.option(OptionDef::flag().short('a').long("all"))?
//!     .option(OptionDef::valued("N").short('j').long("jobs").kind(ValueKind::Number))?
//!     .argument("build")?
//!     .help()?;
//!
//! let matches = argp.try_parse_from(["prog", "-a", "-j4", "build"]).unwrap();
//! assert!(matches.flag("all"));
//! assert_eq!(matches.number("jobs"), Some(4.0));
//! assert!(matches.flag("build"));
//! # Ok::<_, argp::DefinitionError>(())
//! ```
use std::ffi::OsString;
use std::path::PathBuf;

use indexmap::IndexMap;

mod body;
mod command;
mod error;
mod help;
mod matches;
mod registry;
mod runtime;
mod schema;
mod values;

pub use crate::body::{Body, Define};
pub use crate::command::Command;
pub use crate::error::{DefinitionError, Error, ErrorKind};
pub use crate::help::Texts;
pub use crate::matches::{Flow, Matches};
pub use crate::schema::{ArgumentDef, OptionDef, OptionKind, Trailing, ValueSpec};
pub use crate::values::{Reviver, Value, ValueKind, auto_cast, parse_number};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The top-level parser.
///
/// Declare options, arguments and commands through [`Define`] and [`Argp::command`], then
/// consume it with one of the `parse` methods.
#[derive(Default)]
pub struct Argp {
    body: Body,
    commands: IndexMap<String, Command>,
    program: Option<String>,
}

impl Define for Argp {
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Argp {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the program name shown in help and errors, which defaults to the file name
    /// of argv\[0\].
    pub fn program(&mut self, name: impl Into<String>) -> &mut Self {
        self.program = Some(name.into());
        self
    }

    /// Declare a command. With `trailing`, the free tokens after it are collected under its
    /// name.
    pub fn command(
        &mut self,
        name: impl Into<String>,
        trailing: Option<Trailing>,
    ) -> Result<&mut Command, DefinitionError> {
        let name = name.into();
        if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
            return Err(DefinitionError::InvalidName {
                what: "command",
                name,
                reason: "must be non-empty, not start with '-' and contain no whitespace",
            });
        }
        if self.commands.contains_key(&name) {
            return Err(DefinitionError::Duplicate { what: "command", name });
        }
        let arity = trailing.map(Trailing::validate).transpose()?;
        let command = Command::new(name.clone(), arity);
        Ok(self.commands.entry(name).or_insert(command))
    }

    /// Take description, version and bug report address from Cargo metadata.
    ///
    /// The version adds `-v, --version` after every other option once parsing starts, so it
    /// never collides with user options: `-v` is left out when already taken, and a declared
    /// `--version` is kept as is. See [`package_info!`].
    pub fn package(&mut self, info: PackageInfo) -> &mut Self {
        if let Some(email) = info.email() {
            self.email(email);
        }
        if let Some(description) = info.description {
            self.description(description);
        }
        if let Some(version) = info.version {
            self.body.package_version(format!("v{version}"));
        }
        self
    }

    fn program_name(&self, arg0: Option<OsString>) -> String {
        if let Some(program) = &self.program {
            return program.clone();
        }
        // A non-UTF-8 program name does not matter in help.
        let arg0 = PathBuf::from(arg0.unwrap_or_default());
        arg0.file_name().unwrap_or(arg0.as_os_str()).to_string_lossy().into_owned()
    }

    /// Render help as `--help` prints it.
    ///
    /// This completes the declarations like parsing does, so the version option from
    /// [`Argp::package`] shows up.
    #[must_use]
    pub fn help_text(&mut self) -> String {
        self.body.attach_package_version();
        help::render_help(&self.body.schema, &self.program_name(std::env::args_os().next()))
    }

    /// Render usage as `--usage` prints it. See [`Argp::help_text`].
    #[must_use]
    pub fn usage_text(&mut self) -> String {
        self.body.attach_package_version();
        help::render_usage(&self.body.schema, &self.program_name(std::env::args_os().next()))
    }

    #[must_use]
    pub fn version_text(&self) -> Option<String> {
        help::render_version(&self.body.schema)
    }

    /// Parse the process arguments, exiting on errors and terminal options.
    #[must_use]
    pub fn parse(self) -> Matches {
        self.parse_from(std::env::args_os())
    }

    /// Like [`Argp::parse`] with explicit input, argv\[0\] included.
    pub fn parse_from<I, T>(self, iter: I) -> Matches
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        match self.try_parse_from(iter) {
            Ok(matches) => matches,
            Err(err) => err.exit(),
        }
    }

    /// Parse `iter`, whose first item is argv\[0\].
    ///
    /// Help, usage and version requests come back as errors with [`Error::is_display`] set.
    pub fn try_parse_from<I, T>(mut self, iter: I) -> Result<Matches>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut iter = iter.into_iter().map(Into::into);
        let arg0 = iter.next().ok_or(ErrorKind::MissingArg0)?;
        let program = self.program_name(Some(arg0));
        self.body.attach_package_version();
        let hint = help::hint(&self.body.schema, &program);

        let tokens = iter
            .map(|arg| {
                arg.into_string()
                    .map_err(|arg| ErrorKind::InvalidUtf8.with_input(arg.to_string_lossy()))
            })
            .collect::<Result<Vec<String>>>()
            .map_err(|err| err.with_context(&program, hint.clone()))?;

        if let Some(command) = tokens.first().and_then(|first| self.commands.get_mut(first)) {
            let program = format!("{program} {}", command.name);
            tracing::debug!(command = %command.name, "dispatching to command");
            let hint = help::hint(&command.body.schema, &program).or(hint);
            let target = Some((command.name.as_str(), command.arity));
            return runtime::parse(&mut command.body, &program, target, tokens.into_iter().skip(1))
                .map_err(|err| err.with_context(&program, hint));
        }

        runtime::parse(&mut self.body, &program, None, tokens)
            .map_err(|err| err.with_context(&program, hint))
    }
}

/// Package metadata, usually built by [`package_info!`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub version: Option<String>,
    pub description: Option<String>,
    /// Cargo's colon separated authors, e.g. `Jane Doe <jane@example.com>`.
    pub authors: Option<String>,
}

impl PackageInfo {
    /// Empty strings count as absent.
    #[must_use]
    pub fn from_cargo(version: &str, description: &str, authors: &str) -> Self {
        let some = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        Self { version: some(version), description: some(description), authors: some(authors) }
    }

    /// The address of the first author.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        let first = self.authors.as_deref()?.split(':').next()?;
        let start = first.find('<')? + 1;
        let end = first.rfind('>')?;
        first.get(start..end).filter(|email| !email.is_empty())
    }
}

/// Build a [`PackageInfo`] from the calling crate's Cargo metadata.
#[macro_export]
macro_rules! package_info {
    () => {
        $crate::PackageInfo::from_cargo(
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION"),
            env!("CARGO_PKG_AUTHORS"),
        )
    };
}
