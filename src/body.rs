//! The declaration surface shared by the top-level parser and its commands.
use crate::Result;
use crate::error::DefinitionError;
use crate::help::Texts;
use crate::matches::{Flow, Matches, Observers};
use crate::registry::Registry;
use crate::schema::{ArgumentDef, OptionDef};
use crate::values::Value;

/// Fallback when fewer than this many columns are requested.
const MIN_COLUMNS: usize = 32;
const DEFAULT_COLUMNS: usize = 80;

/// Everything declared on one parser or command.
#[derive(Debug, Default)]
pub(crate) struct Schema {
    pub(crate) registry: Registry,
    /// Help entries in registration order.
    pub(crate) lines: Vec<Line>,
    pub(crate) settings: Settings,
    pub(crate) about: About,
    pub(crate) in_command: bool,
}

#[derive(Debug)]
pub(crate) enum Line {
    Option(usize),
    Argument(String),
    Text { text: String, prefix: String },
    Columns(String, String),
}

#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) allow_undefined_options: bool,
    pub(crate) allow_undefined_arguments: bool,
    pub(crate) sort: bool,
    pub(crate) columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_undefined_options: false,
            allow_undefined_arguments: false,
            sort: false,
            columns: DEFAULT_COLUMNS,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct About {
    pub(crate) description: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) usages: Vec<String>,
    pub(crate) version: Option<String>,
    pub(crate) show_help: bool,
    pub(crate) show_usage: bool,
    /// A version from package metadata whose option is added last, when parsing starts.
    pub(crate) package_version: bool,
}

/// Declarations and observers of one parser or command.
#[derive(Default)]
pub struct Body {
    pub(crate) schema: Schema,
    pub(crate) observers: Observers,
}

impl Body {
    pub(crate) fn for_command() -> Self {
        let mut body = Self::default();
        body.schema.in_command = true;
        body
    }

    fn builtin(
        &mut self,
        short: Option<char>,
        long: &str,
        description: &str,
    ) -> Result<(), DefinitionError> {
        let mut def = OptionDef::flag().long(long).description(description);
        if let Some(short) = short {
            def = def.short(short);
        }
        let idx = self.schema.registry.define_option(def)?;
        self.schema.lines.push(Line::Option(idx));
        Ok(())
    }

    fn help(&mut self, short: Option<char>) -> Result<(), DefinitionError> {
        self.builtin(short, "help", "Display this help message and exit")?;
        self.schema.about.show_help = true;
        Ok(())
    }

    fn version(&mut self, version: String, short: Option<char>) -> Result<(), DefinitionError> {
        let about = &mut self.schema.about;
        if about.version.is_none() || about.package_version {
            about.package_version = false;
            self.builtin(short, "version", "Output version information and exit")?;
        }
        self.schema.about.version = Some(version);
        Ok(())
    }

    /// Set the version text without declaring its option yet.
    ///
    /// See [`Body::attach_package_version`].
    pub(crate) fn package_version(&mut self, version: String) {
        let about = &mut self.schema.about;
        if about.version.is_none() {
            about.package_version = true;
        }
        about.version = Some(version);
    }

    /// Declare the pending package version option after every user option.
    ///
    /// It takes `-v` only if that is still free, and is skipped entirely if `--version` is.
    pub(crate) fn attach_package_version(&mut self) {
        if !std::mem::take(&mut self.schema.about.package_version) {
            return;
        }
        let registry = &self.schema.registry;
        if registry.lookup_long("version").is_some() {
            tracing::debug!("package version option shadowed by a declared --version");
            return;
        }
        let short = (!registry.has_short('v')).then_some('v');
        if let Err(err) = self.builtin(short, "version", "Output version information and exit") {
            tracing::debug!(%err, "package version option skipped");
        }
    }
}

/// Builder methods shared by [`Argp`](crate::Argp) and [`Command`](crate::Command).
///
/// Entries show up in help in the order they are declared.
///
/// ```
/// use argp::{Argp, Define, OptionDef};
///
/// let mut argp = Argp::new();
/// argp.description("Frobnicate files.")
///     .text("Options:")
///     .option(OptionDef::flag().short('v').long("verbose"))?
///     .help()?;
/// # Ok::<_, argp::DefinitionError>(())
/// ```
pub trait Define: Sized {
    #[doc(hidden)]
    fn body_mut(&mut self) -> &mut Body;

    fn option(&mut self, def: OptionDef) -> Result<&mut Self, DefinitionError> {
        let schema = &mut self.body_mut().schema;
        let idx = schema.registry.define_option(def)?;
        schema.lines.push(Line::Option(idx));
        Ok(self)
    }

    fn argument(&mut self, def: impl Into<ArgumentDef>) -> Result<&mut Self, DefinitionError> {
        let def = def.into();
        let schema = &mut self.body_mut().schema;
        let name = def.name.clone();
        schema.registry.define_argument(def, schema.in_command)?;
        schema.lines.push(Line::Argument(name));
        Ok(self)
    }

    /// A free text line in help.
    fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text_with_prefix(text, "")
    }

    /// A free text line in help whose wrapped lines start with `prefix`.
    fn text_with_prefix(
        &mut self,
        text: impl Into<String>,
        prefix: impl Into<String>,
    ) -> &mut Self {
        let line = Line::Text { text: text.into(), prefix: prefix.into() };
        self.body_mut().schema.lines.push(line);
        self
    }

    /// A two-column help line laid out like an option.
    fn text_columns(&mut self, left: impl Into<String>, right: impl Into<String>) -> &mut Self {
        self.body_mut().schema.lines.push(Line::Columns(left.into(), right.into()));
        self
    }

    /// Declare `-h, --help`.
    fn help(&mut self) -> Result<&mut Self, DefinitionError> {
        self.body_mut().help(Some('h'))?;
        Ok(self)
    }

    /// Declare `--help` without the short name.
    fn help_long_only(&mut self) -> Result<&mut Self, DefinitionError> {
        self.body_mut().help(None)?;
        Ok(self)
    }

    /// Declare `--usage`.
    fn usage(&mut self) -> Result<&mut Self, DefinitionError> {
        let body = self.body_mut();
        body.builtin(None, "usage", "Display a short usage message and exit")?;
        body.schema.about.show_usage = true;
        Ok(self)
    }

    /// Declare `-v, --version` printing `version`.
    fn version(&mut self, version: impl Into<String>) -> Result<&mut Self, DefinitionError> {
        self.body_mut().version(version.into(), Some('v'))?;
        Ok(self)
    }

    /// Declare `--version` without the short name.
    fn version_long_only(
        &mut self,
        version: impl Into<String>,
    ) -> Result<&mut Self, DefinitionError> {
        self.body_mut().version(version.into(), None)?;
        Ok(self)
    }

    fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.body_mut().schema.about.description = Some(description.into());
        self
    }

    /// The bug report address shown at the end of help.
    fn email(&mut self, email: impl Into<String>) -> &mut Self {
        self.body_mut().schema.about.email = Some(email.into());
        self
    }

    /// Replace the generated `Usage:` lines.
    fn usages<I>(&mut self, usages: I) -> &mut Self
    where
        I: IntoIterator<Item: Into<String>>,
    {
        self.body_mut().schema.about.usages = usages.into_iter().map(Into::into).collect();
        self
    }

    /// Accept options that were never declared. They are auto-cast.
    fn allow_undefined_options(&mut self) -> &mut Self {
        self.body_mut().schema.settings.allow_undefined_options = true;
        self
    }

    fn allow_undefined_arguments(&mut self) -> &mut Self {
        self.body_mut().schema.settings.allow_undefined_arguments = true;
        self
    }

    /// Apply every option before any argument.
    fn sort(&mut self) -> &mut Self {
        self.body_mut().schema.settings.sort = true;
        self
    }

    /// The width help is wrapped to. Less than 32 means 80.
    fn columns(&mut self, columns: usize) -> &mut Self {
        let columns = if columns < MIN_COLUMNS { DEFAULT_COLUMNS } else { columns };
        self.body_mut().schema.settings.columns = columns;
        self
    }

    /// Called once after defaults are seeded, before the first token.
    fn on_start(&mut self, f: impl FnMut(&mut Matches) + 'static) -> &mut Self {
        self.body_mut().observers.start = Some(Box::new(f));
        self
    }

    /// Called for every argument before it is stored.
    fn on_argument(
        &mut self,
        f: impl FnMut(&mut Matches, &str) -> Result<Flow> + 'static,
    ) -> &mut Self {
        self.body_mut().observers.argument = Some(Box::new(f));
        self
    }

    /// Called for every option with its key, its resolved value and whether it was
    /// spelled long, before it is stored.
    fn on_option(
        &mut self,
        f: impl FnMut(&mut Matches, &str, &Value, bool) -> Result<Flow> + 'static,
    ) -> &mut Self {
        self.body_mut().observers.option = Some(Box::new(f));
        self
    }

    /// Called once after the last token with the final map and the help, usage and version
    /// text of this parser or command. An `Err` fails the parse.
    fn on_end(
        &mut self,
        f: impl FnMut(&mut Matches, &Texts<'_>) -> Result<()> + 'static,
    ) -> &mut Self {
        self.body_mut().observers.end = Some(Box::new(f));
        self
    }
}

impl From<&str> for ArgumentDef {
    fn from(name: &str) -> Self {
        ArgumentDef::new(name)
    }
}

impl From<String> for ArgumentDef {
    fn from(name: String) -> Self {
        ArgumentDef::new(name)
    }
}
