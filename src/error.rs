use std::fmt;

type DynStdError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A parse-time error, or a request to display help, usage or version text.
///
/// Use [`Error::exit`] to report it the conventional way: messages go to stderr with exit
/// status 1, help/usage/version text goes to stdout with exit status 0.
pub struct Error(Box<Inner>);

#[cfg(test)]
struct _AssertErrorIsSendSync
where
    Error: Send + Sync;

struct Inner {
    kind: ErrorKind,

    /// The option or command the error is about, as the user should read it.
    arg: Option<String>,
    /// The offending raw input, or the rendered text for display requests.
    input: Option<String>,
    /// The underlying source error, if there is any.
    source: Option<DynStdError>,

    context: Option<Context>,
}

/// Attached while the error bubbles out of the parser.
struct Context {
    program: String,
    /// The "Try ..." line, if the program has `--help` or `--usage`.
    hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    // Input parsing errors.
    MissingArg0,
    InvalidUtf8,
    UnrecognizedOption,
    UnrecognizedArgument,
    AmbiguousOption,
    MissingValue,
    UnexpectedValue,
    TypeConversion,
    InvalidChoice,
    CommandArity,

    // Not really errors, but for bubbling out.
    DisplayHelp,
    DisplayUsage,
    DisplayVersion,

    // User errors.
    Custom,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source.as_ref().map(|err| &**err as _)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &*self.0;
        f.debug_struct("Error")
            .field("kind", &e.kind)
            .field("arg", &e.arg)
            .field("input", &e.input)
            .field("source", &e.source)
            .field("program", &e.context.as_ref().map(|c| &c.program))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &*self.0;
        let arg = e.arg.as_deref().unwrap_or_default();
        let input = e.input.as_deref().unwrap_or_default();

        match e.kind {
            ErrorKind::MissingArg0 => f.write_str("missing executable argument (argv[0])"),
            ErrorKind::InvalidUtf8 => write!(f, "Invalid UTF-8 in argument '{input}'"),
            ErrorKind::UnrecognizedOption => write!(f, "Unrecognized option '{arg}'"),
            ErrorKind::UnrecognizedArgument => write!(f, "Unrecognized argument '{input}'"),
            ErrorKind::AmbiguousOption => write!(f, "Option '{arg}' is ambiguous"),
            ErrorKind::MissingValue => write!(f, "Option '{arg}' requires an argument"),
            ErrorKind::UnexpectedValue => {
                write!(f, "Option '{arg}' does not require an argument")
            }
            ErrorKind::TypeConversion => write!(f, "Option '{arg}' is not a {input}"),
            ErrorKind::InvalidChoice => write!(f, "Unrecognized choice '{input}'"),
            ErrorKind::CommandArity => write!(f, "Command '{arg}' expects {input} argument/s"),
            ErrorKind::DisplayHelp | ErrorKind::DisplayUsage | ErrorKind::DisplayVersion => {
                f.write_str(input)
            }
            ErrorKind::Custom => match &e.source {
                Some(source) => source.fmt(f),
                None => Ok(()),
            },
        }
    }
}

impl Error {
    fn new(kind: ErrorKind, arg: Option<String>, input: Option<String>) -> Self {
        Self(Box::new(Inner { kind, arg, input, source: None, context: None }))
    }

    /// Create a custom error with given reason, reported like any other parse error.
    pub fn custom(reason: impl Into<String>) -> Self {
        let source = reason.into().into();
        let mut e = Self::new(ErrorKind::Custom, None, None);
        e.0.source = Some(source);
        e
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }

    /// Whether this is a help, usage or version request rather than a failure.
    #[must_use]
    pub fn is_display(&self) -> bool {
        matches!(
            self.0.kind,
            ErrorKind::DisplayHelp | ErrorKind::DisplayUsage | ErrorKind::DisplayVersion
        )
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_display() { 0 } else { 1 }
    }

    /// The program name used in the report, once known.
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        self.0.context.as_ref().map(|c| c.program.as_str())
    }

    /// Render the full report as printed by [`Error::print`].
    #[must_use]
    pub fn render(&self) -> String {
        if self.is_display() {
            return self.to_string();
        }
        let mut out = String::new();
        match &self.0.context {
            Some(Context { program, hint }) => {
                out.push_str(program);
                out.push_str(": ");
                out.push_str(&self.to_string());
                out.push('.');
                if let Some(hint) = hint {
                    out.push('\n');
                    out.push_str(hint);
                }
            }
            None => out.push_str(&self.to_string()),
        }
        out
    }

    /// Print the report to stdout for display requests and to stderr otherwise.
    #[allow(clippy::print_stderr, clippy::print_stdout)]
    pub fn print(&self) {
        if self.is_display() {
            println!("{}", self.render());
        } else {
            eprintln!("{}", self.render());
        }
    }

    /// Print the report and terminate the process with [`Error::exit_code`].
    pub fn exit(&self) -> ! {
        tracing::debug!(kind = ?self.0.kind, "terminating after parse");
        self.print();
        std::process::exit(self.exit_code())
    }

    pub(crate) fn with_context(mut self, program: &str, hint: Option<String>) -> Self {
        // The innermost context wins: a command error keeps "prog cmd".
        if self.0.context.is_none() {
            self.0.context = Some(Context { program: program.to_owned(), hint });
        }
        self
    }

    pub(crate) fn display(kind: ErrorKind, text: String) -> Self {
        Self::new(kind, None, Some(text))
    }
}

impl From<ErrorKind> for Error {
    #[cold]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None, None)
    }
}

impl ErrorKind {
    #[cold]
    pub(crate) fn with_input(self, input: impl Into<String>) -> Error {
        Error::new(self, None, Some(input.into()))
    }

    #[cold]
    pub(crate) fn with_arg(self, arg: impl Into<String>) -> Error {
        Error::new(self, Some(arg.into()), None)
    }

    #[cold]
    pub(crate) fn with_arg_input(self, arg: impl Into<String>, input: impl Into<String>) -> Error {
        Error::new(self, Some(arg.into()), Some(input.into()))
    }
}

/// A mistake in the option or argument declarations.
///
/// These are programmer errors reported at registration time, never caused by user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("the {what} \"{name}\" is already defined")]
    Duplicate { what: &'static str, name: String },
    #[error("invalid {what} \"{name}\": {reason}")]
    InvalidName { what: &'static str, name: String, reason: &'static str },
    #[error("invalid trailing arguments: {0}")]
    InvalidTrailing(&'static str),
}
