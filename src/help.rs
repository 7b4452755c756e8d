use crate::body::{Line, Schema};
use crate::schema::{OptionDef, OptionKind};

/// The column where descriptions start in help text.
const DESCRIPTION_COLUMN: usize = 30;
/// Continuation indent of wrapped `Usage:` lines.
const USAGE_PREFIX: &str = "         ";

macro_rules! w {
    ($out:expr, $($e:expr),*) => {{
        $($out.push_str($e);)*
    }};
}

/// Word-wrap `text` to `columns`, starting each continuation line with `prefix`.
///
/// Explicit newlines are kept. A word longer than a line is never broken.
pub(crate) fn wrap(text: &str, columns: usize, prefix: &str) -> String {
    let indent = prefix.chars().count();
    let mut out = String::with_capacity(text.len());
    let mut width = 0;
    for (i, paragraph) in text.split('\n').enumerate() {
        if i != 0 {
            w!(out, "\n", prefix);
            width = indent;
        }
        let mut fresh = true;
        for word in paragraph.split(' ').filter(|word| !word.is_empty()) {
            let len = word.chars().count();
            if !fresh {
                if width + 1 + len > columns {
                    w!(out, "\n", prefix);
                    width = indent;
                } else {
                    out.push(' ');
                    width += 1;
                }
            }
            out.push_str(word);
            width += len;
            fresh = false;
        }
    }
    out
}

/// Append `left` and, from [`DESCRIPTION_COLUMN`] on, the wrapped `right`.
fn columnize(out: &mut String, left: &str, right: Option<&str>, columns: usize) {
    let Some(right) = right else {
        out.push_str(left.trim_end());
        return;
    };
    let blank = " ".repeat(DESCRIPTION_COLUMN);

    out.push_str(left);
    let len = left.chars().count();
    if len > DESCRIPTION_COLUMN {
        w!(out, "\n", &blank);
    } else {
        out.push_str(&blank[len..]);
    }
    let wrapped = wrap(right, columns - DESCRIPTION_COLUMN, "  ");
    for (i, line) in wrapped.split('\n').enumerate() {
        if i != 0 {
            w!(out, "\n", &blank);
        }
        out.push_str(line);
    }
}

fn custom_usages(out: &mut String, usages: &[String], columns: usize) {
    for (i, usage) in usages.iter().enumerate() {
        if i == 0 {
            w!(out, &wrap(&format!("Usage: {usage}"), columns, USAGE_PREFIX));
        } else {
            w!(out, "\n       ", &wrap(usage, columns - 7, USAGE_PREFIX));
        }
    }
}

/// `-s, --long=ARG` and friends, without the description.
fn option_line(def: &OptionDef) -> String {
    let mut line = String::from("  ");
    let (metavar, optional) = match &def.kind {
        OptionKind::Valued(spec) => (Some(spec.metavar.as_str()), spec.optional),
        OptionKind::Flag { .. } => (None, false),
    };
    let long = def.long.as_ref().map(|long| {
        if def.is_negatable() { format!("no-{long}") } else { long.clone() }
    });

    match (def.short, long) {
        (Some(short), None) => {
            line.push('-');
            line.push(short);
            for alias in &def.aliases {
                w!(line, ", --", alias);
            }
            if let Some(metavar) = metavar {
                let sep = if def.aliases.is_empty() { "" } else { "=" };
                if optional {
                    w!(line, "[", sep, metavar, "]");
                } else {
                    w!(line, if sep.is_empty() { " " } else { sep }, metavar);
                }
            }
            return line;
        }
        (Some(short), Some(long)) => {
            line.push('-');
            line.push(short);
            w!(line, ", --", &long);
        }
        (None, Some(long)) => w!(line, "    --", &long),
        (None, None) => {}
    }
    for alias in &def.aliases {
        w!(line, ", --", alias);
    }
    if let Some(metavar) = metavar {
        if optional {
            w!(line, "[=", metavar, "]");
        } else {
            w!(line, "=", metavar);
        }
    }
    line
}

#[cold]
pub(crate) fn render_help(schema: &Schema, program: &str) -> String {
    let columns = schema.settings.columns;
    let about = &schema.about;
    let registry = &schema.registry;
    let mut out = String::new();

    if about.usages.is_empty() {
        let mut usage = format!("Usage: {program}");
        if !registry.options().is_empty() {
            usage.push_str(" [options]");
        }
        if registry.arguments().next().is_some() {
            usage.push_str(" [arguments]");
        }
        w!(out, &wrap(&usage, columns, USAGE_PREFIX));
    } else {
        custom_usages(&mut out, &about.usages, columns);
    }
    if let Some(description) = &about.description {
        w!(out, "\n\n", &wrap(description, columns, ""));
    }
    out.push('\n');

    for line in &schema.lines {
        match line {
            Line::Text { text, prefix } => w!(out, "\n", &wrap(text, columns, prefix)),
            Line::Columns(left, right) => {
                out.push('\n');
                columnize(&mut out, &format!("{left}  "), Some(right.as_str()), columns);
            }
            Line::Argument(name) => {
                let Some(def) = registry.argument(name).filter(|def| !def.hidden) else {
                    continue;
                };
                let shown = match (&def.trailing, &def.help) {
                    (Some(_), Some(help)) => help,
                    _ => name,
                };
                out.push('\n');
                columnize(&mut out, &format!("  {shown}  "), def.description.as_deref(), columns);
            }
            Line::Option(idx) => {
                let def = registry.option(*idx);
                if def.hidden {
                    continue;
                }
                out.push('\n');
                let left = format!("{}  ", option_line(def));
                columnize(&mut out, &left, def.description.as_deref(), columns);
            }
        }
    }

    if let Some(email) = &about.email {
        w!(out, "\n\n", &wrap(&format!("Report bugs to <{email}>."), columns, ""));
    }
    out
}

#[cold]
pub(crate) fn render_usage(schema: &Schema, program: &str) -> String {
    let columns = schema.settings.columns;
    if !schema.about.usages.is_empty() {
        let mut out = String::new();
        custom_usages(&mut out, &schema.about.usages, columns);
        return out;
    }

    let options = schema.registry.options();
    let mut usage = format!("Usage: {program}");

    // Short-only options go first: flags grouped, then those taking a value.
    let short_only = options
        .iter()
        .filter(|def| !def.hidden && def.long.is_none() && def.aliases.is_empty());
    let flags: String =
        short_only.clone().filter(|def| def.is_flag()).filter_map(|def| def.short).collect();
    if !flags.is_empty() {
        w!(usage, " [-", &flags, "]");
    }
    for def in short_only {
        let (Some(short), OptionKind::Valued(spec)) = (def.short, &def.kind) else {
            continue;
        };
        usage.push_str(" [-");
        usage.push(short);
        if spec.optional {
            w!(usage, "[", &spec.metavar, "]]");
        } else {
            w!(usage, " ", &spec.metavar, "]");
        }
    }

    for def in options.iter().filter(|def| !def.hidden) {
        if def.long.is_none() && def.aliases.is_empty() {
            continue;
        }
        usage.push_str(" [");
        if let Some(short) = def.short {
            usage.push('-');
            usage.push(short);
            if def.long.is_some() {
                usage.push('|');
            }
        }
        if let Some(long) = &def.long {
            w!(usage, "--", long);
        }
        for alias in &def.aliases {
            w!(usage, "|--", alias);
        }
        match &def.kind {
            OptionKind::Flag { .. } => usage.push(']'),
            OptionKind::Valued(spec) if spec.optional => w!(usage, "[=", &spec.metavar, "]]"),
            OptionKind::Valued(spec) => w!(usage, "=", &spec.metavar, "]"),
        }
    }

    for arg in schema.registry.arguments().filter(|arg| !arg.hidden) {
        w!(usage, " [", &arg.name, "]");
    }
    wrap(&usage, columns, USAGE_PREFIX)
}

pub(crate) fn render_version(schema: &Schema) -> Option<String> {
    let version = schema.about.version.as_deref()?;
    Some(wrap(version, schema.settings.columns, ""))
}

/// Help, usage and version text of the parser or command that handled the input.
///
/// Handed to [`Define::on_end`](crate::Define::on_end) observers, since the parser itself is
/// consumed by parsing.
pub struct Texts<'a> {
    schema: &'a Schema,
    program: &'a str,
}

impl<'a> Texts<'a> {
    pub(crate) fn new(schema: &'a Schema, program: &'a str) -> Self {
        Self { schema, program }
    }

    /// The program name used in messages, `prog cmd` inside a command.
    #[must_use]
    pub fn program(&self) -> &str {
        self.program
    }

    #[must_use]
    pub fn help(&self) -> String {
        render_help(self.schema, self.program)
    }

    #[must_use]
    pub fn usage(&self) -> String {
        render_usage(self.schema, self.program)
    }

    #[must_use]
    pub fn version(&self) -> Option<String> {
        render_version(self.schema)
    }
}

/// The "Try ..." line printed under error messages, if there is help or usage to point at.
pub(crate) fn hint(schema: &Schema, program: &str) -> Option<String> {
    let about = &schema.about;
    let what = match (about.show_help, about.show_usage) {
        (true, true) => format!("'{program} --help' or '{program} --usage'"),
        (true, false) => format!("'{program} --help'"),
        (false, true) => format!("'{program} --usage'"),
        (false, false) => return None,
    };
    Some(format!("Try {what} for more information."))
}
