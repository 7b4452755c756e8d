//! Print what the parser makes of the command line.
//!
//! ```text
//! RUST_LOG=argp=trace cargo run --example echo -- -v -n3 --tags=a,b --no-color x
//! ```
#![allow(clippy::print_stdout)]
use argp::{Argp, Define, OptionDef, Trailing, ValueKind, package_info};
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).compact().init();
}

/// The declarations, `-v, --version` from the package metadata yielding `-v` to `--verbose`.
pub fn cli() -> Result<Argp, argp::DefinitionError> {
    let mut argp = Argp::new();
    argp.package(package_info!())
        .usages(["echo [OPTION]... [ARGUMENT]...", "echo COMMAND [OPTION]... [ARGUMENT]..."])
        .text("Options:")
        .option(OptionDef::flag().short('v').long("verbose").description("Explain more"))?
        .option(
            OptionDef::valued("N")
                .short('n')
                .long("number")
                .kind(ValueKind::Number)
                .description("Any number, hexadecimal and octal included"),
        )?
        .option(
            OptionDef::valued("LIST")
                .long("tags")
                .kind(ValueKind::Array)
                .description("Comma separated values, repeatable"),
        )?
        .option(OptionDef::flag().long("color").negatable().description("Print without colors"))?
        .help()?
        .usage()?
        .text("")
        .text_columns("RUST_LOG", "Tracing filter, e.g. argp=trace")
        .allow_undefined_options()
        .allow_undefined_arguments();

    argp.command("build", Some(Trailing::new().max(8)))?
        .description("Collect up to eight free arguments.")
        .option(OptionDef::valued("N").short('j').long("jobs").kind(ValueKind::Number))?
        .help()?
        .on_end(|matches, texts| {
            tracing::debug!(program = texts.program(), entries = matches.len(), "parsed");
            Ok(())
        });
    Ok(argp)
}

fn main() {
    init_tracing();
    let argp = match cli() {
        Ok(argp) => argp,
        Err(err) => panic!("invalid declarations: {err}"),
    };
    for (key, value) in argp.parse() {
        println!("{key} = {value}");
    }
}
