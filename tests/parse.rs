use argp::{
    Argp, ArgumentDef, Define, Error, ErrorKind, Flow, Matches, OptionDef, Trailing, Value,
    ValueKind,
};
use expect_test::{Expect, expect};

fn run(argp: Argp, args: &[&str]) -> Result<Matches, Error> {
    argp.try_parse_from(std::iter::once("prog").chain(args.iter().copied()))
}

#[track_caller]
fn check(argp: Argp, args: &[&str], expect: Expect) {
    let got = run(argp, args).unwrap();
    expect.assert_eq(&got.to_string());
}

#[track_caller]
fn check_err(argp: Argp, args: &[&str], expect: Expect) {
    let err = run(argp, args).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    expect.assert_eq(&err.render());
}

#[track_caller]
fn check_display(argp: Argp, args: &[&str], expect: Expect) {
    let err = run(argp, args).unwrap_err();
    assert!(err.is_display());
    assert_eq!(err.exit_code(), 0);
    expect.assert_eq(&format!("{}\n", err.render()));
}

/// `-a/--alpha`, `--beta=N` and the argument `file`.
fn scenario() -> Argp {
    let mut argp = Argp::new();
    argp.option(OptionDef::flag().short('a').long("alpha"))
        .unwrap()
        .option(OptionDef::valued("N").long("beta").kind(ValueKind::Number))
        .unwrap()
        .argument("file")
        .unwrap();
    argp
}

fn documented() -> Argp {
    let mut argp = Argp::new();
    argp.description("Frobnicate the given files.")
        .email("bugs@example.com")
        .text("Options:")
        .option(OptionDef::flag().short('a').long("alpha").description("Enable alpha"))
        .unwrap()
        .option(OptionDef::valued("N").long("beta").kind(ValueKind::Number).description(
            "Beta level, which controls how many times the frobnicator runs before giving up",
        ))
        .unwrap()
        .option(OptionDef::flag().long("color").negatable().description("Disable colors"))
        .unwrap()
        .option(
            OptionDef::valued("FILE")
                .short('o')
                .long("output")
                .alias("out")
                .optional()
                .description("Write to FILE"),
        )
        .unwrap()
        .option(OptionDef::flag().short('q').description("Be quiet"))
        .unwrap()
        .option(OptionDef::valued("N").short('j'))
        .unwrap()
        .option(OptionDef::flag().short('x').hidden())
        .unwrap()
        .help()
        .unwrap()
        .usage()
        .unwrap()
        .version("v1.0.0")
        .unwrap()
        .text("Arguments:")
        .argument(ArgumentDef::new("file").description("Input file"))
        .unwrap()
        .text_columns("RUST_LOG", "Log filter");
    argp
}

#[test]
fn argv0() {
    let err = Argp::new().try_parse_from(None::<&str>).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingArg0);
    expect!["missing executable argument (argv[0])"].assert_eq(&err.render());
}

#[test]
fn basic() {
    check(scenario(), &[], expect!["{ alpha: false, beta: 0, file: false }"]);
    check(
        scenario(),
        &["-a", "--beta", "5", "file"],
        expect!["{ alpha: true, beta: 5, file: true }"],
    );
    check(
        scenario(),
        &["file", "--beta=-1.5"],
        expect!["{ alpha: false, beta: -1.5, file: true }"],
    );

    check_err(scenario(), &["--beta"], expect!["prog: Option '--beta' requires an argument."]);
    check_err(scenario(), &["--beta", "x"], expect!["prog: Option 'beta' is not a Number."]);
    check_err(scenario(), &["--gamma"], expect!["prog: Unrecognized option '--gamma'."]);
    check_err(scenario(), &["--=5"], expect!["prog: Unrecognized option '--=5'."]);
    check_err(scenario(), &["-x"], expect!["prog: Unrecognized option '-x'."]);
    check_err(scenario(), &["other"], expect!["prog: Unrecognized argument 'other'."]);
    check_err(scenario(), &["-"], expect!["prog: Unrecognized argument '-'."]);
    check_err(
        scenario(),
        &["--alpha=1"],
        expect!["prog: Option '--alpha' does not require an argument."],
    );
    check_err(
        scenario(),
        &["--alpha="],
        expect!["prog: Option '--alpha' does not require an argument."],
    );
}

#[test]
fn inline_and_separate_values() {
    for (inline, separate) in [("--beta=5", ["--beta", "5"]), ("--beta=0x10", ["--beta", "16"])] {
        assert_eq!(run(scenario(), &[inline]).unwrap(), run(scenario(), &separate).unwrap());
    }
}

#[test]
fn abbreviations() {
    assert_eq!(run(scenario(), &["--al"]).unwrap(), run(scenario(), &["--alpha"]).unwrap());
    check(scenario(), &["--b", "7"], expect!["{ alpha: false, beta: 7, file: false }"]);

    let ambiguous = || {
        let mut argp = Argp::new();
        argp.option(OptionDef::flag().long("build"))
            .unwrap()
            .option(OptionDef::valued("DIR").long("builder"))
            .unwrap();
        argp
    };
    check_err(ambiguous(), &["--bu"], expect!["prog: Option '--bu' is ambiguous."]);
    check(ambiguous(), &["--build"], expect!["{ build: true, builder: null }"]);
    check(ambiguous(), &["--builde=x"], expect![[r#"{ build: false, builder: "x" }"#]]);
    // Negation only considers flags.
    check(ambiguous(), &["--no-bu"], expect!["{ build: false, builder: null }"]);
}

#[test]
fn short_clusters() {
    let flags = || {
        let mut argp = Argp::new();
        for c in ['a', 'b', 'c'] {
            argp.option(OptionDef::flag().short(c)).unwrap();
        }
        argp
    };
    check(flags(), &["-abc"], expect!["{ a: true, b: true, c: true }"]);
    assert_eq!(run(flags(), &["-abc"]).unwrap(), run(flags(), &["-a", "-b", "-c"]).unwrap());
    check_err(flags(), &["-abd"], expect!["prog: Unrecognized option '-d'."]);

    let valued = || {
        let mut argp = Argp::new();
        argp.option(OptionDef::flag().short('v'))
            .unwrap()
            .option(OptionDef::valued("FILE").short('o'))
            .unwrap()
            .option(OptionDef::valued("N").short('n').optional().kind(ValueKind::Number))
            .unwrap();
        argp
    };
    check(valued(), &[], expect!["{ v: false, o: null, n: 0 }"]);
    check(valued(), &["-ofile"], expect![[r#"{ v: false, o: "file", n: 0 }"#]]);
    check(valued(), &["-vo", "file"], expect![[r#"{ v: true, o: "file", n: 0 }"#]]);
    check(valued(), &["-o", "-"], expect![[r#"{ v: false, o: "-", n: 0 }"#]]);
    check(valued(), &["-n5"], expect!["{ v: false, o: null, n: 5 }"]);
    check(valued(), &["-nv"], expect!["{ v: true, o: null, n: 0 }"]);
    check(valued(), &["-n"], expect!["{ v: false, o: null, n: 0 }"]);
    check_err(valued(), &["-o"], expect!["prog: Option '-o' requires an argument."]);
    check_err(valued(), &["-ov"], expect!["prog: Option '-o' requires an argument."]);
    check_err(valued(), &["-vofile"], expect!["prog: Option '-o' requires an argument."]);
    check_err(valued(), &["-o", "-v"], expect!["prog: Option '-o' requires an argument."]);
}

#[test]
fn hyphen_values() {
    let cli = || {
        let mut argp = Argp::new();
        argp.option(OptionDef::valued("N").long("num").kind(ValueKind::Number))
            .unwrap()
            .option(OptionDef::valued("L").long("list").kind(ValueKind::Array))
            .unwrap()
            .option(OptionDef::valued("S").long("str"))
            .unwrap();
        argp
    };
    check(cli(), &["--num", "-12.34"], expect!["{ num: -12.34, list: [], str: null }"]);
    check(cli(), &["--list", "-1,x"], expect![[r#"{ num: 0, list: [-1, "x"], str: null }"#]]);
    check(cli(), &["--str", "-"], expect![[r#"{ num: 0, list: [], str: "-" }"#]]);
    check_err(cli(), &["--str", "-x"], expect!["prog: Option '--str' requires an argument."]);
}

#[test]
fn separator() {
    let mut argp = Argp::new();
    argp.option(OptionDef::flag().long("k")).unwrap();
    check(argp, &["--", "--k", "l"], expect![[r#"{ k: false, "--k": true, l: true }"#]]);

    check_err(
        scenario(),
        &["--beta", "--"],
        expect!["prog: Option '--beta' requires an argument."],
    );
}

#[test]
fn negation() {
    let cli = || {
        let mut argp = Argp::new();
        argp.option(OptionDef::flag().short('e').long("e").negatable())
            .unwrap()
            .option(OptionDef::flag().long("plain"))
            .unwrap()
            .option(OptionDef::valued("V").long("val"))
            .unwrap();
        argp
    };
    check(cli(), &[], expect!["{ e: true, plain: false, val: null }"]);
    check(cli(), &["--no-e"], expect!["{ e: false, plain: false, val: null }"]);
    check(cli(), &["--e"], expect!["{ e: true, plain: false, val: null }"]);
    check(cli(), &["-e"], expect!["{ e: false, plain: false, val: null }"]);
    check(cli(), &["--plain", "--no-plain"], expect!["{ e: true, plain: true, val: null }"]);
    check_err(cli(), &["--no-val"], expect!["prog: Unrecognized option '--no-val'."]);
    check_err(cli(), &["--no-x"], expect!["prog: Unrecognized option '--no-x'."]);

    // A long name starting with `no-` is taken as is.
    let mut argp = Argp::new();
    argp.option(OptionDef::flag().long("no-cache")).unwrap();
    check(argp, &["--no-cache"], expect![[r#"{ "no-cache": true }"#]]);
}

#[test]
fn arrays() {
    let mut argp = Argp::new();
    argp.option(OptionDef::valued("TAGS").long("tags").kind(ValueKind::Array)).unwrap();
    check(
        argp,
        &["--tags=a,b", "--tags=c", "--tags", "1,true,null"],
        expect![[r#"{ tags: ["a", "b", "c", 1, true, null] }"#]],
    );
}

#[test]
fn values() {
    let cli = || {
        let mut argp = Argp::new();
        argp.option(OptionDef::valued("LEVEL").long("level").choices(["low", "high"]))
            .unwrap()
            .option(
                OptionDef::valued("N")
                    .long("scale")
                    .kind(ValueKind::Number)
                    .reviver(|v| Value::Number(v.as_f64().unwrap_or_default() * 100.0)),
            )
            .unwrap()
            .option(OptionDef::valued("DIR").long("dir").optional().default_value("/tmp"))
            .unwrap()
            .option(OptionDef::valued("B").long("bool").kind(ValueKind::Boolean))
            .unwrap();
        argp
    };
    check(cli(), &[], expect![[r#"{ level: null, scale: 0, dir: "/tmp", bool: false }"#]]);
    check(
        cli(),
        &["--level", "high", "--scale=0.5", "--dir", "--bool=true"],
        expect![[r#"{ level: "high", scale: 50, dir: "/tmp", bool: true }"#]],
    );
    check(
        cli(),
        &["--dir=", "--dir", "x"],
        expect![[r#"{ level: null, scale: 0, dir: "x", bool: false }"#]],
    );
    check_err(cli(), &["--level=mid"], expect!["prog: Unrecognized choice 'mid'."]);
    check_err(cli(), &["--bool", "yes"], expect!["prog: Option 'bool' is not a Boolean."]);
}

#[test]
fn pending_value_and_argument() {
    // `arg` is declared, so it does not become the value of `--beta`.
    let mut argp = scenario();
    argp.argument("arg").unwrap();
    check(
        argp,
        &["--beta", "arg", "1"],
        expect!["{ alpha: false, beta: 1, file: false, arg: true }"],
    );
}

#[test]
fn undefined() {
    let mut argp = Argp::new();
    argp.allow_undefined_options().allow_undefined_arguments();
    check(
        argp,
        &["--foo", "bar", "-x", "--n=3", "--e=", "--no-q", "free", "-"],
        expect![[r#"{ foo: "bar", x: true, n: 3, e: null, q: false, free: true, "-": true }"#]],
    );

    let mut argp = Argp::new();
    argp.allow_undefined_options();
    check(argp, &["-ab", "1"], expect!["{ a: true, b: 1 }"]);

    let mut argp = Argp::new();
    argp.allow_undefined_options();
    check_err(argp, &["--="], expect!["prog: Unrecognized option '--='."]);
}

#[test]
fn observers() {
    let cli = || {
        let mut argp = scenario();
        argp.allow_undefined_arguments()
            .on_start(|m| {
                m.insert("started", true);
            })
            .on_option(|m, key, value, long| {
                if key != "beta" {
                    return Ok(Flow::Continue);
                }
                m.insert("beta_long", long);
                m.insert("beta_twice", value.as_f64().unwrap_or_default() * 2.0);
                Ok(Flow::Suppress)
            })
            .on_argument(|_, name| {
                if name == "bad" {
                    return Err(Error::custom("'bad' is not allowed"));
                }
                Ok(Flow::Continue)
            });
        argp
    };
    check(
        cli(),
        &["--beta", "4", "-a", "x"],
        expect!["{ alpha: true, beta: 0, file: false, started: true, beta_long: true, beta_twice: 8, x: true }"],
    );
    check_err(cli(), &["bad"], expect!["prog: 'bad' is not allowed."]);
}

#[test]
fn sort() {
    let cli = |sort: bool| {
        let mut argp = scenario();
        argp.on_argument(|m, _| {
            let seen = m.flag("alpha");
            m.insert("alpha_seen", seen);
            Ok(Flow::Continue)
        });
        if sort {
            argp.sort();
        }
        argp
    };
    check(
        cli(false),
        &["file", "-a"],
        expect!["{ alpha: true, beta: 0, file: true, alpha_seen: false }"],
    );
    check(
        cli(true),
        &["file", "-a"],
        expect!["{ alpha: true, beta: 0, file: true, alpha_seen: true }"],
    );
}

#[test]
fn help() {
    check_display(
        documented(),
        &["--help"],
        expect![[r#"
            Usage: prog [options] [arguments]

            Frobnicate the given files.

            Options:
              -a, --alpha                 Enable alpha
                  --beta=N                Beta level, which controls how many times the
                                            frobnicator runs before giving up
                  --no-color              Disable colors
              -o, --output, --out[=FILE]  Write to FILE
              -q                          Be quiet
              -j N
              -h, --help                  Display this help message and exit
                  --usage                 Display a short usage message and exit
              -v, --version               Output version information and exit
            Arguments:
              file                        Input file
              RUST_LOG                    Log filter

            Report bugs to <bugs@example.com>.
        "#]],
    );
    let mut argp = documented();
    argp.program("frob");
    assert!(argp.help_text().starts_with("Usage: frob [options] [arguments]\n"));
}

#[test]
fn usage() {
    check_display(
        documented(),
        &["-a", "--usage", "--zzz"],
        expect![[r#"
            Usage: prog [-q] [-j N] [-a|--alpha] [--beta=N] [--color]
                     [-o|--output|--out[=FILE]] [-h|--help] [--usage] [-v|--version] [file]
        "#]],
    );

    let mut argp = documented();
    argp.columns(40);
    check_display(
        argp,
        &["--u"],
        expect![[r#"
            Usage: prog [-q] [-j N] [-a|--alpha]
                     [--beta=N] [--color]
                     [-o|--output|--out[=FILE]]
                     [-h|--help] [--usage]
                     [-v|--version] [file]
        "#]],
    );

    let mut argp = Argp::new();
    argp.usages(["prog [OPTION]... FILE", "prog --list"]).usage().unwrap();
    check_display(
        argp,
        &["--usage"],
        expect![[r#"
            Usage: prog [OPTION]... FILE
                   prog --list
        "#]],
    );
}

#[test]
fn version() {
    check_display(documented(), &["-v"], expect![[r#"
        v1.0.0
    "#]]);
    check_display(documented(), &["--vers"], expect![[r#"
        v1.0.0
    "#]]);
    assert_eq!(documented().version_text().as_deref(), Some("v1.0.0"));
    assert_eq!(scenario().version_text(), None);
}

#[test]
fn hint() {
    check_err(
        documented(),
        &["--zzz"],
        expect!["prog: Unrecognized option '--zzz'.\nTry 'prog --help' or 'prog --usage' for more information."],
    );

    let mut argp = scenario();
    argp.help_long_only().unwrap();
    check_err(
        argp,
        &["-z"],
        expect!["prog: Unrecognized option '-z'.\nTry 'prog --help' for more information."],
    );
}

fn with_commands() -> Argp {
    let mut argp = Argp::new();
    argp.option(OptionDef::flag().short('a').long("all")).unwrap().help().unwrap();
    argp.command("build", Some(Trailing::new().min(1).max(3)))
        .unwrap()
        .option(OptionDef::flag().short('r').long("release"))
        .unwrap();
    argp.command("install", None)
        .unwrap()
        .argument(ArgumentDef::new("pkgs").trailing(Trailing::new().exactly(2)).help("pkgs PKG..."))
        .unwrap()
        .usage()
        .unwrap();
    argp
}

#[test]
fn commands() {
    check(with_commands(), &["-a"], expect!["{ all: true, help: false }"]);
    check(
        with_commands(),
        &["build", "x", "y"],
        expect![[r#"{ build: ["x", "y"], release: false }"#]],
    );
    check(
        with_commands(),
        &["build", "-r", "1", "x"],
        expect![[r#"{ build: [1, "x"], release: true }"#]],
    );
    check(
        with_commands(),
        &["install", "pkgs", "a", "b"],
        expect![[r#"{ install: [], usage: false, pkgs: ["a", "b"] }"#]],
    );

    check_err(
        with_commands(),
        &["build"],
        expect!["prog build: Command 'build' expects minimum 1 argument/s.\nTry 'prog --help' for more information."],
    );
    check_err(
        with_commands(),
        &["build", "a", "b", "c", "d"],
        expect!["prog build: Unrecognized argument 'd'.\nTry 'prog --help' for more information."],
    );
    check_err(
        with_commands(),
        &["install", "pkgs", "a"],
        expect!["prog install: Command 'pkgs' expects 2 argument/s.\nTry 'prog install --usage' for more information."],
    );
    // Only the first token selects a command.
    check_err(with_commands(), &["-a", "build"], expect![
        "prog: Unrecognized argument 'build'.\nTry 'prog --help' for more information."
    ]);

    check_display(with_commands(), &["install", "--usage"], expect![[r#"
        Usage: prog install [--usage] [pkgs]
    "#]]);
}

#[test]
fn end_observer() {
    let mut argp = scenario();
    argp.on_end(|m, texts| {
        m.insert("usage", texts.usage());
        m.insert("version", texts.version().map_or(Value::Null, Value::from));
        Ok(())
    });
    check(
        argp,
        &["-a"],
        expect![[r#"{ alpha: true, beta: 0, file: false, usage: "Usage: prog [-a|--alpha] [--beta=N] [file]", version: null }"#]],
    );

    let cli = || {
        let mut argp = Argp::new();
        argp.command("run", None)
            .unwrap()
            .option(OptionDef::flag().long("dry"))
            .unwrap()
            .version("v2.0.0")
            .unwrap()
            .on_end(|m, texts| {
                if !m.flag("dry") {
                    return Err(Error::custom(format!("use '{} --dry' first", texts.program())));
                }
                m.insert("program", texts.program());
                m.insert("text", texts.version().unwrap_or_default());
                Ok(())
            });
        argp
    };
    check(
        cli(),
        &["run", "--dry"],
        expect![[r#"{ run: [], dry: true, version: false, program: "prog run", text: "v2.0.0" }"#]],
    );
    check_err(cli(), &["run"], expect!["prog run: use 'prog run --dry' first."]);
}

#[test]
fn trailing_outside_command() {
    let mut argp = Argp::new();
    let err = argp.argument(ArgumentDef::new("rest").trailing(Trailing::new())).err().unwrap();
    expect!["invalid trailing arguments: trailing arguments are only available inside commands"]
        .assert_eq(&err.to_string());
}

#[cfg(feature = "serde")]
#[test]
fn serialize() {
    let matches = run(scenario(), &["--beta=2", "file"]).unwrap();
    assert_eq!(
        serde_json::to_string(&matches).unwrap(),
        r#"{"alpha":false,"beta":2.0,"file":true}"#
    );
}
