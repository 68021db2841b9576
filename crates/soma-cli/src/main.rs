//! Standalone SOMA interpreter (SPEC_FULL §6.1). Reads source from a file
//! path argument or, absent one, from stdin; writes program output to
//! stdout and a one-line diagnostic to stderr on any lex/parse/runtime
//! error. `--test` switches to the test-runner mode of §6.3 instead of
//! running a program directly.

use std::io::Read as _;
use std::process::ExitCode;
use std::{env, fs};

use soma::{Diagnostic, Vm};

mod test_runner;

struct Args {
    /// File to run, or `--test` target. `None` means "read stdin".
    path: Option<String>,
    no_stdlib: bool,
    verbosity: u8,
    test_mode: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut path = None;
    let mut no_stdlib = false;
    let mut verbosity = 0u8;
    let mut test_mode = false;

    let mut argv = env::args().skip(1);
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--no-stdlib" => no_stdlib = true,
            "-v" | "--verbose" => verbosity += 1,
            "--test" => {
                test_mode = true;
                path = Some(argv.next().ok_or("--test requires a file or directory argument")?);
            }
            other if path.is_none() => path = Some(other.to_owned()),
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }
    Ok(Args { path, no_stdlib, verbosity, test_mode })
}

fn init_logging(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "soma_cli=warn",
        1 => "soma_cli=info",
        _ => "soma_cli=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SOMA_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: Option<&str>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|err| format!("reading '{path}': {err}")),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|err| format!("reading stdin: {err}"))?;
            Ok(buf)
        }
    }
}

fn no_stdlib_requested(flag: bool) -> bool {
    flag || env::var_os("SOMA_NO_STDLIB").is_some()
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("soma: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(args.verbosity);

    if args.test_mode {
        let Some(target) = args.path.as_deref() else {
            eprintln!("soma: --test requires a file or directory argument");
            return ExitCode::FAILURE;
        };
        return test_runner::run(target, no_stdlib_requested(args.no_stdlib));
    }

    let source = match read_source(args.path.as_deref()) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("soma: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut vm = Vm::new();
    if !no_stdlib_requested(args.no_stdlib)
        && let Err(err) = vm.load_stdlib()
    {
        eprintln!("{}", Diagnostic::from(&err));
        return ExitCode::FAILURE;
    }

    match vm.exec_source(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", Diagnostic::from(&err));
            ExitCode::FAILURE
        }
    }
}
