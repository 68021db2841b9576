//! `soma --test <file-or-dir>`: the minimal test-runner mode of spec.md §6,
//! driving the `.soma` test-file format documented in SPEC_FULL §6.3.
//!
//! Each test block is plain SOMA source, run against a fresh `Vm`, with its
//! directive comments pulled out of the stream before parsing:
//!
//! ```text
//! ) TEST: <description>
//! ) EXPECT_AL: [v1, v2, ...]
//! ) EXPECT_OUTPUT: <line>
//! ```

use std::path::Path;
use std::process::ExitCode;

use soma::{CollectStringPrint, Diagnostic, Value, Vm};

struct TestCase {
    description: String,
    source: String,
    expect_al: Vec<String>,
    expect_output: Vec<String>,
}

/// Splits `text` on blank lines into test blocks, keeping only blocks that
/// contain a `) TEST:` directive (stray prose or a leading file comment is
/// ignored).
fn split_cases(text: &str) -> Vec<TestCase> {
    let mut cases = Vec::new();
    let mut block_lines: Vec<&str> = Vec::new();

    let mut flush = |block_lines: &mut Vec<&str>| {
        if let Some(case) = parse_case(block_lines) {
            cases.push(case);
        }
        block_lines.clear();
    };

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut block_lines);
        } else {
            block_lines.push(line);
        }
    }
    flush(&mut block_lines);
    cases
}

fn parse_case(lines: &[&str]) -> Option<TestCase> {
    let mut description = None;
    let mut expect_al = None;
    let mut expect_output = Vec::new();
    let mut source_lines = Vec::new();

    for line in lines {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(") TEST:") {
            description = Some(rest.trim().to_owned());
        } else if let Some(rest) = trimmed.strip_prefix(") EXPECT_AL:") {
            expect_al = Some(parse_expect_al(rest.trim()));
        } else if let Some(rest) = trimmed.strip_prefix(") EXPECT_OUTPUT:") {
            expect_output.push(rest.trim().to_owned());
        } else {
            source_lines.push(*line);
        }
    }

    let description = description?;
    let expect_al = expect_al.unwrap_or_default();
    Some(TestCase { description, source: source_lines.join("\n"), expect_al, expect_output })
}

/// `[v1, v2, ...]` -> the comma-separated canonical-form tokens inside the
/// brackets, `[]` (or missing brackets) parsing as an empty expectation.
fn parse_expect_al(raw: &str) -> Vec<String> {
    let inner = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(raw);
    let inner = inner.trim();
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(|s| s.trim().to_owned()).collect()
}

fn actual_al(vm: &Vm) -> Vec<String> {
    vm.al().as_slice().iter().skip(1).map(Value::to_canonical_string).collect()
}

fn run_case(case: &TestCase, no_stdlib: bool) -> Result<(), String> {
    let writer = CollectStringPrint::new();
    let handle = writer.handle();
    let mut vm = Vm::new().with_output(Box::new(writer));
    if !no_stdlib {
        vm.load_stdlib().map_err(|err| format!("stdlib failed to load: {}", Diagnostic::from(&err)))?;
    }
    vm.exec_source(&case.source).map_err(|err| Diagnostic::from(&err).to_string())?;

    let al = actual_al(&vm);
    if al != case.expect_al {
        return Err(format!("AL mismatch: expected {:?}, got {:?}", case.expect_al, al));
    }
    let output = handle.borrow().clone();
    if output != case.expect_output {
        return Err(format!("output mismatch: expected {:?}, got {:?}", case.expect_output, output));
    }
    Ok(())
}

fn collect_soma_files(target: &Path, out: &mut Vec<std::path::PathBuf>) -> std::io::Result<()> {
    if target.is_dir() {
        let mut entries: Vec<_> = std::fs::read_dir(target)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(std::fs::DirEntry::path);
        for entry in entries {
            collect_soma_files(&entry.path(), out)?;
        }
    } else if target.extension().is_some_and(|ext| ext == "soma") {
        out.push(target.to_owned());
    }
    Ok(())
}

pub fn run(target: &str, no_stdlib: bool) -> ExitCode {
    let path = Path::new(target);
    let mut files = Vec::new();
    if let Err(err) = collect_soma_files(path, &mut files) {
        eprintln!("soma --test: reading '{target}': {err}");
        return ExitCode::FAILURE;
    }
    if path.is_file() && files.is_empty() {
        files.push(path.to_owned());
    }

    let mut total = 0usize;
    let mut failed = 0usize;
    for file in &files {
        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("soma --test: reading {}: {err}", file.display());
                failed += 1;
                continue;
            }
        };
        for case in split_cases(&text) {
            total += 1;
            match run_case(&case, no_stdlib) {
                Ok(()) => println!("ok   {} - {}", file.display(), case.description),
                Err(reason) => {
                    failed += 1;
                    println!("FAIL {} - {}: {reason}", file.display(), case.description);
                }
            }
        }
    }

    println!("{} tests, {} failed", total, failed);
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
