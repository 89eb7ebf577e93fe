//! Command-line interface for the throws-clause checker.
//!
//! Usage: throwcheck [--no-infer] [--warn] [--json] FILE...

use std::process::ExitCode;

use throwcheck::{check_source_with_options, CheckOptions};

struct Args {
    options: CheckOptions,
    json: bool,
    files: Vec<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut options = CheckOptions::default();
    let mut json = false;
    let mut files = Vec::new();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-infer" => options.infer = false,
            "--infer" => options.infer = true,
            "--warn" => options.warn_only = true,
            "--json" => json = true,
            "--help" | "-h" => return Err(usage()),
            other if other.starts_with('-') => {
                return Err(format!("unknown option '{other}'\n{}", usage()));
            }
            file => files.push(file.to_string()),
        }
    }

    if files.is_empty() {
        return Err(usage());
    }
    Ok(Args { options, json, files })
}

fn usage() -> String {
    "usage: throwcheck [--no-infer] [--warn] [--json] FILE...".to_string()
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let mut failed = false;
    for file in &args.files {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("throwcheck: cannot read '{file}': {e}");
                failed = true;
                continue;
            }
        };

        let report = check_source_with_options(&source, args.options);
        if args.json {
            println!("{}", report.to_json());
        } else {
            for diagnostic in &report.diagnostics {
                println!("{file}: {diagnostic}");
            }
            for inferred in &report.inferred {
                println!(
                    "{file}: note: inferred clause for '{}': {}",
                    inferred.function, inferred.clause
                );
            }
        }

        failed |= report.has_errors();
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
