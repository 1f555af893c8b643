// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! PaCM CLI
//!
//! Gates a model artifact on a policy file, using facts written by the
//! upstream verifier.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pacm::config::Config;
use pacm::facts::FactsFileVerifier;
use pacm::policy::{PolicyEngine, Verdict};
use pacm::PolicyGate;

const HELP: &str = r#"
PaCM - Policy-as-Code for Models

USAGE:
    pacm [OPTIONS] <MODEL> <CERTIFICATE> <POLICY>
    pacm [OPTIONS] -- <MODEL> <CERTIFICATE> <POLICY>
    pacm check <POLICY>

COMMANDS:
    check       Check if policy file is valid

OPTIONS:
    -f, --facts <FILE>    Verifier facts JSON (default: <CERTIFICATE>.facts.json)
        --json            Print the decision as JSON
    -h, --help            Print help information
    -V, --version         Print version information

ENVIRONMENT:
    PACM_LOG_LEVEL        Log level written to stderr (default: warn)
    PACM_LOG_FORMAT       "pretty" or "json" (default: pretty)

EXIT STATUS:
    0 on ALLOW, 1 on DENY or on any policy/verification error, 2 on usage error
"#;

const USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if let Err(e) = init_tracing() {
        eprintln!("Configuration error: {:#}", e);
        return ExitCode::FAILURE;
    }

    if args.len() < 2 {
        eprintln!("{}", HELP);
        return ExitCode::from(USAGE_ERROR);
    }

    match route(&args[1..]) {
        Route::Help => {
            println!("{}", HELP);
            ExitCode::SUCCESS
        }
        Route::Version => {
            println!("pacm {}", pacm::VERSION);
            ExitCode::SUCCESS
        }
        Route::Check(rest) => run_check(rest),
        Route::Evaluate(rest) => run_evaluate(rest),
    }
}

#[derive(Debug, PartialEq)]
enum Route<'a> {
    Help,
    Version,
    Check(&'a [String]),
    Evaluate(&'a [String]),
}

/// Pick the command. A subcommand name only counts when the argument count
/// fits it, so `pacm check <CERTIFICATE> <POLICY>` gates a model named
/// `check`.
fn route(args: &[String]) -> Route<'_> {
    match (args.first().map(String::as_str), args.len()) {
        (Some("-h" | "--help" | "help"), 1) => Route::Help,
        (Some("-V" | "--version" | "version"), 1) => Route::Version,
        (Some("check"), 1 | 2) => Route::Check(&args[1..]),
        _ => Route::Evaluate(args),
    }
}

/// Options of the evaluate command
#[derive(Debug)]
struct EvaluateArgs {
    model: PathBuf,
    certificate: PathBuf,
    policy: PathBuf,
    facts: Option<PathBuf>,
    json: bool,
}

fn parse_evaluate_args(args: &[String]) -> Result<EvaluateArgs, String> {
    let mut positionals = Vec::new();
    let mut facts = None;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            // Everything after `--` is positional.
            "--" => {
                positionals.extend(iter.by_ref().map(PathBuf::from));
                break;
            }
            "-f" | "--facts" => match iter.next() {
                Some(path) => facts = Some(PathBuf::from(path)),
                None => return Err(format!("{} requires a file argument", arg)),
            },
            "--json" => json = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown option: {}", flag))
            }
            _ => positionals.push(PathBuf::from(arg)),
        }
    }

    match <[PathBuf; 3]>::try_from(positionals) {
        Ok([model, certificate, policy]) => Ok(EvaluateArgs {
            model,
            certificate,
            policy,
            facts,
            json,
        }),
        Err(got) => Err(format!(
            "expected <MODEL> <CERTIFICATE> <POLICY>, got {} argument(s)",
            got.len()
        )),
    }
}

fn run_evaluate(args: &[String]) -> ExitCode {
    let args = match parse_evaluate_args(args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: pacm [OPTIONS] <MODEL> <CERTIFICATE> <POLICY>");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    let verifier = match &args.facts {
        Some(path) => FactsFileVerifier::new(path),
        None => FactsFileVerifier::beside_certificate(&args.certificate),
    };

    // The policy is loaded before the verifier runs.
    let result = PolicyGate::from_policy_file(&args.policy, verifier)
        .and_then(|gate| gate.run(&args.model, &args.certificate));

    let decision = match result {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&decision) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to render decision: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", decision);
    }

    match decision.verdict {
        Verdict::Deny => ExitCode::FAILURE,
        Verdict::Allow | Verdict::Warn => ExitCode::SUCCESS,
    }
}

fn run_check(args: &[String]) -> ExitCode {
    let policy_path = match args {
        [path] => Path::new(path),
        _ => {
            eprintln!("Usage: pacm check <POLICY>");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    match PolicyEngine::from_file(policy_path) {
        Ok(engine) => {
            let policy = engine.policy();
            let limit = policy
                .constraints
                .max_parameter_count
                .map(|m| m.to_string())
                .unwrap_or_else(|| "none".to_string());
            println!(
                "OK: Policy file is valid ({} allowed signers, signature required: {}, max parameters: {})",
                engine.signer_count(),
                policy.requirements.signature_required,
                limit
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Policy error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize stderr tracing from `PACM_*` configuration.
///
/// `RUST_LOG` takes precedence over `PACM_LOG_LEVEL`.
fn init_tracing() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid PACM_* environment")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;

    if config.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }
    Ok(())
}
