use std::env;
use std::fs;
use std::process;

use studio_builder::validator::validate_form;
use studio_builder::{
    recover_contract, render_contract, BuilderConfig, BuilderError, FormModel, RecoverySource,
};
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("Usage: studio-contract [--config <builder.yaml>] <command> <file>...");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  render <form.yaml>       print the contract HTML for a form");
    eprintln!("  recover <doc.html>       print the form recovered from a contract as YAML");
    eprintln!("  check <doc.html>...      report how each contract would be recovered");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  studio-contract render demos/forms/studio.yaml > contract.html");
    eprintln!("  studio-contract check contracts/*.html");
    process::exit(2);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config = BuilderConfig::default();
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            usage();
        }
        let path = args[1].clone();
        args.drain(..2);
        config = match BuilderConfig::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ {} is not a valid builder config:", path);
                print_error(&e);
                process::exit(1);
            }
        };
    }

    let Some((command, files)) = args.split_first() else {
        usage();
    };
    if files.is_empty() {
        usage();
    }

    let exit_code = match command.as_str() {
        "render" => single(files, |path| render_file(path, &config)),
        "recover" => single(files, |path| recover_file(path, &config)),
        "check" => check_files(files, &config),
        _ => usage(),
    };
    process::exit(exit_code);
}

fn single(files: &[String], run: impl Fn(&str) -> Result<String, BuilderError>) -> i32 {
    let [path] = files else {
        usage();
    };
    match run(path.as_str()) {
        Ok(out) => {
            print!("{}", out);
            0
        }
        Err(e) => {
            eprintln!("✗ {} failed:", path);
            print_error(&e);
            1
        }
    }
}

fn read(path: &str) -> Result<String, BuilderError> {
    fs::read_to_string(path).map_err(|e| BuilderError::Io(format!("Failed to read {}: {}", path, e)))
}

fn render_file(path: &str, config: &BuilderConfig) -> Result<String, BuilderError> {
    let mut form: FormModel = serde_yaml::from_str(&read(path)?)?;
    // Hand-written forms may leave `order` out of step with list position.
    let sections = std::mem::take(&mut form.sections);
    form.set_sections(sections);
    validate_form(&form)?;
    Ok(render_contract(&form, config))
}

fn recover_file(path: &str, config: &BuilderConfig) -> Result<String, BuilderError> {
    let (form, recovery) = recover_contract(&read(path)?, config);
    for warning in &recovery.warnings {
        eprintln!("  warning: {}", warning);
    }
    Ok(serde_yaml::to_string(&form)?)
}

/// One line per document. Exit code 1 if any document could not be read or its sections had to
/// be substituted.
fn check_files(files: &[String], config: &BuilderConfig) -> i32 {
    let mut exit_code = 0;
    for path in files {
        let html = match read(path) {
            Ok(html) => html,
            Err(e) => {
                eprintln!("✗ {} could not be checked:", path);
                print_error(&e);
                exit_code = 1;
                continue;
            }
        };
        let (form, recovery) = recover_contract(&html, config);
        if recovery.is_degraded() {
            println!("✗ {} degraded ({})", path, recovery.source);
            exit_code = 1;
        } else {
            let how = match recovery.source {
                RecoverySource::DataIsland => "exact",
                RecoverySource::Markup | RecoverySource::Fallback => "heuristic",
            };
            println!(
                "✓ {} recovered from {} ({}, {} sections)",
                path,
                recovery.source,
                how,
                form.sections.len()
            );
        }
        for warning in &recovery.warnings {
            println!("    {}", warning);
        }
    }
    exit_code
}

fn print_error(error: &BuilderError) {
    match error {
        BuilderError::InvalidMarker { token } => {
            eprintln!("  Invalid marker '{}':", token);
            eprintln!("    Markers must be {{{{lower_snake_case}}}}");
        }
        BuilderError::DuplicateId { id } => {
            eprintln!("  Duplicate section id '{}'", id);
        }
        BuilderError::Config(msg) => {
            eprintln!("  Configuration error:");
            eprintln!("    {}", msg);
        }
        BuilderError::Yaml(msg) => {
            eprintln!("  YAML error:");
            eprintln!("    {}", msg);
        }
        BuilderError::Io(msg) => {
            eprintln!("  I/O error:");
            eprintln!("    {}", msg);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
