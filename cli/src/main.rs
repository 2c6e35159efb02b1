//! geovec CLI — driving adapter for the filter expression engine.
//!
//! Subcommands:
//! - `check <filter-file>` — validate a filter expression loads without errors
//! - `fmt <filter-file>` — validate and print the canonical JSON form
//! - `ops` — print the supported operators and their value shapes
//!
//! Filter files are JSON by default; `.yaml`/`.yml` files are read as YAML.

use std::process;

use geovec::Expression;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "fmt" => cmd_fmt(&args[2..]),
        "ops" => cmd_ops(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a filter file path".into());
    }

    load_filter(&args[0])?;
    println!("Filter valid");
    Ok(())
}

fn cmd_fmt(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("fmt requires a filter file path".into());
    }

    let filter = load_filter(&args[0])?;
    let rendered = serde_json::to_string_pretty(&filter.to_json())
        .map_err(|e| format!("could not render filter: {e}"))?;
    println!("{rendered}");
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_ops() -> Result<(), String> {
    println!("Supported operators:");
    for (operation, shape) in geovec::operators() {
        println!("  {operation:<10} value: {shape}");
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn load_filter(path: &str) -> Result<Expression, String> {
    let source =
        std::fs::read_to_string(path).map_err(|e| format!("could not read {path}: {e}"))?;
    parse_filter(&source, is_yaml(path))
}

fn is_yaml(path: &str) -> bool {
    path.ends_with(".yaml") || path.ends_with(".yml")
}

fn parse_filter(source: &str, yaml: bool) -> Result<Expression, String> {
    let value: serde_json::Value = if yaml {
        serde_yaml::from_str(source).map_err(|e| format!("invalid YAML: {e}"))?
    } else {
        serde_json::from_str(source).map_err(|e| format!("invalid JSON: {e}"))?
    };

    Expression::parse(&value).map_err(|e| e.to_string())
}

fn print_usage() {
    eprintln!("geovec — Vector filter expression tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  geovec check <filter-file>   Validate a filter expression");
    eprintln!("  geovec fmt <filter-file>     Print the canonical JSON form");
    eprintln!("  geovec ops                   List supported operators");
}
