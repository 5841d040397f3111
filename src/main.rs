mod cli;

use clap::Parser;
use cli::Cli;
use semantiq::{BuiltinDateParser, Catalog, ClassifyOptions, Record, Value, classify};
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let catalog = Catalog::load(&cli.rule_paths);
    for issue in catalog.issues() {
        log::warn!("{issue}");
    }

    let records = read_records(cli.input.as_deref())?;

    let options = ClassifyOptions {
        confidence_threshold: cli.confidence_threshold,
        stop_on_match: cli.stop_on_match,
        parse_dates: !cli.no_dates,
        ignore_imprecise: !cli.include_imprecise,
        fields: (!cli.fields.is_empty()).then(|| cli.fields.clone()),
        limit: cli.limit,
        contexts: cli.contexts.clone(),
        langs: cli.langs.clone(),
        countries: cli.countries.clone(),
        ..ClassifyOptions::default()
    };

    let report = classify(records, &catalog, &options, &BuiltinDateParser, None).map_err(|e| e.to_string())?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// Read newline-delimited JSON objects from a file, or stdin if none is
/// given. Each line becomes one [`Record`]; blank lines are skipped.
fn read_records(path: Option<&std::path::Path>) -> Result<Vec<Record>, String> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p).map_err(|e| format!("reading {}: {e}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|e| e.to_string())?;
            buf
        }
    };

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let json: serde_json::Value = serde_json::from_str(line).map_err(|e| format!("invalid JSON record: {e}"))?;
            json_to_record(json)
        })
        .collect()
}

fn json_to_record(value: serde_json::Value) -> Result<Record, String> {
    let serde_json::Value::Object(map) = value else {
        return Err("each record must be a JSON object".to_string());
    };
    Ok(map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
}

fn json_to_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() { Value::Int(i) } else { Value::Float(n.as_f64().unwrap_or(f64::NAN)) }
        }
        serde_json::Value::String(s) => Value::Str(s),
        other => Value::Str(other.to_string()),
    }
}
