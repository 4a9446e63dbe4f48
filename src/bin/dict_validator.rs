use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::process::ExitCode;

use datadict::{process_dataset, Dictionary, RawDataset, ValidationContext};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("dict-validator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate tabular data against a data dictionary")
        .arg(
            Arg::new("dictionary")
                .short('d')
                .long("dictionary")
                .value_name("FILE")
                .help("Dictionary definition (JSON)")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("data")
                .short('i')
                .long("data")
                .value_name("FILE")
                .help("Dataset to validate: JSON map of schema name to raw record array")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Only check the dictionary's structural invariants")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Print the report as compact JSON instead of pretty-printed")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let dictionary_path = matches.get_one::<PathBuf>("dictionary").unwrap();
    let check_only = matches.get_flag("check");
    let compact = matches.get_flag("compact");

    match run(
        dictionary_path,
        matches.get_one::<PathBuf>("data"),
        check_only,
        compact,
    ) {
        Ok(valid) => {
            if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(
    dictionary_path: &PathBuf,
    data_path: Option<&PathBuf>,
    check_only: bool,
    compact: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let dictionary: Dictionary = serde_json::from_str(&std::fs::read_to_string(dictionary_path)?)?;
    dictionary.validate_structure()?;
    println!("{dictionary}: structure OK");

    if check_only {
        return Ok(true);
    }

    let Some(data_path) = data_path else {
        return Err("--data is required unless --check is given".into());
    };
    let dataset: RawDataset = serde_json::from_str(&std::fs::read_to_string(data_path)?)?;

    let processed = process_dataset(&dataset, &dictionary, &ValidationContext::new())?;
    let report = if compact {
        serde_json::to_string(&processed.result)?
    } else {
        serde_json::to_string_pretty(&processed.result)?
    };
    println!("{report}");

    Ok(processed.valid)
}
