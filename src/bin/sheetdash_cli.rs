//! CLI tool for sheetdash - indexes a sheet payload and outputs JSON
//!
//! Usage:
//!   sheetdash_cli <sheet.json>                          # Indexed rows as JSON
//!   sheetdash_cli <sheet.json> --group-by COL --sum COL # Rollup as JSON

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use sheetdash::indexer::index;
use sheetdash::rollup::{number_of, rollup, text_of};
use sheetdash::RawSheet;

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: sheetdash_cli <sheet.json> [--group-by COL --sum COL]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let group_by = flag(&args, "--group-by");
    let sum_col = flag(&args, "--sum");

    // Read input file
    let text = match fs::read_to_string(input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    // Decode and index
    let sheet = match RawSheet::from_json(input_path, &text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error decoding sheet: {}", e);
            std::process::exit(1);
        }
    };
    let rows = index(&sheet);
    eprintln!("Indexed {} row(s) over {} column(s)", rows.len(), sheet.columns.len());

    // Serialize to JSON
    let json = match (group_by, sum_col) {
        (Some(group), Some(value)) => {
            let result = rollup(
                &rows,
                |r| !r.is_blank(),
                |r| text_of(r, &[group]),
                |r| number_of(r, &[value]),
            );
            serde_json::to_string_pretty(&result)
        }
        (None, None) => serde_json::to_string_pretty(&rows),
        _ => {
            eprintln!("--group-by and --sum must be given together");
            std::process::exit(1);
        }
    };
    let json = match json {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    io::stdout().write_all(json.as_bytes()).unwrap();
    println!();
}
