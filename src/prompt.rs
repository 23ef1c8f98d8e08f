//! Interactive terminal session: pick a workbook, a sheet, the header names and the visit date.

use std::path::PathBuf;

use anyhow::Result;
use dialoguer::{Input, Select};
use tracing::warn;

use crate::config::Config;
use crate::roster::{parse_cutoff, HeaderSpec, RosterError};
use crate::scanner::scan_sheet;
use crate::workbook::{Workbook, WorkbookError};

pub fn run_interactive(config: &Config) -> Result<()> {
    println!("\n=== Site staff changes ===\n");

    let mut workbook = ask_workbook()?;
    let sheet_name = ask_sheet(&workbook)?;
    println!("\nSelected sheet: {sheet_name}");
    let sheet = workbook.sheet(Some(&sheet_name))?;

    let defaults = config.header_spec();
    let headers = HeaderSpec {
        start: ask_header("Column name for 'Start Date'", &defaults.start)?,
        end: ask_header("Column name for 'End Date'", &defaults.end)?,
        participant: ask_header("Column name for 'Participants'", &defaults.participant)?,
        function: ask_header("Column name for 'Function'", &defaults.function)?,
    };
    let cutoff_text: String = Input::new()
        .with_prompt("Date of the last monitoring visit / initiation (DD.MM.YYYY)")
        .validate_with(|input: &String| -> Result<(), String> {
            parse_cutoff(input.trim())
                .map(|_| ())
                .map_err(|_| "Invalid format, please use DD.MM.YYYY".to_string())
        })
        .interact_text()?;

    match scan_sheet(&sheet, cutoff_text.trim(), &headers, &config.report_options()) {
        Ok(outcome) => println!("\n{}", outcome.report),
        Err(err @ RosterError::MissingColumns(_)) => {
            println!("\nNot all required columns were found, please check the column names.");
            println!("{err}");
        }
        Err(err) => return Err(err.into()),
    }

    println!("\n=== Done ===\n");
    Ok(())
}

fn ask_workbook() -> Result<Workbook> {
    loop {
        let raw: String = Input::new()
            .with_prompt("Path to the Excel file")
            .interact_text()?;
        let path = PathBuf::from(raw.trim());
        if !path.is_file() {
            println!("File not found, please try again.");
            continue;
        }
        match Workbook::open(&path) {
            Ok(workbook) => {
                println!("File loaded.");
                return Ok(workbook);
            }
            Err(err) => {
                warn!("failed loading {}: {err}", path.display());
                println!("Could not load the Excel file: {err}");
            }
        }
    }
}

fn ask_sheet(workbook: &Workbook) -> Result<String> {
    let names = workbook.sheet_names();
    match names.as_slice() {
        [] => return Err(WorkbookError::NoSheets.into()),
        [only] => return Ok(only.clone()),
        _ => {}
    }
    let choice = Select::new()
        .with_prompt("Sheet")
        .items(&names)
        .default(0)
        .interact()?;
    Ok(names[choice].clone())
}

/// Blank input keeps the default substring.
fn ask_header(prompt: &str, default: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(default.to_string());
    }
    Ok(trimmed.to_string())
}
