// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  edit.rs - Field editing demo for CNC grinder Program Files.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fs::File;
use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use grindprog::error::{ProgramError, Result};
use grindprog::program::*;
use grindprog::report::{Units, read_sheet};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to edit.
    file: String,

    /// Assignments of the form `name=value`, in inches. An empty value clears
    /// the field.
    assignments: Vec<String>,

    /// Apply a CSV parameter sheet before the assignments.
    #[arg(long)]
    sheet: Option<String>,

    /// Read sheet lengths in millimeters.
    #[arg(long)]
    mm: bool,

    /// Write to this file instead of overwriting the input.
    #[arg(short, long)]
    output: Option<String>,

    /// Program name to write into the header.
    #[arg(long)]
    name: Option<String>,
}

fn apply(program: &mut Program, args: &Args) -> Result<()> {
    if let Some(sheet) = &args.sheet {
        let units = if args.mm {
            Units::Millimeters
        } else {
            Units::Inches
        };
        let applied = read_sheet(program.values_mut(), File::open(sheet)?, units)?;
        eprintln!("Applied {} rows from {:?}", applied, sheet);
    }

    for assignment in &args.assignments {
        let Some((name, text)) = assignment.split_once('=') else {
            return Err(ProgramError::BadValue {
                field: assignment.clone(),
                text: String::new(),
            });
        };
        let name = name.trim();
        let values = program.values_mut();
        if text.trim().is_empty() {
            values.clear_field(name)?;
            continue;
        }
        let descriptor = values
            .schema()
            .get(name)
            .ok_or_else(|| ProgramError::UnknownField(name.to_string()))?;
        values.set(name, descriptor.parse_value(text)?)?;
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut program = match open_program(&args.file) {
        Ok(p) => p,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    if let Err(error) = apply(&mut program, &args) {
        eprintln!("Error editing file {:?}: {}", &args.file, error);
        return;
    }

    let output = args.output.as_deref().unwrap_or(&args.file);
    let options = SaveOptions {
        name: args.name.clone(),
        ..Default::default()
    };
    if let Err(error) = save_program(&program, output, &options) {
        eprintln!("Error saving file {:?}: {:?}", output, error);
    }
}
