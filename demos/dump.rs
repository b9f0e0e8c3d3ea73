// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  dump.rs - Dump demo for CNC grinder Program Files.
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

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use grindprog::program::*;
use grindprog::report::{Units, write_sheet};
use grindprog::value::Value;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: String,

    /// Print every field as a CSV parameter sheet.
    #[arg(long)]
    csv: bool,

    /// Show lengths in millimeters in the CSV sheet.
    #[arg(long)]
    mm: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let program = match open_program(&args.file) {
        Ok(p) => p,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    if args.csv {
        let units = if args.mm {
            Units::Millimeters
        } else {
            Units::Inches
        };
        if let Err(error) = write_sheet(program.values(), io::stdout().lock(), units) {
            eprintln!("Error writing sheet: {:?}", error);
        }
        return;
    }

    println!("Name: {:?}", program.name());
    println!("Signature: {:?}", program.header().magic);
    for field in program.values().initialized() {
        let descriptor = field.descriptor();
        let value = field.get();
        let label = match value {
            Value::Choice(i) => descriptor.label(i),
            _ => None,
        };
        match label {
            Some(label) => println!("{:5} {} = {}", descriptor.address, descriptor.name, label),
            None => println!("{:5} {} = {}", descriptor.address, descriptor.name, value),
        }
    }
}
