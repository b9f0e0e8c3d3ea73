// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Codec library for CNC grinder Program Files.
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

/*!
 * # `grindprog` Crate
 *
 * A library for reading, editing, and writing the binary Program Files of a
 * CNC grinder control.
 *
 * A Program File is a 256-byte header followed by a stream of tagged records,
 * each holding one integer, float, or string parameter. This crate provides
 * the full pipeline:
 *
 * 1. [header] and [record]: Decode and encode the header and record stream.
 * 2. [address]: Resolve a record's compact `(index, type)` pair to a field
 *    address, and back.
 * 3. [schema] and [fields]: Name and type every known field address.
 * 4. [value]: Hold and edit the values of one program.
 * 5. [program]: Open and save whole files.
 * 6. [report]: Export and import CSV parameter sheets.
 *
 * ## Usage Example
 *
 * ```no_run
 * use grindprog::program::{SaveOptions, open_program, save_program};
 * use grindprog::value::Value;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Open the file
 *     let mut program = open_program("PART01.PRG")?;
 *
 *     // Inspect the fields that are present in the file
 *     for field in program.values().initialized() {
 *         println!("{} = {}", field.descriptor().name, field.get());
 *     }
 *
 *     // Edit a field, in inches
 *     program
 *         .values_mut()
 *         .set("zero-point-x", Value::Float(-1.25))?;
 *
 *     // Write it back
 *     save_program(&program, "PART01.PRG", &SaveOptions::default())?;
 *
 *     Ok(())
 * }
 * ```
 */

pub mod address;
pub mod error;
pub mod fields;
pub mod header;
pub mod primitive;
pub mod program;
pub mod record;
pub mod report;
pub mod schema;
pub mod value;

pub use error::{ProgramError, Result};
pub use program::{Program, SaveOptions, open_program, save_program};
pub use value::{Value, ValueStore};
