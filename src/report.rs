// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/report.rs - CSV parameter sheets for CNC grinder Program Files.
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
 * # `report` Module
 *
 * Exports a program's values as a CSV parameter sheet and applies edited
 * sheets back to a [ValueStore].
 *
 * Sheets have a header row and the columns
 * `name,address,kind,initialized,value,unit`. Only `name`, `initialized`
 * and `value` are read back.
 *
 * ## Usage Example
 *
 * ```
 * use grindprog::report::{Units, read_sheet, write_sheet};
 * use grindprog::value::{Value, ValueStore};
 *
 * let mut store = ValueStore::new();
 * store.set("stock-removal-x1", Value::Float(1.0)).unwrap();
 *
 * let mut sheet = Vec::new();
 * write_sheet(&store, &mut sheet, Units::Millimeters).unwrap();
 *
 * let mut copy = ValueStore::new();
 * read_sheet(&mut copy, sheet.as_slice(), Units::Millimeters).unwrap();
 * assert_eq!(copy.get("stock-removal-x1").unwrap(), Value::Float(1.0));
 * ```
 */

use std::io::{Read, Write};

use rust_decimal::Decimal;

use crate::error::{ProgramError, Result};
use crate::schema::{FieldDescriptor, FieldKind};
use crate::value::{MM_PER_INCH, Value, ValueStore};

const COLUMNS: [&str; 6] = ["name", "address", "kind", "initialized", "value", "unit"];
const DECIMAL_PLACES: u32 = 4;

/// The unit lengths are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Inches,
    Millimeters,
}

fn mm_per_inch() -> Decimal {
    Decimal::new(254, 1)
}

fn kind_name(descriptor: &FieldDescriptor) -> &'static str {
    match descriptor.kind {
        FieldKind::Bool => "bool",
        FieldKind::Choice { .. } => "choice",
        FieldKind::Float { metric: true, .. } => "length",
        FieldKind::Float { metric: false, .. } => "float",
        FieldKind::Int => "int",
        FieldKind::String { .. } => "string",
    }
}

fn render_float(value: f32) -> String {
    match Decimal::try_from(value) {
        Ok(d) => d.round_dp(DECIMAL_PLACES).normalize().to_string(),
        Err(_) => value.to_string(),
    }
}

/// Renders a logical value as sheet text, along with its unit.
fn render(descriptor: &FieldDescriptor, value: &Value, units: Units) -> (String, &'static str) {
    match (&descriptor.kind, value) {
        (FieldKind::Float { metric: true, .. }, Value::Float(v)) => match units {
            Units::Inches => (render_float(*v), "in"),
            Units::Millimeters => {
                let mm = Decimal::try_from(*v)
                    .map(|d| (d * mm_per_inch()).round_dp(DECIMAL_PLACES).normalize().to_string())
                    .unwrap_or_else(|_| (v * MM_PER_INCH).to_string());
                (mm, "mm")
            }
        },
        (_, Value::Float(v)) => (render_float(*v), ""),
        (_, Value::Bool(b)) => ((if *b { "yes" } else { "no" }).to_string(), ""),
        (_, Value::Choice(i)) => (
            descriptor
                .label(*i)
                .map(str::to_string)
                .unwrap_or_else(|| i.to_string()),
            "",
        ),
        (_, other) => (other.to_string(), ""),
    }
}

/// Writes one row per field, in schema order.
pub fn write_sheet<W: Write>(store: &ValueStore, writer: W, units: Units) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(COLUMNS)?;

    for field in store.iter() {
        let descriptor = field.descriptor();
        let (value, unit) = render(descriptor, &field.get(), units);
        csv.write_record([
            descriptor.name.as_str(),
            descriptor.address.to_string().as_str(),
            kind_name(descriptor),
            if field.is_initialized() { "yes" } else { "no" },
            value.as_str(),
            unit,
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Applies a sheet to `store`, returning the number of rows applied.
///
/// An empty value cell clears the field, as does `no` in an `initialized`
/// column. Rows naming unknown fields fail the import, and rows before the
/// failing one stay applied.
pub fn read_sheet<R: Read>(store: &mut ValueStore, reader: R, units: Units) -> Result<usize> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let column = |name: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .unwrap_or(fallback)
    };
    let name_column = column("name", 0);
    let value_column = column("value", 1);
    let initialized_column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("initialized"));

    let mut applied = 0;
    for result in csv.records() {
        let record = result?;
        let Some(name) = record.get(name_column).map(str::trim) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let text = record.get(value_column).unwrap_or("").trim();

        let descriptor = store
            .schema()
            .get(name)
            .ok_or_else(|| ProgramError::UnknownField(name.to_string()))?;

        let uninitialized = initialized_column
            .and_then(|i| record.get(i))
            .is_some_and(|cell| cell.trim().eq_ignore_ascii_case("no"));

        if text.is_empty() || uninitialized {
            store.clear_field(name)?;
        } else if let (FieldKind::Float { metric: true, .. }, Units::Millimeters) =
            (&descriptor.kind, units)
        {
            store.set_stored(name, descriptor.parse_value(text)?)?;
        } else {
            store.set(name, descriptor.parse_value(text)?)?;
        }
        applied += 1;
    }

    Ok(applied)
}
