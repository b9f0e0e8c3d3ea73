// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/value.rs - Field values for CNC grinder Program Files.
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
 * # `value` Module
 *
 * The editable values of one program.
 *
 * A [ValueStore] holds one [FieldValue] per schema field. A field only
 * produces a record on save once it is *initialized*, which happens when it is
 * loaded from a file or assigned with [ValueStore::set].
 *
 * Float values are handed out in logical units. Metric fields are kept
 * internally in the file's unit (millimeters) so that values read from a file
 * are written back bit for bit.
 *
 * ## Usage Example
 *
 * ```
 * use grindprog::value::{Value, ValueStore};
 *
 * let mut store = ValueStore::new();
 * store.set("stock-removal-x1", Value::Float(2.0)).unwrap();
 * assert_eq!(store.get("stock-removal-x1").unwrap(), Value::Float(2.0));
 * assert!(store.is_initialized("stock-removal-x1").unwrap());
 * ```
 */

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::address::Storage;
use crate::error::{ProgramError, Result};
use crate::fields;
use crate::record::Payload;
use crate::schema::{FieldDescriptor, FieldKind, Schema, ValueKind};

/// Millimeters per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Index into the field's choice labels.
    Choice(i32),
    Float(f32),
    Int(i32),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Choice(_) => ValueKind::Choice,
            Value::Float(_) => ValueKind::Float,
            Value::Int(_) => ValueKind::Int,
            Value::Text(_) => ValueKind::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Choice(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

fn mismatch(field: &FieldDescriptor) -> ProgramError {
    ProgramError::KindMismatch {
        field: field.name.clone(),
        expected: field.kind.value_kind(),
    }
}

impl FieldDescriptor {
    /// Converts a logical value into the form a [FieldValue] keeps.
    fn to_stored(&self, value: Value) -> Result<Value> {
        match (&self.kind, value) {
            (FieldKind::Bool, v @ Value::Bool(_)) => Ok(v),
            (FieldKind::Choice { .. }, v @ Value::Choice(_)) => Ok(v),
            (FieldKind::Int, v @ Value::Int(_)) => Ok(v),
            (FieldKind::String { .. }, v @ Value::Text(_)) => Ok(v),
            (FieldKind::Float { metric, .. }, Value::Float(v)) => Ok(Value::Float(if *metric {
                v * MM_PER_INCH
            } else {
                v
            })),
            _ => Err(mismatch(self)),
        }
    }

    /// Converts a stored value back into logical units.
    fn to_logical(&self, stored: &Value) -> Value {
        match (&self.kind, stored) {
            (FieldKind::Float { metric: true, .. }, Value::Float(v)) => Value::Float(v / MM_PER_INCH),
            _ => stored.clone(),
        }
    }

    /// Rounds a float-slot value for a whole-number field.
    fn whole(&self, v: f32) -> i32 {
        if v.fract() != 0.0 {
            debug!("Rounding non-integral value {} for field {}", v, self.name);
        }
        v.round() as i32
    }

    /// Interprets a record payload, or `None` if a payload of that kind cannot
    /// belong to this field.
    fn from_payload(&self, payload: &Payload) -> Option<Value> {
        let value = match (&self.kind, payload) {
            (FieldKind::String { .. }, Payload::Text(s)) => Value::Text(s.clone()),
            (FieldKind::String { .. }, _) | (_, Payload::Text(_)) => return None,
            (FieldKind::Bool, Payload::Int(v)) => Value::Bool(*v != 0),
            (FieldKind::Bool, Payload::Float(v)) => {
                if *v != 0.0 && *v != 1.0 {
                    debug!("Reading {} as true for field {}", v, self.name);
                }
                Value::Bool(*v != 0.0)
            }
            (FieldKind::Choice { base, .. }, Payload::Int(v)) => {
                Value::Choice(v.wrapping_sub(*base))
            }
            (FieldKind::Choice { base, .. }, Payload::Float(v)) => {
                Value::Choice(self.whole(*v).wrapping_sub(*base))
            }
            (FieldKind::Int, Payload::Int(v)) => Value::Int(*v),
            (FieldKind::Int, Payload::Float(v)) => Value::Int(self.whole(*v)),
            (FieldKind::Float { .. }, Payload::Int(v)) => Value::Float(*v as f32),
            (FieldKind::Float { .. }, Payload::Float(v)) => Value::Float(*v),
        };
        Some(value)
    }

    /// Builds the payload written for a stored value, under this field's
    /// declared storage tag.
    fn to_payload(&self, stored: &Value) -> Payload {
        let number = match (&self.kind, stored) {
            (FieldKind::String { width }, Value::Text(s)) => {
                return Payload::Text(format!("{:<width$}", s, width = usize::from(*width)));
            }
            (FieldKind::Choice { base, .. }, Value::Choice(i)) => {
                Number::Int(base.wrapping_add(*i))
            }
            (_, Value::Bool(b)) => Number::Int(i32::from(*b)),
            (_, Value::Int(v)) | (_, Value::Choice(v)) => Number::Int(*v),
            (_, Value::Float(v)) => Number::Float(*v),
            (_, Value::Text(s)) => return Payload::Text(s.clone()),
        };

        match (self.storage, number) {
            (Storage::Float, Number::Int(v)) => Payload::Float(v as f32),
            (Storage::Float, Number::Float(v)) => Payload::Float(v),
            (_, Number::Int(v)) => Payload::Int(v),
            (_, Number::Float(v)) => Payload::Int(v.round() as i32),
        }
    }

    /// Whether a stored value is the zero value of this field's kind.
    ///
    /// For choices this means a raw stored value of 0, not label index 0.
    fn is_zero(&self, stored: &Value) -> bool {
        match (&self.kind, stored) {
            (FieldKind::Choice { base, .. }, Value::Choice(i)) => base.wrapping_add(*i) == 0,
            (_, Value::Bool(b)) => !b,
            (_, Value::Int(v)) => *v == 0,
            (_, Value::Float(v)) => *v == 0.0,
            (_, Value::Text(s)) => s.is_empty(),
            (_, Value::Choice(i)) => *i == 0,
        }
    }

    /// The label for a choice index, if this is a choice field and the index
    /// is in range.
    pub fn label(&self, index: i32) -> Option<&'static str> {
        match &self.kind {
            FieldKind::Choice { labels, .. } => {
                usize::try_from(index).ok().and_then(|i| labels.get(i).copied())
            }
            _ => None,
        }
    }

    /// Parses user-supplied text into a logical value for this field.
    ///
    /// Choices accept a label (case-insensitive) or an index. Floats accept a
    /// comma as the decimal separator.
    pub fn parse_value(&self, text: &str) -> Result<Value> {
        let text = text.trim();
        let bad_value = || ProgramError::BadValue {
            field: self.name.clone(),
            text: text.to_string(),
        };

        match &self.kind {
            FieldKind::Bool => match text.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
                "0" | "false" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(bad_value()),
            },
            FieldKind::Choice { labels, .. } => labels
                .iter()
                .position(|label| label.eq_ignore_ascii_case(text))
                .map(|i| Value::Choice(i as i32))
                .or_else(|| text.parse::<i32>().ok().map(Value::Choice))
                .ok_or_else(bad_value),
            FieldKind::Float { .. } => parse_decimal(text)
                .and_then(|d| d.to_f32())
                .map(Value::Float)
                .ok_or_else(bad_value),
            FieldKind::Int => text.parse::<i32>().map(Value::Int).map_err(|_| bad_value()),
            FieldKind::String { .. } => Ok(Value::Text(text.to_string())),
        }
    }
}

enum Number {
    Int(i32),
    Float(f32),
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(&s.replace(',', ".")).ok()
}

/// The mutable slot behind one field.
#[derive(Debug, Clone)]
pub struct FieldValue {
    descriptor: &'static FieldDescriptor,
    stored: Value,
    initialized: bool,
}

impl FieldValue {
    fn new(descriptor: &'static FieldDescriptor) -> Self {
        let mut value = Self {
            descriptor,
            stored: Value::Bool(false),
            initialized: false,
        };
        value.clear();
        value
    }

    fn default_stored(&self) -> Value {
        self.descriptor
            .to_stored(self.descriptor.default.clone())
            .unwrap_or_else(|_| self.descriptor.default.clone())
    }

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// The current value in logical units, initialized or not.
    pub fn get(&self) -> Value {
        self.descriptor.to_logical(&self.stored)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Takes a value read from a file. Returns `false` if the payload kind
    /// does not fit this field, in which case nothing changes.
    pub fn load(&mut self, payload: &Payload) -> bool {
        match self.descriptor.from_payload(payload) {
            Some(value) => {
                self.stored = value;
                self.initialized = true;
                true
            }
            None => false,
        }
    }

    /// Assigns a logical value. Text longer than a string field's width is
    /// cut to the width.
    pub fn set(&mut self, value: Value) -> Result<()> {
        self.assign(value, true)
    }

    /// Assigns a value in the file's unit, skipping the inch to millimeter
    /// conversion of metric fields.
    pub fn set_stored(&mut self, value: Value) -> Result<()> {
        self.assign(value, false)
    }

    fn assign(&mut self, value: Value, convert: bool) -> Result<()> {
        let value = match (&self.descriptor.kind, value) {
            (FieldKind::Float { .. }, Value::Int(v)) => Value::Float(v as f32),
            (_, value) => value,
        };

        if let (FieldKind::Float { allow_negative: false, .. }, Value::Float(v)) =
            (&self.descriptor.kind, &value)
        {
            if *v < 0.0 {
                return Err(ProgramError::NegativeValue {
                    field: self.descriptor.name.clone(),
                    value: *v,
                });
            }
        }

        self.stored = match (&self.descriptor.kind, value) {
            (FieldKind::Float { .. }, stored @ Value::Float(_)) if !convert => stored,
            (FieldKind::String { width }, Value::Text(s)) => {
                Value::Text(s.chars().take(usize::from(*width)).collect())
            }
            (_, value) => self.descriptor.to_stored(value)?,
        };
        self.initialized = true;
        Ok(())
    }

    /// Resets to the default. The field stays initialized only when the
    /// default is not the zero value, so a zero default is left out of the
    /// file.
    pub fn clear(&mut self) {
        self.stored = self.default_stored();
        self.initialized = !self.descriptor.is_zero(&self.stored);
    }

    /// Resets to the default and marks the field for writing.
    pub fn load_default(&mut self) {
        self.stored = self.default_stored();
        self.initialized = true;
    }

    /// The payload this field is written with.
    pub fn payload(&self) -> Payload {
        self.descriptor.to_payload(&self.stored)
    }
}

/// The values of every field of one program.
#[derive(Debug, Clone)]
pub struct ValueStore {
    schema: &'static Schema,
    values: Vec<FieldValue>,
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueStore {
    /// A store over the built-in grinder schema with every field at its
    /// default.
    pub fn new() -> Self {
        Self::with_schema(fields::schema())
    }

    pub fn with_schema(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: schema.fields().iter().map(FieldValue::new).collect(),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn field(&self, name: &str) -> Result<&FieldValue> {
        self.schema
            .position(name)
            .map(|i| &self.values[i])
            .ok_or_else(|| ProgramError::UnknownField(name.to_string()))
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FieldValue> {
        match self.schema.position(name) {
            Some(i) => Ok(&mut self.values[i]),
            None => Err(ProgramError::UnknownField(name.to_string())),
        }
    }

    /// The current logical value of a field.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.field(name).map(FieldValue::get)
    }

    pub fn is_initialized(&self, name: &str) -> Result<bool> {
        self.field(name).map(FieldValue::is_initialized)
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.field_mut(name)?.set(value)
    }

    /// Assigns a value in the file's unit. See [FieldValue::set_stored].
    pub fn set_stored(&mut self, name: &str, value: Value) -> Result<()> {
        self.field_mut(name)?.set_stored(value)
    }

    /// The label of a choice field's current value.
    pub fn choice_label(&self, name: &str) -> Result<Option<&'static str>> {
        let field = self.field(name)?;
        match field.get() {
            Value::Choice(i) => Ok(field.descriptor().label(i)),
            _ => Err(mismatch(field.descriptor())),
        }
    }

    /// Selects a choice by its label.
    pub fn set_choice_label(&mut self, name: &str, label: &str) -> Result<()> {
        let field = self.field_mut(name)?;
        let FieldKind::Choice { labels, .. } = &field.descriptor().kind else {
            return Err(mismatch(field.descriptor()));
        };
        let index = labels
            .iter()
            .position(|l| *l == label)
            .ok_or_else(|| ProgramError::UnknownChoice {
                field: name.to_string(),
                label: label.to_string(),
            })?;
        field.set(Value::Choice(index as i32))
    }

    pub fn clear_field(&mut self, name: &str) -> Result<()> {
        self.field_mut(name)?.clear();
        Ok(())
    }

    pub fn load_default(&mut self, name: &str) -> Result<()> {
        self.field_mut(name)?.load_default();
        Ok(())
    }

    /// Resets every field to its default.
    pub fn clear_all(&mut self) {
        self.values.iter_mut().for_each(FieldValue::clear);
    }

    /// Loads a record payload into the field at `address`.
    ///
    /// Returns `false` when no field lives at that address or the payload kind
    /// does not fit the field.
    pub fn load_address(&mut self, address: u16, payload: &Payload) -> bool {
        match self.schema.position_of_address(address) {
            Some(i) => self.values[i].load(payload),
            None => false,
        }
    }

    /// Every field, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.values.iter()
    }

    /// The fields that will be written on save, in schema order.
    pub fn initialized(&self) -> impl Iterator<Item = &FieldValue> {
        self.values.iter().filter(|v| v.is_initialized())
    }
}
