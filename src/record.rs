// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/record.rs - Record stream codec for CNC grinder Program Files.
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
 * # `record` Module
 *
 * The tagged record stream that follows the header.
 *
 * ```text
 * [index: u8][type: u8][payload]
 *
 * type 0x60        payload = i32 LE
 * type 0x20..0x26  payload = f32 LE
 * type 0xA0        payload = len: u8, then len ASCII bytes
 * type 0x00        end of records, anything after it is ignored
 * ```
 *
 * ## Usage Example
 *
 * ```
 * use grindprog::record::{Payload, Records};
 *
 * let data = [0x04, 0x20, 0x00, 0x00, 0xC0, 0x3F, 0x00, 0x00];
 * let records: Vec<_> = Records::new(data.as_slice())
 *     .collect::<Result<_, _>>()
 *     .unwrap();
 * assert_eq!(records.len(), 1);
 * assert_eq!(records[0].payload, Payload::Float(1.5));
 * ```
 */

use std::io::{Read, Write};

use tracing::trace;

use crate::address::{self, TYPE_END, TYPE_FLOAT, TYPE_INT, TYPE_STRING};
use crate::error::{ProgramError, Result};
use crate::primitive::*;

/// The decoded payload of a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Int(i32),
    Float(f32),
    /// String payload with surrounding whitespace removed.
    Text(String),
}

/// One `(index, type, payload)` unit of the record stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub index: u8,
    pub type_byte: u8,
    pub payload: Payload,
}

impl Record {
    /// The logical field address this record refers to.
    pub fn address(&self) -> u16 {
        address::decode(self.index, self.type_byte)
    }

    /// Writes the record. The type byte is taken as given, so it must agree
    /// with the payload kind.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u8(w, self.index)?;
        write_u8(w, self.type_byte)?;
        match &self.payload {
            Payload::Int(value) => write_i32_le(w, *value),
            Payload::Float(value) => write_f32_le(w, *value),
            Payload::Text(text) => {
                let text: String = text.chars().take(usize::from(u8::MAX)).collect();
                write_u8(w, text.chars().count() as u8)?;
                write_ascii_string(w, &text)
            }
        }
    }
}

/// Writes the `00 00` end-of-records marker.
pub fn write_sentinel<W: Write>(w: &mut W) -> Result<()> {
    write_u8(w, 0x00)?;
    write_u8(w, TYPE_END)
}

/// A forward-only reader over the record stream.
///
/// Running out of input where an index or type byte is expected ends the
/// stream quietly, which is how files without a trailing sentinel are read.
/// Running out in the middle of a payload is an error. After the sentinel or
/// the first error the iterator yields nothing more.
pub struct Records<R> {
    reader: R,
    done: bool,
}

impl<R: Read> Records<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    fn read_tag_byte(&mut self) -> Result<Option<u8>> {
        match read_u8(&mut self.reader) {
            Ok(byte) => Ok(Some(byte)),
            Err(ProgramError::UnexpectedEndOfInput) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let Some(index) = self.read_tag_byte()? else {
            return Ok(None);
        };
        let Some(type_byte) = self.read_tag_byte()? else {
            return Ok(None);
        };

        let payload = match type_byte {
            TYPE_END => return Ok(None),
            TYPE_INT => Payload::Int(read_i32_le(&mut self.reader)?),
            TYPE_FLOAT..=0x26 => Payload::Float(read_f32_le(&mut self.reader)?),
            TYPE_STRING => {
                let len = read_u8(&mut self.reader)?;
                let text = read_fixed_ascii_string(&mut self.reader, usize::from(len))?;
                Payload::Text(text.trim().to_string())
            }
            other => return Err(ProgramError::UnknownRecordType(other)),
        };

        let record = Record {
            index,
            type_byte,
            payload,
        };
        trace!(
            "Record at address {}: {:?}",
            record.address(),
            record.payload
        );
        Ok(Some(record))
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
