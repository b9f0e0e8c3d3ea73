// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types for CNC grinder Program Files.
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

use thiserror::Error;

use crate::schema::ValueKind;

/// Everything that can go wrong while reading, editing, or writing a program.
#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("Bad magic number: {0:02x?}")]
    BadMagicNumber([u8; 2]),

    #[error("Truncated header: {0} of 256 bytes available")]
    TruncatedHeader(usize),

    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("Unknown record type: 0x{0:02x}")]
    UnknownRecordType(u8),

    #[error("Unrepresentable field address: {0}")]
    UnrepresentableAddress(u16),

    #[error("Field address {address} claimed by both {first:?} and {second:?}")]
    DuplicateAddress {
        address: u16,
        first: String,
        second: String,
    },

    #[error("Duplicate field name: {0:?}")]
    DuplicateName(String),

    #[error("Unknown field: {0:?}")]
    UnknownField(String),

    #[error("Field {field:?} holds a {expected:?} value")]
    KindMismatch { field: String, expected: ValueKind },

    #[error("Field {field:?} does not allow negative values (got {value})")]
    NegativeValue { field: String, value: f32 },

    #[error("Field {field:?} has no choice labelled {label:?}")]
    UnknownChoice { field: String, label: String },

    #[error("Field {field:?} cannot take the value {text:?}")]
    BadValue { field: String, text: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ProgramError>;
