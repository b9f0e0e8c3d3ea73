// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/address.rs - Field address resolution for CNC grinder Program Files.
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
 * # `address` Module
 *
 * Maps a record's raw `(index, type)` byte pair to the logical field address
 * and back.
 *
 * Integer and string records use the index byte as the address. Float records
 * carry an extension `n` in the low nibble of the type byte (`0x20 | n`, with
 * `n` in `0..=6`), giving `address = index + 256 * n`. Float fields can
 * therefore live anywhere in `0..=1791`.
 */

use crate::error::{ProgramError, Result};

pub const TYPE_END: u8 = 0x00;
pub const TYPE_FLOAT: u8 = 0x20;
pub const TYPE_INT: u8 = 0x60;
pub const TYPE_STRING: u8 = 0xA0;

/// Largest extension nibble a float type byte may carry.
pub const MAX_EXTENSION: u8 = 6;

/// Largest address reachable through a float record.
pub const MAX_FLOAT_ADDRESS: u16 = 256 * (MAX_EXTENSION as u16 + 1) - 1;

/// Largest address reachable through an integer or string record.
pub const MAX_BYTE_ADDRESS: u16 = 0xFF;

/// How a field is tagged on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Type byte `0x60`, 32-bit signed integer payload.
    Int,
    /// Type bytes `0x20..=0x26`, 32-bit float payload.
    Float,
    /// Type byte `0xA0`, length-prefixed ASCII payload.
    String,
}

impl Storage {
    /// The storage class a type byte selects, or `None` for the sentinel and
    /// unassigned values.
    pub fn from_type(type_byte: u8) -> Option<Self> {
        match type_byte {
            TYPE_INT => Some(Storage::Int),
            TYPE_FLOAT..=0x26 => Some(Storage::Float),
            TYPE_STRING => Some(Storage::String),
            _ => None,
        }
    }

    /// Largest address a field with this storage can occupy.
    pub fn max_address(self) -> u16 {
        match self {
            Storage::Float => MAX_FLOAT_ADDRESS,
            Storage::Int | Storage::String => MAX_BYTE_ADDRESS,
        }
    }
}

/// Resolves the field address of a record.
pub fn decode(index: u8, type_byte: u8) -> u16 {
    match Storage::from_type(type_byte) {
        Some(Storage::Float) => u16::from(index) + 256 * u16::from(type_byte & 0x0F),
        _ => u16::from(index),
    }
}

/// Computes the `(index, type)` pair a field at `address` is written with.
///
/// Fails with [`ProgramError::UnrepresentableAddress`] when the address does
/// not fit the storage class.
pub fn encode(address: u16, storage: Storage) -> Result<(u8, u8)> {
    if address > storage.max_address() {
        return Err(ProgramError::UnrepresentableAddress(address));
    }

    let (index, type_byte) = match storage {
        Storage::Int => (address, TYPE_INT),
        Storage::String => (address, TYPE_STRING),
        Storage::Float => {
            let extension = address / 256;
            (address - 256 * extension, TYPE_FLOAT | extension as u8)
        }
    };

    Ok((index as u8, type_byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_address_bijection() {
        for address in 0..=MAX_FLOAT_ADDRESS {
            let (index, type_byte) = encode(address, Storage::Float).unwrap();
            assert!((0x20..=0x26).contains(&type_byte), "address {}", address);
            assert_eq!(decode(index, type_byte), address);
        }
    }

    #[test]
    fn test_float_extension() {
        assert_eq!(encode(4, Storage::Float).unwrap(), (4, 0x20));
        assert_eq!(encode(256, Storage::Float).unwrap(), (0, 0x21));
        assert_eq!(encode(1610, Storage::Float).unwrap(), (74, 0x26));
        assert_eq!(decode(0xFF, 0x26), 1791);
    }

    #[test]
    fn test_unrepresentable_addresses() {
        assert!(matches!(
            encode(1792, Storage::Float),
            Err(ProgramError::UnrepresentableAddress(1792))
        ));
        assert!(matches!(
            encode(256, Storage::Int),
            Err(ProgramError::UnrepresentableAddress(256))
        ));
        assert!(matches!(
            encode(300, Storage::String),
            Err(ProgramError::UnrepresentableAddress(300))
        ));
    }

    #[test]
    fn test_integer_and_string_records_are_not_extended() {
        assert_eq!(decode(0x12, TYPE_INT), 0x12);
        assert_eq!(decode(0x12, TYPE_STRING), 0x12);
        assert_eq!(encode(0x12, Storage::Int).unwrap(), (0x12, 0x60));
        assert_eq!(encode(0x12, Storage::String).unwrap(), (0x12, 0xA0));
    }

    #[test]
    fn test_storage_from_type() {
        assert_eq!(Storage::from_type(0x60), Some(Storage::Int));
        assert_eq!(Storage::from_type(0x23), Some(Storage::Float));
        assert_eq!(Storage::from_type(0xA0), Some(Storage::String));
        assert_eq!(Storage::from_type(0x27), None);
        assert_eq!(Storage::from_type(0x00), None);
        assert_eq!(Storage::from_type(0x50), None);
    }
}
