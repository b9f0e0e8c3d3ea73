// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/primitive.rs - Little-endian primitives for CNC grinder Program Files.
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

//! Fixed-width reads and writes used by the header and record codecs.
//!
//! Every multi-byte value in a Program File is little-endian regardless of the
//! host. A short read is always reported as
//! [`ProgramError::UnexpectedEndOfInput`].

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{ProgramError, Result};

fn map_eof(error: io::Error) -> ProgramError {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        ProgramError::UnexpectedEndOfInput
    } else {
        ProgramError::Io(error)
    }
}

pub fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    r.read_u8().map_err(map_eof)
}

pub fn write_u8<W: Write>(w: &mut W, value: u8) -> Result<()> {
    Ok(w.write_u8(value)?)
}

pub fn read_i32_le<R: Read>(r: &mut R) -> Result<i32> {
    r.read_i32::<LittleEndian>().map_err(map_eof)
}

pub fn write_i32_le<W: Write>(w: &mut W, value: i32) -> Result<()> {
    Ok(w.write_i32::<LittleEndian>(value)?)
}

pub fn read_f32_le<R: Read>(r: &mut R) -> Result<f32> {
    r.read_f32::<LittleEndian>().map_err(map_eof)
}

pub fn write_f32_le<W: Write>(w: &mut W, value: f32) -> Result<()> {
    Ok(w.write_f32::<LittleEndian>(value)?)
}

pub fn read_bytes<R: Read>(r: &mut R, n: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; n];
    r.read_exact(&mut buffer).map_err(map_eof)?;
    Ok(buffer)
}

pub fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    Ok(w.write_all(bytes)?)
}

/// Reads `len` bytes as text, one character per byte.
///
/// There is no terminator and the bytes are not checked for printability;
/// bytes above 0x7F map to the Latin-1 code point of the same value.
pub fn read_fixed_ascii_string<R: Read>(r: &mut R, len: usize) -> Result<String> {
    let bytes = read_bytes(r, len)?;
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Writes each character of `s` as a single byte, without padding or
/// truncation. Characters outside Latin-1 are written as `?`.
pub fn write_ascii_string<W: Write>(w: &mut W, s: &str) -> Result<()> {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    write_bytes(w, &bytes)
}
