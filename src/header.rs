// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/header.rs - Header codec for CNC grinder Program Files.
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
 * # `header` Module
 *
 * The fixed 256-byte preamble at the start of every Program File.
 *
 * ```text
 * offset  len  content
 *      0    2  magic, 02 7E (02 7F on older controls)
 *      2   22  reserved, kept as read
 *     24    1  marker, 01
 *     25   24  program name, ASCII, space padded
 *     49  207  reserved, zero on write
 * ```
 */

use tracing::debug;

use crate::error::{ProgramError, Result};

/// Total size of the header in bytes.
pub const HEADER_LEN: usize = 256;

/// Width of the program name slot.
pub const NAME_LEN: usize = 24;

const RESERVED_OFFSET: usize = 2;
const RESERVED_LEN: usize = 22;
const MARKER_OFFSET: usize = 24;
const MARKER: u8 = 0x01;
const NAME_OFFSET: usize = 25;

/// The two accepted file signatures. Both describe the same layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Magic {
    #[default]
    Standard,
    Legacy,
}

impl Magic {
    pub fn bytes(self) -> [u8; 2] {
        match self {
            Magic::Standard => [0x02, 0x7E],
            Magic::Legacy => [0x02, 0x7F],
        }
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Result<Self> {
        match bytes {
            [0x02, 0x7E] => Ok(Magic::Standard),
            [0x02, 0x7F] => Ok(Magic::Legacy),
            other => Err(ProgramError::BadMagicNumber(other)),
        }
    }
}

/// Pads or truncates `name` to exactly [`NAME_LEN`] bytes.
///
/// Characters outside Latin-1 become `?`.
pub fn pad_name(name: &str) -> [u8; NAME_LEN] {
    let mut slot = [b' '; NAME_LEN];
    for (dst, c) in slot.iter_mut().zip(name.chars()) {
        *dst = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
    slot
}

/// A decoded Program File header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub magic: Magic,
    /// Bytes 2..24, carried through untouched.
    pub reserved: [u8; RESERVED_LEN],
    /// The raw 24-byte program name slot.
    pub name: [u8; NAME_LEN],
}

impl Header {
    /// Creates a header with the standard magic and the given program name.
    pub fn new(name: &str) -> Self {
        Self {
            magic: Magic::Standard,
            reserved: [0; RESERVED_LEN],
            name: pad_name(name),
        }
    }

    /// The program name with padding removed.
    pub fn name(&self) -> String {
        self.name
            .iter()
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim_matches(|c: char| c == ' ' || c == '\0')
            .to_string()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = pad_name(name);
    }

    /// Decodes the header from the first [`HEADER_LEN`] bytes of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ProgramError::TruncatedHeader(bytes.len()));
        }

        let magic = Magic::from_bytes([bytes[0], bytes[1]])?;
        if magic == Magic::Legacy {
            debug!("Program uses the legacy 02 7F signature");
        }

        if bytes[MARKER_OFFSET] != MARKER {
            debug!(
                "Unexpected header marker byte 0x{:02x}",
                bytes[MARKER_OFFSET]
            );
        }

        let mut reserved = [0u8; RESERVED_LEN];
        reserved.copy_from_slice(&bytes[RESERVED_OFFSET..RESERVED_OFFSET + RESERVED_LEN]);

        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&bytes[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);

        Ok(Self {
            magic,
            reserved,
            name,
        })
    }

    /// Encodes the header. The trailing reserved area is always zero.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..2].copy_from_slice(&self.magic.bytes());
        bytes[RESERVED_OFFSET..RESERVED_OFFSET + RESERVED_LEN].copy_from_slice(&self.reserved);
        bytes[MARKER_OFFSET] = MARKER;
        bytes[NAME_OFFSET..NAME_OFFSET + NAME_LEN].copy_from_slice(&self.name);
        bytes
    }
}
