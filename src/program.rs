// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/program.rs - Reading and writing CNC grinder Program Files.
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
 * # `program` Module
 *
 * Ties the header, record stream, and value store together.
 *
 * ## Usage Example
 *
 * ```no_run
 * use grindprog::program::{Program, SaveOptions};
 * use grindprog::value::Value;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let mut program = Program::from_filename("PART01.PRG")?;
 *     println!("Program: {}", program.name());
 *
 *     program
 *         .values_mut()
 *         .set("stock-removal-x1", Value::Float(0.125))?;
 *
 *     let options = SaveOptions {
 *         name: Some("PART01B".to_string()),
 *         ..Default::default()
 *     };
 *     program.save("PART01B.PRG", &options)?;
 *
 *     Ok(())
 * }
 * ```
 */

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::address;
use crate::error::Result;
use crate::fields;
use crate::header::{HEADER_LEN, Header, Magic};
use crate::record::{Record, Records, write_sentinel};
use crate::schema::Schema;
use crate::value::ValueStore;

/// Choices made when writing a program.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Program name to write instead of the current one ("save as").
    pub name: Option<String>,
    /// Signature to write instead of the one the program was read with.
    pub magic: Option<Magic>,
}

/// An open program: its header and the values of every field.
#[derive(Debug, Clone)]
pub struct Program {
    header: Header,
    values: ValueStore,
}

impl Program {
    /// A new program with every field at its default.
    pub fn new(name: &str) -> Self {
        Self {
            header: Header::new(name),
            values: ValueStore::new(),
        }
    }

    /// Decodes a program using the built-in grinder schema.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::open_with_schema(bytes, fields::schema())
    }

    /// Decodes a program against `schema`.
    ///
    /// Records whose address no field claims are skipped. Any header or record
    /// error fails the whole open.
    pub fn open_with_schema(bytes: &[u8], schema: &'static Schema) -> Result<Self> {
        let header = Header::from_bytes(bytes)?;
        let mut values = ValueStore::with_schema(schema);

        let mut loaded = 0usize;
        let mut skipped = 0usize;
        for record in Records::new(&bytes[HEADER_LEN..]) {
            let record = record?;
            let address = record.address();
            if values.load_address(address, &record.payload) {
                loaded += 1;
            } else {
                debug!(
                    "Skipping record at address {} (type 0x{:02x})",
                    address, record.type_byte
                );
                skipped += 1;
            }
        }

        info!(
            "Opened program {:?}: {} records loaded, {} skipped",
            header.name(),
            loaded,
            skipped
        );

        Ok(Self { header, values })
    }

    pub fn from_filename<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::open(&bytes)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn name(&self) -> String {
        self.header.name()
    }

    pub fn set_name(&mut self, name: &str) {
        self.header.set_name(name);
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut ValueStore {
        &mut self.values
    }

    /// Encodes the program: header, one record per initialized field in
    /// schema order, then the end marker.
    pub fn to_bytes(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        let mut header = self.header.clone();
        if let Some(name) = &options.name {
            header.set_name(name);
        }
        if let Some(magic) = options.magic {
            header.magic = magic;
        }

        let mut bytes = header.to_bytes().to_vec();
        let mut written = 0usize;
        for field in self.values.initialized() {
            let descriptor = field.descriptor();
            let (index, type_byte) = address::encode(descriptor.address, descriptor.storage)?;
            Record {
                index,
                type_byte,
                payload: field.payload(),
            }
            .write_to(&mut bytes)?;
            written += 1;
        }
        write_sentinel(&mut bytes)?;

        debug!("Encoded {} records ({} bytes)", written, bytes.len());
        Ok(bytes)
    }

    /// Writes the program to `path`.
    ///
    /// The file is written next to the destination under a `.tmp` suffix,
    /// synced, and renamed into place, so a failed save leaves any existing
    /// file untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P, options: &SaveOptions) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes(options)?;

        let tmp_path = temporary_path(path);
        let result = write_synced(&tmp_path, &bytes).and_then(|()| fs::rename(&tmp_path, path));
        if let Err(error) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(error.into());
        }

        info!("Saved program to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Reads and decodes the program at `path`.
pub fn open_program<P: AsRef<Path>>(path: P) -> Result<Program> {
    Program::from_filename(path)
}

/// Encodes `program` and writes it to `path`.
pub fn save_program<P: AsRef<Path>>(
    program: &Program,
    path: P,
    options: &SaveOptions,
) -> Result<()> {
    program.save(path, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProgramError;
    use crate::value::Value;

    fn header_bytes(name: &str) -> Vec<u8> {
        Header::new(name).to_bytes().to_vec()
    }

    fn float_record(index: u8, type_byte: u8, value: f32) -> Vec<u8> {
        let mut bytes = vec![index, type_byte];
        bytes.extend(value.to_le_bytes());
        bytes
    }

    #[test]
    fn test_open_loads_fields() {
        let mut bytes = header_bytes("TESTPROG");
        bytes.extend(float_record(4, 0x20, 1.5));
        bytes.extend([0x00, 0x00]);

        let program = Program::open(&bytes).unwrap();
        assert_eq!(program.name(), "TESTPROG");
        assert_eq!(
            program.values().get("stock-removal-a").unwrap(),
            Value::Float(1.5)
        );
        assert!(program.values().is_initialized("stock-removal-a").unwrap());
    }

    #[test]
    fn test_open_extended_address() {
        // Address 1610 = 74 + 256 * 6.
        let mut bytes = header_bytes("CONTOUR");
        bytes.extend(float_record(74, 0x26, 25.4));

        let program = Program::open(&bytes).unwrap();
        assert_eq!(
            program.values().get("straight-a-x").unwrap(),
            Value::Float(1.0)
        );
    }

    #[test]
    fn test_unknown_address_is_skipped() {
        let mut bytes = header_bytes("TESTPROG");
        bytes.extend(float_record(7, 0x20, 9.0));
        bytes.extend([0x00, 0x00]);

        let program = Program::open(&bytes).unwrap();
        assert_eq!(program.values().initialized().count(), {
            Program::new("TESTPROG").values().initialized().count()
        });
    }

    #[test]
    fn test_unknown_type_fails_open() {
        let mut bytes = header_bytes("TESTPROG");
        bytes.extend(float_record(4, 0x20, 1.5));
        bytes.extend([0x05, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

        assert!(matches!(
            Program::open(&bytes),
            Err(ProgramError::UnknownRecordType(0x50))
        ));
    }

    #[test]
    fn test_encode_layout() {
        let mut program = Program::new("TESTPROG");
        program.values_mut().clear_all();
        program
            .values_mut()
            .set("stock-removal-a", Value::Float(1.5))
            .unwrap();

        let bytes = program.to_bytes(&SaveOptions::default()).unwrap();
        let records = &bytes[HEADER_LEN..];

        // program-control-mode (raw 4) and page-count (1) keep their non-zero
        // defaults and are written around stock-removal-a.
        assert_eq!(&records[..6], &[0x01, 0x60, 0x04, 0x00, 0x00, 0x00]);
        assert_eq!(&records[6..12], float_record(4, 0x20, 1.5).as_slice());
        assert_eq!(&records[12..18], &[0x1E, 0x60, 0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&records[records.len() - 2..], &[0x00, 0x00]);

        // Each page's grind mode defaults to raw 1 and is written too.
        let reopened = Program::open(&bytes).unwrap();
        assert!(reopened.values().is_initialized("page-1-grind-mode").unwrap());
        assert_eq!(
            reopened.values().initialized().count(),
            program.values().initialized().count()
        );
    }

    #[test]
    fn test_save_as_options() {
        let program = Program::new("OLD");
        let options = SaveOptions {
            name: Some("NEW".to_string()),
            magic: Some(Magic::Legacy),
        };
        let bytes = program.to_bytes(&options).unwrap();
        let reopened = Program::open(&bytes).unwrap();
        assert_eq!(reopened.name(), "NEW");
        assert_eq!(reopened.header().magic, Magic::Legacy);
        assert_eq!(program.name(), "OLD");
    }

    #[test]
    fn test_temporary_path() {
        assert_eq!(
            temporary_path(Path::new("dir/PART.PRG")),
            PathBuf::from("dir/PART.PRG.tmp")
        );
    }
}
