// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  tests/program.rs - End-to-end tests for CNC grinder Program Files.
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

use grindprog::header::HEADER_LEN;
use grindprog::record::{Payload, Records};
use grindprog::{Program, ProgramError, SaveOptions, Value, open_program, save_program};
use tempfile::TempDir;

fn test_header() -> Vec<u8> {
    let mut bytes = vec![0x02, 0x7E];
    bytes.extend([0u8; 22]);
    bytes.push(0x01);
    bytes.extend(b"TESTPROG                ");
    bytes.extend([0u8; 207]);
    bytes
}

fn float_record(index: u8, type_byte: u8, value: f32) -> Vec<u8> {
    let mut bytes = vec![index, type_byte];
    bytes.extend(value.to_le_bytes());
    bytes
}

fn int_record(index: u8, value: i32) -> Vec<u8> {
    let mut bytes = vec![index, 0x60];
    bytes.extend(value.to_le_bytes());
    bytes
}

fn string_record(index: u8, text: &str) -> Vec<u8> {
    let mut bytes = vec![index, 0xA0, text.len() as u8];
    bytes.extend(text.as_bytes());
    bytes
}

/// Every initialized field of a program as `(name, value)`.
fn initialized_values(program: &Program) -> Vec<(String, Value)> {
    program
        .values()
        .initialized()
        .map(|f| (f.descriptor().name.clone(), f.get()))
        .collect()
}

fn sample_program_bytes() -> Vec<u8> {
    let mut bytes = test_header();
    bytes.extend(int_record(1, 5));
    bytes.extend(string_record(3, "  FINISH PASS  "));
    bytes.extend(float_record(4, 0x20, 1.5));
    bytes.extend(float_record(9, 0x20, 25.4));
    bytes.extend(float_record(20, 0x20, -12.7));
    bytes.extend(int_record(31, 1));
    // Longer than the 16 characters wheel-spec is declared with.
    bytes.extend(string_record(32, "DIAMOND D126 C75 BRONZE"));
    // operation-order-3 at 380 = 124 + 256
    bytes.extend(float_record(124, 0x21, 2.0));
    // page-2-gl1-x at 236
    bytes.extend(float_record(236, 0x20, 3.175));
    // radius-p-radius at 1722 = 186 + 256 * 6
    bytes.extend(float_record(186, 0x26, 6.35));
    bytes.extend([0x00, 0x00]);
    bytes
}

#[test]
fn test_concrete_scenario() {
    let mut bytes = test_header();
    bytes.extend(float_record(4, 0x20, 1.5));
    bytes.extend([0x00, 0x00]);

    let program = Program::open(&bytes).unwrap();
    assert_eq!(program.name(), "TESTPROG");
    assert_eq!(
        program.values().get("stock-removal-a").unwrap(),
        Value::Float(1.5)
    );
    assert!(program.values().is_initialized("stock-removal-a").unwrap());

    let saved = program.to_bytes(&SaveOptions::default()).unwrap();
    assert_eq!(&saved[..HEADER_LEN], &bytes[..HEADER_LEN]);

    let records: Vec<_> = Records::new(&saved[HEADER_LEN..])
        .collect::<Result<_, _>>()
        .unwrap();
    let record = records.iter().find(|r| r.address() == 4).unwrap();
    assert_eq!(record.type_byte, 0x20);
    assert_eq!(record.payload, Payload::Float(1.5));
    assert_eq!(&saved[saved.len() - 2..], &[0x00, 0x00]);
}

#[test]
fn test_metric_scenario() {
    let mut bytes = test_header();
    bytes.extend(float_record(9, 0x20, 25.4));
    bytes.extend([0x00, 0x00]);

    let mut program = Program::open(&bytes).unwrap();
    assert_eq!(
        program.values().get("stock-removal-x1").unwrap(),
        Value::Float(1.0)
    );

    program
        .values_mut()
        .set("stock-removal-x1", Value::Float(2.0))
        .unwrap();
    let saved = program.to_bytes(&SaveOptions::default()).unwrap();
    let record = Records::new(&saved[HEADER_LEN..])
        .map(Result::unwrap)
        .find(|r| r.address() == 9)
        .unwrap();
    assert_eq!(record.payload, Payload::Float(50.8));
}

#[test]
fn test_round_trip() {
    let bytes = sample_program_bytes();
    let first = Program::open(&bytes).unwrap();
    let saved = first.to_bytes(&SaveOptions::default()).unwrap();
    let second = Program::open(&saved).unwrap();

    assert_eq!(initialized_values(&first), initialized_values(&second));
    assert_eq!(second.name(), "TESTPROG");

    let values = second.values();
    assert_eq!(
        values.choice_label("program-control-mode").unwrap(),
        Some("Automatic")
    );
    assert_eq!(
        values.get("program-comment").unwrap(),
        Value::Text("FINISH PASS".to_string())
    );
    assert_eq!(
        values.get("wheel-spec").unwrap(),
        Value::Text("DIAMOND D126 C75 BRONZE".to_string())
    );
    assert_eq!(values.get("zero-point-x").unwrap(), Value::Float(-0.5));
    assert_eq!(values.get("measure-enabled").unwrap(), Value::Bool(true));
    assert_eq!(values.get("operation-order-3").unwrap(), Value::Int(2));
    assert_eq!(values.get("page-2-gl1-x").unwrap(), Value::Float(0.125));
    assert_eq!(values.get("radius-p-radius").unwrap(), Value::Float(0.25));
}

#[test]
fn test_saved_output_is_stable() {
    let first = Program::open(&sample_program_bytes()).unwrap();
    let once = first.to_bytes(&SaveOptions::default()).unwrap();
    let twice = Program::open(&once)
        .unwrap()
        .to_bytes(&SaveOptions::default())
        .unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_unknown_address_tolerance() {
    let mut with_unknown = test_header();
    with_unknown.extend(float_record(4, 0x20, 1.5));
    with_unknown.extend(float_record(7, 0x20, 99.0));
    with_unknown.extend(int_record(8, 42));
    with_unknown.extend(float_record(0xF0, 0x26, 1.0));
    with_unknown.extend([0x00, 0x00]);

    let mut without_unknown = test_header();
    without_unknown.extend(float_record(4, 0x20, 1.5));
    without_unknown.extend([0x00, 0x00]);

    let a = Program::open(&with_unknown).unwrap();
    let b = Program::open(&without_unknown).unwrap();
    assert_eq!(initialized_values(&a), initialized_values(&b));
}

#[test]
fn test_sentinel_termination() {
    let mut bytes = test_header();
    bytes.extend(float_record(4, 0x20, 1.5));
    bytes.extend([0x00, 0x00]);
    bytes.extend(float_record(5, 0x20, 7.0));
    bytes.extend([0x13, 0x99, 0xFF]);

    let program = Program::open(&bytes).unwrap();
    assert!(!program.values().is_initialized("stock-removal-b").unwrap());
}

#[test]
fn test_unknown_type_rejection() {
    let mut bytes = test_header();
    bytes.extend(float_record(4, 0x20, 1.5));
    bytes.extend([0x05, 0x50, 0x00, 0x00, 0x80, 0x3F]);
    bytes.extend([0x00, 0x00]);

    assert!(matches!(
        Program::open(&bytes),
        Err(ProgramError::UnknownRecordType(0x50))
    ));
}

#[test]
fn test_extreme_choice_values_round_trip() {
    for raw in [i32::MIN, i32::MAX] {
        let mut bytes = test_header();
        bytes.extend(int_record(1, raw));
        // page-1-grind-mode, base 1, in a float slot
        bytes.extend(float_record(115, 0x20, raw as f32));
        bytes.extend([0x00, 0x00]);

        let program = Program::open(&bytes).unwrap();
        assert_eq!(
            program.values().choice_label("program-control-mode").unwrap(),
            None
        );

        let saved = program.to_bytes(&SaveOptions::default()).unwrap();
        let records: Vec<_> = Records::new(&saved[HEADER_LEN..])
            .collect::<Result<_, _>>()
            .unwrap();
        let mode = records.iter().find(|r| r.address() == 1).unwrap();
        assert_eq!(mode.payload, Payload::Int(raw));
        assert!(records.iter().any(|r| r.address() == 115));
    }
}

#[test]
fn test_header_errors() {
    let mut bytes = sample_program_bytes();
    bytes[1] = 0x00;
    assert!(matches!(
        Program::open(&bytes),
        Err(ProgramError::BadMagicNumber(_))
    ));

    assert!(matches!(
        Program::open(&test_header()[..100]),
        Err(ProgramError::TruncatedHeader(100))
    ));
}

#[test]
fn test_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("PART01.PRG");
    std::fs::write(&path, sample_program_bytes()).unwrap();

    let mut program = open_program(&path).unwrap();
    program
        .values_mut()
        .set("page-4-spindle-speed", Value::Int(1800))
        .unwrap();

    let copy = dir.path().join("PART02.PRG");
    let options = SaveOptions {
        name: Some("PART02".to_string()),
        ..Default::default()
    };
    save_program(&program, &copy, &options).unwrap();

    let reopened = open_program(&copy).unwrap();
    assert_eq!(reopened.name(), "PART02");
    assert_eq!(
        reopened.values().get("page-4-spindle-speed").unwrap(),
        Value::Int(1800)
    );
    assert!(!dir.path().join("PART02.PRG.tmp").exists());
}

#[test]
fn test_failed_save_keeps_destination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("PART01.PRG");
    let program = Program::new("PART01");
    assert!(matches!(
        save_program(&program, &path, &SaveOptions::default()),
        Err(ProgramError::Io(_))
    ));
    assert!(!path.exists());
}
