// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/fields.rs - Built-in field table for CNC grinder Program Files.
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
 * # `fields` Module
 *
 * The fields known to exist in grinder Program Files.
 *
 * ```text
 * address     contents
 *    0..=39   program-wide settings
 *   40..=99   probe sets 1-6, 10 addresses each
 *  100..=1599 pages 1-15, 100 addresses each (offset 80 is the page's
 *             operation order)
 * 1610..=1699 straight contour segments a-i, 10 addresses each
 * 1700..=1789 radius contour segments n-v, 10 addresses each
 * ```
 */

use std::sync::OnceLock;

use crate::error::Result;
use crate::schema::{FieldSpec, Group, Member, Schema};
use crate::value::Value;

pub const PAGE_COUNT: u16 = 15;
pub const PROBE_SET_COUNT: u16 = 6;
pub const CONTOUR_SEGMENT_COUNT: u8 = 9;

const CONTROL_MODES: &[&str] = &["Manual", "Automatic"];
const PROBE_LENGTH_MODES: &[&str] = &["Off", "Fixed", "Measured"];
const SPINDLE_DIRECTIONS: &[&str] = &["CW", "CCW"];
const GRIND_MODES: &[&str] = &["Plunge", "Traverse", "Oscillate"];
const RADIUS_DIRECTIONS: &[&str] = &["Convex", "Concave"];

const STATION_BASE: u16 = 20;
const STATION_STRIDE: u16 = 4;

fn probe_layout() -> Vec<Member> {
    vec![
        Member::new("x", 0, FieldSpec::length().signed()),
        Member::new("z", 1, FieldSpec::length().signed()),
        Member::new("feed", 2, FieldSpec::length()),
        Member::new("tolerance", 3, FieldSpec::length()),
        Member::new("enabled", 4, FieldSpec::bool()),
        Member::new("retract", 5, FieldSpec::length()),
    ]
}

fn page_layout() -> Vec<Member> {
    let mut layout = vec![
        Member::new("spindle-speed", 0, FieldSpec::int().in_float_slot()),
        Member::new(
            "spindle-direction",
            1,
            FieldSpec::choice(0, SPINDLE_DIRECTIONS).in_float_slot(),
        ),
        Member::new("coolant-valve-1", 2, FieldSpec::bool().in_float_slot()),
        Member::new("coolant-valve-2", 3, FieldSpec::bool().in_float_slot()),
        Member::new("coolant-valve-3", 4, FieldSpec::bool().in_float_slot()),
        Member::new("coolant-valve-4", 5, FieldSpec::bool().in_float_slot()),
        Member::new("dwell-time", 6, FieldSpec::float()),
        Member::new("spark-out-passes", 7, FieldSpec::int().in_float_slot()),
        Member::new("feed-rough", 8, FieldSpec::length()),
        Member::new("feed-finish", 9, FieldSpec::length()),
        Member::new("feed-rapid", 10, FieldSpec::length()),
        Member::new("infeed-rough", 11, FieldSpec::length()),
        Member::new("infeed-finish", 12, FieldSpec::length()),
        Member::new("wheel-number", 13, FieldSpec::int().in_float_slot()),
        Member::new("dressing-interval", 14, FieldSpec::int().in_float_slot()),
        Member::new(
            "grind-mode",
            15,
            FieldSpec::choice(1, GRIND_MODES).in_float_slot(),
        ),
    ];

    // Tool-path stations I/R, I/F, PLG, 0PT, GL1, L/O and RET, in file order.
    const STATION_MEMBERS: [[&str; 4]; 7] = [
        ["ir-x", "ir-z", "ir-a", "ir-feed"],
        ["if-x", "if-z", "if-a", "if-feed"],
        ["plg-x", "plg-z", "plg-a", "plg-feed"],
        ["0pt-x", "0pt-z", "0pt-a", "0pt-feed"],
        ["gl1-x", "gl1-z", "gl1-a", "gl1-feed"],
        ["lo-x", "lo-z", "lo-a", "lo-feed"],
        ["ret-x", "ret-z", "ret-a", "ret-feed"],
    ];
    for (i, [x, z, a, feed]) in STATION_MEMBERS.into_iter().enumerate() {
        let base = STATION_BASE + STATION_STRIDE * i as u16;
        layout.push(Member::new(x, base, FieldSpec::length().signed()));
        layout.push(Member::new(z, base + 1, FieldSpec::length().signed()));
        layout.push(Member::new(a, base + 2, FieldSpec::float().signed()));
        layout.push(Member::new(feed, base + 3, FieldSpec::length()));
    }

    layout.extend([
        Member::new("oscillation-stroke", 50, FieldSpec::length()),
        Member::new("oscillation-speed", 51, FieldSpec::length()),
        Member::new("wheel-diameter", 52, FieldSpec::length()),
        Member::new("wheel-width", 53, FieldSpec::length()),
        Member::new("surface-speed", 54, FieldSpec::float()),
        Member::new("compensation", 55, FieldSpec::length().signed()),
        Member::new("taper-correction", 56, FieldSpec::length().signed()),
        Member::new("measure-after", 57, FieldSpec::bool().in_float_slot()),
    ]);
    layout
}

fn straight_layout() -> Vec<Member> {
    vec![
        Member::new("x", 0, FieldSpec::length().signed()),
        Member::new("z", 1, FieldSpec::length().signed()),
        Member::new("angle", 2, FieldSpec::float().signed()),
        Member::new("length", 3, FieldSpec::length()),
    ]
}

fn radius_layout() -> Vec<Member> {
    vec![
        Member::new("x", 0, FieldSpec::length().signed()),
        Member::new("z", 1, FieldSpec::length().signed()),
        Member::new("radius", 2, FieldSpec::length()),
        Member::new(
            "direction",
            3,
            FieldSpec::choice(0, RADIUS_DIRECTIONS).in_float_slot(),
        ),
        Member::new("sweep", 4, FieldSpec::float().signed()),
    ]
}

/// Assembles and checks the built-in grinder schema.
pub fn build() -> Result<Schema> {
    Schema::builder()
        .field(
            "program-control-mode",
            1,
            FieldSpec::choice(4, CONTROL_MODES),
        )
        .field(
            "probe-length-mode",
            2,
            FieldSpec::choice(0, PROBE_LENGTH_MODES),
        )
        .field("program-comment", 3, FieldSpec::string(24))
        .field("stock-removal-a", 4, FieldSpec::float().signed())
        .field("stock-removal-b", 5, FieldSpec::float().signed())
        .field("stock-removal-passes", 6, FieldSpec::int())
        .field("stock-removal-x1", 9, FieldSpec::length())
        .field("stock-removal-x2", 10, FieldSpec::length())
        .field("stock-removal-z1", 11, FieldSpec::length())
        .field("stock-removal-z2", 12, FieldSpec::length())
        .field("zero-point-x", 20, FieldSpec::length().signed())
        .field("zero-point-y", 21, FieldSpec::length().signed())
        .field("zero-point-z", 22, FieldSpec::length().signed())
        .field("zero-point-a", 23, FieldSpec::float().signed())
        .field("zero-point-c", 24, FieldSpec::float().signed())
        .field(
            "page-count",
            30,
            FieldSpec::int().with_default(Value::Int(1)),
        )
        .field("measure-enabled", 31, FieldSpec::bool())
        .field("wheel-spec", 32, FieldSpec::string(16))
        .group(
            &Group::numbered("probe", 40, 10, PROBE_SET_COUNT),
            &probe_layout(),
        )
        .group(
            &Group::numbered("operation-order", 180, 100, PAGE_COUNT),
            &[Member::new("", 0, FieldSpec::int().in_float_slot())],
        )
        .group(&Group::numbered("page", 100, 100, PAGE_COUNT), &page_layout())
        .group(
            &Group::lettered("straight", 1610, 10, 'a', CONTOUR_SEGMENT_COUNT),
            &straight_layout(),
        )
        .group(
            &Group::lettered("radius", 1700, 10, 'n', CONTOUR_SEGMENT_COUNT),
            &radius_layout(),
        )
        .build()
}

static SCHEMA: OnceLock<Schema> = OnceLock::new();

/// The process-wide grinder schema, built on first use.
pub fn schema() -> &'static Schema {
    SCHEMA.get_or_init(|| {
        build().unwrap_or_else(|error| panic!("built-in field table is inconsistent: {error}"))
    })
}
