// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/schema.rs - Field schema for CNC grinder Program Files.
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
 * # `schema` Module
 *
 * Describes every field a Program File can hold: its name, its address, how it
 * is stored on disk, and how its value is interpreted.
 *
 * Schemas are assembled with a [SchemaBuilder] from one-off fields and from
 * repeating [Group]s, where each member of the group gets the address
 * `base + stride * slot + offset`. The finished [Schema] is immutable and
 * looks fields up by name or by address.
 *
 * ## Usage Example
 *
 * ```
 * use grindprog::schema::{FieldSpec, Group, Member, Schema};
 *
 * let schema = Schema::builder()
 *     .field("feed", 4, FieldSpec::length())
 *     .group(
 *         &Group::numbered("probe", 40, 10, 2),
 *         &[Member::new("x", 0, FieldSpec::length().signed())],
 *     )
 *     .build()
 *     .unwrap();
 *
 * assert_eq!(schema.get("probe-2-x").unwrap().address, 50);
 * ```
 */

use std::collections::HashMap;

use crate::address::Storage;
use crate::error::{ProgramError, Result};
use crate::value::Value;

/// The kind of value a field holds, without its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Choice,
    Float,
    Int,
    String,
}

/// How a field's value is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Bool,
    /// Stored as `base + label index`.
    Choice {
        base: i32,
        labels: &'static [&'static str],
    },
    /// Metric fields are stored in millimeters and presented in inches.
    Float { metric: bool, allow_negative: bool },
    Int,
    /// Written padded or truncated to exactly `width` characters.
    String { width: u8 },
}

impl FieldKind {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FieldKind::Bool => ValueKind::Bool,
            FieldKind::Choice { .. } => ValueKind::Choice,
            FieldKind::Float { .. } => ValueKind::Float,
            FieldKind::Int => ValueKind::Int,
            FieldKind::String { .. } => ValueKind::String,
        }
    }
}

/// Everything about a field except its name and address.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub storage: Storage,
    pub kind: FieldKind,
    /// Default value, in logical units.
    pub default: Value,
}

impl FieldSpec {
    pub fn bool() -> Self {
        Self {
            storage: Storage::Int,
            kind: FieldKind::Bool,
            default: Value::Bool(false),
        }
    }

    pub fn int() -> Self {
        Self {
            storage: Storage::Int,
            kind: FieldKind::Int,
            default: Value::Int(0),
        }
    }

    pub fn choice(base: i32, labels: &'static [&'static str]) -> Self {
        Self {
            storage: Storage::Int,
            kind: FieldKind::Choice { base, labels },
            default: Value::Choice(0),
        }
    }

    /// A plain, non-negative float.
    pub fn float() -> Self {
        Self {
            storage: Storage::Float,
            kind: FieldKind::Float {
                metric: false,
                allow_negative: false,
            },
            default: Value::Float(0.0),
        }
    }

    /// A non-negative length, stored in millimeters.
    pub fn length() -> Self {
        Self {
            storage: Storage::Float,
            kind: FieldKind::Float {
                metric: true,
                allow_negative: false,
            },
            default: Value::Float(0.0),
        }
    }

    pub fn string(width: u8) -> Self {
        Self {
            storage: Storage::String,
            kind: FieldKind::String { width },
            default: Value::Text(String::new()),
        }
    }

    /// Allows negative values on a float field.
    pub fn signed(mut self) -> Self {
        if let FieldKind::Float { allow_negative, .. } = &mut self.kind {
            *allow_negative = true;
        }
        self
    }

    /// Stores a boolean, choice, or integer under a float tag, which is how
    /// fields above address 255 are written.
    pub fn in_float_slot(mut self) -> Self {
        if self.storage == Storage::Int {
            self.storage = Storage::Float;
        }
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// An immutable schema entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub address: u16,
    pub storage: Storage,
    pub kind: FieldKind,
    pub default: Value,
}

/// One member of a repeating group layout.
#[derive(Debug, Clone)]
pub struct Member {
    /// Appended to the slot name; empty for single-member groups.
    pub suffix: &'static str,
    pub offset: u16,
    pub spec: FieldSpec,
}

impl Member {
    pub fn new(suffix: &'static str, offset: u16, spec: FieldSpec) -> Self {
        Self {
            suffix,
            offset,
            spec,
        }
    }
}

/// A run of identically laid out slots.
///
/// Slot `i` is named `{prefix}-{keys[i]}` and starts at `base + stride * i`.
#[derive(Debug, Clone)]
pub struct Group {
    pub prefix: &'static str,
    pub base: u16,
    pub stride: u16,
    pub keys: Vec<String>,
}

impl Group {
    /// Slots keyed `1..=count`.
    pub fn numbered(prefix: &'static str, base: u16, stride: u16, count: u16) -> Self {
        Self {
            prefix,
            base,
            stride,
            keys: (1..=count).map(|n| n.to_string()).collect(),
        }
    }

    /// Slots keyed by consecutive letters starting at `first`.
    pub fn lettered(prefix: &'static str, base: u16, stride: u16, first: char, count: u8) -> Self {
        Self {
            prefix,
            base,
            stride,
            keys: (0..count)
                .filter_map(|i| char::from_u32(u32::from(first) + u32::from(i)))
                .map(String::from)
                .collect(),
        }
    }
}

/// Collects field declarations and checks them into a [Schema].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: &str, address: u16, spec: FieldSpec) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            address,
            storage: spec.storage,
            kind: spec.kind,
            default: spec.default,
        });
        self
    }

    pub fn group(mut self, group: &Group, layout: &[Member]) -> Self {
        for (slot, key) in group.keys.iter().enumerate() {
            let slot_base = group.base + group.stride * slot as u16;
            for member in layout {
                let name = if member.suffix.is_empty() {
                    format!("{}-{}", group.prefix, key)
                } else {
                    format!("{}-{}-{}", group.prefix, key, member.suffix)
                };
                self = self.field(&name, slot_base + member.offset, member.spec.clone());
            }
        }
        self
    }

    /// Checks that every address is representable under its storage tag and
    /// that names and addresses are unique.
    pub fn build(self) -> Result<Schema> {
        let mut by_name = HashMap::with_capacity(self.fields.len());
        let mut by_address: HashMap<u16, usize> = HashMap::with_capacity(self.fields.len());

        for (i, field) in self.fields.iter().enumerate() {
            if field.address > field.storage.max_address() {
                return Err(ProgramError::UnrepresentableAddress(field.address));
            }
            if by_name.insert(field.name.clone(), i).is_some() {
                return Err(ProgramError::DuplicateName(field.name.clone()));
            }
            if let Some(&first) = by_address.get(&field.address) {
                return Err(ProgramError::DuplicateAddress {
                    address: field.address,
                    first: self.fields[first].name.clone(),
                    second: field.name.clone(),
                });
            }
            by_address.insert(field.address, i);
        }

        Ok(Schema {
            fields: self.fields,
            by_name,
            by_address,
        })
    }
}

/// A checked, read-only set of field descriptors.
#[derive(Debug)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    by_address: HashMap<u16, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// All descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.position(name).map(|i| &self.fields[i])
    }

    pub fn position_of_address(&self, address: u16) -> Option<usize> {
        self.by_address.get(&address).copied()
    }

    pub fn by_address(&self, address: u16) -> Option<&FieldDescriptor> {
        self.position_of_address(address).map(|i| &self.fields[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_addresses() {
        let schema = Schema::builder()
            .group(
                &Group::numbered("page", 100, 100, 3),
                &[
                    Member::new("speed", 0, FieldSpec::int().in_float_slot()),
                    Member::new("feed", 8, FieldSpec::length()),
                ],
            )
            .build()
            .unwrap();

        assert_eq!(schema.len(), 6);
        assert_eq!(schema.get("page-1-speed").unwrap().address, 100);
        assert_eq!(schema.get("page-3-feed").unwrap().address, 308);
        assert_eq!(schema.by_address(208).unwrap().name, "page-2-feed");
        assert_eq!(schema.get("page-2-speed").unwrap().storage, Storage::Float);
    }

    #[test]
    fn test_single_member_group_names() {
        let schema = Schema::builder()
            .group(
                &Group::numbered("operation-order", 180, 100, 2),
                &[Member::new("", 0, FieldSpec::int().in_float_slot())],
            )
            .build()
            .unwrap();
        assert_eq!(schema.get("operation-order-2").unwrap().address, 280);
    }

    #[test]
    fn test_lettered_group() {
        let group = Group::lettered("radius", 1700, 10, 'n', 9);
        assert_eq!(group.keys.first().map(String::as_str), Some("n"));
        assert_eq!(group.keys.last().map(String::as_str), Some("v"));
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let result = Schema::builder()
            .field("a", 4, FieldSpec::float())
            .field("b", 4, FieldSpec::length())
            .build();
        assert!(matches!(
            result,
            Err(ProgramError::DuplicateAddress { address: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Schema::builder()
            .field("a", 4, FieldSpec::float())
            .field("a", 5, FieldSpec::float())
            .build();
        assert!(matches!(result, Err(ProgramError::DuplicateName(_))));
    }

    #[test]
    fn test_unrepresentable_address_rejected() {
        let result = Schema::builder()
            .field("far", 1792, FieldSpec::float())
            .build();
        assert!(matches!(
            result,
            Err(ProgramError::UnrepresentableAddress(1792))
        ));

        let result = Schema::builder().field("wide", 300, FieldSpec::int()).build();
        assert!(matches!(
            result,
            Err(ProgramError::UnrepresentableAddress(300))
        ));
    }

    #[test]
    fn test_spec_modifiers() {
        let spec = FieldSpec::length().signed();
        assert_eq!(
            spec.kind,
            FieldKind::Float {
                metric: true,
                allow_negative: true
            }
        );

        // Strings never move to a float slot.
        assert_eq!(FieldSpec::string(8).in_float_slot().storage, Storage::String);
        assert_eq!(FieldSpec::bool().in_float_slot().storage, Storage::Float);
    }
}
