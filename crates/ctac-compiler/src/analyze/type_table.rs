//! Type table: struct/union tag to layout bindings.
//!
//! Unions share the table; whether a reference is `struct` or `union`
//! stays on the referencing `Type` node.

use std::fmt::Write;

use ctac_core::ScopedMap;

use super::SemanticError;
use crate::parser::ast::Type;

/// One member of a laid-out structure.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    /// Byte offset within the structure; a multiple of the member's
    /// alignment, and 0 for every union member.
    pub offset: i64,
}

/// A completed struct or union layout.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub tag: String,
    pub alignment: i64,
    pub size: i64,
    /// Members ordered by ascending offset.
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Scope-aware table binding tags to layouts.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    map: ScopedMap<StructDef>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_struct(
        &mut self,
        tag: &str,
        alignment: i64,
        size: i64,
        fields: Vec<FieldDef>,
        level: u32,
    ) {
        self.map.insert(
            tag,
            StructDef {
                tag: tag.to_owned(),
                alignment,
                size,
                fields,
            },
            level,
        );
    }

    /// Look up a layout; absence is a fatal error.
    pub fn find(&self, tag: &str) -> Result<&StructDef, SemanticError> {
        self.map
            .get(tag)
            .ok_or_else(|| SemanticError::UndeclaredStructure(tag.to_owned()))
    }

    pub fn find_opt(&self, tag: &str) -> Option<&StructDef> {
        self.map.get(tag)
    }

    pub fn exists(&self, tag: &str) -> bool {
        self.map.contains(tag)
    }

    /// Scope-exit hook: drop every layout stamped deeper than `level`.
    pub fn purge(&mut self, level: u32) {
        self.map.purge(level);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructDef)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render all layouts for the `-D` debug dump.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (_, def) in self.iter() {
            writeln!(
                out,
                "    struct {}: size {} bytes, alignment {}",
                def.tag, def.size, def.alignment
            )
            .unwrap();
            for field in &def.fields {
                writeln!(out, "        field {}: offset {}", field.name, field.offset).unwrap();
                writeln!(out, "            {}", field.ty).unwrap();
            }
        }
        out
    }
}
