//! Graph indexer.
//!
//! Locators address taxonomy declarations as `schema-path#id` hrefs. These
//! flattenings walk a schema's import closure preorder and build the lookup
//! maps traversals resolve those hrefs against. Schemas shared between
//! import branches are visited once; duplicate keys overwrite, which is
//! harmless because every duplicate points at the same interned record.

use std::collections::{HashMap, HashSet};

use crate::loader::DtsSnapshot;
use crate::model::{ElementDecl, RoleType, SchemaId};

/// Insert `schema-path#element-id` → element for every declaration in the
/// import closure of `root`.
pub fn collect_elements<'a>(
    dts: &'a DtsSnapshot,
    root: SchemaId,
    out: &mut HashMap<String, &'a ElementDecl>,
) {
    let mut visited = HashSet::new();
    collect_elements_inner(dts, root, &mut visited, out);
}

fn collect_elements_inner<'a>(
    dts: &'a DtsSnapshot,
    id: SchemaId,
    visited: &mut HashSet<SchemaId>,
    out: &mut HashMap<String, &'a ElementDecl>,
) {
    if !visited.insert(id) {
        return;
    }
    let Some(schema) = dts.schema(id) else {
        return;
    };

    for element in &schema.elements {
        out.insert(format!("{}#{}", schema.path, element.id), element);
    }
    for import in &schema.imports {
        if let Some(child) = import.resolved_schema() {
            collect_elements_inner(dts, child, visited, out);
        }
    }
}

/// Insert `schema-path#roletype-id` → role type, analogous to
/// [`collect_elements`].
pub fn collect_role_types<'a>(
    dts: &'a DtsSnapshot,
    root: SchemaId,
    out: &mut HashMap<String, &'a RoleType>,
) {
    let mut visited = HashSet::new();
    collect_role_types_inner(dts, root, &mut visited, out);
}

fn collect_role_types_inner<'a>(
    dts: &'a DtsSnapshot,
    id: SchemaId,
    visited: &mut HashSet<SchemaId>,
    out: &mut HashMap<String, &'a RoleType>,
) {
    if !visited.insert(id) {
        return;
    }
    let Some(schema) = dts.schema(id) else {
        return;
    };

    for role_type in &schema.role_types {
        out.insert(format!("{}#{}", schema.path, role_type.id), role_type);
    }
    for import in &schema.imports {
        if let Some(child) = import.resolved_schema() {
            collect_role_types_inner(dts, child, visited, out);
        }
    }
}
