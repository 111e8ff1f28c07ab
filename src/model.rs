//! Data model for the resolved taxonomy set.
//!
//! The source documents form a cyclic graph (schemas import each other,
//! records point back at their containers), so cross-references between
//! schemas are arena indices: every loaded schema is interned once by the
//! loader and addressed by [`SchemaId`]. Within one schema, linkbases and
//! their links/locators/arcs/records are plain owned vectors in source
//! order.

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Index of an interned schema in the loader's store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(pub(crate) u32);

impl SchemaId {
    /// Placeholder owner for declarations that have not been interned yet.
    /// Assigned a real value when the owning schema enters the store.
    pub const UNSET: SchemaId = SchemaId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for SchemaId {
    fn default() -> Self {
        SchemaId::UNSET
    }
}

/// A qualified XML name: namespace URI plus local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QName {
    pub namespace: String,
    pub local: String,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// One taxonomy schema document and everything it references.
#[derive(Debug, Default)]
pub struct Schema {
    /// Canonical path or URL this schema was loaded from
    pub path: String,
    pub target_namespace: String,
    pub elements: Vec<ElementDecl>,
    pub imports: Vec<ImportDecl>,
    pub role_types: Vec<RoleType>,
    /// Raw linkbaseRef entries as they appeared in the annotation block
    pub linkbase_refs: Vec<LinkbaseRef>,
    pub label_linkbases: Vec<LabelLinkbase>,
    pub reference_linkbases: Vec<ReferenceLinkbase>,
    pub presentation_linkbases: Vec<PresentationLinkbase>,
    pub definition_linkbases: Vec<DefinitionLinkbase>,
    pub calculation_linkbases: Vec<CalculationLinkbase>,
    pub generic_linkbases: Vec<GenericLinkbase>,
}

/// Top-level element declaration in a taxonomy schema.
///
/// `is_abstract` and `nillable` keep the attribute text verbatim; the
/// taxonomy serializes booleans inconsistently and downstream rendering
/// echoes them as-is.
#[derive(Debug, Clone, Default)]
pub struct ElementDecl {
    pub id: String,
    pub name: String,
    pub xsd_type: String,
    pub substitution_group: String,
    pub is_abstract: String,
    pub nillable: String,
    pub period_type: String,
    /// Owning schema, assigned when the schema is interned
    pub schema: SchemaId,
}

/// Role type declaration from a schema annotation block.
#[derive(Debug, Clone, Default)]
pub struct RoleType {
    pub id: String,
    pub role_uri: String,
    pub definition: String,
    pub used_on: Vec<String>,
    /// Owning schema, assigned when the schema is interned
    pub schema: SchemaId,
}

/// `xsd:import` edge to another schema.
#[derive(Debug)]
pub struct ImportDecl {
    pub namespace: String,
    pub schema_location: String,
    /// Set once by the loader: `Some(id)` when the target was loaded,
    /// `None` for skipped standard schemas and failed secondary loads.
    pub(crate) resolved: OnceLock<Option<SchemaId>>,
}

impl ImportDecl {
    pub fn new(namespace: String, schema_location: String) -> Self {
        Self {
            namespace,
            schema_location,
            resolved: OnceLock::new(),
        }
    }

    /// The imported schema, when it was fetched and decoded.
    pub fn resolved_schema(&self) -> Option<SchemaId> {
        self.resolved.get().copied().flatten()
    }
}

/// Raw `linkbaseRef` entry; the `role` attribute selects the linkbase kind.
#[derive(Debug, Clone, Default)]
pub struct LinkbaseRef {
    pub href: String,
    pub role: String,
    pub arcrole: String,
}

/// Locator inside an extended link: local label bound to an unresolved href.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    pub label: String,
    pub href: String,
}

// ---------------------------------------------------------------------------
// Label linkbase
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LabelLinkbase {
    pub path: Arc<str>,
    pub links: Vec<LabelLink>,
}

/// One `labelLink` extended link.
#[derive(Debug, Default)]
pub struct LabelLink {
    pub role: String,
    pub locators: Vec<Locator>,
    pub arcs: Vec<LabelArc>,
    pub labels: Vec<LabelRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct LabelArc {
    pub from: String,
    pub to: String,
}

/// Human-readable label resource.
#[derive(Debug, Clone, Default)]
pub struct LabelRecord {
    pub label: String,
    pub lang: String,
    pub role: String,
    pub id: String,
    pub value: String,
    /// Path of the owning linkbase, back-linked after decode
    pub linkbase_path: Arc<str>,
}

impl LabelRecord {
    /// `path#id` href of this record, when it carries an id.
    pub fn href(&self) -> Option<String> {
        if self.id.is_empty() {
            None
        } else {
            Some(format!("{}#{}", self.linkbase_path, self.id))
        }
    }
}

// ---------------------------------------------------------------------------
// Reference linkbase
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ReferenceLinkbase {
    pub path: Arc<str>,
    pub links: Vec<ReferenceLink>,
}

#[derive(Debug, Default)]
pub struct ReferenceLink {
    pub role: String,
    pub locators: Vec<Locator>,
    pub arcs: Vec<ReferenceArc>,
    pub references: Vec<ReferenceRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceArc {
    pub from: String,
    pub to: String,
}

/// Authoritative-literature reference resource (EDINET payload fields).
#[derive(Debug, Clone, Default)]
pub struct ReferenceRecord {
    pub label: String,
    pub role: String,
    pub publisher: String,
    pub number: String,
    pub name: String,
    pub article: String,
    pub issue_date: String,
    pub industry_abbreviation: String,
    /// Path of the owning linkbase, back-linked after decode
    pub linkbase_path: Arc<str>,
}

// ---------------------------------------------------------------------------
// Presentation linkbase
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PresentationLinkbase {
    pub path: Arc<str>,
    pub links: Vec<PresentationLink>,
}

#[derive(Debug, Default)]
pub struct PresentationLink {
    pub role: String,
    pub locators: Vec<Locator>,
    pub arcs: Vec<PresentationArc>,
}

#[derive(Debug, Clone, Default)]
pub struct PresentationArc {
    pub from: String,
    pub to: String,
    /// Verbatim `order` attribute; see [`PresentationArc::order_value`]
    pub order: String,
    pub preferred_label: String,
}

impl PresentationArc {
    /// Numeric sibling order; unparseable values sort as 1.0.
    pub fn order_value(&self) -> f64 {
        self.order.parse().unwrap_or(1.0)
    }
}

// ---------------------------------------------------------------------------
// Definition linkbase
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DefinitionLinkbase {
    pub path: Arc<str>,
    pub links: Vec<DefinitionLink>,
}

#[derive(Debug, Default)]
pub struct DefinitionLink {
    pub role: String,
    pub locators: Vec<Locator>,
    pub arcs: Vec<DefinitionArc>,
}

#[derive(Debug, Clone, Default)]
pub struct DefinitionArc {
    pub from: String,
    pub to: String,
    pub arcrole: String,
    pub order: String,
}

// ---------------------------------------------------------------------------
// Calculation linkbase
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CalculationLinkbase {
    pub path: Arc<str>,
    pub links: Vec<CalculationLink>,
}

#[derive(Debug, Default)]
pub struct CalculationLink {
    pub role: String,
    pub locators: Vec<Locator>,
    pub arcs: Vec<CalculationArc>,
}

#[derive(Debug, Clone, Default)]
pub struct CalculationArc {
    pub from: String,
    pub to: String,
    pub arcrole: String,
    pub order: f64,
}

// ---------------------------------------------------------------------------
// Generic linkbase
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct GenericLinkbase {
    pub path: Arc<str>,
    pub links: Vec<GenericLink>,
}

#[derive(Debug, Default)]
pub struct GenericLink {
    pub role: String,
    pub locators: Vec<Locator>,
    pub arcs: Vec<GenericArc>,
    pub labels: Vec<GenericLabelRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct GenericArc {
    pub from: String,
    pub to: String,
}

/// Generic label resource, used for role-type labels.
#[derive(Debug, Clone, Default)]
pub struct GenericLabelRecord {
    pub label: String,
    pub lang: String,
    pub role: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// XBRL instance: either decoded from a native `<xbrl>` document or
/// assembled from inline-XBRL files.
#[derive(Debug, Default)]
pub struct Instance {
    pub path: String,
    pub schema_ref: SchemaRef,
    pub role_refs: Vec<RoleRef>,
    pub contexts: Vec<Context>,
    pub units: Vec<Unit>,
    pub facts: Vec<Fact>,
}

impl Instance {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct SchemaRef {
    pub href: String,
    pub schema: Option<SchemaId>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleRef {
    pub role_uri: String,
    pub href: String,
}

/// Reporting frame of a fact: entity, period, dimensional scenario.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub id: String,
    pub entity: Entity,
    pub period: Period,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Default)]
pub struct Entity {
    pub identifier: Identifier,
}

#[derive(Debug, Clone, Default)]
pub struct Identifier {
    pub scheme: String,
    pub value: String,
}

/// Duration (`start_date`/`end_date`) or point in time (`instant`);
/// whichever the document carried is non-empty.
#[derive(Debug, Clone, Default)]
pub struct Period {
    pub start_date: String,
    pub end_date: String,
    pub instant: String,
}

/// Dimensional qualifiers, preserved verbatim and not validated.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub members: Vec<DimensionMember>,
}

#[derive(Debug, Clone, Default)]
pub struct DimensionMember {
    pub dimension: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct Unit {
    pub id: String,
    pub measure: String,
}

/// One reported datum.
#[derive(Debug, Clone, Default)]
pub struct Fact {
    pub name: QName,
    pub context_ref: String,
    pub unit_ref: String,
    pub decimals: String,
    /// Verbatim `xsi:nil` attribute
    pub nil: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// EDINET-style filing manifest.
#[derive(Debug, Default)]
pub struct Manifest {
    pub path: String,
    pub toc: TocComposition,
    pub list: ManifestList,
}

#[derive(Debug, Clone, Default)]
pub struct TocComposition {
    pub titles: Vec<TocTitle>,
    pub items: Vec<TocItem>,
}

#[derive(Debug, Clone, Default)]
pub struct TocTitle {
    pub lang: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct TocItem {
    pub in_file: String,
    pub reference: String,
    pub extrole: String,
}

#[derive(Debug, Default)]
pub struct ManifestList {
    pub descriptors: Vec<InstanceDescriptor>,
    /// Instances resolved from the descriptors, in descriptor order
    pub instances: Vec<Instance>,
}

/// One `<instance>` entry in the manifest list.
#[derive(Debug, Clone, Default)]
pub struct InstanceDescriptor {
    pub id: String,
    pub doc_type: String,
    pub preferred_filename: String,
    /// Inline-XBRL member files; empty for native instances
    pub ixbrl_files: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        let name = QName {
            namespace: "http://example.com/jp".to_string(),
            local: "Sales".to_string(),
        };
        assert_eq!(name.to_string(), "{http://example.com/jp}Sales");

        let bare = QName {
            namespace: String::new(),
            local: "Sales".to_string(),
        };
        assert_eq!(bare.to_string(), "Sales");
    }

    #[test]
    fn test_presentation_arc_order_value() {
        let arc = PresentationArc {
            order: "2.5".to_string(),
            ..Default::default()
        };
        assert_eq!(arc.order_value(), 2.5);

        let missing = PresentationArc::default();
        assert_eq!(missing.order_value(), 1.0);

        let garbage = PresentationArc {
            order: "first".to_string(),
            ..Default::default()
        };
        assert_eq!(garbage.order_value(), 1.0);
    }

    #[test]
    fn test_label_record_href() {
        let record = LabelRecord {
            id: "label_Sales".to_string(),
            linkbase_path: Arc::from("/tax/jpcrp_lab.xml"),
            ..Default::default()
        };
        assert_eq!(
            record.href().as_deref(),
            Some("/tax/jpcrp_lab.xml#label_Sales")
        );

        let anonymous = LabelRecord::default();
        assert_eq!(anonymous.href(), None);
    }

    #[test]
    fn test_import_decl_resolution() {
        let import = ImportDecl::new("http://example.com/ns".into(), "other.xsd".into());
        assert_eq!(import.resolved_schema(), None);

        import.resolved.set(Some(SchemaId(3))).unwrap();
        assert_eq!(import.resolved_schema(), Some(SchemaId(3)));
    }
}
