//! Linkbase traversal.
//!
//! Joins arcs, locators, and endpoint records across the whole DTS into
//! role-grouped typed relations. One generic DFS serves the four
//! element-anchored kinds (label, reference, presentation, definition); it
//! marks both schema paths and linkbase paths as visited so a linkbase
//! reachable along two import paths contributes its arcs once. The generic
//! linkbase walk anchors on role types instead of elements.
//!
//! Dangling arc labels and locator hrefs that resolve to nothing are
//! structural errors that abort the traversal with the offending label or
//! href.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::error::{Result, XbrlError};
use crate::href::resolve_href;
use crate::index::{collect_elements, collect_role_types};
use crate::loader::DtsSnapshot;
use crate::model::*;

/// One resolved arc: typed endpoints plus the arc itself, grouped under the
/// role URI of the extended link it came from.
#[derive(Debug)]
pub struct ArcRelation<'a, A, From, To> {
    /// Role URI of the owning extended link; the grouping key
    pub role: String,
    pub arc: &'a A,
    pub from: &'a From,
    pub to: &'a To,
}

pub type LabelRelation<'a> = ArcRelation<'a, LabelArc, ElementDecl, LabelRecord>;
pub type ReferenceRelation<'a> = ArcRelation<'a, ReferenceArc, ElementDecl, ReferenceRecord>;
pub type PresentationRelation<'a> = ArcRelation<'a, PresentationArc, ElementDecl, ElementDecl>;
pub type DefinitionRelation<'a> = ArcRelation<'a, DefinitionArc, ElementDecl, ElementDecl>;
pub type GenericRelation<'a> = ArcRelation<'a, GenericArc, RoleType, GenericLabelRecord>;

/// Relations for one traversal, grouped by extended-link role URI.
pub type RelationMap<'a, A, From, To> = BTreeMap<String, Vec<ArcRelation<'a, A, From, To>>>;

fn group_by_role<A, F, T>(relations: Vec<ArcRelation<'_, A, F, T>>) -> RelationMap<'_, A, F, T> {
    let mut grouped: RelationMap<'_, A, F, T> = BTreeMap::new();
    for relation in relations {
        grouped
            .entry(relation.role.clone())
            .or_default()
            .push(relation);
    }
    grouped
}

fn locator_map(locators: &[Locator]) -> HashMap<&str, &Locator> {
    locators
        .iter()
        .map(|locator| (locator.label.as_str(), locator))
        .collect()
}

fn arc_endpoint<'m, V: Copy>(
    map: &'m HashMap<&str, V>,
    label: &str,
    side: &'static str,
) -> Result<V> {
    map.get(label).copied().ok_or_else(|| XbrlError::ArcEndpointMissing {
        side,
        label: label.to_string(),
    })
}

fn element_by_href<'a>(
    elements: &HashMap<String, &'a ElementDecl>,
    base: &str,
    href: &str,
) -> Result<&'a ElementDecl> {
    let key = resolve_href(base, href);
    elements
        .get(&key)
        .copied()
        .ok_or(XbrlError::UnresolvedLocator { href: key })
}

/// DFS over the import closure, visiting each schema and each linkbase path
/// once. `linkbase_paths` selects the kind-specific linkbase list;
/// `collect` turns one linkbase into relations.
fn dfs_link<'a, R>(
    dts: &'a DtsSnapshot,
    id: SchemaId,
    visited: &mut HashSet<String>,
    linkbase_paths: &impl Fn(&'a Schema) -> Vec<&'a str>,
    collect: &impl Fn(&'a Schema, &'a str) -> Result<Vec<R>>,
    out: &mut Vec<R>,
) -> Result<()> {
    let Some(schema) = dts.schema(id) else {
        return Ok(());
    };
    if !visited.insert(schema.path.clone()) {
        return Ok(());
    }

    for path in linkbase_paths(schema) {
        if !visited.insert(path.to_string()) {
            continue;
        }
        out.extend(collect(schema, path)?);
    }

    for import in &schema.imports {
        if let Some(child) = import.resolved_schema() {
            dfs_link(dts, child, visited, linkbase_paths, collect, out)?;
        }
    }
    Ok(())
}

/// Element → label relations over the whole DTS rooted at `root`.
pub fn traverse_label_links<'a>(
    dts: &'a DtsSnapshot,
    root: SchemaId,
) -> Result<BTreeMap<String, Vec<LabelRelation<'a>>>> {
    let mut elements = HashMap::new();
    collect_elements(dts, root, &mut elements);

    let mut relations = Vec::new();
    dfs_link(
        dts,
        root,
        &mut HashSet::new(),
        &|schema| {
            schema
                .label_linkbases
                .iter()
                .map(|lb| &*lb.path)
                .collect()
        },
        &|schema, path| {
            let linkbase = schema
                .label_linkbases
                .iter()
                .find(|lb| &*lb.path == path)
                .ok_or_else(|| XbrlError::LinkbaseNotFound {
                    path: path.to_string(),
                })?;

            let mut relations = Vec::new();
            for link in &linkbase.links {
                let locators = locator_map(&link.locators);
                let records: HashMap<&str, &LabelRecord> = link
                    .labels
                    .iter()
                    .map(|record| (record.label.as_str(), record))
                    .collect();

                for arc in &link.arcs {
                    let locator = arc_endpoint(&locators, &arc.from, "from")?;
                    let record = arc_endpoint(&records, &arc.to, "to")?;
                    let element = element_by_href(&elements, path, &locator.href)?;
                    relations.push(ArcRelation {
                        role: link.role.clone(),
                        arc,
                        from: element,
                        to: record,
                    });
                }
            }
            Ok(relations)
        },
        &mut relations,
    )?;

    Ok(group_by_role(relations))
}

/// Element → reference relations over the whole DTS rooted at `root`.
pub fn traverse_reference_links<'a>(
    dts: &'a DtsSnapshot,
    root: SchemaId,
) -> Result<BTreeMap<String, Vec<ReferenceRelation<'a>>>> {
    let mut elements = HashMap::new();
    collect_elements(dts, root, &mut elements);

    let mut relations = Vec::new();
    dfs_link(
        dts,
        root,
        &mut HashSet::new(),
        &|schema| {
            schema
                .reference_linkbases
                .iter()
                .map(|lb| &*lb.path)
                .collect()
        },
        &|schema, path| {
            let linkbase = schema
                .reference_linkbases
                .iter()
                .find(|lb| &*lb.path == path)
                .ok_or_else(|| XbrlError::LinkbaseNotFound {
                    path: path.to_string(),
                })?;

            let mut relations = Vec::new();
            for link in &linkbase.links {
                let locators = locator_map(&link.locators);
                let records: HashMap<&str, &ReferenceRecord> = link
                    .references
                    .iter()
                    .map(|record| (record.label.as_str(), record))
                    .collect();

                for arc in &link.arcs {
                    let locator = arc_endpoint(&locators, &arc.from, "from")?;
                    let record = arc_endpoint(&records, &arc.to, "to")?;
                    let element = element_by_href(&elements, path, &locator.href)?;
                    relations.push(ArcRelation {
                        role: link.role.clone(),
                        arc,
                        from: element,
                        to: record,
                    });
                }
            }
            Ok(relations)
        },
        &mut relations,
    )?;

    Ok(group_by_role(relations))
}

/// Parent element → child element presentation relations.
pub fn traverse_presentation_links<'a>(
    dts: &'a DtsSnapshot,
    root: SchemaId,
) -> Result<BTreeMap<String, Vec<PresentationRelation<'a>>>> {
    let mut elements = HashMap::new();
    collect_elements(dts, root, &mut elements);

    let mut relations = Vec::new();
    dfs_link(
        dts,
        root,
        &mut HashSet::new(),
        &|schema| {
            schema
                .presentation_linkbases
                .iter()
                .map(|lb| &*lb.path)
                .collect()
        },
        &|schema, path| {
            let linkbase = schema
                .presentation_linkbases
                .iter()
                .find(|lb| &*lb.path == path)
                .ok_or_else(|| XbrlError::LinkbaseNotFound {
                    path: path.to_string(),
                })?;

            let mut relations = Vec::new();
            for link in &linkbase.links {
                let locators = locator_map(&link.locators);
                for arc in &link.arcs {
                    let from_locator = arc_endpoint(&locators, &arc.from, "from")?;
                    let from = element_by_href(&elements, path, &from_locator.href)?;
                    let to_locator = arc_endpoint(&locators, &arc.to, "to")?;
                    let to = element_by_href(&elements, path, &to_locator.href)?;
                    relations.push(ArcRelation {
                        role: link.role.clone(),
                        arc,
                        from,
                        to,
                    });
                }
            }
            Ok(relations)
        },
        &mut relations,
    )?;

    Ok(group_by_role(relations))
}

/// Element → element definition relations.
pub fn traverse_definition_links<'a>(
    dts: &'a DtsSnapshot,
    root: SchemaId,
) -> Result<BTreeMap<String, Vec<DefinitionRelation<'a>>>> {
    let mut elements = HashMap::new();
    collect_elements(dts, root, &mut elements);

    let mut relations = Vec::new();
    dfs_link(
        dts,
        root,
        &mut HashSet::new(),
        &|schema| {
            schema
                .definition_linkbases
                .iter()
                .map(|lb| &*lb.path)
                .collect()
        },
        &|schema, path| {
            let linkbase = schema
                .definition_linkbases
                .iter()
                .find(|lb| &*lb.path == path)
                .ok_or_else(|| XbrlError::LinkbaseNotFound {
                    path: path.to_string(),
                })?;

            let mut relations = Vec::new();
            for link in &linkbase.links {
                let locators = locator_map(&link.locators);
                for arc in &link.arcs {
                    let from_locator = arc_endpoint(&locators, &arc.from, "from")?;
                    let from = element_by_href(&elements, path, &from_locator.href)?;
                    let to_locator = arc_endpoint(&locators, &arc.to, "to")?;
                    let to = element_by_href(&elements, path, &to_locator.href)?;
                    relations.push(ArcRelation {
                        role: link.role.clone(),
                        arc,
                        from,
                        to,
                    });
                }
            }
            Ok(relations)
        },
        &mut relations,
    )?;

    Ok(group_by_role(relations))
}

/// Role type → generic label relations. Anchored on the role-type index
/// rather than the element index.
pub fn traverse_generic_links<'a>(
    dts: &'a DtsSnapshot,
    root: SchemaId,
) -> Result<BTreeMap<String, Vec<GenericRelation<'a>>>> {
    let mut role_types = HashMap::new();
    collect_role_types(dts, root, &mut role_types);

    let mut relations = Vec::new();
    dfs_generic(dts, root, &mut HashSet::new(), &role_types, &mut relations)?;
    Ok(group_by_role(relations))
}

fn dfs_generic<'a>(
    dts: &'a DtsSnapshot,
    id: SchemaId,
    visited: &mut HashSet<String>,
    role_types: &HashMap<String, &'a RoleType>,
    out: &mut Vec<GenericRelation<'a>>,
) -> Result<()> {
    let Some(schema) = dts.schema(id) else {
        return Ok(());
    };
    if !visited.insert(schema.path.clone()) {
        return Ok(());
    }

    for linkbase in &schema.generic_linkbases {
        if !visited.insert(linkbase.path.to_string()) {
            continue;
        }

        for link in &linkbase.links {
            let locators = locator_map(&link.locators);
            let records: HashMap<&str, &GenericLabelRecord> = link
                .labels
                .iter()
                .map(|record| (record.label.as_str(), record))
                .collect();

            for arc in &link.arcs {
                let locator = arc_endpoint(&locators, &arc.from, "from")?;
                let record = arc_endpoint(&records, &arc.to, "to")?;
                let key = resolve_href(&linkbase.path, &locator.href);
                let role_type =
                    role_types
                        .get(&key)
                        .copied()
                        .ok_or(XbrlError::UnresolvedLocator { href: key })?;
                out.push(ArcRelation {
                    role: link.role.clone(),
                    arc,
                    from: role_type,
                    to: record,
                });
            }
        }
    }

    for import in &schema.imports {
        if let Some(child) = import.resolved_schema() {
            dfs_generic(dts, child, visited, role_types, out)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Topology utilities
// ---------------------------------------------------------------------------

/// Typed arc endpoint. Only element endpoints count as "consumed" when
/// looking for roots, so label and reference targets never hide a tree root.
pub trait Endpoint {
    fn as_element(&self) -> Option<&ElementDecl>;
}

impl Endpoint for ElementDecl {
    fn as_element(&self) -> Option<&ElementDecl> {
        Some(self)
    }
}

impl Endpoint for LabelRecord {
    fn as_element(&self) -> Option<&ElementDecl> {
        None
    }
}

impl Endpoint for ReferenceRecord {
    fn as_element(&self) -> Option<&ElementDecl> {
        None
    }
}

impl Endpoint for GenericLabelRecord {
    fn as_element(&self) -> Option<&ElementDecl> {
        None
    }
}

impl Endpoint for RoleType {
    fn as_element(&self) -> Option<&ElementDecl> {
        None
    }
}

/// `from` endpoints that never appear as a `to` element in any relation,
/// deduplicated by identity in first-seen order.
pub fn find_roots<'a, A, F, T>(relations: &[ArcRelation<'a, A, F, T>]) -> Vec<&'a F>
where
    F: Endpoint,
    T: Endpoint,
{
    let consumed: HashSet<*const ElementDecl> = relations
        .iter()
        .filter_map(|relation| relation.to.as_element())
        .map(|element| element as *const ElementDecl)
        .collect();

    let mut seen = HashSet::new();
    let mut roots = Vec::new();
    for relation in relations {
        if !seen.insert(relation.from as *const F) {
            continue;
        }
        let is_consumed = relation
            .from
            .as_element()
            .map(|element| consumed.contains(&(element as *const ElementDecl)))
            .unwrap_or(false);
        if !is_consumed {
            roots.push(relation.from);
        }
    }
    roots
}

/// Identity key over a shared endpoint, for adjacency lookups.
pub struct RefKey<'a, T>(pub &'a T);

impl<'a, T> Clone for RefKey<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for RefKey<'a, T> {}

impl<'a, T> PartialEq for RefKey<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl<'a, T> Eq for RefKey<'a, T> {}

impl<'a, T> Hash for RefKey<'a, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0 as *const T as usize).hash(state);
    }
}

/// `from` endpoint → its outgoing relations, preserving source order.
pub fn build_adjacency<'a, 'r, A, F, T>(
    relations: &'r [ArcRelation<'a, A, F, T>],
) -> HashMap<RefKey<'a, F>, Vec<&'r ArcRelation<'a, A, F, T>>> {
    let mut adjacency: HashMap<RefKey<'a, F>, Vec<&'r ArcRelation<'a, A, F, T>>> = HashMap::new();
    for relation in relations {
        adjacency
            .entry(RefKey(relation.from))
            .or_default()
            .push(relation);
    }
    adjacency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetcherConfig;
    use crate::loader::Loader;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn element(name: &str) -> ElementDecl {
        ElementDecl {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_roots_and_adjacency() {
        let r = element("r");
        let a = element("a");
        let b = element("b");
        let c = element("c");
        let d = element("d");

        let arcs: Vec<PresentationArc> = (0..4)
            .map(|i| PresentationArc {
                order: (i + 1).to_string(),
                ..Default::default()
            })
            .collect();

        let relations: Vec<PresentationRelation> = vec![
            (&r, &a, &arcs[0]),
            (&r, &b, &arcs[1]),
            (&a, &c, &arcs[2]),
            (&a, &d, &arcs[3]),
        ]
        .into_iter()
        .map(|(from, to, arc)| ArcRelation {
            role: "http://example.com/role/bs".to_string(),
            arc,
            from,
            to,
        })
        .collect();

        let roots = find_roots(&relations);
        assert_eq!(roots.len(), 1);
        assert!(std::ptr::eq(roots[0], &r));

        let adjacency = build_adjacency(&relations);
        let children = adjacency.get(&RefKey(&r)).unwrap();
        assert_eq!(children.len(), 2);
        assert!(std::ptr::eq(children[0].to, &a));
        assert!(std::ptr::eq(children[1].to, &b));
        assert_eq!(adjacency.get(&RefKey(&a)).unwrap().len(), 2);
        assert!(adjacency.get(&RefKey(&c)).is_none());
    }

    #[test]
    fn test_label_targets_do_not_consume_roots() {
        let x = element("x");
        let arc = LabelArc::default();
        let record = LabelRecord {
            value: "Sales".to_string(),
            ..Default::default()
        };

        let relations: Vec<LabelRelation> = vec![ArcRelation {
            role: "http://www.xbrl.org/2003/role/link".to_string(),
            arc: &arc,
            from: &x,
            to: &record,
        }];

        // The label record is a `to` endpoint but not an element, so x
        // still counts as a root.
        let roots = find_roots(&relations);
        assert_eq!(roots.len(), 1);
        assert!(std::ptr::eq(roots[0], &x));
    }

    // -- traversal over loaded fixtures --------------------------------

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    async fn load(dir: &TempDir, entry: &str) -> (Loader, SchemaId) {
        let loader = Loader::new(FetcherConfig::default()).unwrap();
        let id = loader
            .load_schema(&dir.path().join(entry).to_string_lossy())
            .await
            .unwrap();
        (loader, id)
    }

    const LABEL_SCHEMA: &str = r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            xmlns:link="http://www.xbrl.org/2003/linkbase"
            xmlns:xlink="http://www.w3.org/1999/xlink"
            targetNamespace="http://example.com/jp">
  <xsd:annotation><xsd:appinfo>
    <link:linkbaseRef xlink:href="jp_lab.xml"
        xlink:role="http://www.xbrl.org/2003/role/labelLinkbaseRef"/>
  </xsd:appinfo></xsd:annotation>
  <xsd:element id="jp_Sales" name="Sales"/>
</xsd:schema>"#;

    fn label_linkbase(arc_to: &str, loc_href: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
               xmlns:xlink="http://www.w3.org/1999/xlink"
               xmlns:xml="http://www.w3.org/XML/1998/namespace">
  <link:labelLink xlink:role="http://www.xbrl.org/2003/role/link">
    <link:loc xlink:label="Sales" xlink:href="{loc_href}"/>
    <link:labelArc xlink:from="Sales" xlink:to="{arc_to}"/>
    <link:label xlink:label="label_Sales" xml:lang="ja"
        xlink:role="http://www.xbrl.org/2003/role/label">売上高</link:label>
  </link:labelLink>
</link:linkbase>"#
        )
    }

    #[tokio::test]
    async fn test_label_traversal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "jp.xsd", LABEL_SCHEMA);
        write(
            dir.path(),
            "jp_lab.xml",
            &label_linkbase("label_Sales", "jp.xsd#jp_Sales"),
        );

        let (loader, root) = load(&dir, "jp.xsd").await;
        let snapshot = loader.snapshot();
        let grouped = traverse_label_links(&snapshot, root).unwrap();

        assert_eq!(grouped.len(), 1);
        let relations = grouped.get("http://www.xbrl.org/2003/role/link").unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].from.name, "Sales");
        assert_eq!(relations[0].to.value, "売上高");
        assert_eq!(relations[0].to.lang, "ja");
    }

    #[tokio::test]
    async fn test_dangling_arc_label_aborts_traversal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "jp.xsd", LABEL_SCHEMA);
        write(
            dir.path(),
            "jp_lab.xml",
            &label_linkbase("label_Missing", "jp.xsd#jp_Sales"),
        );

        let (loader, root) = load(&dir, "jp.xsd").await;
        let snapshot = loader.snapshot();
        let result = traverse_label_links(&snapshot, root);

        match result {
            Err(XbrlError::ArcEndpointMissing { side, label }) => {
                assert_eq!(side, "to");
                assert_eq!(label, "label_Missing");
            }
            other => panic!("expected ArcEndpointMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unresolvable_locator_aborts_traversal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "jp.xsd", LABEL_SCHEMA);
        write(
            dir.path(),
            "jp_lab.xml",
            &label_linkbase("label_Sales", "jp.xsd#jp_Nowhere"),
        );

        let (loader, root) = load(&dir, "jp.xsd").await;
        let snapshot = loader.snapshot();
        let result = traverse_label_links(&snapshot, root);

        match result {
            Err(XbrlError::UnresolvedLocator { href }) => {
                assert!(href.ends_with("jp.xsd#jp_Nowhere"));
            }
            other => panic!("expected UnresolvedLocator, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_shared_linkbase_processed_once() {
        let dir = TempDir::new().unwrap();
        // Both left and right reference the same presentation linkbase over
        // elements of shared.xsd; the DFS must emit its arcs once.
        write(
            dir.path(),
            "shared.xsd",
            r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            targetNamespace="http://example.com/shared">
  <xsd:element id="s_P" name="P"/>
  <xsd:element id="s_C" name="C"/>
</xsd:schema>"#,
        );
        write(
            dir.path(),
            "shared_pre.xml",
            r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
               xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:presentationLink xlink:role="http://example.com/role/bs">
    <link:loc xlink:label="P" xlink:href="shared.xsd#s_P"/>
    <link:loc xlink:label="C" xlink:href="shared.xsd#s_C"/>
    <link:presentationArc xlink:from="P" xlink:to="C" order="1"/>
  </link:presentationLink>
</link:linkbase>"#,
        );
        let side = |ns: &str, import: &str| {
            format!(
                r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            xmlns:link="http://www.xbrl.org/2003/linkbase"
            xmlns:xlink="http://www.w3.org/1999/xlink"
            targetNamespace="{ns}">
  <xsd:annotation><xsd:appinfo>
    <link:linkbaseRef xlink:href="shared_pre.xml"
        xlink:role="http://www.xbrl.org/2003/role/presentationLinkbaseRef"/>
  </xsd:appinfo></xsd:annotation>
  <xsd:import namespace="http://example.com/shared" schemaLocation="{import}"/>
</xsd:schema>"#
            )
        };
        write(dir.path(), "left.xsd", &side("http://example.com/left", "shared.xsd"));
        write(dir.path(), "right.xsd", &side("http://example.com/right", "shared.xsd"));
        write(
            dir.path(),
            "root.xsd",
            r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            targetNamespace="http://example.com/root">
  <xsd:import namespace="http://example.com/left" schemaLocation="left.xsd"/>
  <xsd:import namespace="http://example.com/right" schemaLocation="right.xsd"/>
</xsd:schema>"#,
        );

        let (loader, root) = load(&dir, "root.xsd").await;
        let snapshot = loader.snapshot();
        let grouped = traverse_presentation_links(&snapshot, root).unwrap();

        let relations = grouped.get("http://example.com/role/bs").unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].from.name, "P");
        assert_eq!(relations[0].to.name, "C");
    }

    #[tokio::test]
    async fn test_empty_taxonomy_yields_empty_map() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "empty.xsd",
            r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            targetNamespace="http://example.com/empty"/>"#,
        );

        let (loader, root) = load(&dir, "empty.xsd").await;
        let snapshot = loader.snapshot();

        assert!(traverse_label_links(&snapshot, root).unwrap().is_empty());
        assert!(traverse_presentation_links(&snapshot, root).unwrap().is_empty());
        assert!(traverse_generic_links(&snapshot, root).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generic_traversal_anchors_on_role_types() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "jp_gla.xml",
            r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
               xmlns:xlink="http://www.w3.org/1999/xlink"
               xmlns:xml="http://www.w3.org/XML/1998/namespace">
  <link:link xlink:role="http://www.xbrl.org/2008/role/link">
    <link:loc xlink:label="bs" xlink:href="jp.xsd#rol_bs"/>
    <link:arc xlink:from="bs" xlink:to="label_bs"/>
    <link:label xlink:label="label_bs" xml:lang="ja"
        xlink:role="http://www.xbrl.org/2008/role/label">貸借対照表</link:label>
  </link:link>
</link:linkbase>"#,
        );
        write(
            dir.path(),
            "jp.xsd",
            r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            xmlns:link="http://www.xbrl.org/2003/linkbase"
            xmlns:xlink="http://www.w3.org/1999/xlink"
            targetNamespace="http://example.com/jp">
  <xsd:annotation><xsd:appinfo>
    <link:linkbaseRef xlink:href="jp_gla.xml" xlink:role=""/>
    <link:roleType roleURI="http://example.com/role/bs" id="rol_bs">
      <link:definition>Balance Sheet</link:definition>
    </link:roleType>
  </xsd:appinfo></xsd:annotation>
</xsd:schema>"#,
        );

        let (loader, root) = load(&dir, "jp.xsd").await;
        let snapshot = loader.snapshot();
        let grouped = traverse_generic_links(&snapshot, root).unwrap();

        let relations = grouped.get("http://www.xbrl.org/2008/role/link").unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].from.role_uri, "http://example.com/role/bs");
        assert_eq!(relations[0].to.value, "貸借対照表");
    }
}
