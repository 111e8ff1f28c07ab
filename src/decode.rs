//! Typed decoders from XML documents into the data model.
//!
//! Matching follows the conventions of the source formats: elements are
//! selected by local name (the EDINET corpus mixes prefixes freely), and
//! attributes are matched by local name so `xlink:href` and bare `href`
//! decode alike. Each decoder is variant-specific; the loader picks one
//! based on the entry root or the `linkbaseRef` role.

use std::sync::Arc;

use roxmltree::{Document, Node};

use crate::error::{Result, XbrlError};
use crate::model::*;

/// Namespace URIs dispatched on by the decoders and the inline extractor.
pub mod ns {
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    pub const LINKBASE: &str = "http://www.xbrl.org/2003/linkbase";
    pub const INSTANCE: &str = "http://www.xbrl.org/2003/instance";
    pub const INLINE_XBRL: &str = "http://www.xbrl.org/2008/inlineXBRL";
}

/// Decode raw bytes into the UTF-8 text roxmltree parses from.
pub(crate) fn document_text(bytes: Vec<u8>, location: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| XbrlError::XmlParse {
        location: location.to_string(),
        details: "document is not valid UTF-8".to_string(),
    })
}

/// Parse a document, attributing failures to `location`.
pub(crate) fn parse_document<'a>(text: &'a str, location: &str) -> Result<Document<'a>> {
    Document::parse(text).map_err(|e| XbrlError::xml(location, e))
}

/// Local name of the document's root element; selects the entry loader.
pub fn peek_root_local_name(text: &str, location: &str) -> Result<String> {
    let doc = parse_document(text, location)?;
    Ok(doc.root_element().tag_name().name().to_string())
}

/// Attribute value by local name, any namespace. Missing attributes decode
/// as the empty string.
fn attr(node: Node, local: &str) -> String {
    node.attributes()
        .find(|a| a.name() == local)
        .map(|a| a.value().to_string())
        .unwrap_or_default()
}

/// Concatenated text of all descendant text nodes.
pub(crate) fn inner_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn element_children<'a, 'i>(node: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children().filter(|c| c.is_element())
}

fn child_element<'a, 'i>(node: Node<'a, 'i>, local: &str) -> Option<Node<'a, 'i>> {
    element_children(node).find(|c| c.tag_name().name() == local)
}

fn child_text(node: Node, local: &str) -> String {
    child_element(node, local).map(inner_text).unwrap_or_default()
}

fn locator(node: Node) -> Locator {
    Locator {
        label: attr(node, "label"),
        href: attr(node, "href"),
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Decode a taxonomy schema. Linkbase lists stay empty; the loader fills
/// them in during its linkbase phase.
pub fn decode_schema(doc: &Document, path: &str) -> Schema {
    let root = doc.root_element();
    let mut schema = Schema {
        path: path.to_string(),
        target_namespace: attr(root, "targetNamespace"),
        ..Default::default()
    };

    for child in element_children(root) {
        match child.tag_name().name() {
            "element" => schema.elements.push(ElementDecl {
                id: attr(child, "id"),
                name: attr(child, "name"),
                xsd_type: attr(child, "type"),
                substitution_group: attr(child, "substitutionGroup"),
                is_abstract: attr(child, "abstract"),
                nillable: attr(child, "nillable"),
                period_type: attr(child, "periodType"),
                schema: SchemaId::UNSET,
            }),
            "import" => schema.imports.push(ImportDecl::new(
                attr(child, "namespace"),
                attr(child, "schemaLocation"),
            )),
            "annotation" => {
                for appinfo in element_children(child).filter(|c| c.tag_name().name() == "appinfo")
                {
                    for entry in element_children(appinfo) {
                        match entry.tag_name().name() {
                            "linkbaseRef" => schema.linkbase_refs.push(LinkbaseRef {
                                href: attr(entry, "href"),
                                role: attr(entry, "role"),
                                arcrole: attr(entry, "arcrole"),
                            }),
                            "roleType" => schema.role_types.push(RoleType {
                                id: attr(entry, "id"),
                                role_uri: attr(entry, "roleURI"),
                                definition: child_text(entry, "definition"),
                                used_on: element_children(entry)
                                    .filter(|c| c.tag_name().name() == "usedOn")
                                    .map(inner_text)
                                    .collect(),
                                schema: SchemaId::UNSET,
                            }),
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }

    schema
}

// ---------------------------------------------------------------------------
// Linkbases
// ---------------------------------------------------------------------------

pub fn decode_label_linkbase(doc: &Document, path: &str) -> Result<LabelLinkbase> {
    let path: Arc<str> = Arc::from(path);
    let mut linkbase = LabelLinkbase {
        path: path.clone(),
        links: Vec::new(),
    };

    for link in element_children(doc.root_element()).filter(|c| c.tag_name().name() == "labelLink")
    {
        let mut extended = LabelLink {
            role: attr(link, "role"),
            ..Default::default()
        };
        for child in element_children(link) {
            match child.tag_name().name() {
                "loc" => extended.locators.push(locator(child)),
                "labelArc" => extended.arcs.push(LabelArc {
                    from: attr(child, "from"),
                    to: attr(child, "to"),
                }),
                "label" => extended.labels.push(LabelRecord {
                    label: attr(child, "label"),
                    lang: attr(child, "lang"),
                    role: attr(child, "role"),
                    id: attr(child, "id"),
                    value: inner_text(child),
                    linkbase_path: path.clone(),
                }),
                _ => {}
            }
        }
        linkbase.links.push(extended);
    }

    Ok(linkbase)
}

pub fn decode_reference_linkbase(doc: &Document, path: &str) -> Result<ReferenceLinkbase> {
    let path: Arc<str> = Arc::from(path);
    let mut linkbase = ReferenceLinkbase {
        path: path.clone(),
        links: Vec::new(),
    };

    for link in
        element_children(doc.root_element()).filter(|c| c.tag_name().name() == "referenceLink")
    {
        let mut extended = ReferenceLink {
            role: attr(link, "role"),
            ..Default::default()
        };
        for child in element_children(link) {
            match child.tag_name().name() {
                "loc" => extended.locators.push(locator(child)),
                "referenceArc" => extended.arcs.push(ReferenceArc {
                    from: attr(child, "from"),
                    to: attr(child, "to"),
                }),
                "reference" => extended.references.push(ReferenceRecord {
                    label: attr(child, "label"),
                    role: attr(child, "role"),
                    publisher: child_text(child, "Publisher"),
                    number: child_text(child, "Number"),
                    name: child_text(child, "Name"),
                    article: child_text(child, "Article"),
                    issue_date: child_text(child, "IssueDate"),
                    industry_abbreviation: child_text(child, "IndustryAbbreviation"),
                    linkbase_path: path.clone(),
                }),
                _ => {}
            }
        }
        linkbase.links.push(extended);
    }

    Ok(linkbase)
}

pub fn decode_presentation_linkbase(doc: &Document, path: &str) -> Result<PresentationLinkbase> {
    let mut linkbase = PresentationLinkbase {
        path: Arc::from(path),
        links: Vec::new(),
    };

    for link in
        element_children(doc.root_element()).filter(|c| c.tag_name().name() == "presentationLink")
    {
        let mut extended = PresentationLink {
            role: attr(link, "role"),
            ..Default::default()
        };
        for child in element_children(link) {
            match child.tag_name().name() {
                "loc" => extended.locators.push(locator(child)),
                "presentationArc" => extended.arcs.push(PresentationArc {
                    from: attr(child, "from"),
                    to: attr(child, "to"),
                    order: attr(child, "order"),
                    preferred_label: attr(child, "preferredLabel"),
                }),
                _ => {}
            }
        }
        linkbase.links.push(extended);
    }

    Ok(linkbase)
}

pub fn decode_definition_linkbase(doc: &Document, path: &str) -> Result<DefinitionLinkbase> {
    let mut linkbase = DefinitionLinkbase {
        path: Arc::from(path),
        links: Vec::new(),
    };

    for link in
        element_children(doc.root_element()).filter(|c| c.tag_name().name() == "definitionLink")
    {
        let mut extended = DefinitionLink {
            role: attr(link, "role"),
            ..Default::default()
        };
        for child in element_children(link) {
            match child.tag_name().name() {
                "loc" => extended.locators.push(locator(child)),
                "definitionArc" => extended.arcs.push(DefinitionArc {
                    from: attr(child, "from"),
                    to: attr(child, "to"),
                    arcrole: attr(child, "arcrole"),
                    order: attr(child, "order"),
                }),
                _ => {}
            }
        }
        linkbase.links.push(extended);
    }

    Ok(linkbase)
}

pub fn decode_calculation_linkbase(doc: &Document, path: &str) -> Result<CalculationLinkbase> {
    let mut linkbase = CalculationLinkbase {
        path: Arc::from(path),
        links: Vec::new(),
    };

    for link in
        element_children(doc.root_element()).filter(|c| c.tag_name().name() == "calculationLink")
    {
        let mut extended = CalculationLink {
            role: attr(link, "role"),
            ..Default::default()
        };
        for child in element_children(link) {
            match child.tag_name().name() {
                "loc" => extended.locators.push(locator(child)),
                "calculationArc" => {
                    let order_text = attr(child, "order");
                    let order = if order_text.is_empty() {
                        0.0
                    } else {
                        order_text.parse().map_err(|_| XbrlError::XmlParse {
                            location: path.to_string(),
                            details: format!("invalid calculationArc order: {order_text}"),
                        })?
                    };
                    extended.arcs.push(CalculationArc {
                        from: attr(child, "from"),
                        to: attr(child, "to"),
                        arcrole: attr(child, "arcrole"),
                        order,
                    });
                }
                _ => {}
            }
        }
        linkbase.links.push(extended);
    }

    Ok(linkbase)
}

pub fn decode_generic_linkbase(doc: &Document, path: &str) -> Result<GenericLinkbase> {
    let mut linkbase = GenericLinkbase {
        path: Arc::from(path),
        links: Vec::new(),
    };

    for link in element_children(doc.root_element()).filter(|c| c.tag_name().name() == "link") {
        let mut extended = GenericLink {
            role: attr(link, "role"),
            ..Default::default()
        };
        for child in element_children(link) {
            match child.tag_name().name() {
                "loc" => extended.locators.push(locator(child)),
                "arc" => extended.arcs.push(GenericArc {
                    from: attr(child, "from"),
                    to: attr(child, "to"),
                }),
                "label" => extended.labels.push(GenericLabelRecord {
                    label: attr(child, "label"),
                    lang: attr(child, "lang"),
                    role: attr(child, "role"),
                    value: inner_text(child),
                }),
                _ => {}
            }
        }
        linkbase.links.push(extended);
    }

    Ok(linkbase)
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// Decode a native XBRL instance. Unknown children of `<xbrl>` become facts
/// with their qualified name preserved; `footnoteLink` is not a fact.
pub fn decode_instance(doc: &Document, path: &str) -> Instance {
    let mut instance = Instance::new(path);

    for child in element_children(doc.root_element()) {
        match child.tag_name().name() {
            "schemaRef" => instance.schema_ref.href = attr(child, "href"),
            "roleRef" => instance.role_refs.push(RoleRef {
                role_uri: attr(child, "roleURI"),
                href: attr(child, "href"),
            }),
            "context" => instance.contexts.push(decode_context(child)),
            "unit" => instance.units.push(decode_unit(child)),
            "footnoteLink" => {}
            local => instance.facts.push(Fact {
                name: QName {
                    namespace: child.tag_name().namespace().unwrap_or("").to_string(),
                    local: local.to_string(),
                },
                context_ref: attr(child, "contextRef"),
                unit_ref: attr(child, "unitRef"),
                decimals: attr(child, "decimals"),
                nil: attr(child, "nil"),
                value: inner_text(child),
            }),
        }
    }

    instance
}

/// Decode one `context` element subtree.
pub fn decode_context(node: Node) -> Context {
    let mut context = Context {
        id: attr(node, "id"),
        ..Default::default()
    };

    if let Some(entity) = child_element(node, "entity") {
        if let Some(identifier) = child_element(entity, "identifier") {
            context.entity.identifier = Identifier {
                scheme: attr(identifier, "scheme"),
                value: inner_text(identifier),
            };
        }
    }

    if let Some(period) = child_element(node, "period") {
        context.period = Period {
            start_date: child_text(period, "startDate"),
            end_date: child_text(period, "endDate"),
            instant: child_text(period, "instant"),
        };
    }

    if let Some(scenario) = child_element(node, "scenario") {
        context.scenario.members = element_children(scenario)
            .filter(|c| c.tag_name().name() == "explicitMember")
            .map(|member| DimensionMember {
                dimension: attr(member, "dimension"),
                value: inner_text(member),
            })
            .collect();
    }

    context
}

/// Decode one `unit` element subtree.
pub fn decode_unit(node: Node) -> Unit {
    Unit {
        id: attr(node, "id"),
        measure: child_text(node, "measure"),
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

pub fn decode_manifest(doc: &Document, path: &str) -> Manifest {
    let mut manifest = Manifest {
        path: path.to_string(),
        ..Default::default()
    };

    let root = doc.root_element();

    if let Some(toc) = child_element(root, "tocComposition") {
        for child in element_children(toc) {
            match child.tag_name().name() {
                "title" => manifest.toc.titles.push(TocTitle {
                    lang: attr(child, "lang"),
                    text: inner_text(child),
                }),
                "item" => manifest.toc.items.push(TocItem {
                    in_file: attr(child, "in"),
                    reference: attr(child, "ref"),
                    extrole: attr(child, "extrole"),
                }),
                _ => {}
            }
        }
    }

    if let Some(list) = child_element(root, "list") {
        for entry in element_children(list).filter(|c| c.tag_name().name() == "instance") {
            manifest.list.descriptors.push(InstanceDescriptor {
                id: attr(entry, "id"),
                doc_type: attr(entry, "type"),
                preferred_filename: attr(entry, "preferredFilename"),
                ixbrl_files: element_children(entry)
                    .filter(|c| c.tag_name().name() == "ixbrl")
                    .map(inner_text)
                    .collect(),
            });
        }
    }

    manifest
}
