//! Inline-XBRL extraction.
//!
//! Walks a presentation-annotated XHTML report and appends the embedded
//! facts, contexts, units, role refs, and schema ref onto an [`Instance`],
//! producing the same model as a native instance document. Escaped facts
//! (HTML text blocks) keep their inner markup byte-for-byte; all other
//! fact values go through the format-driven transform pipeline.

use std::collections::HashMap;

use roxmltree::{Document, Node};
use tracing::warn;

use crate::decode::{self, ns};
use crate::error::Result;
use crate::model::{Fact, Instance, QName, RoleRef};
use crate::transform;

/// Map key for the default namespace in the prefix table.
const DEFAULT_PREFIX: &str = "(default)";

/// Extract one inline-XBRL document into `instance`.
///
/// Later `schemaRef` elements overwrite the recorded href; facts, contexts,
/// units, and role refs are append-only.
pub fn extract_into(text: &str, location: &str, instance: &mut Instance) -> Result<()> {
    let doc = decode::parse_document(text, location)?;
    let prefixes = namespace_map(doc.root_element());

    for node in doc.descendants().filter(|n| n.is_element()) {
        let local = node.tag_name().name();
        let namespace = node.tag_name().namespace().unwrap_or("");

        match (local, namespace) {
            ("nonNumeric", ns::INLINE_XBRL) | ("nonFraction", ns::INLINE_XBRL) => {
                instance.facts.push(extract_fact(&doc, node, &prefixes));
            }
            ("schemaRef", ns::LINKBASE) => {
                instance.schema_ref.href = xlink_href(node);
            }
            ("context", ns::INSTANCE) => {
                instance.contexts.push(decode::decode_context(node));
            }
            ("unit", ns::INSTANCE) => {
                instance.units.push(decode::decode_unit(node));
            }
            ("roleRef", ns::LINKBASE) => {
                instance.role_refs.push(RoleRef {
                    role_uri: node.attribute("roleURI").unwrap_or("").to_string(),
                    href: xlink_href(node),
                });
            }
            _ => {}
        }
    }

    Ok(())
}

/// Prefix → namespace URI table from the root element's declarations.
/// The default namespace is keyed by `(default)`.
fn namespace_map(root: Node) -> HashMap<String, String> {
    root.namespaces()
        .map(|decl| {
            (
                decl.name().unwrap_or(DEFAULT_PREFIX).to_string(),
                decl.uri().to_string(),
            )
        })
        .collect()
}

/// Resolve a prefixed tag (`jp:Sales`) against the prefix table. A bare tag
/// takes the default namespace; an unknown prefix leaves the namespace empty.
fn resolve_qname(tag: &str, prefixes: &HashMap<String, String>) -> QName {
    let (prefix, local) = match tag.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => (DEFAULT_PREFIX, tag),
    };

    QName {
        namespace: prefixes.get(prefix).cloned().unwrap_or_default(),
        local: local.to_string(),
    }
}

fn xlink_href(node: Node) -> String {
    node.attribute((ns::XLINK, "href"))
        .unwrap_or("")
        .to_string()
}

fn extract_fact(doc: &Document, node: Node, prefixes: &HashMap<String, String>) -> Fact {
    let nil = node.attribute((ns::XSI, "nil")).unwrap_or("");
    let escape = node.attribute("escape").unwrap_or("");

    let value = if nil == "true" {
        String::new()
    } else if escape == "true" {
        inner_xml(doc, node)
    } else {
        compose_value(node)
    };

    Fact {
        name: resolve_qname(node.attribute("name").unwrap_or(""), prefixes),
        context_ref: node.attribute("contextRef").unwrap_or("").to_string(),
        unit_ref: node.attribute("unitRef").unwrap_or("").to_string(),
        decimals: node.attribute("decimals").unwrap_or("").to_string(),
        nil: nil.to_string(),
        value,
    }
}

/// Raw serialization of the node's children, byte-for-byte from the source
/// document.
fn inner_xml(doc: &Document, node: Node) -> String {
    let input = doc.input_text();
    node.children().map(|child| &input[child.range()]).collect()
}

/// Apply the format/scale/sign pipeline to the node's inner text.
///
/// Each step is best-effort: a transform that fails leaves the working
/// value unchanged, and the sign prefix is applied last regardless.
fn compose_value(node: Node) -> String {
    let mut value = decode::inner_text(node);
    let format = node.attribute("format").unwrap_or("");

    if format.ends_with(":numdotdecimal") {
        value = value.replace(',', "");
    } else if format.ends_with(":dateerayearmonthdayjp")
        || format.ends_with(":dateerayearmonthjp")
    {
        match transform::wareki_to_iso(&value) {
            Ok(iso) => value = iso,
            Err(e) => warn!(literal = %value, error = %e, "wareki transform failed"),
        }
    } else if format.ends_with(":dateyearmonthdaycjk") || format.ends_with(":dateyearmonthcjk") {
        match transform::cjk_date_to_iso(&value) {
            Ok(iso) => value = iso,
            Err(e) => warn!(literal = %value, error = %e, "date transform failed"),
        }
    }

    let scale: i32 = node
        .attribute("scale")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    if scale != 0 {
        match transform::shift_decimal(&value, scale) {
            Ok(shifted) => value = shifted,
            Err(e) => warn!(literal = %value, error = %e, "scale transform failed"),
        }
    }

    let sign = node.attribute("sign").unwrap_or("");
    format!("{sign}{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"
      xmlns:ix="http://www.xbrl.org/2008/inlineXBRL"
      xmlns:link="http://www.xbrl.org/2003/linkbase"
      xmlns:xbrli="http://www.xbrl.org/2003/instance"
      xmlns:xlink="http://www.w3.org/1999/xlink"
      xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
      xmlns:jpcrp="http://example.com/jpcrp"
      xmlns:jp="http://example.com/jp">
<body>{body}</body>
</html>"#
        )
    }

    fn extract(body: &str) -> Instance {
        let mut instance = Instance::new("report.xbrl");
        extract_into(&report(body), "0101010.htm", &mut instance).unwrap();
        instance
    }

    #[test]
    fn test_wareki_date_fact() {
        let instance = extract(
            r#"<ix:nonNumeric name="jp:Date" contextRef="Cur"
                format="jpcrp:dateerayearmonthdayjp">令和３年４月１日</ix:nonNumeric>"#,
        );

        assert_eq!(instance.facts.len(), 1);
        let fact = &instance.facts[0];
        assert_eq!(fact.value, "2021-04-01");
        assert_eq!(fact.name.namespace, "http://example.com/jp");
        assert_eq!(fact.name.local, "Date");
        assert_eq!(fact.context_ref, "Cur");
    }

    #[test]
    fn test_scaled_signed_numeric_fact() {
        let instance = extract(
            r#"<ix:nonFraction name="jp:Sales" contextRef="Cur" unitRef="JPY"
                decimals="-6" scale="6" sign="-">1,234</ix:nonFraction>"#,
        );

        let fact = &instance.facts[0];
        assert_eq!(fact.value, "-1234000000");
        assert_eq!(fact.decimals, "-6");
        assert_eq!(fact.unit_ref, "JPY");
    }

    #[test]
    fn test_numdotdecimal_strips_commas() {
        let instance = extract(
            r#"<ix:nonFraction name="jp:Count" contextRef="Cur"
                format="ixt:numdotdecimal">12,345,678</ix:nonFraction>"#,
        );
        assert_eq!(instance.facts[0].value, "12345678");
    }

    #[test]
    fn test_scale_zero_leaves_value_unchanged() {
        let instance = extract(
            r#"<ix:nonFraction name="jp:Count" contextRef="Cur"
                scale="0">1234</ix:nonFraction>"#,
        );
        assert_eq!(instance.facts[0].value, "1234");
    }

    #[test]
    fn test_unparseable_date_keeps_raw_literal() {
        let instance = extract(
            r#"<ix:nonNumeric name="jp:Date" contextRef="Cur"
                format="jpcrp:dateerayearmonthdayjp">未定</ix:nonNumeric>"#,
        );
        assert_eq!(instance.facts[0].value, "未定");
    }

    #[test]
    fn test_nil_fact_has_empty_value() {
        let instance = extract(
            r#"<ix:nonNumeric name="jp:Note" contextRef="Cur"
                xsi:nil="true">ignored</ix:nonNumeric>"#,
        );
        let fact = &instance.facts[0];
        assert_eq!(fact.nil, "true");
        assert_eq!(fact.value, "");
    }

    #[test]
    fn test_escaped_fact_preserves_markup() {
        let instance = extract(
            "<ix:nonNumeric name=\"jp:Policy\" contextRef=\"Cur\" escape=\"true\"><p>第1段落</p>\n  <p>第2&amp;段落</p></ix:nonNumeric>",
        );
        assert_eq!(
            instance.facts[0].value,
            "<p>第1段落</p>\n  <p>第2&amp;段落</p>"
        );
    }

    #[test]
    fn test_plain_inner_text_gathers_nested_markup() {
        let instance = extract(
            r#"<ix:nonNumeric name="jp:Name" contextRef="Cur"><span>株式会社</span>サンプル</ix:nonNumeric>"#,
        );
        assert_eq!(instance.facts[0].value, "株式会社サンプル");
    }

    #[test]
    fn test_schema_ref_and_overwrite() {
        let mut instance = Instance::new("report.xbrl");
        extract_into(
            &report(r#"<link:schemaRef xlink:href="first.xsd"/>"#),
            "0101010.htm",
            &mut instance,
        )
        .unwrap();
        assert_eq!(instance.schema_ref.href, "first.xsd");

        // A later document's schemaRef overwrites, never appends.
        extract_into(
            &report(r#"<link:schemaRef xlink:href="second.xsd"/>"#),
            "0102010.htm",
            &mut instance,
        )
        .unwrap();
        assert_eq!(instance.schema_ref.href, "second.xsd");
    }

    #[test]
    fn test_contexts_units_role_refs_collected() {
        let instance = extract(
            r#"<ix:header>
  <xbrli:context id="Cur">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E00000</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:instant>2021-03-31</xbrli:instant></xbrli:period>
  </xbrli:context>
  <xbrli:unit id="JPY"><xbrli:measure>iso4217:JPY</xbrli:measure></xbrli:unit>
  <link:roleRef roleURI="http://example.com/role/bs" xlink:href="jp.xsd#rol_bs"/>
</ix:header>"#,
        );

        assert_eq!(instance.contexts.len(), 1);
        assert_eq!(instance.contexts[0].id, "Cur");
        assert_eq!(instance.contexts[0].period.instant, "2021-03-31");
        assert_eq!(instance.units.len(), 1);
        assert_eq!(instance.units[0].measure, "iso4217:JPY");
        assert_eq!(instance.role_refs.len(), 1);
        assert_eq!(instance.role_refs[0].role_uri, "http://example.com/role/bs");
        assert_eq!(instance.role_refs[0].href, "jp.xsd#rol_bs");
    }

    #[test]
    fn test_default_namespace_name_resolution() {
        let text = r#"<?xml version="1.0"?>
<html xmlns="http://example.com/jp"
      xmlns:ix="http://www.xbrl.org/2008/inlineXBRL">
<body><ix:nonNumeric name="Company" contextRef="Cur">サンプル</ix:nonNumeric></body>
</html>"#;

        let mut instance = Instance::new("report.xbrl");
        extract_into(text, "0101010.htm", &mut instance).unwrap();

        let fact = &instance.facts[0];
        assert_eq!(fact.name.namespace, "http://example.com/jp");
        assert_eq!(fact.name.local, "Company");
    }

    #[test]
    fn test_unknown_prefix_leaves_namespace_empty() {
        let instance = extract(
            r#"<ix:nonNumeric name="mystery:Thing" contextRef="Cur">x</ix:nonNumeric>"#,
        );
        assert_eq!(instance.facts[0].name.namespace, "");
        assert_eq!(instance.facts[0].name.local, "Thing");
    }
}
