//! Namespace-agnostic accessors over a parsed XML document.
//!
//! Every lookup matches on the local name only, so `wms:Layer`, `Layer` and
//! `{http://www.opengis.net/wms}Layer` are all found by `"Layer"`.

use roxmltree::{Document, Node};

use crate::error::{OgcError, Result};

/// Deepest element nesting [`parse_xml_string`] accepts.
///
/// The DOM parser recurses once per level, so deeper documents are rejected
/// up front instead of exhausting the thread's stack.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse a raw XML string into a document
pub fn parse_xml_string(raw: &str) -> Result<Document<'_>> {
    check_nesting_depth(raw)?;
    Document::parse(raw).map_err(OgcError::from)
}

/// Count open elements with a flat scan, skipping comments, CDATA sections,
/// processing instructions and declarations. Syntax errors are left for the
/// DOM parser to report.
fn check_nesting_depth(raw: &str) -> Result<()> {
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = bytes[pos..].iter().position(|&b| b == b'<') {
        let start = pos + offset;
        let rest = &bytes[start..];
        pos = if rest.starts_with(b"<!--") {
            skip_past(bytes, start, b"-->")
        } else if rest.starts_with(b"<![CDATA[") {
            skip_past(bytes, start, b"]]>")
        } else if rest.starts_with(b"<?") {
            skip_past(bytes, start, b"?>")
        } else if rest.starts_with(b"<!") {
            skip_past(bytes, start, b">")
        } else if rest.starts_with(b"</") {
            depth = depth.saturating_sub(1);
            skip_past(bytes, start, b">")
        } else {
            let Some(end) = tag_end(bytes, start) else {
                break;
            };
            if bytes[end - 1] != b'/' {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(OgcError::malformed(format!(
                        "elements nested deeper than {MAX_NESTING_DEPTH} levels"
                    )));
                }
            }
            end + 1
        };
    }
    Ok(())
}

fn skip_past(bytes: &[u8], from: usize, pattern: &[u8]) -> usize {
    bytes[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map_or(bytes.len(), |i| from + i + pattern.len())
}

/// Index of the `>` closing the tag opened at `from`; quoted values may hold `>`
fn tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(from + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

/// The document's root element
pub fn root_element<'a, 'i>(doc: &'a Document<'i>) -> Node<'a, 'i> {
    doc.root_element()
}

/// Remove a `prefix:` from a qualified name
pub fn strip_namespace(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// Local name of an element
pub fn element_name<'a>(el: Node<'a, '_>) -> &'a str {
    el.tag_name().name()
}

/// All child elements, in document order
pub fn children_element<'a, 'i>(parent: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
    parent.children().filter(|n| n.is_element())
}

/// All child elements with the given local name, in document order
pub fn find_children_element<'a, 'i>(parent: Node<'a, 'i>, local_name: &str) -> Vec<Node<'a, 'i>> {
    let local_name = strip_namespace(local_name);
    children_element(parent)
        .filter(|el| element_name(*el) == local_name)
        .collect()
}

/// First child element with the given local name
pub fn find_child_element<'a, 'i>(parent: Node<'a, 'i>, local_name: &str) -> Option<Node<'a, 'i>> {
    let local_name = strip_namespace(local_name);
    children_element(parent).find(|el| element_name(*el) == local_name)
}

/// Follow a path of local names from `parent`, e.g. `["Capability", "Request"]`
pub fn find_path<'a, 'i>(parent: Node<'a, 'i>, path: &[&str]) -> Option<Node<'a, 'i>> {
    path.iter()
        .try_fold(parent, |node, name| find_child_element(node, name))
}

/// Attribute value by name. A prefixed name (`xlink:href`, `gml:id`) prefers
/// a namespaced attribute but accepts an unqualified one with the same local name.
pub fn element_attribute<'a>(el: Node<'a, '_>, name: &str) -> Option<&'a str> {
    let local = strip_namespace(name);
    let qualified = local.len() != name.len();

    let mut fallback = None;
    for attr in el.attributes() {
        if attr.name() != local {
            continue;
        }
        if !qualified || attr.namespace().is_some() {
            return Some(attr.value());
        }
        fallback.get_or_insert(attr.value());
    }
    fallback
}

/// Concatenated, trimmed text content of an element
pub fn element_text(el: Node<'_, '_>) -> String {
    let text: String = el
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}

/// Text of the first child element with the given name, empty when absent
pub fn child_text(parent: Node<'_, '_>, local_name: &str) -> String {
    find_child_element(parent, local_name)
        .map(element_text)
        .unwrap_or_default()
}

/// Texts of every child element with the given name
pub fn children_text(parent: Node<'_, '_>, local_name: &str) -> Vec<String> {
    find_children_element(parent, local_name)
        .into_iter()
        .map(element_text)
        .collect()
}
