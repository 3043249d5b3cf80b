//! XML front end: turns the grammar compiler's output into [`crate::ir`] values.

use crate::ir::{
    Component, Entry, Grammar, Morph, MorphField, Relation, SemItem, SourceFeature, SourceFs,
    SourceNode, SourceTree, SourceValue, VarRef,
};
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

pub fn parse_document(xml: &str) -> Result<Grammar, ParseError> {
    let doc = Document::parse(xml)?;
    let entries = doc
        .descendants()
        .filter(|node| is_tag(node, "entry"))
        .map(|node| parse_entry(&node))
        .collect::<Vec<_>>();
    debug!(count = entries.len(), "parsed grammar document");
    Ok(Grammar { entries })
}

/// Parses a single `entry` element. Exposed for hosts that already hold a DOM.
pub fn parse_entry(entry: &Node<'_, '_>) -> Entry {
    let name = match entry.attribute("name") {
        Some(name) => name.to_string(),
        None => {
            warn!("entry without a name attribute");
            String::new()
        }
    };

    let tree = first_descendant(entry, "tree").and_then(|tree| parse_tree(&tree));
    let frame = first_descendant(entry, "frame").map(|frame| parse_components(&frame));
    let interface =
        first_descendant(entry, "interface").map(|interface| parse_components(&interface));
    let semantics = first_descendant(entry, "semantics").map(|sem| parse_semantics(&sem));
    let trace = first_descendant(entry, "trace").map(|trace| parse_trace(&trace));
    let morph = first_descendant(entry, "morph").map(|morph| parse_morph(&morph));

    Entry {
        name,
        tree,
        frame,
        interface,
        semantics,
        trace,
        morph,
    }
}

fn is_tag(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn element_children<'a, 'input>(
    node: &Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + use<'a, 'input> {
    node.children().filter(|child| child.is_element())
}

fn first_descendant<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|candidate| is_tag(candidate, name))
}

fn first_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    element_children(node).find(|child| is_tag(child, name))
}

fn parse_tree(tree: &Node<'_, '_>) -> Option<SourceTree> {
    let mut roots = element_children(tree).filter(|child| is_tag(child, "node"));
    let root = roots.next()?;
    if roots.next().is_some() {
        warn!("tree has more than one root node; only the first is displayed");
    }
    Some(SourceTree {
        root: parse_node(&root),
    })
}

fn parse_node(node: &Node<'_, '_>) -> SourceNode {
    let kind = node.attribute("type").unwrap_or("std").to_string();
    let name = node.attribute("name").map(str::to_string);
    let mut fs = None;
    let mut daughters = Vec::new();
    for child in element_children(node) {
        match child.tag_name().name() {
            "narg" => {
                fs = element_children(&child)
                    .find(|inner| is_tag(inner, "fs"))
                    .map(|inner| parse_fs(&inner));
            }
            "node" => daughters.push(parse_node(&child)),
            other => debug!(tag = other, "ignoring unexpected child of tree node"),
        }
    }
    SourceNode {
        kind,
        name,
        fs,
        daughters,
    }
}

pub(crate) fn parse_fs(fs: &Node<'_, '_>) -> SourceFs {
    let coref = fs.attribute("coref").map(str::to_string);

    // Legacy DTD: the type sits in an attribute like `[event]`.
    let mut fstype = fs.attribute("type").map(|raw| {
        raw.replacen('[', "", 1)
            .replacen(']', "", 1)
            .to_lowercase()
    });
    if let Some(ctype) = element_children(fs).next().filter(|c| is_tag(c, "ctype")) {
        let parts = element_children(&ctype)
            .map(|t| t.attribute("val").unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        fstype = Some(parts.join(","));
    }

    let mut features = Vec::new();
    for child in element_children(fs) {
        let Some(name) = child.attribute("name") else {
            continue;
        };
        let Some(raw_value) = element_children(&child).next() else {
            debug!(feature = name, "feature without a value");
            continue;
        };
        let value = match raw_value.tag_name().name() {
            "sym" => SourceValue::Atom(parse_var_ref(&raw_value)),
            "fs" => SourceValue::Fs(parse_fs(&raw_value)),
            "vAlt" => SourceValue::Alternation(
                element_children(&raw_value)
                    .map(|alt| parse_var_ref(&alt).display())
                    .collect(),
            ),
            other => {
                debug!(feature = name, tag = other, "unsupported feature value");
                continue;
            }
        };
        features.push(SourceFeature {
            name: name.to_string(),
            value,
        });
    }

    SourceFs {
        coref,
        fstype,
        features,
    }
}

fn parse_var_ref(node: &Node<'_, '_>) -> VarRef {
    VarRef {
        varname: node.attribute("varname").map(str::to_string),
        value: node.attribute("value").map(str::to_string),
    }
}

/// Operands are either the `sym` itself or a wrapper (`label`, `arg`, ...) around it.
fn parse_operand(node: &Node<'_, '_>) -> VarRef {
    if node.has_attribute("varname") || node.has_attribute("value") {
        return parse_var_ref(node);
    }
    element_children(node)
        .next()
        .map(|inner| parse_var_ref(&inner))
        .unwrap_or_default()
}

fn parse_components(block: &Node<'_, '_>) -> Vec<Component> {
    let mut components = Vec::new();
    for child in element_children(block) {
        match child.tag_name().name() {
            "fs" => components.push(Component::Fs(parse_fs(&child))),
            "relation" => components.push(Component::Relation(Relation {
                name: child.attribute("name").unwrap_or_default().to_string(),
                args: element_children(&child).map(|arg| parse_operand(&arg)).collect(),
            })),
            other => debug!(tag = other, "ignoring frame component"),
        }
    }
    components
}

fn parse_semantics(sem: &Node<'_, '_>) -> Vec<SemItem> {
    let mut items = Vec::new();
    for child in element_children(sem) {
        match child.tag_name().name() {
            "literal" => {
                let negated = matches!(
                    child.attribute("negated"),
                    Some("yes") | Some("true") | Some("1")
                );
                let parts = element_children(&child).collect::<Vec<_>>();
                let operand = |idx: usize| {
                    parts
                        .get(idx)
                        .map(|node| parse_operand(node))
                        .unwrap_or_default()
                };
                items.push(SemItem::Literal {
                    negated,
                    label: operand(0),
                    predicate: operand(1),
                    args: parts.iter().skip(2).map(|node| parse_operand(node)).collect(),
                });
            }
            "semdominance" => {
                let parts = element_children(&child).collect::<Vec<_>>();
                let operand = |idx: usize| {
                    parts
                        .get(idx)
                        .map(|node| parse_operand(node))
                        .unwrap_or_default()
                };
                items.push(SemItem::Dominance {
                    left: operand(0),
                    right: operand(1),
                });
            }
            other => debug!(tag = other, "ignoring semantics item"),
        }
    }
    items
}

fn parse_trace(trace: &Node<'_, '_>) -> Vec<String> {
    element_children(trace)
        .map(|step| step.text().unwrap_or_default().trim().to_string())
        .collect()
}

fn parse_morph(morph: &Node<'_, '_>) -> Morph {
    let surface = first_child(morph, "string")
        .or_else(|| first_descendant(morph, "string"))
        .and_then(|s| s.attribute("value"))
        .unwrap_or_default()
        .to_string();
    let fields = first_child(morph, "fields")
        .map(|fields| {
            element_children(&fields)
                .map(|field| MorphField {
                    string: first_descendant(&field, "string")
                        .and_then(|s| s.attribute("value"))
                        .unwrap_or_default()
                        .to_string(),
                    feats: first_descendant(&field, "feats")
                        .map(|feats| {
                            element_children(&feats)
                                .filter(|fs| is_tag(fs, "fs"))
                                .map(|fs| parse_fs(&fs))
                                .collect()
                        })
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();
    Morph { surface, fields }
}
