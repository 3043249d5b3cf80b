//! Source model → semantic element tree. No geometry is computed here.

use crate::ir::{
    Component, Entry, Morph, Relation, SemItem, SourceFs, SourceNode, SourceValue, VarRef,
    strip_sigil,
};
use crate::model::{
    CollapseState, ElementData, ElementId, ElementKind, Mark, NodeData, Scene, TextRole,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Names the grammar compiler invents for anonymous nodes.
static SYNTHETIC_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"XMGVAR_").expect("valid synthetic name pattern"));

pub fn is_synthetic_name(name: &str) -> bool {
    SYNTHETIC_NAME.is_match(name)
}

/// Builds the tree display. Returns `None` when the entry has neither a tree nor a
/// morph description.
pub fn transform_tree(entry: &Entry) -> Option<(Scene, ElementId)> {
    let mut scene = Scene::new();
    if let Some(tree) = &entry.tree {
        let root = push_tree(&mut scene, None, &tree.root);
        return Some((scene, root));
    }
    if let Some(morph) = &entry.morph {
        let root = push_morph(&mut scene, morph);
        return Some((scene, root));
    }
    debug!(entry = %entry.name, "no tree description");
    None
}

/// Builds the frame display, falling back to the predicate display when the entry has
/// semantics but no frame. An empty frame produces nothing.
pub fn transform_frame(entry: &Entry) -> Option<(Scene, ElementId)> {
    let mut scene = Scene::new();
    match &entry.frame {
        Some(components) if components.is_empty() => {
            debug!(entry = %entry.name, "frame dimension is present but empty");
            None
        }
        Some(components) => {
            let root = push_components(&mut scene, ElementKind::Frame, components);
            Some((scene, root))
        }
        None => match &entry.semantics {
            Some(items) => {
                let root = push_semantics(&mut scene, items);
                Some((scene, root))
            }
            None => {
                debug!(entry = %entry.name, "no frame to display");
                None
            }
        },
    }
}

pub fn transform_interface(entry: &Entry) -> Option<(Scene, ElementId)> {
    let Some(components) = &entry.interface else {
        debug!(entry = %entry.name, "no interface to display");
        return None;
    };
    let mut scene = Scene::new();
    let root = push_components(&mut scene, ElementKind::Interface, components);
    Some((scene, root))
}

pub fn transform_trace(entry: &Entry) -> Option<(Scene, ElementId)> {
    let Some(steps) = &entry.trace else {
        debug!(entry = %entry.name, "no trace to display");
        return None;
    };
    let mut scene = Scene::new();
    let root = scene.push(None, ElementKind::Trace, ElementData::None);
    for step in steps {
        push_text(&mut scene, root, step, TextRole::Step);
    }
    Some((scene, root))
}

fn push_text(scene: &mut Scene, parent: ElementId, content: &str, role: TextRole) -> ElementId {
    scene.push(
        Some(parent),
        ElementKind::Text,
        ElementData::Text {
            content: content.to_string(),
            annotation: None,
            role,
        },
    )
}

fn push_label(scene: &mut Scene, parent: ElementId, name: &str) -> ElementId {
    scene.push(
        Some(parent),
        ElementKind::Label,
        ElementData::Label {
            name: name.to_string(),
        },
    )
}

fn push_tree(scene: &mut Scene, parent: Option<ElementId>, source: &SourceNode) -> ElementId {
    let tree = scene.push(parent, ElementKind::Tree, ElementData::None);
    push_node(scene, tree, source);
    if !source.daughters.is_empty() {
        let children = scene.push(Some(tree), ElementKind::Children, ElementData::None);
        for daughter in &source.daughters {
            push_tree(scene, Some(children), daughter);
        }
    }
    tree
}

fn push_node(scene: &mut Scene, tree: ElementId, source: &SourceNode) -> ElementId {
    let mark = if source.kind == "std" {
        None
    } else {
        let mark = Mark::from_kind(&source.kind);
        if mark.is_none() {
            debug!(kind = %source.kind, "unknown node type, drawn without a mark");
        }
        mark
    };
    let name = source
        .name
        .as_deref()
        .filter(|name| !is_synthetic_name(name))
        .map(str::to_string);

    let node = scene.push(
        Some(tree),
        ElementKind::Node,
        ElementData::Node(NodeData {
            mark,
            name: name.clone(),
            cat: None,
            phon: None,
            state: CollapseState::Expanded,
        }),
    );

    let empty = SourceFs::default();
    let fs = push_fs(scene, node, source.fs.as_ref().unwrap_or(&empty));
    reorder_top_bot(scene, fs);
    let cat = feature_atom(source.fs.as_ref(), "cat");
    let phon = feature_atom(source.fs.as_ref(), "phon");
    if let Some(name) = &name {
        annotate_cat(scene, fs, name);
    }

    let (content, role, annotation) = match &phon {
        Some(phon) => (phon.clone(), TextRole::Phon, None),
        None => (
            cat.clone().unwrap_or_default().to_uppercase(),
            TextRole::Category,
            name.clone(),
        ),
    };
    scene.push(
        Some(node),
        ElementKind::CatLabel,
        ElementData::Text {
            content,
            annotation,
            role,
        },
    );
    if let Some(mark) = mark.filter(|mark| mark.glyph_path().is_some()) {
        scene.push(Some(node), ElementKind::Mark, ElementData::Mark(mark));
    }
    scene.push(Some(node), ElementKind::CeSwitch, ElementData::None);

    if let Some(node_data) = scene.node_mut(node) {
        node_data.cat = cat;
        node_data.phon = phon;
    }
    node
}

fn feature_atom(fs: Option<&SourceFs>, feature: &str) -> Option<String> {
    fs?.features.iter().find_map(|f| match &f.value {
        SourceValue::Atom(atom) if f.name == feature => atom.value.clone(),
        _ => None,
    })
}

/// `top` first, `bot` last.
fn reorder_top_bot(scene: &mut Scene, fs: ElementId) {
    let find = |scene: &Scene, wanted: &str| {
        scene.children(fs).iter().copied().find(|child| {
            matches!(&scene.get(*child).data, ElementData::Feature { name } if name == wanted)
        })
    };
    if let Some(top) = find(scene, "top") {
        let first = usize::from(scene.child_of_kind(fs, ElementKind::Type).is_some());
        scene.reorder_child(fs, top, first);
    }
    if let Some(bot) = find(scene, "bot") {
        scene.reorder_child(fs, bot, usize::MAX);
    }
}

/// Appends the node name to every CAT value of the node's feature structure.
fn annotate_cat(scene: &mut Scene, fs: ElementId, name: &str) {
    for id in scene.descendants(fs) {
        let is_cat = matches!(&scene.get(id).data, ElementData::Feature { name } if name == "cat");
        if !is_cat {
            continue;
        }
        let Some(value) = scene.child_of_kind(id, ElementKind::Value) else {
            continue;
        };
        let Some(text) = scene.child_of_kind(value, ElementKind::Text) else {
            continue;
        };
        if let ElementData::Text { annotation, .. } = &mut scene.get_mut(text).data {
            *annotation = Some(name.to_string());
        }
    }
}

pub(crate) fn push_fs(scene: &mut Scene, parent: ElementId, source: &SourceFs) -> ElementId {
    let label = source.coref.as_deref().map(strip_sigil);
    let fs = scene.push(
        Some(parent),
        ElementKind::Fs,
        ElementData::Fs {
            label,
            fstype: source.fstype.clone(),
        },
    );
    if let Some(fstype) = &source.fstype {
        scene.push(
            Some(fs),
            ElementKind::Type,
            ElementData::Type {
                name: fstype.clone(),
            },
        );
    }
    for feature in &source.features {
        let feature_id = scene.push(
            Some(fs),
            ElementKind::Feature,
            ElementData::Feature {
                name: feature.name.clone(),
            },
        );
        push_text(scene, feature_id, &feature.name, TextRole::FeatureName);
        match &feature.value {
            SourceValue::Atom(atom) => {
                let label = atom.label();
                let value = scene.push(
                    Some(feature_id),
                    ElementKind::Value,
                    ElementData::Value {
                        label: label.clone(),
                    },
                );
                if let Some(label) = &label {
                    push_label(scene, value, label);
                }
                let content = atom.value.clone().unwrap_or_default();
                if label.is_none() || !content.is_empty() {
                    push_text(scene, value, &content, TextRole::Atom);
                }
            }
            SourceValue::Fs(inner) => {
                push_labelled_fs(scene, feature_id, inner);
            }
            SourceValue::Alternation(alternatives) => {
                let value = scene.push(
                    Some(feature_id),
                    ElementKind::Value,
                    ElementData::Value { label: None },
                );
                push_text(
                    scene,
                    value,
                    &format!("@{{{}}}", alternatives.join(",")),
                    TextRole::Atom,
                );
            }
        }
    }
    fs
}

/// A value box holding an optional co-index label followed by the structure.
fn push_labelled_fs(scene: &mut Scene, parent: ElementId, source: &SourceFs) -> ElementId {
    let label = source.coref.as_deref().map(strip_sigil);
    let value = scene.push(
        Some(parent),
        ElementKind::Value,
        ElementData::Value {
            label: label.clone(),
        },
    );
    if let Some(label) = &label {
        push_label(scene, value, label);
    }
    push_fs(scene, value, source);
    value
}

fn push_components(scene: &mut Scene, kind: ElementKind, components: &[Component]) -> ElementId {
    let root = scene.push(None, kind, ElementData::None);
    for component in components {
        match component {
            Component::Fs(fs) => {
                push_labelled_fs(scene, root, fs);
            }
            Component::Relation(relation) => {
                push_relation(scene, root, relation);
            }
        }
    }
    root
}

fn push_relation(scene: &mut Scene, parent: ElementId, relation: &Relation) -> ElementId {
    let rel = scene.push(
        Some(parent),
        ElementKind::Relation,
        ElementData::Relation {
            name: relation.name.clone(),
        },
    );
    push_text(scene, rel, &relation.name, TextRole::Token);
    push_text(scene, rel, "(", TextRole::Token);
    for (idx, arg) in relation.args.iter().enumerate() {
        if idx > 0 {
            push_text(scene, rel, ",", TextRole::Token);
        }
        if arg.is_var() {
            push_label(scene, rel, &arg.display());
        } else {
            push_text(scene, rel, &arg.display(), TextRole::Token);
        }
    }
    push_text(scene, rel, ")", TextRole::Token);
    rel
}

fn push_semantics(scene: &mut Scene, items: &[SemItem]) -> ElementId {
    let root = scene.push(None, ElementKind::Pred, ElementData::None);
    for item in items {
        let line = scene.push(Some(root), ElementKind::Line, ElementData::None);
        match item {
            SemItem::Literal {
                negated,
                label,
                predicate,
                args,
            } => {
                if *negated {
                    push_text(scene, line, "¬", TextRole::Token);
                }
                // Labels may arrive as values that still carry the variable sigil.
                push_label(scene, line, &strip_sigil(&label.display()));
                push_text(scene, line, ":", TextRole::Token);
                push_operand(scene, line, predicate);
                push_text(scene, line, "(", TextRole::Token);
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        push_text(scene, line, ",", TextRole::Token);
                    }
                    push_operand(scene, line, arg);
                }
                push_text(scene, line, ")", TextRole::Token);
            }
            SemItem::Dominance { left, right } => {
                push_operand(scene, line, left);
                push_text(scene, line, ">>", TextRole::Token);
                push_operand(scene, line, right);
            }
        }
    }
    root
}

fn push_operand(scene: &mut Scene, line: ElementId, operand: &VarRef) {
    push_label(scene, line, &operand.display());
}

fn push_morph(scene: &mut Scene, morph: &Morph) -> ElementId {
    let root = scene.push(None, ElementKind::Morph, ElementData::None);
    push_text(scene, root, &morph.surface, TextRole::Surface);
    for (idx, field) in morph.fields.iter().enumerate() {
        if idx > 0 {
            push_text(scene, root, "-", TextRole::Surface);
        }
        let group = scene.push(Some(root), ElementKind::Line, ElementData::None);
        push_text(scene, group, &field.string, TextRole::Surface);
        for fs in &field.feats {
            push_fs(scene, group, fs);
        }
    }
    root
}

/// Plain-text rendering of one predicate line, tokens separated by single spaces.
pub fn pred_line_text(scene: &Scene, line: ElementId) -> String {
    scene
        .children(line)
        .iter()
        .filter_map(|token| match &scene.get(*token).data {
            ElementData::Label { name, .. } => Some(name.as_str()),
            ElementData::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn entry(xml: &str) -> Entry {
        parse_document(xml).unwrap().entries.remove(0)
    }

    #[test]
    fn synthetic_names_are_suppressed() {
        let e = entry(
            r#"<entry name="t"><tree><node type="std" name="XMGVAR_12"><narg><fs><f name="cat"><sym value="s"/></f></fs></narg></node></tree></entry>"#,
        );
        let (scene, root) = transform_tree(&e).unwrap();
        let node = scene.child_of_kind(root, ElementKind::Node).unwrap();
        let data = scene.node(node).unwrap();
        assert_eq!(data.name, None);
        assert_eq!(data.cat.as_deref(), Some("s"));
    }

    #[test]
    fn tree_shape_uses_children_wrapper() {
        let e = entry(
            r#"<entry name="t"><tree><node type="std" name="Root"><narg><fs><f name="cat"><sym value="s"/></f></fs></narg>
               <node type="subst"><narg><fs><f name="cat"><sym value="np"/></f></fs></narg></node>
               <node type="anchor"><narg><fs><f name="phon"><sym value="sleeps"/></f></fs></narg></node>
               </node></tree></entry>"#,
        );
        let (scene, root) = transform_tree(&e).unwrap();
        assert_eq!(scene.kind(root), ElementKind::Tree);
        let kinds = scene
            .children(root)
            .iter()
            .map(|c| scene.kind(*c))
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec![ElementKind::Node, ElementKind::Children]);
        let children = scene.child_of_kind(root, ElementKind::Children).unwrap();
        assert_eq!(scene.children(children).len(), 2);
        let second = scene.children(children)[1];
        let leaf = scene.child_of_kind(second, ElementKind::Node).unwrap();
        assert_eq!(scene.node(leaf).unwrap().mark, Some(Mark::Anchor));
        assert_eq!(scene.node(leaf).unwrap().phon.as_deref(), Some("sleeps"));
        assert!(scene.child_of_kind(second, ElementKind::Children).is_none());
    }

    #[test]
    fn top_and_bot_rows_are_reordered() {
        let e = entry(
            r#"<entry name="t"><tree><node type="std"><narg><fs>
               <f name="bot"><fs><f name="a"><sym value="1"/></f></fs></f>
               <f name="cat"><sym value="s"/></f>
               <f name="top"><fs><f name="a"><sym value="2"/></f></fs></f>
               </fs></narg></node></tree></entry>"#,
        );
        let (scene, root) = transform_tree(&e).unwrap();
        let node = scene.child_of_kind(root, ElementKind::Node).unwrap();
        let fs = scene.child_of_kind(node, ElementKind::Fs).unwrap();
        let names = scene
            .children(fs)
            .iter()
            .filter_map(|f| match &scene.get(*f).data {
                ElementData::Feature { name } => Some(name.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["top", "cat", "bot"]);
    }

    #[test]
    fn frame_without_components_is_empty() {
        let e = entry(r#"<entry name="t"><frame/></entry>"#);
        assert!(transform_frame(&e).is_none());
    }

    #[test]
    fn tree_only_entry_has_no_frame() {
        let e = entry(
            r#"<entry name="t"><tree><node type="std"><narg><fs/></narg><node type="subst"><narg><fs/></narg></node><node type="anchor"><narg><fs/></narg></node></node></tree></entry>"#,
        );
        assert!(transform_frame(&e).is_none());
        assert!(transform_interface(&e).is_none());
        assert!(transform_trace(&e).is_none());
    }

    #[test]
    fn literal_prints_label_predicate_and_args() {
        let e = entry(
            r#"<entry name="t"><semantics><literal negated="no">
               <label><sym varname="@l1"/></label><predicate><sym value="p"/></predicate>
               <arg><sym varname="@x"/></arg><arg><sym varname="@y"/></arg>
               </literal></semantics></entry>"#,
        );
        let (scene, root) = transform_frame(&e).unwrap();
        assert_eq!(scene.kind(root), ElementKind::Pred);
        let line = scene.children(root)[0];
        assert_eq!(pred_line_text(&scene, line), "l1 : p ( x , y )");
    }

    #[test]
    fn literal_label_given_as_value_loses_its_sigil() {
        let e = entry(
            r#"<entry name="t"><semantics>
               <literal negated="no"><label><sym value="@l1"/></label><predicate><sym value="p"/></predicate><arg><sym varname="@x"/></arg></literal>
               <semdominance><sym varname="@h0"/><sym varname="@l1"/></semdominance>
               </semantics></entry>"#,
        );
        let (scene, root) = transform_frame(&e).unwrap();
        let lines = scene.children(root);
        assert_eq!(pred_line_text(&scene, lines[0]), "l1 : p ( x )");
        let labels = scene
            .descendants(root)
            .into_iter()
            .filter(|id| scene.label_name(*id) == Some("l1"))
            .count();
        assert_eq!(labels, 2);
    }

    #[test]
    fn dominance_and_missing_operands() {
        let e = entry(
            r#"<entry name="t"><semantics><semdominance><sym varname="@h0"/><sym/></semdominance></semantics></entry>"#,
        );
        let (scene, root) = transform_frame(&e).unwrap();
        let line = scene.children(root)[0];
        assert_eq!(pred_line_text(&scene, line), "h0 >> ");
    }

    #[test]
    fn relation_arguments_keep_variables_clickable() {
        let e = entry(
            r#"<entry name="t"><frame><relation name="part-of"><sym varname="@X"/><sym value="c"/></relation></frame></entry>"#,
        );
        let (scene, root) = transform_frame(&e).unwrap();
        let rel = scene.children(root)[0];
        assert_eq!(scene.kind(rel), ElementKind::Relation);
        let labels = scene
            .children(rel)
            .iter()
            .filter_map(|c| scene.label_name(*c))
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["X"]);
    }
}
