//! Text exports of a view: LaTeX (forest + avm packages), Graphviz DOT and standalone SVG.

use crate::interaction::View;
use crate::model::{CollapseState, ElementData, ElementId, ElementKind, Mark, Scene};
use crate::render::{RenderMode, render_svg};
use std::fmt::Write as _;

/// A standalone SVG document and the name to save it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgFile {
    pub file_name: String,
    pub contents: String,
}

/// Static SVG of the view, named after the entry.
pub fn export_svg(view: &View) -> SvgFile {
    SvgFile {
        file_name: format!("{}.svg", view.entry_name()),
        contents: render_svg(view, RenderMode::Static),
    }
}

/// LaTeX for the current state of the view: collapsed nodes export their category label.
pub fn export_latex(view: &View) -> String {
    latex_document(view.scene(), view.root())
}

/// One `digraph` describing every feature structure and relation of the view.
pub fn export_dot(view: &View) -> String {
    dot_document(view.scene(), view.root())
}

pub(crate) fn latex_document(scene: &Scene, root: ElementId) -> String {
    match scene.kind(root) {
        ElementKind::Tree => format!("\\Forest{{\n\t{}\n}}\n", latex_tree(scene, root, "\t")),
        ElementKind::Frame | ElementKind::Interface => {
            let mut out = String::new();
            for component in scene.children(root) {
                match scene.kind(*component) {
                    ElementKind::Value => {
                        out.push_str("\\begin{avm}\n");
                        if let Some(label) = scene.child_of_kind(*component, ElementKind::Label) {
                            let name = scene.label_name(label).unwrap_or_default();
                            let _ = write!(out, "\\@{{{name}}}");
                        }
                        if let Some(fs) = scene.child_of_kind(*component, ElementKind::Fs) {
                            out.push_str(&latex_fs(scene, fs));
                        }
                        out.push_str("\n\\end{avm}\n\n");
                    }
                    ElementKind::Relation => {
                        out.push_str("\\begin{avm}\n");
                        out.push_str(&latex_tokens(scene, *component));
                        out.push_str("\n\\end{avm}\n\n");
                    }
                    _ => {}
                }
            }
            out.push('\n');
            out
        }
        ElementKind::Pred => scene
            .children(root)
            .iter()
            .map(|line| format!("{}\n", latex_tokens(scene, *line)))
            .collect(),
        ElementKind::Trace => scene
            .children(root)
            .iter()
            .filter_map(|step| scene.text(*step))
            .map(|step| format!("{step}\n"))
            .collect(),
        ElementKind::Morph => latex_morph(scene, root),
        ElementKind::Fs => format!("\\begin{{avm}}{}\\end{{avm}}\n", latex_fs(scene, root)),
        _ => String::new(),
    }
}

fn latex_tree(scene: &Scene, tree: ElementId, indent: &str) -> String {
    let mut out = String::from("[");
    if let Some(node) = scene.child_of_kind(tree, ElementKind::Node) {
        out.push_str(&latex_node(scene, node));
    }
    if let Some(children) = scene.child_of_kind(tree, ElementKind::Children) {
        let indent = format!("{indent}\t");
        for daughter in scene.children(children) {
            out.push('\n');
            out.push_str(&indent);
            out.push_str(&latex_tree(scene, *daughter, &indent));
        }
    }
    out.push(']');
    out
}

fn latex_node(scene: &Scene, node: ElementId) -> String {
    let Some(data) = scene.node(node) else {
        return "{}".to_string();
    };
    let mut out = String::from("{");
    match data.state {
        CollapseState::Expanded => {
            if let Some(fs) = scene.child_of_kind(node, ElementKind::Fs) {
                let _ = write!(out, "\\begin{{avm}}{}\\end{{avm}}", latex_fs(scene, fs));
            }
        }
        CollapseState::Collapsed => match &data.phon {
            Some(phon) => {
                let _ = write!(out, "\\textit{{{phon}}}");
            }
            None => out.push_str(&data.cat.as_deref().unwrap_or_default().to_uppercase()),
        },
    }
    if let Some(suffix) = data.mark.and_then(mark_suffix) {
        out.push_str(suffix);
    }
    out.push('}');
    out
}

fn mark_suffix(mark: Mark) -> Option<&'static str> {
    match mark {
        Mark::Subst => Some("$\\downarrow$"),
        Mark::Anchor => Some("$\\diamond$"),
        Mark::Foot | Mark::Star => Some("*"),
        Mark::OpBound => Some("$=\\joinrel=$"),
        Mark::DDaughter => None,
    }
}

fn latex_fs(scene: &Scene, fs: ElementId) -> String {
    let mut out = String::from("\\[");
    if let ElementData::Fs {
        fstype: Some(fstype),
        ..
    } = &scene.get(fs).data
    {
        let _ = write!(out, "\\asort{{{}}}", fstype.replace('_', "\\_"));
    }
    for feature in scene.children(fs) {
        let ElementData::Feature { name } = &scene.get(*feature).data else {
            continue;
        };
        let _ = write!(out, "{} & ", name.to_lowercase());
        if let Some(value) = scene.child_of_kind(*feature, ElementKind::Value) {
            let mut label = String::new();
            let mut content = String::new();
            for part in scene.children(value) {
                match &scene.get(*part).data {
                    ElementData::Label { name, .. } => label = format!("\\@{{{name}}} "),
                    ElementData::Text { content: text, .. } => content = text.clone(),
                    ElementData::Fs { .. } => content.push_str(&latex_fs(scene, *part)),
                    _ => {}
                }
            }
            let _ = write!(out, "{label}{content}");
        }
        out.push_str(" \\\\ ");
    }
    out.push_str("\\]");
    out
}

/// Relation or predicate line with co-indexes as `\@{...}` boxes.
fn latex_tokens(scene: &Scene, row: ElementId) -> String {
    let mut out = String::new();
    for token in scene.children(row) {
        match &scene.get(*token).data {
            ElementData::Label { name, .. } => {
                let _ = write!(out, "\\@{{{name}}} ");
            }
            ElementData::Text { content, .. } => out.push_str(content),
            _ => {}
        }
    }
    out
}

fn latex_morph(scene: &Scene, root: ElementId) -> String {
    let mut out = String::new();
    let mut fields = Vec::new();
    for child in scene.children(root) {
        match scene.kind(*child) {
            ElementKind::Text if out.is_empty() => {
                let _ = writeln!(out, "{}", scene.text(*child).unwrap_or_default());
            }
            ElementKind::Line => {
                let string = scene
                    .child_of_kind(*child, ElementKind::Text)
                    .and_then(|text| scene.text(text))
                    .unwrap_or_default();
                let feats: String = scene
                    .children(*child)
                    .iter()
                    .filter(|part| scene.kind(**part) == ElementKind::Fs)
                    .map(|fs| format!("\\begin{{avm}}{}\\end{{avm}}", latex_fs(scene, *fs)))
                    .collect();
                fields.push(format!("{string}{feats}"));
            }
            _ => {}
        }
    }
    if !fields.is_empty() {
        let _ = writeln!(out, "{}", fields.join(" - "));
    }
    out
}

pub(crate) fn dot_document(scene: &Scene, root: ElementId) -> String {
    let mut out = String::from("digraph{\nrankdir=\"TB\";\n");
    for id in scene.descendants(root) {
        match scene.kind(id) {
            ElementKind::Fs => dot_fs(scene, id, &mut out),
            ElementKind::Relation => dot_relation(scene, id, &mut out),
            _ => {}
        }
    }
    out.push_str("}\n");
    out
}

fn dot_quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

fn fs_node_id(scene: &Scene, fs: ElementId) -> String {
    match &scene.get(fs).data {
        ElementData::Fs {
            label: Some(label), ..
        } => dot_quote(&format!("[{label}]")),
        _ => dot_quote(&format!("fs{}", fs.index())),
    }
}

fn dot_fs(scene: &Scene, fs: ElementId, out: &mut String) {
    let node = fs_node_id(scene, fs);
    match &scene.get(fs).data {
        ElementData::Fs {
            fstype: Some(fstype),
            ..
        } => {
            let _ = writeln!(out, "{node} [label={}];", dot_quote(fstype));
        }
        ElementData::Fs { label: None, .. } => {
            let _ = writeln!(out, "{node} [label=\"\"];");
        }
        _ => {
            let _ = writeln!(out, "{node};");
        }
    }
    for feature in scene.children(fs) {
        let ElementData::Feature { name } = &scene.get(*feature).data else {
            continue;
        };
        let Some(value) = scene.child_of_kind(*feature, ElementKind::Value) else {
            continue;
        };
        let target = dot_value_target(scene, value, out);
        let _ = writeln!(out, "{node} -> {target} [label={}];", dot_quote(name));
    }
}

/// Node a feature or relation argument points to, declaring it when it is a plain atom.
fn dot_value_target(scene: &Scene, value: ElementId, out: &mut String) -> String {
    if let Some(fs) = scene.child_of_kind(value, ElementKind::Fs) {
        return fs_node_id(scene, fs);
    }
    if let Some(label) = scene.child_of_kind(value, ElementKind::Label) {
        return dot_quote(&format!("[{}]", scene.label_name(label).unwrap_or_default()));
    }
    let text = scene
        .child_of_kind(value, ElementKind::Text)
        .and_then(|text| scene.text(text))
        .unwrap_or_default();
    let node = dot_quote(&format!("v{}", value.index()));
    let _ = writeln!(out, "{node} [label={}, shape=plaintext];", dot_quote(text));
    node
}

fn dot_relation(scene: &Scene, relation: ElementId, out: &mut String) {
    let name = match &scene.get(relation).data {
        ElementData::Relation { name } => name.as_str(),
        _ => "",
    };
    let node = dot_quote(&format!("rel{}", relation.index()));
    let _ = writeln!(out, "{node} [label={}, shape=box];", dot_quote(name));
    // Tokens after the name are "(", args separated by ",", then ")".
    let args = scene.children(relation).iter().skip(1).filter(|token| {
        !matches!(
            &scene.get(**token).data,
            ElementData::Text { content, .. } if matches!(content.as_str(), "(" | ")" | ",")
        )
    });
    for (position, arg) in args.enumerate() {
        let target = match &scene.get(*arg).data {
            ElementData::Label { name, .. } => dot_quote(&format!("[{name}]")),
            ElementData::Text { content, .. } => {
                let atom = dot_quote(&format!("v{}", arg.index()));
                let _ = writeln!(out, "{atom} [label={}, shape=plaintext];", dot_quote(content));
                atom
            }
            _ => continue,
        };
        let _ = writeln!(out, "{node} -> {target} [label=\"{}\"];", position + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use crate::transform::{pred_line_text, transform_frame, transform_tree};

    fn tree(xml: &str) -> (Scene, ElementId) {
        let grammar = parse_document(xml).unwrap();
        transform_tree(&grammar.entries[0]).unwrap()
    }

    const MARKS: &str = r#"<entry name="t"><tree>
        <node type="std"><narg><fs><f name="cat"><sym value="s"/></f></fs></narg>
          <node type="subst"><narg><fs><f name="cat"><sym value="np"/></f></fs></narg></node>
          <node type="std"><narg><fs><f name="cat"><sym value="vp"/></f></fs></narg>
            <node type="anchor"><narg><fs><f name="cat"><sym value="v"/></f></fs></narg></node>
            <node type="foot"><narg><fs><f name="cat"><sym value="vp"/></f></fs></narg></node>
            <node type="op-bound"><narg><fs><f name="phon"><sym value="to"/></f></fs></narg></node>
          </node>
        </node></tree></entry>"#;

    #[test]
    fn collapsed_tree_exports_categories_and_marks() {
        let (mut scene, root) = tree(MARKS);
        for node in scene.tree_nodes(root) {
            scene.node_mut(node).unwrap().state = CollapseState::Collapsed;
        }
        let latex = latex_document(&scene, root);
        assert_eq!(
            latex,
            "\\Forest{\n\t[{S}\n\t\t[{NP$\\downarrow$}]\n\t\t[{VP}\n\t\t\t[{V$\\diamond$}]\n\t\t\t[{VP*}]\n\t\t\t[{\\textit{to}$=\\joinrel=$}]]]\n}\n"
        );
    }

    #[test]
    fn expanded_node_exports_its_structure() {
        let (scene, root) = tree(
            r#"<entry name="t"><tree><node type="anchor"><narg><fs type="[my_type]">
               <f name="cat"><sym value="v"/></f>
               <f name="idx"><sym varname="@X"/></f>
               <f name="agr"><fs coref="@A"><f name="num"><sym value="sg"/></f></fs></f>
               </fs></narg></node></tree></entry>"#,
        );
        let latex = latex_document(&scene, root);
        assert_eq!(
            latex,
            "\\Forest{\n\t[{\\begin{avm}\\[\\asort{my\\_type}cat & v \\\\ idx & \\@{X}  \\\\ agr & \\@{A} \\[num & sg \\\\ \\] \\\\ \\]\\end{avm}$\\diamond$}]\n}\n"
        );
    }

    #[test]
    fn frame_exports_one_avm_per_component() {
        let grammar = parse_document(
            r#"<entry name="f"><frame>
               <fs coref="@E" type="event"><f name="actor"><sym varname="@X"/></f></fs>
               <relation name="part-of"><sym varname="@X"/><sym value="c"/></relation>
               </frame></entry>"#,
        )
        .unwrap();
        let (scene, root) = transform_frame(&grammar.entries[0]).unwrap();
        let latex = latex_document(&scene, root);
        assert_eq!(
            latex,
            "\\begin{avm}\n\\@{E}\\[\\asort{event}actor & \\@{X}  \\\\ \\]\n\\end{avm}\n\n\\begin{avm}\npart-of(\\@{X} ,c)\n\\end{avm}\n\n\n"
        );

        let dot = dot_document(&scene, root);
        assert!(dot.starts_with("digraph{\nrankdir=\"TB\";\n"));
        assert!(dot.ends_with("}\n"));
        assert_eq!(dot.matches("digraph").count(), 1);
        assert!(dot.contains("\"[E]\" [label=\"event\"];"));
        assert!(dot.contains("\"[E]\" -> \"[X]\" [label=\"actor\"];"));
        assert!(dot.contains("[label=\"part-of\", shape=box];"));
        assert!(dot.contains("-> \"[X]\" [label=\"1\"];"));
        assert!(dot.contains("[label=\"c\", shape=plaintext];"));
    }

    #[test]
    fn predicate_lines_export_inline() {
        let grammar = parse_document(
            r#"<entry name="p"><semantics><literal negated="no">
               <label><sym varname="@l1"/></label><predicate><sym value="p"/></predicate>
               <arg><sym varname="@x"/></arg></literal></semantics></entry>"#,
        )
        .unwrap();
        let (scene, root) = transform_frame(&grammar.entries[0]).unwrap();
        assert_eq!(latex_document(&scene, root), "\\@{l1} :\\@{p} (\\@{x} )\n");
        assert_eq!(pred_line_text(&scene, scene.children(root)[0]), "l1 : p ( x )");
    }
}
