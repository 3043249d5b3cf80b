//! Semantic element tree produced by [`crate::transform`].
//!
//! Elements live in an arena and refer to each other by [`ElementId`]; geometry is kept
//! elsewhere (see [`crate::layout::Geometry`]).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementId(pub usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    Frame,
    Interface,
    Pred,
    Trace,
    Morph,
    Tree,
    Children,
    Node,
    Fs,
    Feature,
    Value,
    Type,
    Label,
    Mark,
    CeSwitch,
    CatLabel,
    Relation,
    Line,
    Text,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Frame => "frame",
            ElementKind::Interface => "interface",
            ElementKind::Pred => "pred",
            ElementKind::Trace => "trace",
            ElementKind::Morph => "morph",
            ElementKind::Tree => "tree",
            ElementKind::Children => "children",
            ElementKind::Node => "node",
            ElementKind::Fs => "fs",
            ElementKind::Feature => "feature",
            ElementKind::Value => "value",
            ElementKind::Type => "type",
            ElementKind::Label => "label",
            ElementKind::Mark => "mark",
            ElementKind::CeSwitch => "ce-switch",
            ElementKind::CatLabel => "catlabel",
            ElementKind::Relation => "relation",
            ElementKind::Line => "line",
            ElementKind::Text => "text",
        }
    }
}

/// Side of the square box mark and switch glyphs are designed in.
pub const GLYPH_DESIGN_SIZE: f32 = 20.0;

/// Structural role of a tree node, drawn as a glyph next to its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mark {
    Anchor,
    Subst,
    Foot,
    Star,
    OpBound,
    DDaughter,
}

impl Mark {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "anchor" => Some(Mark::Anchor),
            "subst" => Some(Mark::Subst),
            "foot" => Some(Mark::Foot),
            "star" => Some(Mark::Star),
            "op-bound" => Some(Mark::OpBound),
            "ddaughter" => Some(Mark::DDaughter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::Anchor => "anchor",
            Mark::Subst => "subst",
            Mark::Foot => "foot",
            Mark::Star => "star",
            Mark::OpBound => "op-bound",
            Mark::DDaughter => "ddaughter",
        }
    }

    /// SVG path of the glyph in its unscaled 20×20 design box. `ddaughter` has no glyph;
    /// it shows as a dashed edge instead.
    pub fn glyph_path(self) -> Option<&'static str> {
        match self {
            Mark::Anchor => Some("M 10 0 L 0 10 L 10 20 L 20 10 Z"),
            Mark::Subst => Some("M 5 0 L 5 20 L 0 10 M 5 20 L 10 10"),
            Mark::Foot | Mark::Star => Some(
                "M 10 10 L 0 10 M 10 10 L 10 0 M 10 10 L 2 2 M 10 10 L 18 18 M 10 10 L 20 10 M 10 10 L 10 20 M 10 10 L 2 18 M 10 10 L 18 2",
            ),
            Mark::OpBound => Some("M 0 5 L 20 5 M 0 15 L 20 15"),
            Mark::DDaughter => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollapseState {
    Expanded,
    Collapsed,
}

impl CollapseState {
    pub fn flipped(self) -> Self {
        match self {
            CollapseState::Expanded => CollapseState::Collapsed,
            CollapseState::Collapsed => CollapseState::Expanded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextRole {
    FeatureName,
    Atom,
    Category,
    Phon,
    Token,
    Surface,
    Step,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeData {
    pub mark: Option<Mark>,
    pub name: Option<String>,
    pub cat: Option<String>,
    pub phon: Option<String>,
    pub state: CollapseState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElementData {
    None,
    Node(NodeData),
    Fs {
        label: Option<String>,
        fstype: Option<String>,
    },
    Feature {
        name: String,
    },
    Value {
        label: Option<String>,
    },
    Type {
        name: String,
    },
    /// Clickable co-index box. `name` is the identity used for highlighting.
    Label {
        name: String,
    },
    Mark(Mark),
    Text {
        content: String,
        /// Drawn bold and red after the content (node names).
        annotation: Option<String>,
        role: TextRole,
    },
    Relation {
        name: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub data: ElementData,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    elements: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Adds an element and links it under `parent`.
    pub fn push(
        &mut self,
        parent: Option<ElementId>,
        kind: ElementKind,
        data: ElementData,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            kind,
            parent,
            children: Vec::new(),
            data,
        });
        if let Some(parent) = parent {
            self.elements[parent.0].children.push(id);
        }
        id
    }

    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn get_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn kind(&self, id: ElementId) -> ElementKind {
        self.elements[id.0].kind
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id.0].children
    }

    pub fn child_of_kind(&self, id: ElementId, kind: ElementKind) -> Option<ElementId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.kind(*child) == kind)
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len()).map(ElementId)
    }

    /// Depth-first pre-order walk starting at `root`.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Moves `child` to position `index` among its siblings.
    pub fn reorder_child(&mut self, parent: ElementId, child: ElementId, index: usize) {
        let children = &mut self.elements[parent.0].children;
        if let Some(pos) = children.iter().position(|c| *c == child) {
            children.remove(pos);
            let index = index.min(children.len());
            children.insert(index, child);
        }
    }

    pub fn node(&self, id: ElementId) -> Option<&NodeData> {
        match &self.elements[id.0].data {
            ElementData::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn node_mut(&mut self, id: ElementId) -> Option<&mut NodeData> {
        match &mut self.elements[id.0].data {
            ElementData::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        match &self.elements[id.0].data {
            ElementData::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn label_name(&self, id: ElementId) -> Option<&str> {
        match &self.elements[id.0].data {
            ElementData::Label { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Tree nodes under `root`, in pre-order.
    pub fn tree_nodes(&self, root: ElementId) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.kind(*id) == ElementKind::Node)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_links_parent_and_child() {
        let mut scene = Scene::new();
        let root = scene.push(None, ElementKind::Tree, ElementData::None);
        let child = scene.push(Some(root), ElementKind::Children, ElementData::None);
        assert_eq!(scene.parent(child), Some(root));
        assert_eq!(scene.children(root), &[child]);
        assert_eq!(scene.kind(child).as_str(), "children");
    }

    #[test]
    fn reorder_moves_child() {
        let mut scene = Scene::new();
        let root = scene.push(None, ElementKind::Fs, ElementData::None);
        let a = scene.push(Some(root), ElementKind::Feature, ElementData::None);
        let b = scene.push(Some(root), ElementKind::Feature, ElementData::None);
        let c = scene.push(Some(root), ElementKind::Feature, ElementData::None);
        scene.reorder_child(root, c, 0);
        assert_eq!(scene.children(root), &[c, a, b]);
        scene.reorder_child(root, c, usize::MAX);
        assert_eq!(scene.children(root), &[a, b, c]);
    }

    #[test]
    fn mark_kinds_round_trip() {
        for kind in ["anchor", "subst", "foot", "star", "op-bound", "ddaughter"] {
            assert_eq!(Mark::from_kind(kind).map(Mark::as_str), Some(kind));
        }
        assert_eq!(Mark::from_kind("std"), None);
    }
}
