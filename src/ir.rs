//! Typed view of the grammar compiler's XML output.
//!
//! Everything here is owned data extracted by [`crate::parser`]; nothing in this module
//! knows about geometry.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Grammar {
    pub entries: Vec<Entry>,
}

impl Grammar {
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

/// One named grammar artifact.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Entry {
    pub name: String,
    pub tree: Option<SourceTree>,
    /// `None` when the entry has no `frame`; `Some(vec![])` when it is present but empty.
    pub frame: Option<Vec<Component>>,
    pub interface: Option<Vec<Component>>,
    pub semantics: Option<Vec<SemItem>>,
    pub trace: Option<Vec<String>>,
    pub morph: Option<Morph>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceTree {
    pub root: SourceNode,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceNode {
    /// The node's `type` attribute (`std`, `anchor`, `subst`, ...).
    pub kind: String,
    pub name: Option<String>,
    pub fs: Option<SourceFs>,
    pub daughters: Vec<SourceNode>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceFs {
    pub coref: Option<String>,
    pub fstype: Option<String>,
    pub features: Vec<SourceFeature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFeature {
    pub name: String,
    pub value: SourceValue,
}

#[derive(Debug, Clone, Serialize)]
pub enum SourceValue {
    Atom(VarRef),
    Fs(SourceFs),
    Alternation(Vec<String>),
}

/// A `sym`-like operand: a variable reference, a literal value, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VarRef {
    pub varname: Option<String>,
    pub value: Option<String>,
}

impl VarRef {
    pub fn var(name: &str) -> Self {
        Self {
            varname: Some(name.to_string()),
            value: None,
        }
    }

    pub fn literal(value: &str) -> Self {
        Self {
            varname: None,
            value: Some(value.to_string()),
        }
    }

    /// Variable name without the `@` sigil.
    pub fn label(&self) -> Option<String> {
        self.varname.as_deref().map(strip_sigil)
    }

    /// What gets printed for this operand. A reference with neither a variable nor a
    /// value prints as the empty string.
    pub fn display(&self) -> String {
        if let Some(label) = self.label() {
            return label;
        }
        self.value.clone().unwrap_or_default()
    }

    pub fn is_var(&self) -> bool {
        self.varname.is_some()
    }
}

pub fn strip_sigil(raw: &str) -> String {
    raw.replacen('@', "", 1)
}

#[derive(Debug, Clone, Serialize)]
pub enum Component {
    Fs(SourceFs),
    Relation(Relation),
}

#[derive(Debug, Clone, Serialize)]
pub struct Relation {
    pub name: String,
    pub args: Vec<VarRef>,
}

#[derive(Debug, Clone, Serialize)]
pub enum SemItem {
    Literal {
        negated: bool,
        label: VarRef,
        predicate: VarRef,
        args: Vec<VarRef>,
    },
    Dominance {
        left: VarRef,
        right: VarRef,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Morph {
    pub surface: String,
    pub fields: Vec<MorphField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MorphField {
    pub string: String,
    pub feats: Vec<SourceFs>,
}
