use crate::model::{ElementId, Scene};
use serde::Serialize;
use std::collections::HashMap;

/// A box in the coordinate system of its parent element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn approx_eq(&self, other: &Rect, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// The two bracket polylines of a feature structure, local to the structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brackets {
    pub left: Vec<(f32, f32)>,
    pub right: Vec<(f32, f32)>,
}

impl Brackets {
    pub fn height(&self) -> f32 {
        let ys = self.left.iter().map(|(_, y)| *y);
        let (min, max) = ys.fold((f32::MAX, f32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if min > max { 0.0 } else { max - min }
    }
}

/// A line between a tree root and one daughter, local to the tree element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeLayout {
    pub daughter: ElementId,
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub dashed: bool,
}

/// Geometry table: one box per element plus the decorations layout derives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Geometry {
    rects: Vec<Rect>,
    pub brackets: HashMap<ElementId, Brackets>,
    pub edges: HashMap<ElementId, Vec<EdgeLayout>>,
}

impl Geometry {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            rects: vec![Rect::default(); len],
            brackets: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    pub fn rect(&self, id: ElementId) -> Rect {
        self.rects.get(id.index()).copied().unwrap_or_default()
    }

    pub fn rect_mut(&mut self, id: ElementId) -> &mut Rect {
        if id.index() >= self.rects.len() {
            self.rects.resize(id.index() + 1, Rect::default());
        }
        &mut self.rects[id.index()]
    }

    pub fn set_size(&mut self, id: ElementId, width: f32, height: f32) {
        let rect = self.rect_mut(id);
        rect.width = width;
        rect.height = height;
    }

    pub fn place(&mut self, id: ElementId, x: f32, y: f32) {
        let rect = self.rect_mut(id);
        rect.x = x;
        rect.y = y;
    }

    pub fn size(&self, id: ElementId) -> (f32, f32) {
        let rect = self.rect(id);
        (rect.width, rect.height)
    }

    /// Position of the element's origin in the coordinate system of the scene root.
    pub fn absolute(&self, scene: &Scene, id: ElementId) -> Rect {
        let mut rect = self.rect(id);
        let mut current = scene.parent(id);
        while let Some(parent) = current {
            let parent_rect = self.rect(parent);
            rect.x += parent_rect.x;
            rect.y += parent_rect.y;
            current = scene.parent(parent);
        }
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementData, ElementKind};

    #[test]
    fn absolute_sums_parent_offsets() {
        let mut scene = Scene::new();
        let root = scene.push(None, ElementKind::Tree, ElementData::None);
        let mid = scene.push(Some(root), ElementKind::Children, ElementData::None);
        let leaf = scene.push(Some(mid), ElementKind::Tree, ElementData::None);
        let mut geometry = Geometry::with_capacity(scene.len());
        geometry.place(root, 1.0, 1.0);
        geometry.place(mid, 10.0, 20.0);
        geometry.place(leaf, 5.0, 0.0);
        geometry.set_size(leaf, 3.0, 4.0);
        let abs = geometry.absolute(&scene, leaf);
        assert_eq!(
            abs,
            Rect {
                x: 16.0,
                y: 21.0,
                width: 3.0,
                height: 4.0
            }
        );
    }

    #[test]
    fn bracket_height_spans_polyline() {
        let brackets = Brackets {
            left: vec![(6.0, 0.0), (1.0, 0.0), (1.0, 42.0), (6.0, 42.0)],
            right: vec![],
        };
        assert_eq!(brackets.height(), 42.0);
    }
}
