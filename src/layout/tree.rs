use super::*;
use crate::model::{GLYPH_DESIGN_SIZE, Mark};

impl Layouter<'_> {
    /// Lays out daughters first, then the node, then arranges the level.
    pub(super) fn layout_tree(&mut self, tree: ElementId) -> (f32, f32) {
        if let Some(children) = self.scene.child_of_kind(tree, ElementKind::Children) {
            for daughter in self.scene.children(children).to_vec() {
                self.layout_tree(daughter);
            }
        }
        if let Some(node) = self.scene.child_of_kind(tree, ElementKind::Node) {
            self.layout_node(node);
        }
        self.arrange_tree(tree)
    }

    /// Sizes both renditions of a node so a later toggle only has to re-place them.
    fn layout_node(&mut self, node: ElementId) {
        if let Some(fs) = self.scene.child_of_kind(node, ElementKind::Fs) {
            self.layout_fs(fs);
        }
        if let Some(cat) = self.scene.child_of_kind(node, ElementKind::CatLabel) {
            self.layout_text(cat);
        }
        self.place_node_glyphs(node);
    }

    /// Positions mark and collapse switch against whichever content is visible and sizes
    /// the node to fit. Depends only on the content sizes, so toggling twice is a no-op.
    pub(super) fn place_node_glyphs(&mut self, node: ElementId) {
        let cfg = &self.config.tree;
        let (mark_gap, switch_gap, scale) = (cfg.mark_gap, cfg.switch_gap, cfg.glyph_scale);
        let (switch_w, switch_h) = (cfg.switch_width * scale, cfg.switch_height * scale);

        let collapsed = self
            .scene
            .node(node)
            .is_some_and(|data| data.state == CollapseState::Collapsed);
        let fs = self.scene.child_of_kind(node, ElementKind::Fs);
        let cat = self.scene.child_of_kind(node, ElementKind::CatLabel);
        for id in [fs, cat].into_iter().flatten() {
            self.geometry.place(id, 0.0, 0.0);
        }
        let visible = if collapsed { cat } else { fs };
        let (content_w, content_h) = visible.map(|id| self.geometry.size(id)).unwrap_or_default();
        let mut width = content_w;
        let mut height = content_h;

        let mut mark_box: Option<Rect> = None;
        if let Some(mark) = self.scene.child_of_kind(node, ElementKind::Mark) {
            let side = GLYPH_DESIGN_SIZE * scale;
            let rect = Rect {
                x: content_w + mark_gap,
                y: 0.0,
                width: side,
                height: side,
            };
            *self.geometry.rect_mut(mark) = rect;
            width = width.max(rect.right());
            height = height.max(rect.bottom());
            mark_box = Some(rect);
        }

        if let Some(switch) = self.scene.child_of_kind(node, ElementKind::CeSwitch) {
            let y = if collapsed {
                ((content_h - switch_h) / 2.0).max(0.0)
            } else {
                content_h / 2.0
            };
            let mut x = content_w + switch_gap;
            if let Some(mark) = mark_box {
                let overlaps = y < mark.bottom() && y + switch_h > mark.y;
                if overlaps {
                    x = x.max(mark.right() + (switch_gap - mark_gap).max(0.0));
                }
            }
            let rect = Rect {
                x,
                y,
                width: switch_w,
                height: switch_h,
            };
            *self.geometry.rect_mut(switch) = rect;
            width = width.max(rect.right());
            height = height.max(rect.bottom());
        }

        self.geometry.set_size(node, width, height);
    }

    /// Places the node and its daughters and records the edges. The root is centred over
    /// the first and last daughter roots when the daughters are wider than it, otherwise
    /// the daughters are centred under the root.
    pub(super) fn arrange_tree(&mut self, tree: ElementId) -> (f32, f32) {
        let cfg = &self.config.tree;
        let (level_gap, sibling_gap, top_offset, bottom_offset) = (
            cfg.level_gap,
            cfg.sibling_gap,
            cfg.edge_top_offset,
            cfg.edge_bottom_offset,
        );

        let node = self.scene.child_of_kind(tree, ElementKind::Node);
        let (root_w, root_h) = node.map(|id| self.geometry.size(id)).unwrap_or_default();
        let children = self
            .scene
            .child_of_kind(tree, ElementKind::Children)
            .filter(|children| !self.scene.children(*children).is_empty());

        let Some(children) = children else {
            if let Some(node) = node {
                self.geometry.place(node, 0.0, 0.0);
            }
            self.geometry.edges.remove(&tree);
            self.geometry.set_size(tree, root_w, root_h);
            return (root_w, root_h);
        };

        let daughters = self.scene.children(children).to_vec();
        let mut x = 0.0;
        let mut span_height: f32 = 0.0;
        let mut centers = Vec::with_capacity(daughters.len());
        for daughter in &daughters {
            let rect = self.geometry.rect(*daughter);
            self.geometry.place(*daughter, x, 0.0);
            let daughter_root = self
                .scene
                .child_of_kind(*daughter, ElementKind::Node)
                .map(|id| self.geometry.rect(id))
                .unwrap_or_default();
            centers.push(x + daughter_root.center_x());
            span_height = span_height.max(rect.height);
            x += rect.width + sibling_gap;
        }
        let span = x - sibling_gap;

        let (mut root_x, mut children_x) = if span > root_w {
            let first = centers.first().copied().unwrap_or(0.0);
            let last = centers.last().copied().unwrap_or(0.0);
            ((first + last) / 2.0 - root_w / 2.0, 0.0)
        } else {
            (0.0, root_w / 2.0 - span / 2.0)
        };
        if root_x < 0.0 {
            children_x -= root_x;
            root_x = 0.0;
        }

        let children_y = root_h + level_gap;
        if let Some(node) = node {
            self.geometry.place(node, root_x, 0.0);
        }
        self.geometry.place(children, children_x, children_y);
        self.geometry.set_size(children, span, span_height);

        let from = (root_x + root_w / 2.0, root_h + top_offset);
        let edges = daughters
            .iter()
            .zip(&centers)
            .map(|(daughter, center)| {
                let dashed = self
                    .scene
                    .child_of_kind(*daughter, ElementKind::Node)
                    .and_then(|id| self.scene.node(id))
                    .is_some_and(|data| data.mark == Some(Mark::DDaughter));
                EdgeLayout {
                    daughter: *daughter,
                    from,
                    to: (children_x + center, children_y + bottom_offset),
                    dashed,
                }
            })
            .collect();
        self.geometry.edges.insert(tree, edges);

        let width = (root_x + root_w).max(children_x + span);
        let height = children_y + span_height;
        self.geometry.set_size(tree, width, height);
        (width, height)
    }
}
