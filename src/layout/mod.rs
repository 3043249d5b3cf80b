//! Geometry for the semantic element tree.
//!
//! Every element gets a [`Rect`] local to its parent. Layout is bottom-up: an element's
//! size is known once its children are sized and placed. After a node is collapsed or
//! expanded only the node and the trees above it are recomputed.

mod frame;
mod fs;
mod lines;
mod text;
mod tree;
pub(crate) mod types;

pub use text::{TextBlock, annotation_text, display_text, text_style};
pub use types::*;

use crate::config::LayoutConfig;
use crate::model::{CollapseState, ElementId, ElementKind, Scene};
use crate::text_metrics::TextMeasurer;
use crate::theme::Theme;
use text::measure_text_element;
use tracing::debug;

pub(crate) struct Layouter<'a> {
    scene: &'a Scene,
    geometry: &'a mut Geometry,
    measurer: &'a dyn TextMeasurer,
    config: &'a LayoutConfig,
    font_family: &'a str,
}

impl<'a> Layouter<'a> {
    fn new(
        scene: &'a Scene,
        geometry: &'a mut Geometry,
        measurer: &'a dyn TextMeasurer,
        config: &'a LayoutConfig,
        theme: &'a Theme,
    ) -> Self {
        Self {
            scene,
            geometry,
            measurer,
            config,
            font_family: theme.font_family.as_str(),
        }
    }

    /// Sizes a text-bearing leaf (text, type, catlabel).
    fn layout_text(&mut self, id: ElementId) -> (f32, f32) {
        let block = measure_text_element(
            self.scene,
            id,
            self.measurer,
            self.config,
            self.font_family,
        );
        self.geometry.set_size(id, block.width, block.height);
        (block.width, block.height)
    }

    /// Sizes a co-index label: its text plus a padded frame.
    fn layout_label(&mut self, id: ElementId, pad_x: f32, pad_y: f32) -> (f32, f32) {
        let block = measure_text_element(
            self.scene,
            id,
            self.measurer,
            self.config,
            self.font_family,
        );
        let size = (block.width + 2.0 * pad_x, block.height + 2.0 * pad_y);
        self.geometry.set_size(id, size.0, size.1);
        size
    }

    fn layout_root(&mut self, root: ElementId) {
        match self.scene.kind(root) {
            ElementKind::Tree => {
                self.layout_tree(root);
            }
            ElementKind::Frame | ElementKind::Interface => {
                self.layout_components(root);
            }
            ElementKind::Pred => {
                self.layout_pred(root);
            }
            ElementKind::Trace => {
                self.layout_trace(root);
            }
            ElementKind::Morph => {
                self.layout_morph(root);
            }
            ElementKind::Fs => {
                self.layout_fs(root);
            }
            other => debug!(kind = other.as_str(), "no layout for this root kind"),
        }
        self.geometry.place(root, 0.0, 0.0);
    }
}

/// Lays out the scene under `root` from scratch.
pub fn compute_layout(
    scene: &Scene,
    root: ElementId,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
    theme: &Theme,
) -> Geometry {
    let mut geometry = Geometry::with_capacity(scene.len());
    Layouter::new(scene, &mut geometry, measurer, config, theme).layout_root(root);
    geometry
}

/// Recomputes a node after its collapse state changed, then redraws every tree on the
/// path to the root so siblings and edges follow the node's new size.
pub fn relayout_node(
    scene: &Scene,
    geometry: &mut Geometry,
    node: ElementId,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
    theme: &Theme,
) {
    let mut layouter = Layouter::new(scene, geometry, measurer, config, theme);
    layouter.place_node_glyphs(node);
    let mut current = scene.parent(node);
    while let Some(tree) = current {
        if scene.kind(tree) != ElementKind::Tree {
            break;
        }
        layouter.arrange_tree(tree);
        // tree -> children -> tree
        current = scene
            .parent(tree)
            .filter(|parent| scene.kind(*parent) == ElementKind::Children)
            .and_then(|children| scene.parent(children));
    }
}

/// True when the element is not drawn in the current collapse state: the feature
/// structure of a collapsed node, or the category label of an expanded one.
pub fn is_hidden(scene: &Scene, id: ElementId) -> bool {
    let kind = scene.kind(id);
    if !matches!(kind, ElementKind::Fs | ElementKind::CatLabel) {
        return false;
    }
    let Some(state) = scene
        .parent(id)
        .and_then(|parent| scene.node(parent))
        .map(|node| node.state)
    else {
        return false;
    };
    match kind {
        ElementKind::Fs => state == CollapseState::Collapsed,
        _ => state == CollapseState::Expanded,
    }
}

/// Canvas size for a region: the content box plus padding on the right and bottom.
pub fn region_size(geometry: &Geometry, root: ElementId, config: &LayoutConfig) -> (f32, f32) {
    let rect = geometry.rect(root);
    (
        rect.right() + config.region_padding,
        rect.bottom() + config.region_padding,
    )
}
