#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod export;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod transform;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use export::{SvgFile, export_dot, export_latex, export_svg};
pub use interaction::{GraphRequest, RegionKind, RenderContext, View};
pub use ir::{Entry, Grammar};
pub use parser::{ParseError, parse_document};
pub use render::{RenderMode, render_svg};

use model::{ElementId, Scene};
use tracing::debug;

/// Outcome of rendering one region of an entry. `Empty` means the entry has nothing to
/// show there and the host should drop the region.
#[derive(Debug)]
pub enum Rendered {
    View(View),
    Empty,
}

impl Rendered {
    pub fn is_empty(&self) -> bool {
        matches!(self, Rendered::Empty)
    }

    pub fn into_view(self) -> Option<View> {
        match self {
            Rendered::View(view) => Some(view),
            Rendered::Empty => None,
        }
    }
}

fn build(
    entry: &Entry,
    region: RegionKind,
    transformed: Option<(Scene, ElementId)>,
    context: &RenderContext,
) -> Rendered {
    match transformed {
        Some((scene, root)) => {
            Rendered::View(View::new(&entry.name, region, scene, root, context.clone()))
        }
        None => {
            debug!(entry = %entry.name, region = region.as_str(), "region is empty");
            Rendered::Empty
        }
    }
}

/// The derivation tree, or the morph description when the entry has no tree.
pub fn render_tree(entry: &Entry, context: &RenderContext) -> Rendered {
    build(entry, RegionKind::Tree, transform::transform_tree(entry), context)
}

/// The semantic frame, or the predicate literals when the entry has semantics but no
/// frame. A frame without components renders nothing.
pub fn render_frame(entry: &Entry, context: &RenderContext) -> Rendered {
    build(entry, RegionKind::Frame, transform::transform_frame(entry), context)
}

pub fn render_trace(entry: &Entry, context: &RenderContext) -> Rendered {
    build(entry, RegionKind::Trace, transform::transform_trace(entry), context)
}

pub fn render_interface(entry: &Entry, context: &RenderContext) -> Rendered {
    build(entry, RegionKind::Interface, transform::transform_interface(entry), context)
}

/// Dispatches to the region's `render_*` function.
pub fn render_region(entry: &Entry, region: RegionKind, context: &RenderContext) -> Rendered {
    match region {
        RegionKind::Tree => render_tree(entry, context),
        RegionKind::Frame => render_frame(entry, context),
        RegionKind::Interface => render_interface(entry, context),
        RegionKind::Trace => render_trace(entry, context),
    }
}
