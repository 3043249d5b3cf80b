use crate::config::LayoutConfig;
use crate::interaction::View;
use crate::layout::{Geometry, annotation_text, display_text, is_hidden, text_style};
use crate::model::{CollapseState, ElementData, ElementId, ElementKind, Scene};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Baseline of a text line as a fraction of its measured line height.
const BASELINE_RATIO: f32 = 0.8;
const LATEX_PANEL_HEIGHT: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Click targets, collapse switches and the highlight state are emitted.
    Interactive,
    /// Plain drawing for export.
    Static,
}

struct SvgWriter<'a> {
    scene: &'a Scene,
    geometry: &'a Geometry,
    view: &'a View,
    theme: &'a Theme,
    layout: &'a LayoutConfig,
    mode: RenderMode,
    out: String,
}

pub fn render_svg(view: &View, mode: RenderMode) -> String {
    let config = view.config();
    let (mut width, mut height) = view.size();
    let latex_panel = match mode {
        RenderMode::Interactive => view.latex_panel(),
        RenderMode::Static => None,
    };
    if latex_panel.is_some() {
        width = width.max(LATEX_PANEL_HEIGHT);
        height += LATEX_PANEL_HEIGHT;
    }

    let mut writer = SvgWriter {
        scene: view.scene(),
        geometry: view.geometry(),
        view,
        theme: &config.theme,
        layout: &config.layout,
        mode,
        out: String::new(),
    };
    let _ = write!(
        writer.out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\" data-entry=\"{}\" data-region=\"{}\">",
        escape_xml(view.entry_name()),
        view.region().as_str()
    );
    let _ = write!(
        writer.out,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.theme.background
    );

    match view.graph_svg() {
        Some(graph) => writer.out.push_str(strip_prolog(graph)),
        None => writer.element(view.root()),
    }

    if let Some(panel) = latex_panel {
        let (_, content_height) = view.size();
        let _ = write!(
            writer.out,
            "<foreignObject x=\"0\" y=\"{content_height:.2}\" width=\"{width:.2}\" height=\"{LATEX_PANEL_HEIGHT}\"><textarea xmlns=\"http://www.w3.org/1999/xhtml\" rows=\"25\" cols=\"50\" readonly=\"readonly\">{}</textarea></foreignObject>",
            escape_xml(panel)
        );
    }

    writer.out.push_str("</svg>");
    writer.out
}

impl SvgWriter<'_> {
    fn interactive(&self) -> bool {
        self.mode == RenderMode::Interactive
    }

    fn element(&mut self, id: ElementId) {
        if is_hidden(self.scene, id) {
            return;
        }
        let kind = self.scene.kind(id);
        if kind == ElementKind::CeSwitch && !self.interactive() {
            return;
        }
        let rect = self.geometry.rect(id);
        let _ = write!(
            self.out,
            "<g class=\"{}\" transform=\"translate({:.2},{:.2})\"",
            kind.as_str(),
            rect.x,
            rect.y
        );
        if self.interactive() && kind == ElementKind::Node {
            let _ = write!(self.out, " data-node=\"{}\"", id.index());
        }
        self.out.push('>');

        match kind {
            ElementKind::Tree => {
                self.edges(id);
                self.children(id);
            }
            ElementKind::Fs => {
                self.brackets(id);
                self.children(id);
            }
            ElementKind::Text | ElementKind::CatLabel | ElementKind::Type => {
                self.text(id, 0.0, 0.0)
            }
            ElementKind::Label => self.label(id),
            ElementKind::Mark => self.mark(id),
            ElementKind::CeSwitch => self.switch(id),
            _ => self.children(id),
        }

        self.out.push_str("</g>");
    }

    fn children(&mut self, id: ElementId) {
        let scene = self.scene;
        for child in scene.children(id) {
            self.element(*child);
        }
    }

    fn edges(&mut self, tree: ElementId) {
        let Some(edges) = self.geometry.edges.get(&tree) else {
            return;
        };
        for edge in edges {
            let dash = if edge.dashed { " stroke-dasharray=\"5 3\"" } else { "" };
            let _ = write!(
                self.out,
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"{dash}/>",
                edge.from.0, edge.from.1, edge.to.0, edge.to.1, self.theme.edge_color
            );
        }
    }

    fn brackets(&mut self, fs: ElementId) {
        let Some(brackets) = self.geometry.brackets.get(&fs) else {
            return;
        };
        for side in [&brackets.left, &brackets.right] {
            let _ = write!(
                self.out,
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
                points_to_path(side),
                self.theme.bracket_color
            );
        }
    }

    fn text(&mut self, id: ElementId, offset_x: f32, offset_y: f32) {
        let rect = self.geometry.rect(id);
        let style = text_style(self.scene, id, self.layout, &self.theme.font_family);
        let baseline = offset_y + (rect.height - 2.0 * offset_y).max(0.0) * BASELINE_RATIO;
        let italic = if style.italic { " font-style=\"italic\"" } else { "" };
        let _ = write!(
            self.out,
            "<text x=\"{offset_x:.2}\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{italic}>{}",
            escape_xml(&style.font_family),
            style.font_size,
            self.theme.text_color,
            escape_xml(&display_text(self.scene, id))
        );
        if let ElementData::Text {
            annotation: Some(name),
            ..
        } = &self.scene.get(id).data
        {
            let _ = write!(
                self.out,
                "<tspan font-weight=\"bold\" fill=\"{}\">{}</tspan>",
                self.theme.node_name_color,
                escape_xml(&annotation_text(name))
            );
        }
        self.out.push_str("</text>");
    }

    fn label(&mut self, id: ElementId) {
        let rect = self.geometry.rect(id);
        let highlighted = self.interactive() && self.view.is_highlighted(id);
        let fill = if highlighted {
            self.theme.highlight_fill.as_str()
        } else {
            self.theme.label_fill.as_str()
        };
        let _ = write!(
            self.out,
            "<rect width=\"{:.2}\" height=\"{:.2}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"1\"",
            rect.width, rect.height, self.theme.label_stroke
        );
        if self.interactive() {
            let name = self.scene.label_name(id).unwrap_or_default();
            let _ = write!(
                self.out,
                " cursor=\"pointer\" data-label=\"{}\" data-element=\"{}\"",
                escape_xml(name),
                id.index()
            );
        }
        self.out.push_str("/>");
        let (pad_x, pad_y) = (self.layout.fs.label_pad_x, self.layout.fs.label_pad_y);
        self.text(id, pad_x, pad_y);
    }

    fn mark(&mut self, id: ElementId) {
        let ElementData::Mark(mark) = &self.scene.get(id).data else {
            return;
        };
        let Some(path) = mark.glyph_path() else {
            return;
        };
        let _ = write!(
            self.out,
            "<path d=\"{path}\" transform=\"scale({})\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
            self.layout.tree.glyph_scale, self.theme.mark_color
        );
    }

    fn switch(&mut self, id: ElementId) {
        let rect = self.geometry.rect(id);
        let node = self.scene.parent(id);
        let collapsed = node
            .and_then(|node| self.scene.node(node))
            .is_some_and(|data| data.state == CollapseState::Collapsed);
        let _ = write!(
            self.out,
            "<rect width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" fill=\"{}\" cursor=\"pointer\" data-switch=\"{}\"/>",
            rect.width,
            rect.height,
            self.theme.switch_color,
            node.map(|node| node.index()).unwrap_or_default()
        );
        let mid_x = rect.width / 2.0;
        let mid_y = rect.height / 2.0;
        let arm = rect.width / 3.0;
        let mut d = format!("M {:.2} {mid_y:.2} L {:.2} {mid_y:.2}", mid_x - arm, mid_x + arm);
        if collapsed {
            let _ = write!(d, " M {mid_x:.2} {:.2} L {mid_x:.2} {:.2}", mid_y - arm, mid_y + arm);
        }
        let _ = write!(
            self.out,
            "<path d=\"{d}\" stroke=\"{}\" stroke-width=\"1.5\" pointer-events=\"none\"/>",
            self.theme.background
        );
    }
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    let mut d = String::new();
    for (idx, (x, y)) in points.iter().enumerate() {
        let cmd = if idx == 0 { "M" } else { " L" };
        let _ = write!(d, "{cmd} {x:.2} {y:.2}");
    }
    d
}

/// Drops an XML declaration or doctype so a returned document can be inlined.
fn strip_prolog(svg: &str) -> &str {
    let mut rest = svg.trim_start();
    while rest.starts_with("<?") || rest.starts_with("<!") {
        match rest.find('>') {
            Some(end) => rest = rest[end + 1..].trim_start(),
            None => break,
        }
    }
    rest
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &crate::config::RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .unwrap_or("serif")
        .trim()
        .to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.scale.max(0.1);
    let size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or_else(|| anyhow::anyhow!("Invalid output size"))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::interaction::RenderContext;
    use crate::parser::parse_document;
    use crate::text_metrics::FixedTextMeasurer;
    use crate::{Rendered, render_frame, render_tree};
    use std::sync::Arc;

    fn context() -> RenderContext {
        RenderContext::with_measurer(Config::default(), Arc::new(FixedTextMeasurer::default()))
    }

    const ENTRY: &str = r#"<entry name="n0V"><tree>
        <node type="std" name="S_1"><narg><fs><f name="cat"><sym value="s"/></f></fs></narg>
          <node type="subst"><narg><fs><f name="cat"><sym value="np"/></f><f name="idx"><sym varname="@X"/></f></fs></narg></node>
          <node type="anchor"><narg><fs><f name="cat"><sym value="v"/></f><f name="arg"><sym varname="@X"/></f></fs></narg></node>
        </node></tree></entry>"#;

    fn view() -> View {
        let grammar = parse_document(ENTRY).unwrap();
        match render_tree(&grammar.entries[0], &context()) {
            Rendered::View(view) => view,
            Rendered::Empty => panic!("tree expected"),
        }
    }

    #[test]
    fn interactive_svg_carries_click_targets() {
        let mut view = view();
        view.activate_label("X");
        let svg = render_svg(&view, RenderMode::Interactive);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("data-label=\"X\"").count(), 2);
        assert_eq!(svg.matches("data-switch=").count(), 3);
        assert_eq!(svg.matches("fill=\"red\" stroke").count(), 2);
        assert!(svg.contains("<tspan font-weight=\"bold\" fill=\"red\"> (S_1)</tspan>"));
        assert!(svg.contains(">CAT</text>"));
    }

    #[test]
    fn static_svg_strips_interaction() {
        let mut view = view();
        view.activate_label("X");
        let svg = render_svg(&view, RenderMode::Static);
        assert!(!svg.contains("data-label"));
        assert!(!svg.contains("data-switch"));
        assert!(!svg.contains("cursor"));
        assert!(!svg.contains("fill=\"red\" stroke"));
    }

    #[test]
    fn collapsed_node_draws_its_category() {
        let mut view = view();
        let leaf = view.nodes()[1];
        view.toggle_node(leaf);
        let svg = render_svg(&view, RenderMode::Static);
        assert!(svg.contains(">NP</text>"));
    }

    #[test]
    fn graph_markup_replaces_the_content() {
        let grammar = parse_document(
            r#"<entry name="f"><frame><fs coref="@E"><f name="actor"><sym varname="@X"/></f></fs></frame></entry>"#,
        )
        .unwrap();
        let Rendered::View(mut view) = render_frame(&grammar.entries[0], &context()) else {
            panic!("frame expected");
        };
        let request = view.toggle_graph().unwrap();
        let response = "<?xml version=\"1.0\"?><svg id=\"graph\"></svg>".to_string();
        view.complete_graph::<String>(request.id, Ok(response));
        let svg = render_svg(&view, RenderMode::Interactive);
        assert!(svg.contains("<svg id=\"graph\"></svg>"));
        assert!(!svg.contains("<?xml"));
        assert!(!svg.contains("data-label"));
    }

    #[test]
    fn latex_panel_is_embedded_while_open() {
        let mut view = view();
        view.toggle_latex_panel();
        let svg = render_svg(&view, RenderMode::Interactive);
        assert!(svg.contains("<foreignObject"));
        assert!(svg.contains("\\Forest{"));
        assert!(!render_svg(&view, RenderMode::Static).contains("<foreignObject"));
    }

    #[test]
    fn escape_xml_handles_markup() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
