use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feature structure spacing. All values are in SVG user units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FsLayoutConfig {
    pub name_font_size: f32,
    pub value_font_size: f32,
    pub type_font_size: f32,
    pub label_font_size: f32,
    /// Distance from the left bracket to the feature names and from the widest value to
    /// the right bracket.
    pub inset: f32,
    /// Gap between the widest feature name and the value column.
    pub value_gap: f32,
    /// Vertical padding above, between and below rows.
    pub row_padding: f32,
    pub bracket_tip: f32,
    /// Gap between a co-index label and the structure it tags.
    pub label_gap: f32,
    /// Gap between a co-index label and an atomic value.
    pub atom_label_gap: f32,
    pub label_pad_x: f32,
    pub label_pad_y: f32,
    /// Added to the vertically centred feature name position.
    pub name_nudge: f32,
    pub empty_width: f32,
}

impl Default for FsLayoutConfig {
    fn default() -> Self {
        Self {
            name_font_size: 13.0,
            value_font_size: 15.0,
            type_font_size: 15.0,
            label_font_size: 11.0,
            inset: 5.0,
            value_gap: 5.0,
            row_padding: 5.0,
            bracket_tip: 5.0,
            label_gap: 5.0,
            atom_label_gap: 3.0,
            label_pad_x: 2.0,
            label_pad_y: 1.0,
            name_nudge: 0.0,
            empty_width: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeLayoutConfig {
    pub level_gap: f32,
    pub sibling_gap: f32,
    pub edge_top_offset: f32,
    pub edge_bottom_offset: f32,
    pub catlabel_font_size: f32,
    pub mark_gap: f32,
    pub switch_gap: f32,
    /// Mark glyphs are drawn in a 20×20 box scaled by this factor.
    pub glyph_scale: f32,
    pub switch_width: f32,
    pub switch_height: f32,
}

impl Default for TreeLayoutConfig {
    fn default() -> Self {
        Self {
            level_gap: 50.0,
            sibling_gap: 40.0,
            edge_top_offset: 3.0,
            edge_bottom_offset: 2.0,
            catlabel_font_size: 25.0,
            mark_gap: 7.0,
            switch_gap: 10.0,
            glyph_scale: 0.7,
            switch_width: 15.0,
            switch_height: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameLayoutConfig {
    pub top_padding: f32,
    pub block_gap: f32,
    pub relation_band: f32,
    pub relation_font_size: f32,
    pub token_gap: f32,
}

impl Default for FrameLayoutConfig {
    fn default() -> Self {
        Self {
            top_padding: 3.0,
            block_gap: 20.0,
            relation_band: 40.0,
            relation_font_size: 15.0,
            token_gap: 5.0,
        }
    }
}

/// Line-oriented displays: predicate literals, traces and morph descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinesLayoutConfig {
    pub pred_font_size: f32,
    pub pred_line_spacing: f32,
    pub pred_token_gap: f32,
    pub label_box_pad: f32,
    pub trace_font_size: f32,
    pub trace_line_spacing: f32,
    pub morph_font_size: f32,
    pub morph_token_gap: f32,
    pub morph_line_gap: f32,
    pub morph_fs_gap: f32,
}

impl Default for LinesLayoutConfig {
    fn default() -> Self {
        Self {
            pred_font_size: 25.0,
            pred_line_spacing: 1.5,
            pred_token_gap: 2.0,
            label_box_pad: 1.2,
            trace_font_size: 15.0,
            trace_line_spacing: 1.5,
            morph_font_size: 25.0,
            morph_token_gap: 2.0,
            morph_line_gap: 20.0,
            morph_fs_gap: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub fs: FsLayoutConfig,
    pub tree: TreeLayoutConfig,
    pub frame: FrameLayoutConfig,
    pub lines: LinesLayoutConfig,
    /// Margin added around a region's content box when sizing its SVG.
    pub region_padding: f32,
    /// Use calibrated character widths instead of loading system fonts.
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            fs: FsLayoutConfig::default(),
            tree: TreeLayoutConfig::default(),
            frame: FrameLayoutConfig::default(),
            lines: LinesLayoutConfig::default(),
            region_padding: 10.0,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Raster scale factor for PNG output.
    pub scale: f32,
    /// Where the graph view posts its DOT description.
    pub graph_endpoint: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            graph_endpoint: "GRAPHVIZ.svg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    text_color: Option<String>,
    bracket_color: Option<String>,
    edge_color: Option<String>,
    label_stroke: Option<String>,
    label_fill: Option<String>,
    highlight_fill: Option<String>,
    mark_color: Option<String>,
    switch_color: Option<String>,
    node_name_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfig>,
}

/// Loads a JSON (or JSON5) configuration file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    match parsed.theme.as_deref() {
        Some("modern") => config.theme = Theme::modern(),
        Some("classic") | Some("default") | None => {}
        Some(other) => tracing::warn!(theme = other, "unknown theme, keeping the default"),
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.bracket_color {
            config.theme.bracket_color = v;
        }
        if let Some(v) = vars.edge_color {
            config.theme.edge_color = v;
        }
        if let Some(v) = vars.label_stroke {
            config.theme.label_stroke = v;
        }
        if let Some(v) = vars.label_fill {
            config.theme.label_fill = v;
        }
        if let Some(v) = vars.highlight_fill {
            config.theme.highlight_fill = v;
        }
        if let Some(v) = vars.mark_color {
            config.theme.mark_color = v;
        }
        if let Some(v) = vars.switch_color {
            config.theme.switch_color = v;
        }
        if let Some(v) = vars.node_name_color {
            config.theme.node_name_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_layout_overrides_keep_other_defaults() {
        let config = parse_config(
            r#"{
                // comments are fine, this is JSON5
                theme: "modern",
                themeVariables: { highlightFill: "orange" },
                layout: { tree: { siblingGap: 60 } },
            }"#,
        )
        .unwrap();
        assert_eq!(config.theme.highlight_fill, "orange");
        assert_eq!(config.layout.tree.sibling_gap, 60.0);
        assert_eq!(config.layout.tree.level_gap, 50.0);
        assert_eq!(config.layout.fs.row_padding, 5.0);
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.render.graph_endpoint, "GRAPHVIZ.svg");
        assert_eq!(config.layout.frame.relation_band, 40.0);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(parse_config("{ layout: ").is_err());
    }
}
