use crate::config::LayoutConfig;
use crate::model::{ElementData, ElementId, ElementKind, Scene, TextRole};
use crate::text_metrics::{TextMeasurer, TextStyle};

/// The measured extent of a text element, split into its content and the optional
/// bold annotation drawn after it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextBlock {
    pub width: f32,
    pub height: f32,
    pub content_width: f32,
}

/// String actually drawn for a text element. Feature names are shown upper-case.
pub fn display_text(scene: &Scene, id: ElementId) -> String {
    match &scene.get(id).data {
        ElementData::Text {
            content,
            role: TextRole::FeatureName,
            ..
        } => content.to_uppercase(),
        ElementData::Text { content, .. } => content.clone(),
        ElementData::Type { name } => name.clone(),
        ElementData::Label { name, .. } => name.clone(),
        _ => String::new(),
    }
}

/// Annotations render as ` (name)` after the content.
pub fn annotation_text(name: &str) -> String {
    format!(" ({name})")
}

/// Resolves font size and face variant for any element carrying text.
pub fn text_style(
    scene: &Scene,
    id: ElementId,
    config: &LayoutConfig,
    font_family: &str,
) -> TextStyle {
    let element = scene.get(id);
    match &element.data {
        ElementData::Label { .. } => {
            let size = match element.parent.map(|parent| scene.kind(parent)) {
                Some(ElementKind::Relation) => config.frame.relation_font_size,
                Some(ElementKind::Line) => config.lines.pred_font_size,
                _ => config.fs.label_font_size,
            };
            TextStyle::new(font_family, size)
        }
        ElementData::Type { .. } => TextStyle::new(font_family, config.fs.type_font_size).italic(),
        ElementData::Text { role, .. } => match role {
            TextRole::FeatureName => TextStyle::new(font_family, config.fs.name_font_size),
            TextRole::Atom => TextStyle::new(font_family, config.fs.value_font_size),
            TextRole::Category => TextStyle::new(font_family, config.tree.catlabel_font_size),
            TextRole::Phon => TextStyle::new(font_family, config.tree.catlabel_font_size).italic(),
            TextRole::Surface => TextStyle::new(font_family, config.lines.morph_font_size),
            TextRole::Step => TextStyle::new(font_family, config.lines.trace_font_size),
            TextRole::Token => {
                let in_relation = element
                    .parent
                    .is_some_and(|parent| scene.kind(parent) == ElementKind::Relation);
                if in_relation {
                    TextStyle::new(font_family, config.frame.relation_font_size)
                } else {
                    TextStyle::new(font_family, config.lines.pred_font_size)
                }
            }
        },
        _ => TextStyle::new(font_family, config.fs.value_font_size),
    }
}

pub(super) fn measure_text_element(
    scene: &Scene,
    id: ElementId,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
    font_family: &str,
) -> TextBlock {
    let style = text_style(scene, id, config, font_family);
    let content = measurer.measure(&display_text(scene, id), &style);
    let annotation = match &scene.get(id).data {
        ElementData::Text {
            annotation: Some(name),
            ..
        } => Some(measurer.measure(&annotation_text(name), &style.clone().bold())),
        _ => None,
    };
    match annotation {
        Some(extra) => TextBlock {
            width: content.width + extra.width,
            height: content.height.max(extra.height),
            content_width: content.width,
        },
        None => TextBlock {
            width: content.width,
            height: content.height,
            content_width: content.width,
        },
    }
}
