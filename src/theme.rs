use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub bracket_color: String,
    pub edge_color: String,
    pub label_stroke: String,
    pub label_fill: String,
    pub highlight_fill: String,
    pub mark_color: String,
    pub switch_color: String,
    pub node_name_color: String,
    pub background: String,
}

impl Theme {
    /// Red highlights, green marks, black strokes.
    pub fn classic() -> Self {
        Self {
            font_family: "serif".to_string(),
            text_color: "black".to_string(),
            bracket_color: "black".to_string(),
            edge_color: "black".to_string(),
            label_stroke: "black".to_string(),
            label_fill: "transparent".to_string(),
            highlight_fill: "red".to_string(),
            mark_color: "green".to_string(),
            switch_color: "gray".to_string(),
            node_name_color: "red".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            text_color: "#1C2430".to_string(),
            bracket_color: "#334155".to_string(),
            edge_color: "#7A8AA6".to_string(),
            label_stroke: "#475569".to_string(),
            label_fill: "transparent".to_string(),
            highlight_fill: "#F87171".to_string(),
            mark_color: "#15803D".to_string(),
            switch_color: "#94A3B8".to_string(),
            node_name_color: "#DC2626".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
