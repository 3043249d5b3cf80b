use crate::interaction::View;
use crate::layout::is_hidden;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub entry: String,
    pub region: String,
    pub width: f32,
    pub height: f32,
    pub elements: Vec<ElementDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct ElementDump {
    pub id: usize,
    pub kind: String,
    pub parent: Option<usize>,
    /// Offset from the parent element.
    pub x: f32,
    pub y: f32,
    /// Position in region coordinates.
    pub abs_x: f32,
    pub abs_y: f32,
    pub width: f32,
    pub height: f32,
    pub text: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub tree: usize,
    pub daughter: usize,
    pub dashed: bool,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_view(view: &View) -> Self {
        let scene = view.scene();
        let geometry = view.geometry();
        let (width, height) = view.size();

        let elements = scene
            .descendants(view.root())
            .into_iter()
            .map(|id| {
                let local = geometry.rect(id);
                let abs = geometry.absolute(scene, id);
                ElementDump {
                    id: id.index(),
                    kind: scene.kind(id).as_str().to_string(),
                    parent: scene.parent(id).map(|p| p.index()),
                    x: local.x,
                    y: local.y,
                    abs_x: abs.x,
                    abs_y: abs.y,
                    width: local.width,
                    height: local.height,
                    text: view.element_text(id),
                    hidden: is_hidden(scene, id),
                }
            })
            .collect();

        let mut edges: Vec<EdgeDump> = geometry
            .edges
            .iter()
            .flat_map(|(tree, edges)| {
                edges.iter().map(move |edge| EdgeDump {
                    tree: tree.index(),
                    daughter: edge.daughter.index(),
                    dashed: edge.dashed,
                    points: vec![[edge.from.0, edge.from.1], [edge.to.0, edge.to.1]],
                })
            })
            .collect();
        edges.sort_by_key(|edge| (edge.tree, edge.daughter));

        LayoutDump {
            entry: view.entry_name().to_string(),
            region: view.region().as_str().to_string(),
            width,
            height,
            elements,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, view: &View) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_view(view);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
