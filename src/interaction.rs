//! A rendered region and the state a user changes by clicking it.

use crate::config::Config;
use crate::layout::{self, Geometry};
use crate::model::{CollapseState, ElementData, ElementId, ElementKind, Scene};
use crate::text_metrics::{FontTextMeasurer, TextMeasurer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration plus the text measurer shared by every view rendered with it.
#[derive(Clone)]
pub struct RenderContext {
    pub config: Config,
    pub measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl RenderContext {
    pub fn new(config: Config) -> Self {
        let measurer = FontTextMeasurer {
            fast: config.layout.fast_text_metrics,
        };
        Self {
            config,
            measurer: Arc::new(measurer),
        }
    }

    pub fn with_measurer(config: Config, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        Self { config, measurer }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Tree,
    Frame,
    Interface,
    Trace,
}

impl RegionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionKind::Tree => "tree",
            RegionKind::Frame => "frame",
            RegionKind::Interface => "interface",
            RegionKind::Trace => "trace",
        }
    }
}

/// The DOT description of a frame, to be posted to `endpoint` by the host. The answer
/// goes back through [`View::complete_graph`] with the same `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequest {
    pub id: u64,
    pub endpoint: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GraphState {
    Off,
    Pending(u64),
    Shown(String),
}

#[derive(Debug, Clone)]
pub struct View {
    entry_name: String,
    region: RegionKind,
    scene: Scene,
    root: ElementId,
    geometry: Geometry,
    labels: BTreeMap<String, Vec<ElementId>>,
    active_label: Option<String>,
    latex_panel: Option<String>,
    graph: GraphState,
    next_request: u64,
    context: RenderContext,
}

impl View {
    pub(crate) fn new(
        entry_name: &str,
        region: RegionKind,
        scene: Scene,
        root: ElementId,
        context: RenderContext,
    ) -> Self {
        let geometry = layout::compute_layout(
            &scene,
            root,
            context.measurer.as_ref(),
            &context.config.layout,
            &context.config.theme,
        );
        let mut labels: BTreeMap<String, Vec<ElementId>> = BTreeMap::new();
        for id in scene.descendants(root) {
            if let Some(name) = scene.label_name(id) {
                labels.entry(name.to_string()).or_default().push(id);
            }
        }
        debug!(
            entry = entry_name,
            region = region.as_str(),
            elements = scene.len(),
            labels = labels.len(),
            "view built"
        );
        Self {
            entry_name: entry_name.to_string(),
            region,
            scene,
            root,
            geometry,
            labels,
            active_label: None,
            latex_panel: None,
            graph: GraphState::Off,
            next_request: 0,
            context,
        }
    }

    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    pub fn region(&self) -> RegionKind {
        self.region
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn config(&self) -> &Config {
        &self.context.config
    }

    /// Canvas size of the region.
    pub fn size(&self) -> (f32, f32) {
        layout::region_size(&self.geometry, self.root, &self.context.config.layout)
    }

    /// Tree nodes in pre-order.
    pub fn nodes(&self) -> Vec<ElementId> {
        self.scene.tree_nodes(self.root)
    }

    /// Flips a node between its feature structure and its category label. Accepts the
    /// node or its collapse switch. Returns false when `id` is neither.
    pub fn toggle_node(&mut self, id: ElementId) -> bool {
        let node = match self.scene.kind(id) {
            ElementKind::Node => id,
            ElementKind::CeSwitch => match self.scene.parent(id) {
                Some(parent) => parent,
                None => return false,
            },
            other => {
                debug!(kind = other.as_str(), "not a collapsible element");
                return false;
            }
        };
        let Some(data) = self.scene.node_mut(node) else {
            return false;
        };
        data.state = data.state.flipped();
        layout::relayout_node(
            &self.scene,
            &mut self.geometry,
            node,
            self.context.measurer.as_ref(),
            &self.context.config.layout,
            &self.context.config.theme,
        );
        self.refresh_latex_panel();
        true
    }

    pub fn collapse_all(&mut self) {
        self.set_all(CollapseState::Collapsed);
    }

    pub fn expand_all(&mut self) {
        self.set_all(CollapseState::Expanded);
    }

    fn set_all(&mut self, state: CollapseState) {
        for node in self.scene.tree_nodes(self.root) {
            if let Some(data) = self.scene.node_mut(node) {
                data.state = state;
            }
        }
        self.relayout();
        self.refresh_latex_panel();
    }

    fn relayout(&mut self) {
        self.geometry = layout::compute_layout(
            &self.scene,
            self.root,
            self.context.measurer.as_ref(),
            &self.context.config.layout,
            &self.context.config.theme,
        );
    }

    /// Highlights every label named `name`. Activating the active label again clears the
    /// highlight; any other label replaces it.
    pub fn activate_label(&mut self, name: &str) {
        if self.active_label.as_deref() == Some(name) {
            self.active_label = None;
            return;
        }
        if !self.labels.contains_key(name) {
            debug!(label = name, "no such label in this view");
            return;
        }
        self.active_label = Some(name.to_string());
    }

    /// Click on an element; only labels react.
    pub fn activate_element(&mut self, id: ElementId) {
        if let Some(name) = self.scene.label_name(id).map(str::to_string) {
            self.activate_label(&name);
        }
    }

    pub fn active_label(&self) -> Option<&str> {
        self.active_label.as_deref()
    }

    pub fn highlighted_elements(&self) -> &[ElementId] {
        self.active_label
            .as_ref()
            .and_then(|name| self.labels.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_highlighted(&self, id: ElementId) -> bool {
        match (&self.active_label, self.scene.label_name(id)) {
            (Some(active), Some(name)) => active == name,
            _ => false,
        }
    }

    /// Names of all labels in the view, sorted.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Opens or closes the LaTeX panel. Returns the panel text when it was opened.
    pub fn toggle_latex_panel(&mut self) -> Option<&str> {
        if self.latex_panel.take().is_some() {
            return None;
        }
        self.latex_panel = Some(crate::export::latex_document(&self.scene, self.root));
        self.latex_panel.as_deref()
    }

    pub fn latex_panel(&self) -> Option<&str> {
        self.latex_panel.as_deref()
    }

    fn refresh_latex_panel(&mut self) {
        if self.latex_panel.is_some() {
            self.latex_panel = Some(crate::export::latex_document(&self.scene, self.root));
        }
    }

    /// Switches the graph view. Switching on yields the request the host must send;
    /// switching off restores the regular display and invalidates any pending request.
    /// Only frames and interfaces have a graph view.
    pub fn toggle_graph(&mut self) -> Option<GraphRequest> {
        if self.graph != GraphState::Off {
            self.graph = GraphState::Off;
            return None;
        }
        if !matches!(self.region, RegionKind::Frame | RegionKind::Interface) {
            debug!(region = self.region.as_str(), "no graph view for this region");
            return None;
        }
        self.next_request += 1;
        let id = self.next_request;
        self.graph = GraphState::Pending(id);
        info!(entry = %self.entry_name, request = id, "requesting graph view");
        Some(GraphRequest {
            id,
            endpoint: self.context.config.render.graph_endpoint.clone(),
            body: crate::export::dot_document(&self.scene, self.root),
        })
    }

    /// Delivers the answer to a graph request. A response for a request that is no
    /// longer pending is dropped. Returns true when the graph is now displayed.
    pub fn complete_graph<E: fmt::Display>(
        &mut self,
        id: u64,
        response: Result<String, E>,
    ) -> bool {
        if self.graph != GraphState::Pending(id) {
            debug!(request = id, "dropping stale graph response");
            return false;
        }
        match response {
            Ok(svg) => {
                self.graph = GraphState::Shown(svg);
                true
            }
            Err(err) => {
                warn!(request = id, error = %err, "graph request failed");
                self.graph = GraphState::Off;
                false
            }
        }
    }

    pub fn graph_pending(&self) -> bool {
        matches!(self.graph, GraphState::Pending(_))
    }

    /// The graph markup currently shown in place of the region content.
    pub fn graph_svg(&self) -> Option<&str> {
        match &self.graph {
            GraphState::Shown(svg) => Some(svg),
            _ => None,
        }
    }

    /// Node data for a tree node, with its collapse state.
    pub fn node_state(&self, id: ElementId) -> Option<CollapseState> {
        self.scene.node(id).map(|node| node.state)
    }

    /// The text of a label or text element, as drawn.
    pub fn element_text(&self, id: ElementId) -> Option<String> {
        match &self.scene.get(id).data {
            ElementData::Label { .. } | ElementData::Text { .. } | ElementData::Type { .. } => {
                Some(layout::display_text(&self.scene, id))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use crate::text_metrics::FixedTextMeasurer;
    use crate::transform::{transform_frame, transform_tree};

    fn context() -> RenderContext {
        RenderContext::with_measurer(Config::default(), Arc::new(FixedTextMeasurer::default()))
    }

    const SHARED: &str = r#"<entry name="shared"><tree>
        <node type="std"><narg><fs><f name="cat"><sym value="s"/></f></fs></narg>
          <node type="subst"><narg><fs><f name="cat"><sym value="np"/></f><f name="idx"><sym varname="@X"/></f></fs></narg></node>
          <node type="std"><narg><fs><f name="cat"><sym value="vp"/></f></fs></narg>
            <node type="anchor"><narg><fs><f name="cat"><sym value="v"/></f><f name="arg"><sym varname="@X"/></f><f name="e"><sym varname="@E"/></f></fs></narg></node>
          </node>
        </node></tree></entry>"#;

    fn tree_view(xml: &str) -> View {
        let grammar = parse_document(xml).unwrap();
        let (scene, root) = transform_tree(&grammar.entries[0]).unwrap();
        View::new("shared", RegionKind::Tree, scene, root, context())
    }

    fn frame_view(xml: &str) -> View {
        let grammar = parse_document(xml).unwrap();
        let (scene, root) = transform_frame(&grammar.entries[0]).unwrap();
        View::new("f", RegionKind::Frame, scene, root, context())
    }

    #[test]
    fn shared_label_highlights_across_subtrees() {
        let mut view = tree_view(SHARED);
        view.activate_label("X");
        let highlighted = view.highlighted_elements().to_vec();
        assert_eq!(highlighted.len(), 2);
        for id in &highlighted {
            assert!(view.is_highlighted(*id));
        }
        let e = view.scene().ids().find(|id| view.scene().label_name(*id) == Some("E")).unwrap();
        assert!(!view.is_highlighted(e));

        view.activate_element(e);
        assert_eq!(view.active_label(), Some("E"));
        assert_eq!(view.highlighted_elements(), &[e]);

        view.activate_element(e);
        assert_eq!(view.active_label(), None);
        assert!(view.highlighted_elements().is_empty());
    }

    #[test]
    fn unknown_label_leaves_state_alone() {
        let mut view = tree_view(SHARED);
        view.activate_label("X");
        view.activate_label("nope");
        assert_eq!(view.active_label(), Some("X"));
    }

    #[test]
    fn toggle_accepts_switch_and_rejects_others() {
        let mut view = tree_view(SHARED);
        let node = view.nodes()[1];
        let switch = view.scene().child_of_kind(node, ElementKind::CeSwitch).unwrap();
        assert!(view.toggle_node(switch));
        assert_eq!(view.node_state(node), Some(CollapseState::Collapsed));
        assert!(view.toggle_node(node));
        assert_eq!(view.node_state(node), Some(CollapseState::Expanded));
        assert!(!view.toggle_node(view.root()));
    }

    #[test]
    fn collapse_all_then_expand_all_restores_size() {
        let mut view = tree_view(SHARED);
        let size = view.size();
        view.collapse_all();
        assert!(view.nodes().iter().all(|n| view.node_state(*n) == Some(CollapseState::Collapsed)));
        assert_ne!(view.size(), size);
        view.expand_all();
        assert_eq!(view.size(), size);
    }

    #[test]
    fn latex_panel_follows_collapse() {
        let mut view = tree_view(SHARED);
        let opened = view.toggle_latex_panel().map(str::to_string).unwrap();
        assert!(opened.contains("\\begin{avm}"));
        view.collapse_all();
        let refreshed = view.latex_panel().unwrap();
        assert!(!refreshed.contains("\\begin{avm}"));
        assert!(refreshed.contains("NP$\\downarrow$"));
        assert!(view.toggle_latex_panel().is_none());
        assert!(view.latex_panel().is_none());
    }

    const FRAME: &str = r#"<entry name="f"><frame><fs coref="@E" type="event"><f name="actor"><sym varname="@X"/></f></fs></frame></entry>"#;

    #[test]
    fn graph_round_trip() {
        let mut view = frame_view(FRAME);
        let request = view.toggle_graph().unwrap();
        assert_eq!(request.endpoint, "GRAPHVIZ.svg");
        assert!(request.body.starts_with("digraph{"));
        assert!(view.graph_pending());
        assert!(view.graph_svg().is_none());

        assert!(view.complete_graph::<String>(request.id, Ok("<svg/>".into())));
        assert_eq!(view.graph_svg(), Some("<svg/>"));

        assert!(view.toggle_graph().is_none());
        assert!(view.graph_svg().is_none());
    }

    #[test]
    fn stale_and_failed_graph_responses_are_ignored() {
        let mut view = frame_view(FRAME);
        let first = view.toggle_graph().unwrap();
        assert!(view.toggle_graph().is_none());
        let second = view.toggle_graph().unwrap();
        assert_ne!(first.id, second.id);
        assert!(!view.complete_graph::<String>(first.id, Ok("<svg>old</svg>".into())));
        assert!(view.graph_pending());
        assert!(!view.complete_graph(second.id, Err("connection refused")));
        assert!(view.graph_svg().is_none());
        assert!(!view.graph_pending());
    }

    #[test]
    fn trees_have_no_graph_view() {
        let mut view = tree_view(SHARED);
        assert!(view.toggle_graph().is_none());
        assert!(!view.graph_pending());
    }
}
