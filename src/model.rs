use std::collections::HashMap;

use crate::foundation::{
    core::Resolution,
    error::{TexError, TexResult},
};

/// Open, operator-specific parameter bag as stored by the editor.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Closed set of operator identifiers the evaluator dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorKind {
    // generators
    Rectangle,
    Circle,
    Polygon,
    WavyRing,
    Beam,
    Gradient,
    // inputs
    Color,
    Value,
    Alpha,
    Image,
    // boolean / math
    Add,
    Subtract,
    Multiply,
    Divide,
    // filters
    Fill,
    Glow,
    Neon,
    SoftBlur,
    Stroke,
    GradientFade,
    Pixelate,
    // transforms
    Translate,
    Rotate,
    Scale,
    Polar,
    Output,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Generator,
    Input,
    Math,
    Filter,
    Transform,
    Output,
    Unknown,
}

pub const HANDLE_IN: &str = "in";
pub const HANDLE_A: &str = "a";
pub const HANDLE_B: &str = "b";
pub const HANDLE_OUT: &str = "out";

impl OperatorKind {
    pub fn family(self) -> Family {
        use OperatorKind::*;
        match self {
            Rectangle | Circle | Polygon | WavyRing | Beam | Gradient => Family::Generator,
            Color | Value | Alpha | Image => Family::Input,
            Add | Subtract | Multiply | Divide => Family::Math,
            Fill | Glow | Neon | SoftBlur | Stroke | GradientFade | Pixelate => Family::Filter,
            Translate | Rotate | Scale | Polar => Family::Transform,
            Output => Family::Output,
            Unknown => Family::Unknown,
        }
    }

    /// Input handles the operator reads, in evaluation order.
    pub fn input_handles(self) -> &'static [&'static str] {
        use OperatorKind::*;
        match self {
            Add | Subtract | Multiply | Divide => &[HANDLE_A, HANDLE_B],
            Color | Alpha | Fill | Glow | Neon | SoftBlur | Stroke | GradientFade | Pixelate
            | Translate | Rotate | Scale | Polar | Output => &[HANDLE_IN],
            Rectangle | Circle | Polygon | WavyRing | Beam | Gradient | Value | Image | Unknown => {
                &[]
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawNode")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OperatorKind,
    pub params: Params,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: OperatorKind) -> Self {
        Self {
            id: id.into(),
            kind,
            params: Params::new(),
        }
    }

    /// Builder-style helper that accepts a JSON object literal.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = params {
            self.params = map;
        }
        self
    }
}

// Accepts both the flat `{id, type, params}` shape and the editor's
// `{id, type, position, data: {type, params}}` shape.
#[derive(serde::Deserialize)]
struct RawNode {
    id: String,
    #[serde(default, rename = "type", alias = "operatorType")]
    kind: Option<OperatorKind>,
    #[serde(default)]
    params: Option<Params>,
    #[serde(default)]
    data: Option<RawNodeData>,
}

#[derive(serde::Deserialize)]
struct RawNodeData {
    #[serde(default, rename = "type")]
    kind: Option<OperatorKind>,
    #[serde(default)]
    params: Option<Params>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let (data_kind, data_params) = match raw.data {
            Some(d) => (d.kind, d.params),
            None => (None, None),
        };
        let kind = [data_kind, raw.kind]
            .into_iter()
            .flatten()
            .find(|k| *k != OperatorKind::Unknown)
            .unwrap_or(OperatorKind::Unknown);
        Self {
            id: raw.id,
            kind,
            params: data_params.or(raw.params).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "sourceNodeId")]
    pub source: String,
    #[serde(default = "default_out", deserialize_with = "de_out_handle")]
    pub source_handle: String,
    #[serde(alias = "targetNodeId")]
    pub target: String,
    #[serde(default = "default_in", deserialize_with = "de_in_handle")]
    pub target_handle: String,
}

fn default_out() -> String {
    HANDLE_OUT.to_string()
}

fn default_in() -> String {
    HANDLE_IN.to_string()
}

fn de_out_handle<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v: Option<String> = serde::Deserialize::deserialize(d)?;
    Ok(v.unwrap_or_else(default_out))
}

fn de_in_handle<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v: Option<String> = serde::Deserialize::deserialize(d)?;
    Ok(v.unwrap_or_else(default_in))
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_handle: default_out(),
            target: target.into(),
            target_handle: target_handle.into(),
        }
    }

    fn terminates_at(&self, target: &str, handle: &str) -> bool {
        self.target == target && self.target_handle == handle
    }
}

/// Node and edge collections. Evaluation treats a `&Graph` as an immutable snapshot.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The graph's output sink: the first node tagged `OUTPUT`.
    pub fn output_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind == OperatorKind::Output)
    }

    pub fn incoming(&self, target: &str, handle: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.terminates_at(target, handle))
    }

    /// Inserts `edge`, evicting (and returning) any edge already feeding the same input.
    pub fn connect(&mut self, edge: Edge) -> Option<Edge> {
        let evicted = self
            .edges
            .iter()
            .position(|e| e.terminates_at(&edge.target, &edge.target_handle))
            .map(|i| self.edges.remove(i));
        self.edges.push(edge);
        evicted
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Option<Edge> {
        let i = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(i))
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let i = self.nodes.iter().position(|n| n.id == id)?;
        self.edges.retain(|e| e.source != id && e.target != id);
        Some(self.nodes.remove(i))
    }

    /// Shallow-merges `patch` into the node's params. Returns `false` for unknown ids.
    pub fn update_params(&mut self, id: &str, patch: Params) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.params.extend(patch);
        true
    }

    pub(crate) fn index(&self) -> GraphIndex<'_> {
        let mut nodes = HashMap::with_capacity(self.nodes.len());
        for n in &self.nodes {
            nodes.entry(n.id.as_str()).or_insert(n);
        }
        let mut inputs: HashMap<&str, HashMap<&str, &str>> = HashMap::new();
        for e in &self.edges {
            // First producer wins if a loaded graph violates the one-producer rule.
            inputs
                .entry(e.target.as_str())
                .or_default()
                .entry(e.target_handle.as_str())
                .or_insert(e.source.as_str());
        }
        GraphIndex { nodes, inputs }
    }
}

pub(crate) struct GraphIndex<'g> {
    nodes: HashMap<&'g str, &'g Node>,
    /// target -> handle -> source
    inputs: HashMap<&'g str, HashMap<&'g str, &'g str>>,
}

impl<'g> GraphIndex<'g> {
    pub(crate) fn node(&self, id: &str) -> Option<&'g Node> {
        self.nodes.get(id).copied()
    }

    pub(crate) fn producer(&self, target: &str, handle: &str) -> Option<&'g str> {
        self.inputs.get(target)?.get(handle).copied()
    }
}

/// Persisted project as written by the editor. Only `nodes` and `edges` are required.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Project {
    #[serde(default = "default_project_name")]
    pub name: String,
    #[serde(default)]
    pub resolution: Resolution,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

fn default_project_name() -> String {
    "Untitled Project".to_string()
}

impl Project {
    pub fn from_json(s: &str) -> TexResult<Self> {
        serde_json::from_str(s).map_err(|e| TexError::serde(format!("parse project: {e}")))
    }

    pub fn to_json_pretty(&self) -> TexResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn graph(&self) -> Graph {
        Graph::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn into_graph(self) -> Graph {
        Graph::new(self.nodes, self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_accepts_editor_shape() {
        let n: Node = serde_json::from_value(json!({
            "id": "node-output",
            "type": "outputNode",
            "position": {"x": 1.0, "y": 2.0},
            "data": {"label": "Material Output", "type": "OUTPUT", "params": {"resolution": "1024"}}
        }))
        .unwrap();
        assert_eq!(n.kind, OperatorKind::Output);
        assert_eq!(n.params["resolution"], json!("1024"));
    }

    #[test]
    fn node_accepts_flat_shape_and_unknown_kinds() {
        let n: Node =
            serde_json::from_value(json!({"id": "a", "operatorType": "WAVY_RING"})).unwrap();
        assert_eq!(n.kind, OperatorKind::WavyRing);
        assert!(n.params.is_empty());

        let u: Node = serde_json::from_value(json!({"id": "b", "type": "HOLOGRAM"})).unwrap();
        assert_eq!(u.kind, OperatorKind::Unknown);
    }

    #[test]
    fn edge_defaults_and_aliases() {
        let e: Edge = serde_json::from_value(json!({
            "id": "e1", "sourceNodeId": "x", "sourceHandle": null, "targetNodeId": "y"
        }))
        .unwrap();
        assert_eq!(e.source, "x");
        assert_eq!(e.source_handle, "out");
        assert_eq!(e.target_handle, "in");
    }

    #[test]
    fn connect_evicts_existing_producer() {
        let mut g = Graph::default();
        assert!(g.connect(Edge::new("e1", "r", "m", "a")).is_none());
        assert!(g.connect(Edge::new("e2", "c", "m", "b")).is_none());
        let evicted = g.connect(Edge::new("e3", "p", "m", "a")).unwrap();
        assert_eq!(evicted.id, "e1");
        assert_eq!(g.edges.len(), 2);
        assert_eq!(g.incoming("m", "a").unwrap().source, "p");
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut g = Graph::new(
            vec![
                Node::new("r", OperatorKind::Rectangle),
                Node::new("o", OperatorKind::Output),
            ],
            vec![Edge::new("e1", "r", "o", "in")],
        );
        assert!(g.remove_node("r").is_some());
        assert!(g.edges.is_empty());
        assert!(g.remove_node("r").is_none());
    }

    #[test]
    fn update_params_merges_shallowly() {
        let mut g = Graph::new(
            vec![Node::new("r", OperatorKind::Rectangle).with_params(json!({"width": 10, "height": 20}))],
            vec![],
        );
        let patch = json!({"width": 99}).as_object().cloned().unwrap();
        assert!(g.update_params("r", patch.clone()));
        assert!(!g.update_params("zz", patch));
        let p = &g.node("r").unwrap().params;
        assert_eq!(p["width"], json!(99));
        assert_eq!(p["height"], json!(20));
    }

    #[test]
    fn project_requires_nodes_and_edges() {
        assert!(Project::from_json(r#"{"name": "x"}"#).is_err());
        let p = Project::from_json(r#"{"nodes": [], "edges": []}"#).unwrap();
        assert_eq!(p.name, "Untitled Project");
        assert_eq!(p.resolution.get(), 512);
    }

    #[test]
    fn input_handles_follow_family() {
        assert_eq!(OperatorKind::Multiply.input_handles(), &["a", "b"]);
        assert_eq!(OperatorKind::Polar.input_handles(), &["in"]);
        assert!(OperatorKind::Beam.input_handles().is_empty());
        assert_eq!(OperatorKind::Neon.family(), Family::Filter);
    }
}
