use std::collections::{HashMap, HashSet};

use crate::{
    artifact::Artifact,
    foundation::{
        core::{Resolution, Rgb},
        error::{TexError, TexResult},
    },
    markup::Document,
    model::{Family, Graph, GraphIndex, Node},
    ops::{self, Inputs, OpContext},
    params::parse_params,
    raster::{Rasterizer, ResvgRasterizer},
};

/// Full-canvas fill beneath composed documents.
pub const BACKGROUND: Rgb = Rgb::gray(0x05);

/// Walks a graph from its root and compiles it into an [`Artifact`].
///
/// Every call owns its own memo table and id counter; nothing is shared between calls.
pub struct Evaluator<'r> {
    rasterizer: &'r dyn Rasterizer,
}

impl<'r> Evaluator<'r> {
    pub fn new(rasterizer: &'r dyn Rasterizer) -> Self {
        Self { rasterizer }
    }

    /// Root artifact. An unresolvable root yields an empty artifact, not an error.
    #[tracing::instrument(
        skip(self, graph),
        fields(nodes = graph.nodes.len(), edges = graph.edges.len(), res = res.get())
    )]
    pub fn evaluate(
        &self,
        graph: &Graph,
        res: Resolution,
        root: Option<&str>,
    ) -> TexResult<Artifact> {
        let Some(root) = resolve_root(graph, root) else {
            tracing::debug!(?root, "no root node, evaluating to empty");
            return Ok(Artifact::empty());
        };
        let mut walk = Walk {
            index: graph.index(),
            ctx: OpContext::new(res, self.rasterizer),
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        };
        walk.eval_node(&root.id)
    }

    /// Standalone document: root definitions, optional background, root markup.
    pub fn compile(
        &self,
        graph: &Graph,
        res: Resolution,
        root: Option<&str>,
        background: Option<Rgb>,
    ) -> TexResult<Document> {
        self.evaluate(graph, res, root)?
            .to_document(res, background)
    }
}

/// Evaluates with the default CPU rasterizer.
pub fn evaluate(graph: &Graph, res: Resolution, root: Option<&str>) -> TexResult<Artifact> {
    Evaluator::new(&ResvgRasterizer::default()).evaluate(graph, res, root)
}

/// SVG text of the composed document over [`BACKGROUND`].
pub fn compile_svg(graph: &Graph, res: Resolution, root: Option<&str>) -> TexResult<String> {
    Ok(Evaluator::new(&ResvgRasterizer::default())
        .compile(graph, res, root, Some(BACKGROUND))?
        .to_svg_string())
}

/// An explicit root must exist; otherwise the output sink is used.
fn resolve_root<'g>(graph: &'g Graph, root: Option<&str>) -> Option<&'g Node> {
    match root {
        Some(id) => graph.node(id),
        None => graph.output_node(),
    }
}

struct Walk<'g, 'r> {
    index: GraphIndex<'g>,
    ctx: OpContext<'r>,
    memo: HashMap<&'g str, Artifact>,
    in_progress: HashSet<&'g str>,
}

impl<'g> Walk<'g, '_> {
    fn eval_node(&mut self, id: &str) -> TexResult<Artifact> {
        if let Some(done) = self.memo.get(id) {
            return Ok(done.clone());
        }
        let Some(node) = self.index.node(id) else {
            tracing::debug!(node = id, "edge references a missing node");
            return Ok(Artifact::empty());
        };
        if !self.in_progress.insert(node.id.as_str()) {
            return Err(TexError::cyclic(id));
        }

        let mut inputs = Inputs::default();
        for &handle in node.kind.input_handles() {
            match self.index.producer(&node.id, handle) {
                Some(source) => {
                    let upstream = self.eval_node(source)?;
                    inputs.set(handle, upstream);
                }
                None => tracing::debug!(node = %node.id, handle, "input unconnected"),
            }
        }

        if node.kind.family() == Family::Unknown {
            tracing::debug!(node = %node.id, "unknown operator type");
        }
        let params = parse_params(node.kind, &node.params);
        let out = ops::apply(&params, inputs, &mut self.ctx)?;

        self.in_progress.remove(node.id.as_str());
        self.memo.insert(node.id.as_str(), out.clone());
        Ok(out)
    }
}
