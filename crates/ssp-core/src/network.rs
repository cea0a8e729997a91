//! Arc arena shared by every formulation.

use crate::arc::{Arc, ArcId, ArcKind, ArcNaming, Node};
use crate::nodes::NodeSet;
use std::collections::{BTreeMap, HashMap};
use std::ops::Index;

/// Nodes and deduplicated arcs of one formulation.
///
/// Arcs are stored in insertion order and addressed by [`ArcId`]. Adjacency
/// lists keep insertion order too, which is what the decoders' tie-breaks
/// rely on.
#[derive(Debug, Clone)]
pub struct Network {
    threshold: Node,
    naming: ArcNaming,
    nodes: NodeSet,
    arcs: Vec<Arc>,
    index: HashMap<Arc, ArcId>,
    outgoing: BTreeMap<Node, Vec<ArcId>>,
    incoming: BTreeMap<Node, Vec<ArcId>>,
    loss_floor: Option<Node>,
}

impl Network {
    /// Empty network for threshold `threshold` with node 0 active.
    pub fn new(threshold: u64, naming: ArcNaming) -> Self {
        let mut nodes = NodeSet::new();
        nodes.insert(0);
        Self {
            threshold: threshold as Node,
            naming,
            nodes,
            arcs: Vec::new(),
            index: HashMap::new(),
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
            loss_floor: None,
        }
    }

    pub fn threshold(&self) -> Node {
        self.threshold
    }

    pub fn naming(&self) -> ArcNaming {
        self.naming
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    /// Mark `node` active, returning whether it was new.
    pub fn activate(&mut self, node: Node) -> bool {
        self.nodes.insert(node)
    }

    /// Add `arc`, or return the handle of the identical arc already present.
    pub fn add_arc(&mut self, arc: Arc) -> ArcId {
        if let Some(&id) = self.index.get(&arc) {
            return id;
        }
        let id = ArcId::new(self.arcs.len() as u32);
        self.arcs.push(arc);
        self.index.insert(arc, id);
        self.outgoing.entry(arc.start).or_default().push(id);
        self.incoming.entry(arc.end).or_default().push(id);
        tracing::trace!(
            component = "network",
            operation = "add_arc",
            arc_id = id.inner(),
            arc = %arc,
            "Added arc"
        );
        id
    }

    pub fn find(&self, arc: &Arc) -> Option<ArcId> {
        self.index.get(arc).copied()
    }

    pub fn get(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.get(id.index())
    }

    /// Arc behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this network.
    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id.index()]
    }

    /// All arcs with their handles, in insertion order.
    pub fn arcs(&self) -> impl ExactSizeIterator<Item = (ArcId, &Arc)> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .map(|(index, arc)| (ArcId::new(index as u32), arc))
    }

    pub fn outgoing(&self, node: Node) -> &[ArcId] {
        self.outgoing.get(&node).map_or(&[], Vec::as_slice)
    }

    pub fn incoming(&self, node: Node) -> &[ArcId] {
        self.incoming.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Arcs carrying item `item`.
    pub fn item_arcs(&self, item: usize) -> impl Iterator<Item = ArcId> + '_ {
        self.arcs()
            .filter(move |(_, arc)| arc.item == Some(item))
            .map(|(id, _)| id)
    }

    /// Arcs of a given kind.
    pub fn arcs_of_kind(&self, kind: ArcKind) -> impl Iterator<Item = ArcId> + '_ {
        self.arcs()
            .filter(move |(_, arc)| arc.kind == kind)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Lowest coordinate reached by the loss chain: the minimum shifted start
    /// (LossArc) or the minimum folded endpoint (Reflect).
    pub fn min_loss_node(&self) -> Option<Node> {
        self.loss_floor
    }

    pub fn set_min_loss_node(&mut self, node: Node) {
        self.loss_floor = Some(node);
    }

    /// Name of `id` in this network's naming layout.
    pub fn arc_name(&self, id: ArcId) -> String {
        self.arc(id).name(self.naming)
    }
}

impl Index<ArcId> for Network {
    type Output = Arc;

    fn index(&self, id: ArcId) -> &Arc {
        self.arc(id)
    }
}
