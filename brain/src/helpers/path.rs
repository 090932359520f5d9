use log::warn;
use rand::Rng;
use track::{NodeIndex, TrackGraph};

/// How many nodes ahead of the current one are searched when re-localizing.
pub const LOOKAHEAD_NODES: usize = 10;

/// The route one kart follows through the graph: which successor it takes at
/// every node.
///
/// Computed once per controller, so a kart sticks with its choice at each
/// fork for the whole race.
#[derive(Clone, Debug)]
pub struct AgentPath {
    successor: Vec<Option<usize>>,
    next: Vec<Option<NodeIndex>>,
    lookahead: Vec<Vec<NodeIndex>>,
}

impl AgentPath {
    /// Choose a successor for every node. At forks the choice is random unless
    /// `target` is given, in which case the branch leading to it is taken.
    /// Links hidden from the AI are only used when there is nothing else.
    pub fn compute(graph: &TrackGraph, target: Option<NodeIndex>, rng: &mut impl Rng) -> Self {
        let num_nodes = graph.num_nodes();
        let mut successor = Vec::with_capacity(num_nodes);
        let mut next = Vec::with_capacity(num_nodes);

        for node in graph.nodes() {
            let choice = match target.and_then(|t| graph.successor_to_reach(node.index(), t)) {
                Some(i) => Some(i),
                None => choose_successor(graph, node.index(), rng),
            };
            successor.push(choice);
            next.push(choice.map(|i| node.successor(i)));
        }

        let lookahead = (0..num_nodes)
            .map(|start| {
                let mut list = Vec::with_capacity(LOOKAHEAD_NODES);
                let mut current = start;
                while list.len() < LOOKAHEAD_NODES {
                    current = some_or_else!(next[current], { break });
                    list.push(current);
                }
                list
            })
            .collect();

        Self {
            successor,
            next,
            lookahead,
        }
    }

    pub fn successor(&self, node: NodeIndex) -> Option<usize> {
        self.successor[node]
    }

    pub fn next(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.next[node]
    }

    /// The next nodes along the path after `node`, not including `node`.
    pub fn lookahead(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.lookahead[node]
    }

    /// `node` followed by its look-ahead list.
    pub fn search_window(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut window = Vec::with_capacity(LOOKAHEAD_NODES + 1);
        window.push(node);
        window.extend_from_slice(&self.lookahead[node]);
        window
    }

    /// Walk the path from `from`, yielding `from` first. Stops at dead ends and
    /// after `limit` nodes.
    pub fn walk(&self, from: NodeIndex, limit: usize) -> impl Iterator<Item = NodeIndex> + '_ {
        let mut current = Some(from);
        (0..limit).map_while(move |_| {
            let node = current?;
            current = self.next[node];
            Some(node)
        })
    }
}

fn choose_successor(graph: &TrackGraph, node: NodeIndex, rng: &mut impl Rng) -> Option<usize> {
    let node = graph.node(node);
    let visible: Vec<usize> = (0..node.num_successors())
        .filter(|&i| !node.successor_data(i).ai_ignored)
        .collect();
    match (visible.len(), node.num_successors()) {
        (_, 0) => None,
        (0, n) => {
            warn!("node {} only has hidden successors", node.index());
            Some(rng.random_range(0..n))
        }
        (1, _) => Some(visible[0]),
        (n, _) => Some(visible[rng.random_range(0..n)]),
    }
}
