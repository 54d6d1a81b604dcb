//! Monte Carlo Tree Search with UCB1 selection.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A parent owns
//! its children through the id list; the child's `parent` field is only used
//! to walk back up during backpropagation. The whole tree is dropped after a
//! decision.
//!
//! Each iteration:
//! 1. descends from the root through fully expanded nodes by UCB1,
//! 2. expands one untried move (last in the list first),
//! 3. runs a random playout from the new node,
//! 4. propagates the result back to the root.

use std::time::{Duration, Instant};

use fastrand::Rng;
use tracing::{debug, trace};

use crate::playout::{mcplayout, Outcome};
use crate::shapes::Placement;
use crate::state::{GameState, Move};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS search tree.
pub struct Node {
    /// Position at this node
    pub state: GameState,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    /// Placement that led here from the parent
    pub action: Option<Placement>,
    /// Expanded children, in expansion order
    pub children: Vec<NodeId>,
    /// Number of visits
    pub visits: u32,
    /// Wins for the player who moved into this node
    pub total_wins: f64,
    /// Moves not yet expanded; popped from the back
    pub untried: Vec<Move>,
}

impl Node {
    fn new(
        state: GameState,
        parent: Option<NodeId>,
        action: Option<Placement>,
        rng: &mut Rng,
    ) -> Self {
        let untried = state.find_all_valid_moves(state.current_player, rng);
        Self {
            state,
            parent,
            action,
            children: Vec::new(),
            visits: 0,
            total_wins: 0.0,
            untried,
        }
    }

    /// Fraction of visits that were wins for the player who moved here.
    /// `None` until the node has been visited.
    #[inline]
    pub fn winrate(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.total_wins / self.visits as f64)
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// UCB1 score given the parent's visit count. Unvisited nodes score +inf.
    pub fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.total_wins / visits + exploration * ((parent_visits as f64).ln() / visits).sqrt()
    }
}

/// Arena-allocated search tree.
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only the root for `state`.
    pub fn new(state: GameState, rng: &mut Rng) -> Self {
        Self {
            nodes: vec![Node::new(state, None, None, rng)],
        }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a child of `parent` and return its id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        state: GameState,
        action: Placement,
        rng: &mut Rng,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(state, Some(parent), Some(action), rng));
        self.get_mut(parent).children.push(id);
        id
    }

    /// Child of `id` with the highest UCB1 score; the first one wins ties.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &node.children {
            let score = self.get(child).ucb1(node.visits, exploration);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((child, score));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Walk down from the root while nodes are fully expanded and have children.
    pub fn descend(&self, exploration: f64) -> NodeId {
        let mut id = NodeId::ROOT;
        loop {
            let node = self.get(id);
            if !node.is_fully_expanded() || node.children.is_empty() {
                return id;
            }
            match self.select_child(id, exploration) {
                Some(child) => id = child,
                None => return id,
            }
        }
    }

    /// Pop the last untried move of `id` and materialise its child.
    ///
    /// The child's position has the move applied, completed lines cleared and
    /// the turn passed. Returns `None` when nothing is left to try.
    pub fn expand(&mut self, id: NodeId, rng: &mut Rng) -> Option<NodeId> {
        let node = self.get_mut(id);
        let mv = node.untried.pop()?;
        let mut state = node.state;
        let placement = mv.placement();
        state.apply(&placement);
        Some(self.add_child(id, state, placement, rng))
    }

    /// Update statistics from `id` up to the root.
    ///
    /// Every node on the path gains a visit. A win for `outcome.player` is
    /// credited to the nodes whose side to move is the other player, i.e. the
    /// nodes that `outcome.player` moved into.
    pub fn backpropagate(&mut self, id: NodeId, outcome: Outcome) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            if outcome.won && node.state.current_player != outcome.player {
                node.total_wins += 1.0;
            }
            current = node.parent;
        }
    }

    /// Most-visited root child; the first one wins ties.
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for &child in &self.root().children {
            let visits = self.get(child).visits;
            if best.is_none_or(|(_, v)| visits > v) {
                best = Some((child, visits));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Action of the most-visited root child.
    pub fn best_action(&self) -> Option<Placement> {
        self.best_child().and_then(|id| self.get(id).action)
    }
}

/// Limits and tuning for one search.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub iterations: usize,
    pub time_budget: Duration,
    pub exploration: f64,
    pub playout_depth: usize,
}

/// Run one full select/expand/simulate/backpropagate cycle.
pub fn iterate(tree: &mut Tree, limits: &SearchLimits, rng: &mut Rng) {
    let mut id = tree.descend(limits.exploration);
    if let Some(child) = tree.expand(id, rng) {
        id = child;
    }
    let outcome = mcplayout(&tree.get(id).state, limits.playout_depth, rng);
    trace!(node = id.0, player = %outcome.player, won = outcome.won, "playout");
    tree.backpropagate(id, outcome);
}

/// Search from `state` until the iteration cap or the time budget is hit.
///
/// Returns the tree so callers can inspect root statistics.
pub fn tree_search(state: GameState, limits: &SearchLimits, rng: &mut Rng) -> Tree {
    let start = Instant::now();
    let mut tree = Tree::new(state, rng);

    let mut iterations = 0;
    while iterations < limits.iterations && start.elapsed() < limits.time_budget {
        iterate(&mut tree, limits, rng);
        iterations += 1;
    }

    debug!(
        iterations,
        nodes = tree.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search finished"
    );
    tree
}
