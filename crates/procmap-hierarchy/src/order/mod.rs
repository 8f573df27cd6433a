//! Execution order of elements within one process.
//!
//! [`OrderIndexer`] turns the partially ordered sequence-flow graph of a
//! single definition into a total display order:
//!
//! - Start nodes are elements without incoming flows. A tagged start event
//!   with incoming flows is numbered after its predecessors, and only becomes
//!   a start when it sits behind a cycle no start reaches.
//! - Elements are numbered in visitation order. An element is visited once
//!   every predecessor has been, and outgoing flows are followed in
//!   declaration order, so the index strictly increases along any acyclic
//!   path. Intermediate catch/throw events are numbered like any other node,
//!   which keeps elements behind a relay event on the same chain.
//! - Every outgoing flow of a fork starts its own [`BranchId`].
//! - Cyclic flows are broken at the earliest declared element that is
//!   reachable from the already numbered part, so indexing always terminates
//!   and every element receives an index.

mod branch;
mod layout;

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

pub use branch::BranchId;
use branch::BranchPath;
pub use layout::visual_order;

use crate::TRACING_TARGET_ORDER;
use crate::definition::ProcessDefinition;

/// Ordering attributes of a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeOrder {
    /// Position along the sequence-flow traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
    /// Position derived from the diagram layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_order_index: Option<u32>,
    /// Concurrent path the node sits on; `None` on the main line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<BranchId>,
}

impl NodeOrder {
    /// Creates an order with only an order index.
    pub fn indexed(order_index: u32) -> Self {
        Self {
            order_index: Some(order_index),
            ..Default::default()
        }
    }

    /// Sets the visual order index.
    pub fn with_visual_order_index(mut self, visual_order_index: u32) -> Self {
        self.visual_order_index = Some(visual_order_index);
        self
    }

    /// Sets the branch id.
    pub fn with_branch_id(mut self, branch_id: impl Into<BranchId>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    /// Returns whether no ordering attribute is set.
    pub fn is_empty(&self) -> bool {
        self.order_index.is_none()
            && self.visual_order_index.is_none()
            && self.branch_id.is_none()
    }
}

/// Ordering computed for every element of one definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOrder {
    orders: HashMap<String, NodeOrder>,
    starts: Vec<String>,
    cycle_breaks: usize,
}

impl ProcessOrder {
    /// Returns the order of an element.
    pub fn get(&self, element_id: &str) -> Option<&NodeOrder> {
        self.orders.get(element_id)
    }

    /// Returns the order index of an element.
    pub fn order_index(&self, element_id: &str) -> Option<u32> {
        self.orders.get(element_id)?.order_index
    }

    /// Returns the branch id of an element.
    pub fn branch_id(&self, element_id: &str) -> Option<&BranchId> {
        self.orders.get(element_id)?.branch_id.as_ref()
    }

    /// Returns the start nodes in the order they were seeded.
    pub fn starts(&self) -> &[String] {
        &self.starts
    }

    /// Returns how many times a cycle had to be broken to continue.
    pub fn cycle_breaks(&self) -> usize {
        self.cycle_breaks
    }

    /// Returns the number of ordered elements.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns whether no element was ordered.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Local adjacency of one definition, by declaration position.
struct FlowGraph<'a> {
    ids: Vec<&'a str>,
    start_events: Vec<bool>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<'a> FlowGraph<'a> {
    /// Keeps the first declaration of each element id and drops self loops,
    /// parallel duplicates and flows with unknown endpoints.
    fn new(definition: &'a ProcessDefinition) -> Self {
        let mut positions = HashMap::new();
        let mut ids = Vec::new();
        let mut start_events = Vec::new();

        for element in &definition.elements {
            if !positions.contains_key(element.id.as_str()) {
                positions.insert(element.id.as_str(), ids.len());
                ids.push(element.id.as_str());
                start_events.push(element.is_start_event());
            }
        }

        let mut outgoing = vec![Vec::new(); ids.len()];
        let mut incoming = vec![Vec::new(); ids.len()];
        let mut seen = HashSet::new();

        for flow in &definition.flows {
            let (Some(&from), Some(&to)) = (
                positions.get(flow.source_ref.as_str()),
                positions.get(flow.target_ref.as_str()),
            ) else {
                continue;
            };
            if from == to || !seen.insert((from, to)) {
                continue;
            }
            outgoing[from].push(to);
            incoming[to].push(from);
        }

        Self {
            ids,
            start_events,
            outgoing,
            incoming,
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn is_fork(&self, node: usize) -> bool {
        self.outgoing[node].len() > 1
    }
}

/// Computes execution order for one process definition.
pub struct OrderIndexer<'a> {
    definition: &'a ProcessDefinition,
}

impl<'a> OrderIndexer<'a> {
    /// Creates an indexer over the given definition.
    pub fn new(definition: &'a ProcessDefinition) -> Self {
        Self { definition }
    }

    /// Computes order index, branch id and visual order index for every
    /// element of the definition.
    pub fn index(&self) -> ProcessOrder {
        let flows = FlowGraph::new(self.definition);
        let count = flows.len();

        let mut remaining: Vec<usize> = flows.incoming.iter().map(Vec::len).collect();
        let mut queued = vec![false; count];
        let mut order: Vec<Option<u32>> = vec![None; count];
        let mut branches: Vec<Option<BranchPath>> = vec![None; count];
        let mut queue = VecDeque::new();

        let mut starts: Vec<usize> = (0..count).filter(|&node| remaining[node] == 0).collect();
        let independent_entries = starts.len() > 1;
        for &node in &starts {
            branches[node] = Some(if independent_entries {
                BranchPath::entry(flows.ids[node])
            } else {
                BranchPath::default()
            });
            queued[node] = true;
            queue.push_back(node);
        }

        let mut counter = 0u32;
        let mut cycle_breaks = 0;

        loop {
            while let Some(node) = queue.pop_front() {
                if order[node].is_some() {
                    continue;
                }
                if branches[node].is_none() {
                    branches[node] = Some(Self::inherit_branch(&flows, &branches, &order, node));
                }
                order[node] = Some(counter);
                counter += 1;

                for &next in &flows.outgoing[node] {
                    if order[next].is_some() {
                        continue;
                    }
                    remaining[next] -= 1;
                    if remaining[next] == 0 && !queued[next] {
                        queued[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            if let Some(node) = Self::stranded_start_event(&flows, &order) {
                starts.push(node);
                queued[node] = true;
                queue.push_back(node);
                continue;
            }

            let Some(node) = Self::break_cycle(&flows, &order) else {
                break;
            };
            cycle_breaks += 1;
            tracing::debug!(
                target: TRACING_TARGET_ORDER,
                source = %self.definition.source,
                element_id = flows.ids[node],
                "breaking sequence-flow cycle"
            );
            queued[node] = true;
            queue.push_back(node);
        }

        if cycle_breaks > 0 {
            tracing::warn!(
                target: TRACING_TARGET_ORDER,
                source = %self.definition.source,
                process_id = %self.definition.process_id,
                cycle_breaks,
                "cyclic sequence flows, order is best effort"
            );
        }

        let visual = visual_order(self.definition);
        let orders = (0..count)
            .map(|node| {
                let id = flows.ids[node];
                let entry = NodeOrder {
                    order_index: order[node],
                    visual_order_index: visual.get(id).copied(),
                    branch_id: branches[node].as_ref().and_then(BranchPath::to_branch_id),
                };
                (id.to_owned(), entry)
            })
            .collect();

        ProcessOrder {
            orders,
            starts: starts.iter().map(|&node| flows.ids[node].to_owned()).collect(),
            cycle_breaks,
        }
    }

    /// Branch of a node from the branches of its already numbered predecessors.
    fn inherit_branch(
        flows: &FlowGraph<'_>,
        branches: &[Option<BranchPath>],
        order: &[Option<u32>],
        node: usize,
    ) -> BranchPath {
        let arriving: Vec<BranchPath> = flows.incoming[node]
            .iter()
            .filter(|&&pred| order[pred].is_some())
            .filter_map(|&pred| {
                let branch = branches[pred].as_ref()?;
                if !flows.is_fork(pred) {
                    return Some(branch.clone());
                }
                let k = flows.outgoing[pred].iter().position(|&next| next == node)?;
                Some(branch.fork(flows.ids[pred], k))
            })
            .collect();

        if arriving.is_empty() {
            // Entered only by breaking a cycle with no numbered predecessor.
            return BranchPath::entry(flows.ids[node]);
        }
        BranchPath::common_prefix(&arriving)
    }

    /// Earliest unnumbered start event none of whose predecessors is numbered.
    fn stranded_start_event(flows: &FlowGraph<'_>, order: &[Option<u32>]) -> Option<usize> {
        (0..flows.len()).find(|&node| {
            flows.start_events[node]
                && order[node].is_none()
                && flows.incoming[node].iter().all(|&pred| order[pred].is_none())
        })
    }

    /// Picks the earliest declared unnumbered node with a numbered
    /// predecessor, falling back to the earliest unnumbered node.
    fn break_cycle(flows: &FlowGraph<'_>, order: &[Option<u32>]) -> Option<usize> {
        let mut unnumbered = (0..flows.len()).filter(|&node| order[node].is_none());
        let first = unnumbered.next()?;
        let reachable = std::iter::once(first)
            .chain(unnumbered)
            .find(|&node| flows.incoming[node].iter().any(|&pred| order[pred].is_some()));
        Some(reachable.unwrap_or(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Element, EventKind};

    fn chain_with_relay() -> ProcessDefinition {
        ProcessDefinition::new("loans/application.bpmn", "application")
            .with_element(Element::service_task("kyc"))
            .with_element(Element::business_rule_task("credit-decision"))
            .with_element(Element::event("notify", EventKind::IntermediateThrow))
            .with_element(Element::user_task("offer"))
            .with_flow("f1", "kyc", "credit-decision")
            .with_flow("f2", "credit-decision", "notify")
            .with_flow("f3", "notify", "offer")
    }

    #[test]
    fn test_chain_through_intermediate_event() {
        let order = OrderIndexer::new(&chain_with_relay()).index();
        assert_eq!(order.order_index("kyc"), Some(0));
        assert_eq!(order.order_index("credit-decision"), Some(1));
        assert_eq!(order.order_index("notify"), Some(2));
        assert_eq!(order.order_index("offer"), Some(3));
        assert_eq!(order.starts(), &["kyc".to_owned()]);
        assert_eq!(order.branch_id("offer"), None);
    }

    #[test]
    fn test_start_event_then_chain_of_relays() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::event("start", EventKind::Start))
            .with_element(Element::user_task("a"))
            .with_element(Element::event("catch", EventKind::IntermediateCatch))
            .with_element(Element::event("throw", EventKind::IntermediateThrow))
            .with_element(Element::user_task("b"))
            .with_flow("f1", "start", "a")
            .with_flow("f2", "a", "catch")
            .with_flow("f3", "catch", "throw")
            .with_flow("f4", "throw", "b");

        let order = OrderIndexer::new(&def).index();
        let a = order.order_index("a").expect("a is ordered");
        let b = order.order_index("b").expect("b is ordered");
        assert!(a < b);
        assert!(order.order_index("throw").expect("throw is ordered") < b);
    }

    #[test]
    fn test_fork_assigns_distinct_branches() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::event("start", EventKind::Start))
            .with_element(Element::user_task("split"))
            .with_element(Element::user_task("left"))
            .with_element(Element::service_task("right"))
            .with_element(Element::user_task("join"))
            .with_flow("f1", "start", "split")
            .with_flow("f2", "split", "left")
            .with_flow("f3", "split", "right")
            .with_flow("f4", "left", "join")
            .with_flow("f5", "right", "join");

        let order = OrderIndexer::new(&def).index();
        let split = order.order_index("split").expect("split is ordered");
        assert!(order.order_index("left").expect("left is ordered") > split);
        assert!(order.order_index("right").expect("right is ordered") > split);

        let left = order.branch_id("left").expect("left is on a branch");
        let right = order.branch_id("right").expect("right is on a branch");
        assert_ne!(left, right);
        assert_eq!(left.as_str(), "split#0");
        assert_eq!(right.as_str(), "split#1");

        // The join returns to the main line and comes after both branches.
        assert_eq!(order.branch_id("join"), None);
        assert_eq!(order.order_index("join"), Some(4));
    }

    #[test]
    fn test_join_waits_for_longest_path() {
        // Declared so that a naive breadth-first walk would number `c` before `b`.
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::user_task("a"))
            .with_element(Element::user_task("c"))
            .with_element(Element::user_task("b"))
            .with_flow("f1", "a", "c")
            .with_flow("f2", "a", "b")
            .with_flow("f3", "b", "c");

        let order = OrderIndexer::new(&def).index();
        assert!(order.order_index("a") < order.order_index("b"));
        assert!(order.order_index("b") < order.order_index("c"));
    }

    #[test]
    fn test_nested_forks_extend_branch() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::user_task("outer"))
            .with_element(Element::user_task("inner"))
            .with_element(Element::user_task("x"))
            .with_element(Element::user_task("y"))
            .with_element(Element::user_task("z"))
            .with_flow("f1", "outer", "inner")
            .with_flow("f2", "outer", "z")
            .with_flow("f3", "inner", "x")
            .with_flow("f4", "inner", "y");

        let order = OrderIndexer::new(&def).index();
        assert_eq!(order.branch_id("inner").map(BranchId::as_str), Some("outer#0"));
        assert_eq!(order.branch_id("z").map(BranchId::as_str), Some("outer#1"));
        assert_eq!(
            order.branch_id("x").map(BranchId::as_str),
            Some("outer#0/inner#0")
        );
        assert_eq!(
            order.branch_id("y").map(BranchId::as_str),
            Some("outer#0/inner#1")
        );
    }

    #[test]
    fn test_multiple_starts_are_independent_entries() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::user_task("a"))
            .with_element(Element::user_task("b"))
            .with_element(Element::user_task("after_b"))
            .with_flow("f1", "b", "after_b");

        let order = OrderIndexer::new(&def).index();
        assert_eq!(order.starts(), &["a".to_owned(), "b".to_owned()]);
        assert_eq!(order.branch_id("a").map(BranchId::as_str), Some("a"));
        assert_eq!(order.branch_id("after_b").map(BranchId::as_str), Some("b"));
    }

    #[test]
    fn test_cyclic_flows_terminate_with_total_order() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::event("start", EventKind::Start))
            .with_element(Element::user_task("a"))
            .with_element(Element::user_task("b"))
            .with_element(Element::user_task("c"))
            .with_flow("f1", "start", "a")
            .with_flow("f2", "a", "b")
            .with_flow("f3", "b", "c")
            .with_flow("f4", "c", "a");

        let order = OrderIndexer::new(&def).index();
        assert_eq!(order.len(), 4);
        assert_eq!(order.cycle_breaks(), 1);
        assert_eq!(order.order_index("start"), Some(0));
        assert_eq!(order.order_index("a"), Some(1));
        assert_eq!(order.order_index("b"), Some(2));
        assert_eq!(order.order_index("c"), Some(3));
    }

    #[test]
    fn test_start_event_with_incoming_flow_follows_predecessor() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::event("start", EventKind::Start))
            .with_element(Element::user_task("a"))
            .with_element(Element::user_task("x"))
            .with_flow("f1", "x", "start")
            .with_flow("f2", "start", "a");

        let order = OrderIndexer::new(&def).index();
        assert_eq!(order.starts(), &["x".to_owned()]);
        assert_eq!(order.order_index("x"), Some(0));
        assert_eq!(order.order_index("start"), Some(1));
        assert_eq!(order.order_index("a"), Some(2));
        assert_eq!(order.cycle_breaks(), 0);
    }

    #[test]
    fn test_start_event_inside_cycle_is_entry() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::user_task("a"))
            .with_element(Element::event("start", EventKind::Start))
            .with_flow("f1", "start", "a")
            .with_flow("f2", "a", "start");

        let order = OrderIndexer::new(&def).index();
        assert_eq!(order.starts(), &["start".to_owned()]);
        assert_eq!(order.order_index("start"), Some(0));
        assert_eq!(order.order_index("a"), Some(1));
        assert_eq!(order.cycle_breaks(), 0);
    }

    #[test]
    fn test_isolated_cycle_still_ordered() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::user_task("x"))
            .with_element(Element::user_task("y"))
            .with_flow("f1", "x", "y")
            .with_flow("f2", "y", "x")
            .with_flow("f3", "x", "x");

        let order = OrderIndexer::new(&def).index();
        assert!(order.starts().is_empty());
        assert_eq!(order.order_index("x"), Some(0));
        assert_eq!(order.order_index("y"), Some(1));
        assert_eq!(order.branch_id("x").map(BranchId::as_str), Some("x"));
    }

    #[test]
    fn test_dangling_flows_and_duplicates_are_ignored() {
        let def = ProcessDefinition::new("p.bpmn", "p")
            .with_element(Element::user_task("a"))
            .with_element(Element::user_task("b"))
            .with_element(Element::service_task("a"))
            .with_flow("f1", "a", "b")
            .with_flow("f2", "a", "b")
            .with_flow("f3", "b", "ghost");

        let order = OrderIndexer::new(&def).index();
        assert_eq!(order.len(), 2);
        assert_eq!(order.order_index("a"), Some(0));
        assert_eq!(order.order_index("b"), Some(1));
        // A duplicated flow does not turn `a` into a fork.
        assert_eq!(order.branch_id("b"), None);
    }

    #[test]
    fn test_visual_order_is_merged() {
        let def = chain_with_relay();
        let mut def = def;
        def.elements[3].position = Some(crate::definition::Position::new(10.0, 10.0));

        let order = OrderIndexer::new(&def).index();
        assert_eq!(order.get("offer").and_then(|o| o.visual_order_index), Some(0));
        assert_eq!(order.get("kyc").and_then(|o| o.visual_order_index), None);
    }

    #[test]
    fn test_empty_definition() {
        let order = OrderIndexer::new(&ProcessDefinition::new("p.bpmn", "p")).index();
        assert!(order.is_empty());
        assert_eq!(order.cycle_breaks(), 0);
    }
}
