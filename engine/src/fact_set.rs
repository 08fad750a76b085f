//! FactSet: a discrimination tree of ground facts, supporting idempotent
//! insertion and unification-based retrieval.

use crate::fact::Fact;
use crate::matching::Matching;
use crate::path::Path;
use crate::grammar::Grammar;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

struct Node {
    parent: Weak<RefCell<Node>>,
    /// Exact-match children, keyed by a concrete (non-variable) path.
    children: HashMap<Path, Rc<RefCell<Node>>>,
    /// Variable-bearing children: leaf variables, and variable-range nodes
    /// whose whole sub-tree is shared.
    logic_children: HashMap<Path, Rc<RefCell<Node>>>,
}

impl Node {
    fn new(parent: Weak<RefCell<Node>>) -> Rc<RefCell<Node>> {
        Rc::new(RefCell::new(Node {
            parent,
            children: HashMap::new(),
            logic_children: HashMap::new(),
        }))
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.logic_children.is_empty()
    }
}

/// A set of facts arranged in a tree structure that facilitates queries.
pub struct FactSet {
    root: Rc<RefCell<Node>>,
}

impl Default for FactSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FactSet {
    pub fn new() -> Self {
        Self {
            root: Node::new(Weak::new()),
        }
    }

    /// Add `fact` to the set. Idempotent: adding the same fact twice leaves
    /// the tree unchanged the second time.
    pub fn add_fact(&self, fact: &Fact, grammar: &dyn Grammar) {
        tracing::debug!(fact = %fact, "adding fact to fact set");
        let paths = fact.get_all_paths();
        follow_paths(&self.root, &paths, grammar);
    }

    /// Query `fact`, which may contain variables. Returns one matching per
    /// distinct way the query unifies with a stored fact; an empty matching
    /// as the sole response means "present, no variables".
    pub fn ask_fact(&self, fact: &Fact, grammar: &dyn Grammar) -> Vec<Matching> {
        let paths = fact.get_leaf_paths();
        let matching = Matching::with_origin(Rc::new(fact.clone()));
        let mut response = Vec::new();
        query_paths(&self.root, &paths, matching, &mut response);
        tracing::debug!(fact = %fact, matches = response.len(), "queried fact set");
        response
    }

    /// Remove `fact` from the set, pruning now-empty ancestor nodes. Does
    /// not touch any other index; facts already derived from `fact` are
    /// not retracted (no truth maintenance).
    pub fn remove_fact(&self, fact: &Fact, grammar: &dyn Grammar) {
        let paths = fact.get_all_paths();
        let mut chain = Vec::new();
        if !collect_chain(&self.root, &paths, grammar, &mut chain) {
            return;
        }
        while let Some((holder, path, is_logic)) = chain.pop() {
            if is_logic {
                holder.borrow_mut().logic_children.remove(&path);
            } else {
                holder.borrow_mut().children.remove(&path);
            }
            if !holder.borrow().is_empty() {
                break;
            }
        }
    }
}

fn follow_paths(start: &Rc<RefCell<Node>>, paths: &[Path], grammar: &dyn Grammar) {
    let mut parent = start.clone();
    let mut idx = 0;
    while idx < paths.len() {
        let path = &paths[idx];
        if path.can_be_var(grammar) {
            let found = parent.borrow().logic_children.get(path).cloned();
            match found {
                Some(node) if !path.is_leaf() => {
                    let rest = path.paths_after(&paths[idx..]);
                    follow_paths(&node, &rest, grammar);
                    return;
                }
                Some(node) => {
                    parent = node;
                    idx += 1;
                }
                None => {
                    create_paths(&parent, &paths[idx..], grammar);
                    return;
                }
            }
        } else {
            match parent.borrow().children.get(path).cloned() {
                Some(node) => {
                    parent = node;
                    idx += 1;
                }
                None => {
                    create_paths(&parent, &paths[idx..], grammar);
                    return;
                }
            }
        }
    }
}

fn create_paths(start: &Rc<RefCell<Node>>, paths: &[Path], grammar: &dyn Grammar) {
    let mut parent = start.clone();
    let mut idx = 0;
    while idx < paths.len() {
        let path = paths[idx].clone();
        let new_node = Node::new(Rc::downgrade(&parent));
        if path.can_be_var(grammar) {
            parent.borrow_mut().logic_children.insert(path.clone(), new_node.clone());
            if !path.is_leaf() {
                let rest = path.paths_after(&paths[idx..]);
                create_paths(&new_node, &rest, grammar);
                return;
            }
        } else {
            parent.borrow_mut().children.insert(path.clone(), new_node.clone());
        }
        parent = new_node;
        idx += 1;
    }
}

fn query_paths(node: &Rc<RefCell<Node>>, paths: &[Path], matching: Matching, response: &mut Vec<Matching>) {
    let Some((path, rest)) = paths.split_first() else {
        tracing::debug!(matching = %matching, "answer");
        response.push(matching);
        return;
    };

    if path.is_var() {
        let key = path.value();
        if !matching.contains(key) {
            let children: Vec<(Path, Rc<RefCell<Node>>)> = node
                .borrow()
                .logic_children
                .iter()
                .map(|(p, n)| (p.clone(), n.clone()))
                .collect();
            for (child_path, child) in children {
                let new_matching = matching.setitem(key.clone(), child_path.value().clone());
                query_paths(&child, rest, new_matching, response);
            }
            return;
        }
        let (concrete, _) = path.substitute(&matching);
        query_concrete(node, &concrete, rest, matching, response);
        return;
    }

    query_concrete(node, path, rest, matching, response);
}

fn query_concrete(node: &Rc<RefCell<Node>>, path: &Path, rest: &[Path], matching: Matching, response: &mut Vec<Matching>) {
    let next = {
        let n = node.borrow();
        n.children.get(path).or_else(|| n.logic_children.get(path)).cloned()
    };
    if let Some(next) = next {
        query_paths(&next, rest, matching, response);
    }
}

fn collect_chain(
    node: &Rc<RefCell<Node>>,
    paths: &[Path],
    grammar: &dyn Grammar,
    chain: &mut Vec<(Rc<RefCell<Node>>, Path, bool)>,
) -> bool {
    let Some((path, rest)) = paths.split_first() else {
        return true;
    };
    let is_logic = path.can_be_var(grammar);
    let found = if is_logic {
        node.borrow().logic_children.get(path).cloned()
    } else {
        node.borrow().children.get(path).cloned()
    };
    let Some(next) = found else {
        return false;
    };
    chain.push((node.clone(), path.clone(), is_logic));
    if is_logic && !path.is_leaf() {
        let new_rest = path.paths_after(paths);
        return collect_chain(&next, &new_rest, grammar, chain);
    }
    collect_chain(&next, rest, grammar, chain)
}
