//! Shared discrimination-tree machinery behind `CondSet` and `ConsSet`: a
//! tree indexed on normalized rule conditions or consequences, matched
//! against a fact's leaf paths to produce activations or backtrack records.

use crate::grammar::Grammar;
use crate::matching::Matching;
use crate::path::Path;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

struct Node<T> {
    parent: Weak<RefCell<Node<T>>>,
    /// The path this node was created for (`None` only for the root).
    /// Needed both for the `can_follow` ancestor check and so a `var_child`
    /// knows which canonical variable it binds.
    path: Option<Path>,
    children: HashMap<Path, Rc<RefCell<Node<T>>>>,
    logic_children: HashMap<Path, Rc<RefCell<Node<T>>>>,
    var_child: Option<Rc<RefCell<Node<T>>>>,
    endnode: Vec<T>,
}

impl<T> Node<T> {
    fn new(parent: Weak<RefCell<Node<T>>>, path: Option<Path>) -> Rc<RefCell<Node<T>>> {
        Rc::new(RefCell::new(Node {
            parent,
            path,
            children: HashMap::new(),
            logic_children: HashMap::new(),
            var_child: None,
            endnode: Vec::new(),
        }))
    }
}

pub struct RuleIndex<T> {
    root: Rc<RefCell<Node<T>>>,
}

impl<T: Clone> Default for RuleIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RuleIndex<T> {
    pub fn new() -> Self {
        Self {
            root: Node::new(Weak::new(), None),
        }
    }

    /// Insert `paths` (a normalized condition's or consequence's leaf
    /// paths) and attach `payload` to the terminal `EndNode`.
    pub fn insert(&self, paths: &[Path], payload: T) {
        let mut parent = self.root.clone();
        let mut seen_vars: Vec<crate::segment::Segment> = Vec::new();
        for path in paths {
            parent = if !path.is_var() {
                get_or_create_exact_child(&parent, path)
            } else {
                let seg = path.value().clone();
                if seen_vars.iter().any(|s| s == &seg) {
                    get_or_create_logic_child(&parent, path)
                } else {
                    seen_vars.push(seg);
                    var_child_of(&parent, path)
                }
            };
        }
        parent.borrow_mut().endnode.push(payload);
    }

    /// Match `paths` (a fact's leaf paths) against the index, producing one
    /// `(payload, matching)` pair per terminated branch.
    pub fn propagate(&self, paths: &[Path], matching: Matching, grammar: &dyn Grammar) -> Vec<(T, Matching)> {
        let mut out = Vec::new();
        propagate_node(&self.root, paths, matching, grammar, &mut out);
        out
    }
}

fn get_or_create_exact_child<T>(parent: &Rc<RefCell<Node<T>>>, path: &Path) -> Rc<RefCell<Node<T>>> {
    if let Some(existing) = parent.borrow().children.get(path) {
        return existing.clone();
    }
    let node = Node::new(Rc::downgrade(parent), Some(path.clone()));
    parent.borrow_mut().children.insert(path.clone(), node.clone());
    node
}

fn get_or_create_logic_child<T>(parent: &Rc<RefCell<Node<T>>>, path: &Path) -> Rc<RefCell<Node<T>>> {
    if let Some(existing) = parent.borrow().logic_children.get(path) {
        return existing.clone();
    }
    let node = Node::new(Rc::downgrade(parent), Some(path.clone()));
    parent.borrow_mut().logic_children.insert(path.clone(), node.clone());
    node
}

fn var_child_of<T>(parent: &Rc<RefCell<Node<T>>>, path: &Path) -> Rc<RefCell<Node<T>>> {
    if let Some(existing) = parent.borrow().var_child.clone() {
        return existing;
    }
    let node = Node::new(Rc::downgrade(parent), Some(path.clone()));
    parent.borrow_mut().var_child = Some(node.clone());
    node
}

fn propagate_node<T: Clone>(
    node: &Rc<RefCell<Node<T>>>,
    paths: &[Path],
    matching: Matching,
    grammar: &dyn Grammar,
    out: &mut Vec<(T, Matching)>,
) {
    let Some((path, rest)) = paths.split_first() else {
        for payload in &node.borrow().endnode {
            out.push((payload.clone(), matching.clone()));
        }
        return;
    };

    let mut ancestor = node.borrow().parent.upgrade();
    while let Some(a) = ancestor {
        let next = a.borrow().parent.upgrade();
        if let Some(ancestor_path) = &a.borrow().path {
            if !grammar.can_follow(path, ancestor_path) {
                return;
            }
        }
        ancestor = next;
    }

    if let Some(child) = node.borrow().children.get(path).cloned() {
        propagate_node(&child, rest, matching.clone(), grammar, out);
    }

    if let Some(bound_var) = matching.getkey(path.value()).cloned() {
        let rewritten = path.change_value(bound_var);
        if let Some(child) = node.borrow().logic_children.get(&rewritten).cloned() {
            propagate_node(&child, rest, matching.clone(), grammar, out);
        }
    }

    if let Some(child) = node.borrow().var_child.clone() {
        if let Some(var_path) = child.borrow().path.clone() {
            let new_matching = matching.setitem(var_path.value().clone(), path.value().clone());
            propagate_node(&child, rest, new_matching, grammar, out);
        }
    }
}
