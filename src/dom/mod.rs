//! In-memory element tree standing in for the browser DOM.
//!
//! Views build their scaffold through [`Document`] the way a page script
//! would through a templating helper: create an element, append it, style
//! it, and later find and replace parts of it. The tree is a petgraph
//! `StableDiGraph` with parent -> child edges weighted by sibling order.

mod element;

use std::{
    fmt::Write,
    sync::{Arc, PoisonError, RwLock},
};

use petgraph::{
    Direction,
    stable_graph::{NodeIndex, StableDiGraph},
    visit::EdgeRef,
};

use crate::{PipeflowError, Result, ShareLock};

pub use element::Element;

/// Handle to an element of a [`Document`].
///
/// Handles of removed elements never alias later elements: each carries the
/// serial of the element it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    index: NodeIndex,
    serial: u64,
}

struct Slot {
    serial: u64,
    element: Element,
}

#[derive(Default)]
struct Tree {
    graph: StableDiGraph<Slot, i64>,
    next_serial: u64,
}

impl Tree {
    fn insert(
        &mut self,
        element: Element,
    ) -> ElementId {
        self.next_serial += 1;
        let serial = self.next_serial;
        let index = self.graph.add_node(Slot {
            serial,
            element,
        });
        ElementId {
            index,
            serial,
        }
    }

    fn slot(
        &self,
        id: ElementId,
    ) -> Option<&Slot> {
        self.graph.node_weight(id.index).filter(|slot| slot.serial == id.serial)
    }

    fn slot_mut(
        &mut self,
        id: ElementId,
    ) -> Option<&mut Slot> {
        self.graph.node_weight_mut(id.index).filter(|slot| slot.serial == id.serial)
    }

    fn id_of(
        &self,
        index: NodeIndex,
    ) -> ElementId {
        ElementId {
            index,
            serial: self.graph[index].serial,
        }
    }

    fn require(
        &self,
        id: ElementId,
    ) -> Result<()> {
        match self.slot(id) {
            Some(_) => Ok(()),
            None => Err(PipeflowError::Dom(format!("element {:?} does not exist", id))),
        }
    }

    fn parent(
        &self,
        id: ElementId,
    ) -> Option<ElementId> {
        self.slot(id)?;
        self.graph.neighbors_directed(id.index, Direction::Incoming).next().map(|index| self.id_of(index))
    }

    fn children(
        &self,
        id: ElementId,
    ) -> Vec<ElementId> {
        if self.slot(id).is_none() {
            return Vec::new();
        }
        let mut edges: Vec<(i64, NodeIndex)> = self.graph.edges_directed(id.index, Direction::Outgoing).map(|e| (*e.weight(), e.target())).collect();
        edges.sort_by_key(|(order, _)| *order);
        edges.into_iter().map(|(_, index)| self.id_of(index)).collect()
    }

    /// Pre-order walk starting at `id`, `id` included.
    fn descendants(
        &self,
        id: ElementId,
    ) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.slot(current).is_none() {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }

    fn attach(
        &mut self,
        parent: ElementId,
        child: ElementId,
        front: bool,
    ) -> Result<()> {
        self.require(parent)?;
        self.require(child)?;

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(PipeflowError::Dom("cannot insert an element into itself".to_string()));
            }
            ancestor = self.parent(current);
        }

        let incoming: Vec<_> = self.graph.edges_directed(child.index, Direction::Incoming).map(|e| e.id()).collect();
        for edge in incoming {
            self.graph.remove_edge(edge);
        }

        let orders = self.graph.edges_directed(parent.index, Direction::Outgoing).map(|e| *e.weight());
        let order = if front {
            orders.min().map_or(0, |min| min - 1)
        } else {
            orders.max().map_or(0, |max| max + 1)
        };
        self.graph.add_edge(parent.index, child.index, order);
        Ok(())
    }

    fn render_into(
        &self,
        id: ElementId,
        out: &mut String,
    ) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        let el = &slot.element;

        let _ = write!(out, "<{}", el.tag);
        for (key, value) in &el.attrs {
            let _ = write!(out, " {}=\"{}\"", key, escape(value));
        }
        if !el.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&el.classes.join(" ")));
        }
        if !el.style.is_empty() {
            let style: Vec<String> = el.style.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            let _ = write!(out, " style=\"{}\"", escape(&style.join("; ")));
        }
        out.push('>');
        if el.is_void() {
            return;
        }
        if let Some(text) = &el.text {
            out.push_str(&escape(text));
        }
        for child in self.children(id) {
            self.render_into(child, out);
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Shared element tree with a single root.
#[derive(Clone)]
pub struct Document {
    tree: ShareLock<Tree>,
    root: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        let root = tree.insert(Element::new("body"));
        Self {
            tree: Arc::new(RwLock::new(tree)),
            root,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create a detached element.
    pub fn create(
        &self,
        element: Element,
    ) -> ElementId {
        self.tree.write().unwrap_or_else(PoisonError::into_inner).insert(element)
    }

    /// Create `element` as the last child of `parent`.
    pub fn create_in(
        &self,
        parent: ElementId,
        element: Element,
    ) -> Result<ElementId> {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.require(parent)?;
        let id = tree.insert(element);
        tree.attach(parent, id, false)?;
        Ok(id)
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(
        &self,
        parent: ElementId,
        child: ElementId,
    ) -> Result<()> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner).attach(parent, child, false)
    }

    /// Move `child` to the front of `parent`'s children.
    pub fn prepend(
        &self,
        parent: ElementId,
        child: ElementId,
    ) -> Result<()> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner).attach(parent, child, true)
    }

    /// Remove `id` together with its subtree.
    pub fn remove(
        &self,
        id: ElementId,
    ) -> Result<()> {
        if id == self.root {
            return Err(PipeflowError::Dom("the root element cannot be removed".to_string()));
        }
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.require(id)?;
        for element in tree.descendants(id) {
            tree.graph.remove_node(element.index);
        }
        Ok(())
    }

    pub fn contains(
        &self,
        id: ElementId,
    ) -> bool {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).slot(id).is_some()
    }

    /// Whether `id` exists and hangs below the root.
    pub fn is_attached(
        &self,
        id: ElementId,
    ) -> bool {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        let mut current = Some(id);
        while let Some(el) = current {
            if el == self.root {
                return true;
            }
            current = tree.parent(el);
        }
        false
    }

    pub fn get(
        &self,
        id: ElementId,
    ) -> Option<Element> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).slot(id).map(|slot| slot.element.clone())
    }

    pub fn update<R>(
        &self,
        id: ElementId,
        f: impl FnOnce(&mut Element) -> R,
    ) -> Result<R> {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        match tree.slot_mut(id) {
            Some(slot) => Ok(f(&mut slot.element)),
            None => Err(PipeflowError::Dom(format!("element {:?} does not exist", id))),
        }
    }

    pub fn set_style(
        &self,
        id: ElementId,
        key: &str,
        value: &str,
    ) -> Result<()> {
        self.update(id, |el| {
            el.style.insert(key.to_string(), value.to_string());
        })
    }

    pub fn add_class(
        &self,
        id: ElementId,
        class: &str,
    ) -> Result<()> {
        self.update(id, |el| el.add_class(class))
    }

    pub fn parent(
        &self,
        id: ElementId,
    ) -> Option<ElementId> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).parent(id)
    }

    pub fn children(
        &self,
        id: ElementId,
    ) -> Vec<ElementId> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).children(id)
    }

    /// Elements below `scope` (excluded) matching `pred`, in document order.
    pub fn find(
        &self,
        scope: ElementId,
        pred: impl Fn(&Element) -> bool,
    ) -> Vec<ElementId> {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|id| tree.slot(*id).is_some_and(|slot| pred(&slot.element)))
            .collect()
    }

    pub fn find_by_class(
        &self,
        scope: ElementId,
        class: &str,
    ) -> Vec<ElementId> {
        self.find(scope, |el| el.has_class(class))
    }

    /// Attached element carrying the `id` attribute `dom_id`.
    pub fn find_by_id(
        &self,
        dom_id: &str,
    ) -> Option<ElementId> {
        self.find(self.root, |el| el.id() == Some(dom_id)).into_iter().next()
    }

    /// HTML-like serialisation of `id` and its subtree.
    pub fn render(
        &self,
        id: ElementId,
    ) -> String {
        let mut out = String::new();
        self.tree.read().unwrap_or_else(PoisonError::into_inner).render_into(id, &mut out);
        out
    }

    /// Number of live elements, root included.
    pub fn len(&self) -> usize {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}
