//! # In-Memory Host
//!
//! [`MemoryHost`] is an arena-backed [`HostTree`] that records every mutation it
//! receives. Tests use the log to check that a diff touched exactly what it had
//! to, and the CLI renders sentences into it to print markup.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::arg::{format_number, Event, Scalar};
use crate::host::{HostTree, Listener, ListenerId, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Element(String),
    Text(String),
    Marker(String),
    /// Unparsed markup inserted by `html`
    Raw(String),
}

/// One primitive call received by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateElement { node: NodeId, tag: String },
    CreateText { node: NodeId, value: String },
    CreateMarker { node: NodeId, label: String },
    Append { parent: NodeId, child: NodeId },
    InsertBefore { parent: NodeId, node: NodeId, reference: NodeId },
    Remove { parent: NodeId, child: NodeId },
    SetText { node: NodeId, value: String },
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    AddClass { node: NodeId, class: String },
    RemoveClass { node: NodeId, class: String },
    ToggleClass { node: NodeId, class: String },
    SetProperty { node: NodeId, name: String, value: Scalar },
    RemoveProperty { node: NodeId, name: String },
    SetDataset { node: NodeId, key: String, value: String },
    RemoveDataset { node: NodeId, key: String },
    SetStyle { node: NodeId, key: String, value: String },
    RemoveStyle { node: NodeId, key: String },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
    SetId { node: NodeId, id: String },
    ClearId { node: NodeId },
    InsertRaw { parent: NodeId, markup: String },
}

struct MemoryNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    id: Option<String>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    properties: BTreeMap<String, Scalar>,
    dataset: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    listeners: Vec<(ListenerId, String, Listener)>,
}

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        MemoryNode {
            kind,
            parent: None,
            children: Vec::new(),
            id: None,
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            properties: BTreeMap::new(),
            dataset: BTreeMap::new(),
            style: BTreeMap::new(),
            listeners: Vec::new(),
        }
    }
}

pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
    next_listener: u64,
    log: Vec<Mutation>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        MemoryHost { nodes: vec![MemoryNode::new(NodeKind::Root)], next_listener: 0, log: Vec::new() }
    }

    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    fn node(&self, id: NodeId) -> &MemoryNode {
        &self.nodes[id.raw() as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MemoryNode {
        &mut self.nodes[id.raw() as usize]
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(MemoryNode::new(kind));
        id
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            self.node_mut(parent).children.retain(|child| *child != node);
        }
        self.node_mut(node).parent = None;
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.node(node).kind
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root() {
                return true;
            }
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node).attributes.get(name).map(String::as_str)
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.node(node).classes
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node).classes.iter().any(|c| c == class)
    }

    pub fn dataset(&self, node: NodeId, key: &str) -> Option<&str> {
        self.node(node).dataset.get(key).map(String::as_str)
    }

    pub fn style(&self, node: NodeId, key: &str) -> Option<&str> {
        self.node(node).style.get(key).map(String::as_str)
    }

    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.node(node).id.as_deref()
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.node(node).listeners.len()
    }

    /// Children of `node` ignoring markers.
    pub fn visible_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| !matches!(self.kind(*child), NodeKind::Marker(_)))
            .collect()
    }

    /// Depth-first pre-order walk of attached descendants.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.id_of(*node) == Some(id))
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|node| matches!(self.kind(*node), NodeKind::Element(t) if t == tag))
            .collect()
    }

    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for current in std::iter::once(node).chain(self.descendants(node)) {
            if let NodeKind::Text(value) = self.kind(current) {
                out.push_str(value);
            }
        }
        out
    }

    /// Fire `event` on `node`. Returns how many listeners ran.
    ///
    /// Listeners are cloned out before being called, so they may freely cause
    /// new render passes.
    pub fn dispatch(&self, node: NodeId, event: &Event) -> usize {
        let listeners: Vec<Listener> = self
            .node(node)
            .listeners
            .iter()
            .filter(|(_, name, _)| *name == event.name)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    /// Serialize the children of `node` as markup, without markers.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(&mut out, *child, false);
        }
        out
    }

    /// Like [`MemoryHost::to_html`] but markers show as `<!--label-->`.
    pub fn to_html_with_markers(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(&mut out, *child, true);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, markers: bool) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Root => {}
            NodeKind::Text(value) => out.push_str(&escape(value)),
            NodeKind::Raw(markup) => out.push_str(markup),
            NodeKind::Marker(label) => {
                if markers {
                    let _ = write!(out, "<!--{}-->", label);
                }
            }
            NodeKind::Element(tag) => {
                let _ = write!(out, "<{}", tag);
                if let Some(id) = &node.id {
                    let _ = write!(out, " id=\"{}\"", escape(id));
                }
                if !node.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", escape(&node.classes.join(" ")));
                }
                for (name, value) in &node.attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value));
                }
                for (key, value) in &node.dataset {
                    let _ = write!(out, " data-{}=\"{}\"", key, escape(value));
                }
                if !node.style.is_empty() {
                    let style: Vec<String> = node.style.iter().map(|(k, v)| format!("{}: {};", k, v)).collect();
                    let _ = write!(out, " style=\"{}\"", escape(&style.join(" ")));
                }
                out.push('>');
                for child in &node.children {
                    self.write_node(out, *child, markers);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl HostTree for MemoryHost {
    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = self.alloc(NodeKind::Element(tag.to_string()));
        self.log.push(Mutation::CreateElement { node, tag: tag.to_string() });
        node
    }

    fn create_text(&mut self, value: &str) -> NodeId {
        let node = self.alloc(NodeKind::Text(value.to_string()));
        self.log.push(Mutation::CreateText { node, value: value.to_string() });
        node
    }

    fn create_marker(&mut self, label: &str) -> NodeId {
        let node = self.alloc(NodeKind::Marker(label.to_string()));
        self.log.push(Mutation::CreateMarker { node, label: label.to_string() });
        node
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        self.log.push(Mutation::Append { parent, child });
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: NodeId) {
        self.detach(node);
        let children = &mut self.node_mut(parent).children;
        let index = children.iter().position(|child| *child == reference).unwrap_or(children.len());
        children.insert(index, node);
        self.node_mut(node).parent = Some(parent);
        self.log.push(Mutation::InsertBefore { parent, node, reference });
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != child);
        self.node_mut(child).parent = None;
        self.log.push(Mutation::Remove { parent, child });
    }

    fn child_nodes(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).to_vec()
    }

    fn set_text(&mut self, node: NodeId, value: &str) {
        self.node_mut(node).kind = NodeKind::Text(value.to_string());
        self.log.push(Mutation::SetText { node, value: value.to_string() });
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.node_mut(node).attributes.insert(name.to_string(), value.to_string());
        self.log.push(Mutation::SetAttribute { node, name: name.to_string(), value: value.to_string() });
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.node_mut(node).attributes.remove(name);
        self.log.push(Mutation::RemoveAttribute { node, name: name.to_string() });
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.node_mut(node).classes.push(class.to_string());
        }
        self.log.push(Mutation::AddClass { node, class: class.to_string() });
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        self.node_mut(node).classes.retain(|c| c != class);
        self.log.push(Mutation::RemoveClass { node, class: class.to_string() });
    }

    fn toggle_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            self.node_mut(node).classes.retain(|c| c != class);
        } else {
            self.node_mut(node).classes.push(class.to_string());
        }
        self.log.push(Mutation::ToggleClass { node, class: class.to_string() });
    }

    fn property(&self, node: NodeId, name: &str) -> Option<Scalar> {
        self.node(node).properties.get(name).cloned()
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: &Scalar) {
        self.node_mut(node).properties.insert(name.to_string(), value.clone());
        self.log.push(Mutation::SetProperty { node, name: name.to_string(), value: value.clone() });
    }

    fn remove_property(&mut self, node: NodeId, name: &str) {
        self.node_mut(node).properties.remove(name);
        self.log.push(Mutation::RemoveProperty { node, name: name.to_string() });
    }

    fn set_dataset_entry(&mut self, node: NodeId, key: &str, value: &str) {
        self.node_mut(node).dataset.insert(key.to_string(), value.to_string());
        self.log.push(Mutation::SetDataset { node, key: key.to_string(), value: value.to_string() });
    }

    fn remove_dataset_entry(&mut self, node: NodeId, key: &str) {
        self.node_mut(node).dataset.remove(key);
        self.log.push(Mutation::RemoveDataset { node, key: key.to_string() });
    }

    fn set_style_entry(&mut self, node: NodeId, key: &str, value: &str) {
        self.node_mut(node).style.insert(key.to_string(), value.to_string());
        self.log.push(Mutation::SetStyle { node, key: key.to_string(), value: value.to_string() });
    }

    fn remove_style_entry(&mut self, node: NodeId, key: &str) {
        self.node_mut(node).style.remove(key);
        self.log.push(Mutation::RemoveStyle { node, key: key.to_string() });
    }

    fn add_event_listener(&mut self, node: NodeId, event: &str, listener: Listener) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId::new(self.next_listener);
        self.node_mut(node).listeners.push((id, event.to_string(), listener));
        self.log.push(Mutation::AddListener { node, event: event.to_string() });
        id
    }

    fn remove_event_listener(&mut self, node: NodeId, event: &str, listener: ListenerId) {
        self.node_mut(node).listeners.retain(|(id, _, _)| *id != listener);
        self.log.push(Mutation::RemoveListener { node, event: event.to_string() });
    }

    fn set_id(&mut self, node: NodeId, id: &str) {
        self.node_mut(node).id = Some(id.to_string());
        self.log.push(Mutation::SetId { node, id: id.to_string() });
    }

    fn clear_id(&mut self, node: NodeId) {
        self.node_mut(node).id = None;
        self.log.push(Mutation::ClearId { node });
    }

    fn insert_raw_markup(&mut self, parent: NodeId, markup: &str, anchor: Option<NodeId>) -> Vec<NodeId> {
        let node = self.alloc(NodeKind::Raw(markup.to_string()));
        {
            let children = &mut self.node_mut(parent).children;
            let index = anchor
                .and_then(|reference| children.iter().position(|child| *child == reference))
                .unwrap_or(children.len());
            children.insert(index, node);
        }
        self.node_mut(node).parent = Some(parent);
        self.log.push(Mutation::InsertRaw { parent, markup: markup.to_string() });
        vec![node]
    }
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryHost({})", self.to_html_with_markers(self.root()))
    }
}

/// One-line description of a mutation, used by the CLI.
pub fn describe(mutation: &Mutation) -> String {
    match mutation {
        Mutation::CreateElement { node, tag } => format!("create <{}> #{}", tag, node.raw()),
        Mutation::CreateText { node, value } => format!("create text {:?} #{}", value, node.raw()),
        Mutation::CreateMarker { node, label } => format!("create marker {} #{}", label, node.raw()),
        Mutation::Append { parent, child } => format!("append #{} to #{}", child.raw(), parent.raw()),
        Mutation::InsertBefore { parent, node, reference } => {
            format!("insert #{} into #{} before #{}", node.raw(), parent.raw(), reference.raw())
        }
        Mutation::Remove { parent, child } => format!("remove #{} from #{}", child.raw(), parent.raw()),
        Mutation::SetText { node, value } => format!("text #{} = {:?}", node.raw(), value),
        Mutation::SetAttribute { node, name, value } => format!("attr #{} {}={:?}", node.raw(), name, value),
        Mutation::RemoveAttribute { node, name } => format!("attr #{} -{}", node.raw(), name),
        Mutation::AddClass { node, class } => format!("class #{} +{}", node.raw(), class),
        Mutation::RemoveClass { node, class } => format!("class #{} -{}", node.raw(), class),
        Mutation::ToggleClass { node, class } => format!("class #{} ~{}", node.raw(), class),
        Mutation::SetProperty { node, name, value } => format!("prop #{} {}={}", node.raw(), name, scalar(value)),
        Mutation::RemoveProperty { node, name } => format!("prop #{} -{}", node.raw(), name),
        Mutation::SetDataset { node, key, value } => format!("data #{} {}={:?}", node.raw(), key, value),
        Mutation::RemoveDataset { node, key } => format!("data #{} -{}", node.raw(), key),
        Mutation::SetStyle { node, key, value } => format!("style #{} {}: {}", node.raw(), key, value),
        Mutation::RemoveStyle { node, key } => format!("style #{} -{}", node.raw(), key),
        Mutation::AddListener { node, event } => format!("listen #{} {}", node.raw(), event),
        Mutation::RemoveListener { node, event } => format!("unlisten #{} {}", node.raw(), event),
        Mutation::SetId { node, id } => format!("id #{} = {:?}", node.raw(), id),
        Mutation::ClearId { node } => format!("id #{} cleared", node.raw()),
        Mutation::InsertRaw { parent, markup } => format!("raw into #{} {:?}", parent.raw(), markup),
    }
}

fn scalar(value: &Scalar) -> String {
    match value {
        Scalar::Number(n) => format_number(*n),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_insert_before_and_serialize() {
        let mut host = MemoryHost::new();
        let root = host.root();
        let div = host.create_element("div");
        host.append_child(root, div);
        let marker = host.create_marker("if");
        host.append_child(div, marker);
        let text = host.create_text("a < b");
        host.insert_before(div, text, marker);
        host.set_id(div, "x");
        host.add_class(div, "big");

        assert_eq!(host.to_html(root), "<div id=\"x\" class=\"big\">a &lt; b</div>");
        assert_eq!(host.to_html_with_markers(root), "<div id=\"x\" class=\"big\">a &lt; b<!--if--></div>");
        assert_eq!(host.find_by_id("x"), Some(div));
    }

    #[test]
    fn test_dispatch_runs_matching_listeners() {
        let mut host = MemoryHost::new();
        let button = host.create_element("button");
        host.append_child(host.root(), button);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = host.add_event_listener(button, "click", Rc::new(move |_| counter.set(counter.get() + 1)));

        assert_eq!(host.dispatch(button, &Event::new("click")), 1);
        assert_eq!(host.dispatch(button, &Event::new("keyup")), 0);
        host.remove_event_listener(button, "click", id);
        assert_eq!(host.dispatch(button, &Event::new("click")), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_removed_nodes_are_detached() {
        let mut host = MemoryHost::new();
        let root = host.root();
        let ul = host.create_element("ul");
        let li = host.create_element("li");
        host.append_child(root, ul);
        host.append_child(ul, li);
        assert!(host.is_attached(li));
        host.remove_child(root, ul);
        assert!(!host.is_attached(li));
        assert_eq!(host.to_html(root), "");
    }
}
