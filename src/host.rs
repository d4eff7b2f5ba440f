//! # Host Tree Contract
//!
//! The reconciliation engine never touches a concrete UI toolkit. It drives an
//! implementation of [`HostTree`] through opaque [`NodeId`] handles. Two hosts
//! ship with the crate:
//!
//! - [`MemoryHost`](crate::memory::MemoryHost): an arena tree with a mutation log
//! - [`DomHost`](crate::web::DomHost): the browser DOM through `web-sys`
//!
//! Host operations are assumed to succeed. A host that cannot perform one is in
//! an unrecoverable state and may panic.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::arg::{Arg, Event, Scalar};

/// Handle to a node owned by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        NodeId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        ListenerId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Callback a host invokes when an event fires on a node.
pub type Listener = Rc<dyn Fn(&Event)>;

pub trait HostTree {
    fn create_element(&mut self, tag: &str) -> NodeId;
    fn create_text(&mut self, value: &str) -> NodeId;
    /// Zero-width node marking the end of a structural instruction's output.
    fn create_marker(&mut self, label: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId);
    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: NodeId);
    fn remove_child(&mut self, parent: NodeId, child: NodeId);
    /// Current children of `parent`. Order is not significant.
    fn child_nodes(&self, parent: NodeId) -> Vec<NodeId>;

    fn set_text(&mut self, node: NodeId, value: &str);

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    fn toggle_class(&mut self, node: NodeId, class: &str);

    /// Live value of a property. Reading is not a mutation.
    fn property(&self, node: NodeId, name: &str) -> Option<Scalar>;
    fn set_property(&mut self, node: NodeId, name: &str, value: &Scalar);
    fn remove_property(&mut self, node: NodeId, name: &str);

    fn set_dataset_entry(&mut self, node: NodeId, key: &str, value: &str);
    fn remove_dataset_entry(&mut self, node: NodeId, key: &str);

    fn set_style_entry(&mut self, node: NodeId, key: &str, value: &str);
    fn remove_style_entry(&mut self, node: NodeId, key: &str);

    fn add_event_listener(&mut self, node: NodeId, event: &str, listener: Listener) -> ListenerId;
    fn remove_event_listener(&mut self, node: NodeId, event: &str, listener: ListenerId);

    fn set_id(&mut self, node: NodeId, id: &str);
    fn clear_id(&mut self, node: NodeId);

    /// Parse `markup` and insert the resulting nodes before `anchor`, or at the
    /// end of `parent` when there is no anchor.
    fn insert_raw_markup(&mut self, parent: NodeId, markup: &str, anchor: Option<NodeId>) -> Vec<NodeId>;
}

/// Custom host hook attached with the `onDom` instruction.
///
/// `node` is the element the instruction applies to.
pub trait DomHook {
    fn render(&self, host: &mut dyn HostTree, node: NodeId, args: &[Arg]);

    fn diff(&self, _host: &mut dyn HostTree, _node: NodeId, _args: &[Arg], _previous: &[Arg]) {}

    fn remove(&self, _host: &mut dyn HostTree, _node: NodeId, _args: &[Arg]) {}
}

/// Insert `node` before `anchor`, or append it when there is none.
pub(crate) fn place(host: &mut dyn HostTree, parent: NodeId, node: NodeId, anchor: Option<NodeId>) {
    match anchor {
        Some(reference) => host.insert_before(parent, node, reference),
        None => host.append_child(parent, node),
    }
}
