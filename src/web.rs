//! Browser host and wasm entry points.
//!
//! [`DomHost`] maps [`NodeId`]s onto live DOM nodes. The exported functions
//! render a serialized sentence document into a container element and diff
//! later documents against what is already there.

use std::cell::RefCell;
use std::collections::HashMap;

use js_sys::{Object, Reflect};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event as DomEvent, HtmlElement, HtmlInputElement, KeyboardEvent, Node};

use crate::arg::{Event, Scalar};
use crate::host::{HostTree, Listener, ListenerId, NodeId};
use crate::reconcile::{Reconciler, Rendered};
use crate::registry::Registry;
use crate::sentence::Sentence;
use crate::serialize::SentenceDoc;

struct BoundListener {
    node: u64,
    closure: Closure<dyn FnMut(DomEvent)>,
}

pub struct DomHost {
    document: Document,
    nodes: HashMap<u64, Node>,
    children: HashMap<u64, Vec<u64>>,
    listeners: HashMap<u64, BoundListener>,
    next_node: u64,
    next_listener: u64,
}

impl DomHost {
    /// Host rooted at `container`, which becomes `NodeId(0)`.
    pub fn new(container: Element) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container is not attached to a document"))?;
        let mut nodes = HashMap::new();
        nodes.insert(0, container.into());
        Ok(DomHost {
            document,
            nodes,
            children: HashMap::new(),
            listeners: HashMap::new(),
            next_node: 1,
            next_listener: 0,
        })
    }

    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id.raw())
    }

    fn adopt(&mut self, node: Node) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        self.nodes.insert(id, node);
        NodeId::new(id)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.children.entry(parent.raw()).or_default().push(child.raw());
    }

    /// Forget a detached node, its subtree and its listeners.
    fn release(&mut self, id: u64) {
        self.nodes.remove(&id);
        self.listeners.retain(|_, bound| bound.node != id);
        for child in self.children.remove(&id).unwrap_or_default() {
            self.release(child);
        }
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(|node| node.dyn_ref::<Element>())
    }

    fn html_element(&self, id: NodeId) -> Option<&HtmlElement> {
        self.node(id).and_then(|node| node.dyn_ref::<HtmlElement>())
    }
}

fn report<T>(operation: &str, result: Result<T, JsValue>) {
    if let Err(error) = result {
        warn!(operation, error = ?error, "DOM operation failed");
    }
}

fn to_scalar(value: &JsValue) -> Scalar {
    if let Some(flag) = value.as_bool() {
        Scalar::Bool(flag)
    } else if let Some(number) = value.as_f64() {
        Scalar::Number(number)
    } else if let Some(text) = value.as_string() {
        Scalar::Str(text)
    } else {
        Scalar::Null
    }
}

fn to_js(value: &Scalar) -> JsValue {
    match value {
        Scalar::Null => JsValue::NULL,
        Scalar::Bool(flag) => JsValue::from_bool(*flag),
        Scalar::Number(number) => JsValue::from_f64(*number),
        Scalar::Str(text) => JsValue::from_str(text),
    }
}

fn host_event(event: &DomEvent) -> Event {
    let mut out = Event::new(event.type_());
    if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
        out.key_code = Some(keyboard.key_code());
    }
    if let Some(target) = event.target() {
        if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
            out.value = Some(input.value());
            out.checked = Some(input.checked());
        }
        if let Some(node) = target.dyn_ref::<Node>() {
            out.text = node.text_content();
        }
    }
    out
}

impl HostTree for DomHost {
    fn create_element(&mut self, tag: &str) -> NodeId {
        let node: Node = match self.document.create_element(tag) {
            Ok(element) => element.into(),
            Err(error) => {
                warn!(tag, error = ?error, "invalid tag name, using a comment");
                self.document.create_comment(tag).into()
            }
        };
        self.adopt(node)
    }

    fn create_text(&mut self, value: &str) -> NodeId {
        let node = self.document.create_text_node(value);
        self.adopt(node.into())
    }

    fn create_marker(&mut self, label: &str) -> NodeId {
        let node = self.document.create_comment(label);
        self.adopt(node.into())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let (Some(parent_node), Some(child_node)) = (self.node(parent), self.node(child)) {
            report("appendChild", parent_node.append_child(child_node));
        }
        self.link(parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: NodeId) {
        if let (Some(parent_node), Some(inserted)) = (self.node(parent), self.node(node)) {
            report("insertBefore", parent_node.insert_before(inserted, self.node(reference)));
        }
        self.link(parent, node);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if let (Some(parent_node), Some(child_node)) = (self.node(parent), self.node(child)) {
            report("removeChild", parent_node.remove_child(child_node));
        }
        if let Some(siblings) = self.children.get_mut(&parent.raw()) {
            siblings.retain(|id| *id != child.raw());
        }
        self.release(child.raw());
    }

    fn child_nodes(&self, parent: NodeId) -> Vec<NodeId> {
        self.children.get(&parent.raw()).map(|ids| ids.iter().copied().map(NodeId::new).collect()).unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, value: &str) {
        if let Some(text) = self.node(node) {
            text.set_text_content(Some(value));
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element(node) {
            report("setAttribute", element.set_attribute(name, value));
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element(node) {
            report("removeAttribute", element.remove_attribute(name));
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            report("classList.add", element.class_list().add_1(class));
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            report("classList.remove", element.class_list().remove_1(class));
        }
    }

    fn toggle_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            report("classList.toggle", element.class_list().toggle(class));
        }
    }

    fn property(&self, node: NodeId, name: &str) -> Option<Scalar> {
        let target = self.node(node)?;
        Reflect::get(target.as_ref(), &JsValue::from_str(name)).ok().map(|value| to_scalar(&value))
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: &Scalar) {
        if let Some(target) = self.node(node) {
            report("setProperty", Reflect::set(target.as_ref(), &JsValue::from_str(name), &to_js(value)));
        }
    }

    fn remove_property(&mut self, node: NodeId, name: &str) {
        if let Some(target) = self.node(node) {
            report("deleteProperty", Reflect::delete_property(target.unchecked_ref::<Object>(), &JsValue::from_str(name)));
        }
    }

    fn set_dataset_entry(&mut self, node: NodeId, key: &str, value: &str) {
        if let Some(element) = self.element(node) {
            report("dataset", element.set_attribute(&format!("data-{}", key), value));
        }
    }

    fn remove_dataset_entry(&mut self, node: NodeId, key: &str) {
        if let Some(element) = self.element(node) {
            report("dataset", element.remove_attribute(&format!("data-{}", key)));
        }
    }

    fn set_style_entry(&mut self, node: NodeId, key: &str, value: &str) {
        if let Some(element) = self.html_element(node) {
            report("style.setProperty", element.style().set_property(key, value));
        }
    }

    fn remove_style_entry(&mut self, node: NodeId, key: &str) {
        if let Some(element) = self.html_element(node) {
            report("style.removeProperty", element.style().remove_property(key));
        }
    }

    fn add_event_listener(&mut self, node: NodeId, event: &str, listener: Listener) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        let closure = Closure::wrap(Box::new(move |event: DomEvent| listener(&host_event(&event))) as Box<dyn FnMut(DomEvent)>);
        if let Some(target) = self.node(node) {
            report(
                "addEventListener",
                target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()),
            );
        }
        self.listeners.insert(id, BoundListener { node: node.raw(), closure });
        ListenerId::new(id)
    }

    fn remove_event_listener(&mut self, node: NodeId, event: &str, listener: ListenerId) {
        let Some(bound) = self.listeners.remove(&listener.raw()) else {
            return;
        };
        if let Some(target) = self.node(node) {
            report(
                "removeEventListener",
                target.remove_event_listener_with_callback(event, bound.closure.as_ref().unchecked_ref()),
            );
        }
    }

    fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(element) = self.element(node) {
            element.set_id(id);
        }
    }

    fn clear_id(&mut self, node: NodeId) {
        self.remove_attribute(node, "id");
    }

    fn insert_raw_markup(&mut self, parent: NodeId, markup: &str, anchor: Option<NodeId>) -> Vec<NodeId> {
        let holder = match self.document.create_element("div") {
            Ok(holder) => holder,
            Err(error) => {
                warn!(error = ?error, "could not parse raw markup");
                return Vec::new();
            }
        };
        holder.set_inner_html(markup);
        let mut inserted = Vec::new();
        while let Some(child) = holder.first_child() {
            if let Some(parent_node) = self.node(parent) {
                let reference = anchor.and_then(|anchor| self.node(anchor));
                report("insertBefore", parent_node.insert_before(&child, reference));
            } else {
                report("removeChild", holder.remove_child(&child));
            }
            let id = self.adopt(child);
            self.link(parent, id);
            inserted.push(id);
        }
        inserted
    }
}

struct Mount {
    host: DomHost,
    engine: Reconciler,
    registry: Registry,
    rendered: Option<Rendered>,
}

thread_local! {
    static MOUNTS: RefCell<HashMap<String, Mount>> = RefCell::new(HashMap::new());
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn new_mount(container_id: &str) -> Result<Mount, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id `{}`", container_id)))?;
    let lexicon = crate::html::lexicon();
    let mut registry = Registry::new();
    registry.register(&lexicon);
    Ok(Mount { host: DomHost::new(container)?, engine: Reconciler::new().target(&lexicon), registry, rendered: None })
}

/// Render a sentence document into the element with id `container_id`. Later
/// calls for the same container diff against the previous document.
#[wasm_bindgen]
pub fn render_document(container_id: &str, document: JsValue) -> Result<(), JsValue> {
    let doc: SentenceDoc = serde_wasm_bindgen::from_value(document).map_err(js_error)?;
    MOUNTS.with(|mounts| {
        let mut mounts = mounts.borrow_mut();
        if !mounts.contains_key(container_id) {
            mounts.insert(container_id.to_string(), new_mount(container_id)?);
        }
        let Some(mount) = mounts.get_mut(container_id) else {
            return Ok(());
        };
        let sentence = Sentence::from_doc(&doc, &mount.registry).map_err(js_error)?;
        let root = mount.host.root();
        let previous = mount.rendered.take();
        let rendered = mount.engine.output(&mut mount.host, root, sentence, previous).map_err(js_error)?;
        mount.rendered = Some(rendered);
        Ok(())
    })
}

/// Remove whatever was rendered into `container_id`.
#[wasm_bindgen]
pub fn unmount_document(container_id: &str) {
    let mount = MOUNTS.with(|mounts| mounts.borrow_mut().remove(container_id));
    if let Some(Mount { mut host, engine, rendered: Some(rendered), .. }) = mount {
        let root = host.root();
        engine.remove(&mut host, root, rendered);
    }
}

// Initialize the web module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error reporting
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
