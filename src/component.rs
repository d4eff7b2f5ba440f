//! # Components
//!
//! A component is a stateful object mounted by the `component(factory, props)`
//! instruction. It owns the sentence it last rendered and a witness marker
//! closing its output in the host tree.
//!
//! ## Lifecycle
//!
//! - **mount**: `will_mount`, `render`, render into the host, witness, `did_mount`
//! - **update**: `render` again and diff against the retained result
//! - **unmount**: nested components are collected innermost first, each gets
//!   `will_unmount`, the subtree is detached, then each gets `did_unmount`
//!
//! The component type at a given position may not change between renders.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::arg::Arg;
use crate::host::{HostTree, NodeId};
use crate::pragmatics::ScopeError;
use crate::reconcile::{Cursor, ReconcileError, Reconciler, Rendered};
use crate::sentence::Sentence;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("Component type changed from {previous} to {next} while rerendering")]
    ComponentTypeChanged { previous: String, next: String },

    #[error("Component {0} is not mounted")]
    NotMounted(String),
}

pub trait Component {
    /// Produce the component's FirstLevel sentence from its current state.
    fn render(&self) -> Sentence;

    fn will_mount(&mut self) {}

    fn did_mount(&mut self) {}

    /// Called during a parent diff when the props argument changed identity.
    fn set_props(&mut self, _props: &Arg) {}

    fn will_unmount(&mut self) {}

    fn did_unmount(&mut self) {}
}

/// Creates component instances. Factories are identified by the component type
/// they produce.
#[derive(Clone)]
pub struct ComponentFactory {
    name: &'static str,
    type_id: TypeId,
    create: Rc<dyn Fn(&Arg) -> Box<dyn Component>>,
}

impl ComponentFactory {
    pub fn new<C: Component + 'static>(create: impl Fn(&Arg) -> C + 'static) -> Self {
        ComponentFactory {
            name: std::any::type_name::<C>(),
            type_id: TypeId::of::<C>(),
            create: Rc::new(move |props| Box::new(create(props))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn same(&self, other: &ComponentFactory) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentFactory").field(&self.name).finish()
    }
}

struct Instance {
    factory: ComponentFactory,
    component: Box<dyn Component>,
    engine: Reconciler,
    parent: NodeId,
    witness: Option<NodeId>,
    developed: Option<Rendered>,
    refs: HashMap<String, NodeId>,
}

/// Shared handle to a mounted component instance.
#[derive(Clone)]
pub struct ComponentHandle(Rc<RefCell<Instance>>);

impl ComponentHandle {
    pub(crate) fn mount(
        engine: &Reconciler,
        host: &mut dyn HostTree,
        parent: NodeId,
        anchor: Option<NodeId>,
        factory: ComponentFactory,
        props: &Arg,
    ) -> Result<Self, ReconcileError> {
        debug!(component = factory.name(), "mounting component");
        let component = (factory.create)(props);
        let handle = ComponentHandle(Rc::new(RefCell::new(Instance {
            factory,
            component,
            engine: engine.clone(),
            parent,
            witness: None,
            developed: None,
            refs: HashMap::new(),
        })));

        handle.0.borrow_mut().component.will_mount();
        let sentence = handle.0.borrow().component.render();
        let at = Cursor { parent, anchor, component: Some(&handle) };
        let developed = engine.render_sentence(host, at, Rc::new(sentence))?;
        let witness = engine.witness(host, at, "component");
        {
            let mut instance = handle.0.borrow_mut();
            instance.developed = Some(developed);
            instance.witness = Some(witness);
        }
        handle.0.borrow_mut().component.did_mount();
        Ok(handle)
    }

    pub fn name(&self) -> &'static str {
        self.0.borrow().factory.name()
    }

    pub fn factory(&self) -> ComponentFactory {
        self.0.borrow().factory.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.0.borrow().developed.is_some()
    }

    pub fn witness(&self) -> Option<NodeId> {
        self.0.borrow().witness
    }

    /// Node recorded by a `ref(name)` instruction in the component's output.
    pub fn node_ref(&self, name: &str) -> Result<NodeId, ScopeError> {
        self.0
            .borrow()
            .refs
            .get(name)
            .copied()
            .ok_or_else(|| ScopeError::Undeclared(name.to_string()))
    }

    pub(crate) fn set_ref(&self, name: &str, node: NodeId) {
        self.0.borrow_mut().refs.insert(name.to_string(), node);
    }

    /// Re-render from the component's own state and patch the host tree.
    pub fn update(&self, host: &mut dyn HostTree) -> Result<(), ReconcileError> {
        let (engine, parent, witness) = {
            let instance = self.0.borrow();
            (instance.engine.clone(), instance.parent, instance.witness)
        };
        let taken = self.0.borrow_mut().developed.take();
        let previous = taken.ok_or_else(|| LifecycleError::NotMounted(self.name().to_string()))?;
        let sentence = self.0.borrow().component.render();
        let at = Cursor { parent, anchor: witness, component: Some(self) };
        let next = engine.diff_sentence(host, at, Rc::new(sentence), previous)?;
        self.0.borrow_mut().developed = Some(next);
        Ok(())
    }

    pub(crate) fn receive_props(&self, host: &mut dyn HostTree, props: &Arg) -> Result<(), ReconcileError> {
        self.0.borrow_mut().component.set_props(props);
        self.update(host)
    }

    /// Collect nested components depth first, then this one.
    pub(crate) fn seek(&self, host: &mut dyn HostTree, found: &mut Vec<ComponentHandle>) {
        {
            let instance = self.0.borrow();
            if let Some(developed) = &instance.developed {
                instance.engine.seek(host, developed, found);
            }
        }
        found.push(self.clone());
    }

    pub(crate) fn will_unmount(&self) {
        debug!(component = self.name(), "unmounting component");
        self.0.borrow_mut().component.will_unmount();
    }

    pub(crate) fn did_unmount(&self) {
        let mut instance = self.0.borrow_mut();
        instance.component.did_unmount();
        instance.developed = None;
        instance.refs.clear();
    }

    /// Detach the component's nodes and witness from the host.
    pub(crate) fn detach(&self, host: &mut dyn HostTree) {
        let instance = self.0.borrow();
        if let Some(developed) = &instance.developed {
            instance.engine.detach(host, instance.parent, developed);
        }
        if let Some(witness) = instance.witness {
            host.remove_child(instance.parent, witness);
        }
    }

    pub(crate) fn top_nodes(&self) -> Vec<NodeId> {
        let instance = self.0.borrow();
        let mut nodes = instance.developed.as_ref().map(Rendered::nodes).unwrap_or_default();
        nodes.extend(instance.witness);
        nodes
    }

    /// Components mounted directly by this one's current output.
    pub fn children(&self) -> Vec<ComponentHandle> {
        self.0.borrow().developed.as_ref().map(Rendered::components).unwrap_or_default()
    }

    pub fn same_instance(&self, other: &ComponentHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.name())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
