//! # Update Loop
//!
//! Application state lives in a [`Store`] as immutable snapshots. Every
//! change schedules a frame on a [`FrameScheduler`], and an [`App`] renders the
//! latest scheduled snapshot when the host asks for a frame. Several changes
//! between two frames cost a single pass.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::host::{HostTree, NodeId};
use crate::reconcile::{ReconcileError, Reconciler, Rendered};
use crate::sentence::Sentence;

type ChangeListener<T> = Rc<dyn Fn(&Rc<T>)>;

/// Holds the current snapshot and notifies listeners when it is replaced.
pub struct Store<T> {
    state: RefCell<Rc<T>>,
    listeners: RefCell<Vec<ChangeListener<T>>>,
}

impl<T: 'static> Store<T> {
    pub fn new(initial: T) -> Rc<Self> {
        Rc::new(Store { state: RefCell::new(Rc::new(initial)), listeners: RefCell::new(Vec::new()) })
    }

    pub fn snapshot(&self) -> Rc<T> {
        Rc::clone(&self.state.borrow())
    }

    /// Replace the snapshot with `f(current)` and notify listeners.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = Rc::new(f(&self.snapshot()));
        *self.state.borrow_mut() = next;
        self.emit();
    }

    /// Notify listeners with the current snapshot.
    pub fn emit(&self) {
        let snapshot = self.snapshot();
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn on_change(&self, listener: impl Fn(&Rc<T>) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }
}

/// At most one pending snapshot. A newer one replaces it.
pub struct FrameScheduler<S> {
    pending: RefCell<Option<S>>,
    superseded: Cell<usize>,
}

impl<S> Default for FrameScheduler<S> {
    fn default() -> Self {
        FrameScheduler { pending: RefCell::new(None), superseded: Cell::new(0) }
    }
}

impl<S> FrameScheduler<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `snapshot` for the next frame. Returns the snapshot it replaced.
    pub fn schedule(&self, snapshot: S) -> Option<S> {
        let previous = self.pending.borrow_mut().replace(snapshot);
        if previous.is_some() {
            self.superseded.set(self.superseded.get() + 1);
        }
        previous
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn take(&self) -> Option<S> {
        self.pending.borrow_mut().take()
    }

    /// Snapshots dropped because a newer one arrived before their frame.
    pub fn superseded(&self) -> usize {
        self.superseded.get()
    }
}

type View<S> = Box<dyn Fn(&S) -> Sentence>;

/// Root driver: a view function rendered into one host node.
pub struct App<S> {
    engine: Reconciler,
    root: NodeId,
    view: View<S>,
    frames: Rc<FrameScheduler<S>>,
    rendered: Option<Rendered>,
    /// Root children that were there before the first frame.
    foreign: Vec<NodeId>,
}

impl<S: 'static> App<S> {
    pub fn new(engine: Reconciler, root: NodeId, view: impl Fn(&S) -> Sentence + 'static) -> Self {
        App {
            engine,
            root,
            view: Box::new(view),
            frames: Rc::new(FrameScheduler::new()),
            rendered: None,
            foreign: Vec::new(),
        }
    }

    pub fn scheduler(&self) -> Rc<FrameScheduler<S>> {
        Rc::clone(&self.frames)
    }

    pub fn schedule(&self, snapshot: S) {
        self.frames.schedule(snapshot);
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frames.is_pending()
    }

    /// Render the latest scheduled snapshot. Returns `false` when nothing was
    /// scheduled.
    ///
    /// A failed pass removes whatever the app had mounted under its root, so
    /// the next frame starts from a fresh render.
    pub fn frame(&mut self, host: &mut dyn HostTree) -> Result<bool, ReconcileError> {
        let Some(snapshot) = self.frames.take() else {
            return Ok(false);
        };
        debug!(superseded = self.frames.superseded(), "rendering frame");
        let sentence = (self.view)(&snapshot);
        let previous = self.rendered.take();
        if previous.is_none() {
            self.foreign = host.child_nodes(self.root);
        }
        match self.engine.output(host, self.root, sentence, previous) {
            Ok(rendered) => {
                self.rendered = Some(rendered);
                Ok(true)
            }
            Err(error) => {
                warn!(%error, "frame failed, clearing root");
                for child in host.child_nodes(self.root) {
                    if !self.foreign.contains(&child) {
                        host.remove_child(self.root, child);
                    }
                }
                Err(error)
            }
        }
    }

    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    pub fn unmount(&mut self, host: &mut dyn HostTree) {
        self.frames.take();
        if let Some(rendered) = self.rendered.take() {
            self.engine.remove(host, self.root, rendered);
        }
    }
}

impl<T: 'static> App<Rc<T>> {
    /// Schedule a frame for every change of `store`, and one for its current
    /// snapshot.
    pub fn follow(&self, store: &Store<T>) {
        let frames = self.scheduler();
        store.on_change(move |snapshot| {
            frames.schedule(Rc::clone(snapshot));
        });
        self.schedule(store.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_notifies_with_fresh_snapshot() {
        let store = Store::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.on_change(move |value| sink.borrow_mut().push(**value));

        let before = store.snapshot();
        store.update(|value| value + 1);
        store.update(|value| value * 10);
        assert_eq!(*before, 1);
        assert_eq!(*store.snapshot(), 20);
        assert_eq!(*seen.borrow(), vec![2, 20]);
    }

    #[test]
    fn test_scheduler_keeps_latest() {
        let frames = FrameScheduler::new();
        assert_eq!(frames.schedule("a"), None);
        assert_eq!(frames.schedule("b"), Some("a"));
        assert!(frames.is_pending());
        assert_eq!(frames.take(), Some("b"));
        assert_eq!(frames.take(), None);
        assert_eq!(frames.superseded(), 1);
    }
}
