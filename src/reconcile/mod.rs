//! # Reconciliation Engine
//!
//! Projects FirstLevel sentences onto a [`HostTree`] and keeps the tree in sync
//! across passes with minimal mutation.
//!
//! ## Passes
//!
//! - **render**: mount every lexem of a sentence
//! - **diff**: patch the host by comparing a new sentence with the retained
//!   [`Rendered`] result of the previous one, position by position
//! - **remove**: run teardown hooks innermost first, then detach
//!
//! Lexems whose namespace is not a target are skipped. Names with a terminal
//! strategy (`tag`, `attr`, `if`, ...) are handled directly unless the
//! lexem's own lexicon redefines them; every other name is a compound, developed one level through the lexicon's second level and
//! reconciled recursively. On diff a compound whose arguments are all the same
//! references as last time keeps its previous development untouched.
//!
//! ## Example
//!
//! ```rust
//! use lexidom::{args, html, HtmlWords, MemoryHost, Reconciler};
//!
//! let lexicon = html::lexicon();
//! let engine = Reconciler::new().target(&lexicon);
//! let mut host = MemoryHost::new();
//! let root = host.root();
//!
//! let h = lexicon.first_level();
//! let rendered = engine.render(&mut host, root, h.div(args![h.id("x")])).unwrap();
//! assert_eq!(host.to_html(root), r#"<div id="x"></div>"#);
//! engine.remove(&mut host, root, rendered);
//! assert_eq!(host.to_html(root), "");
//! ```

mod diff;
mod remove;
mod render;
mod state;

use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::component::LifecycleError;
use crate::config::EngineConfig;
use crate::host::{place, HostTree, NodeId};
use crate::lexem::Lexem;
use crate::lexicon::{Lexicon, LexiconError, WordKind};
use crate::pragmatics::ScopeError;
use crate::registry::Registry;
use crate::sentence::Sentence;

pub(crate) use state::Cursor;
use state::Instruction;
pub use state::Rendered;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Vocabulary(#[from] LexiconError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("Sentences are not congruent at lexem {index}: expected {expected}, found {found}")]
    Incongruent { index: usize, expected: String, found: String },

    #[error("Sentence length changed from {expected} to {found} lexems")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Listener for `{event}` is not a function")]
    NotAListener { event: String },

    #[error("Argument {index} of `{word}` must be {expected}, found {found}")]
    InvalidArgument { word: String, index: usize, expected: &'static str, found: &'static str },
}

#[derive(Clone)]
struct Inner {
    targets: Registry,
    config: EngineConfig,
}

/// The engine. Cheap to clone; mounted components keep a clone to re-render
/// themselves.
#[derive(Clone)]
pub struct Reconciler {
    inner: Rc<Inner>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Reconciler { inner: Rc::new(Inner { targets: Registry::new(), config }) }
    }

    /// Interpret `lexicon` and every lexicon it inherits from.
    pub fn add_lexicon(&mut self, lexicon: &Rc<Lexicon>) -> &mut Self {
        Rc::make_mut(&mut self.inner).targets.register_with_ancestors(lexicon);
        self
    }

    pub fn target(mut self, lexicon: &Rc<Lexicon>) -> Self {
        self.add_lexicon(lexicon);
        self
    }

    pub fn targets(&self) -> &Registry {
        &self.inner.targets
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn is_target(&self, namespace: &str) -> bool {
        self.inner.targets.contains(namespace)
    }

    /// Render when there is no previous result, diff otherwise.
    pub fn output(
        &self,
        host: &mut dyn HostTree,
        parent: NodeId,
        sentence: Sentence,
        previous: Option<Rendered>,
    ) -> Result<Rendered, ReconcileError> {
        debug!(lexems = sentence.len(), diff = previous.is_some(), "output pass");
        match previous {
            Some(previous) => self.diff(host, parent, sentence, previous),
            None => self.render(host, parent, sentence),
        }
    }

    pub fn render(&self, host: &mut dyn HostTree, parent: NodeId, sentence: Sentence) -> Result<Rendered, ReconcileError> {
        self.render_sentence(host, Cursor::root(parent), Rc::new(sentence))
    }

    pub fn diff(
        &self,
        host: &mut dyn HostTree,
        parent: NodeId,
        sentence: Sentence,
        previous: Rendered,
    ) -> Result<Rendered, ReconcileError> {
        self.diff_sentence(host, Cursor::root(parent), Rc::new(sentence), previous)
    }

    /// Tear down everything `rendered` put into `parent`.
    pub fn remove(&self, host: &mut dyn HostTree, parent: NodeId, rendered: Rendered) {
        self.teardown(host, parent, rendered);
    }

    /// Terminal strategy for `lexem`. A name its own lexicon defines as a
    /// compound is developed even when it shadows a terminal word.
    fn instruction(&self, lexem: &Lexem) -> Option<Instruction> {
        let kind = self.inner.targets.get(lexem.namespace()).ok().and_then(|lexicon| lexicon.kind_of(lexem.name()));
        match kind {
            Some(WordKind::Compound) => None,
            _ => Instruction::from_name(lexem.name()),
        }
    }

    /// One-step development of a compound lexem through its namespace's lexicon.
    fn develop(&self, lexem: &Lexem) -> Result<Sentence, ReconcileError> {
        let lexicon = self.inner.targets.get(lexem.namespace())?;
        Ok(lexicon.second_level().develop(lexem)?)
    }

    /// Create a witness marker at the cursor.
    pub(crate) fn witness(&self, host: &mut dyn HostTree, at: Cursor<'_>, label: &str) -> NodeId {
        let label = if self.inner.config.label_markers { label } else { "" };
        let marker = host.create_marker(label);
        place(host, at.parent, marker, at.anchor);
        marker
    }
}
