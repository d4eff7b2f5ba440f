pub mod arg;
pub mod lexem;
pub mod sentence;
pub mod lexicon;
pub mod initializer;
pub mod registry;
pub mod pragmatics;
pub mod host;
pub mod memory;
pub mod config;
pub mod component;
pub mod reconcile;
pub mod html;
pub mod schedule;
pub mod serialize;
pub mod debug_visualizer;
pub mod test_framework;
pub mod web;

#[cfg(test)]
mod property_tests;

pub use arg::{Arg, ArgList, Callback, Event, Handler, RenderFn, Scalar, Shared};
pub use component::{Component, ComponentFactory, ComponentHandle, LifecycleError};
pub use config::{ConfigError, EngineConfig};
pub use debug_visualizer::SentenceVisualizer;
pub use host::{DomHook, HostTree, Listener, ListenerId, NodeId};
pub use html::{HtmlWords, Words};
pub use initializer::Initializer;
pub use lexem::Lexem;
pub use lexicon::{Definitions, Lexicon, LexiconBuilder, LexiconError, SecondLevel, WordFn, WordKind};
pub use memory::{MemoryHost, Mutation, NodeKind};
pub use pragmatics::{Facade, FacadePragmatics, Pragmatics, PragmaticsError, Scope, ScopeError};
pub use reconcile::{ReconcileError, Reconciler, Rendered};
pub use registry::Registry;
pub use schedule::{App, FrameScheduler, Store};
pub use sentence::{Level, Sentence};
pub use serialize::{ArgDoc, LexemDoc, SentenceDoc, SerializeError};
