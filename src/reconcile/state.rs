use std::cell::RefCell;
use std::rc::Rc;

use crate::arg::{Arg, Handler};
use crate::component::ComponentHandle;
use crate::host::{ListenerId, NodeId};
use crate::sentence::Sentence;

/// Where a pass is writing: the parent node, an optional anchor to insert
/// before, and the component that owns the output.
#[derive(Clone, Copy)]
pub(crate) struct Cursor<'a> {
    pub parent: NodeId,
    pub anchor: Option<NodeId>,
    pub component: Option<&'a ComponentHandle>,
}

impl<'a> Cursor<'a> {
    pub fn root(parent: NodeId) -> Self {
        Cursor { parent, anchor: None, component: None }
    }

    pub fn inside(self, node: NodeId) -> Self {
        Cursor { parent: node, anchor: None, component: self.component }
    }

    pub fn before(self, witness: NodeId) -> Self {
        Cursor { anchor: Some(witness), ..self }
    }
}

/// Words with a terminal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Instruction {
    Tag,
    Text,
    Attr,
    Prop,
    Data,
    Class,
    Classes,
    Style,
    Id,
    On,
    If,
    Each,
    Html,
    OnDom,
    Execute,
    Ref,
    SwitchUse,
    Component,
}

impl Instruction {
    pub fn from_name(name: &str) -> Option<Self> {
        let instruction = match name {
            "tag" => Instruction::Tag,
            "text" => Instruction::Text,
            "attr" => Instruction::Attr,
            "prop" => Instruction::Prop,
            "data" => Instruction::Data,
            "class" => Instruction::Class,
            "classes" => Instruction::Classes,
            "style" => Instruction::Style,
            "id" => Instruction::Id,
            "on" => Instruction::On,
            "if" => Instruction::If,
            "each" => Instruction::Each,
            "html" => Instruction::Html,
            "onDom" => Instruction::OnDom,
            "execute" => Instruction::Execute,
            "ref" => Instruction::Ref,
            "switchUse" => Instruction::SwitchUse,
            "component" => Instruction::Component,
            _ => return None,
        };
        Some(instruction)
    }
}

/// Closure target of a bound listener. Swapped in place on diff.
pub(crate) struct Binding {
    pub handler: Handler,
    pub extra: Vec<Arg>,
}

/// What the engine remembers about one rendered lexem.
pub(crate) enum LexemState {
    /// Namespace not targeted
    Skipped,
    /// attr, prop, data, class, classes, style, id on the parent node
    Attribute,
    /// execute, ref
    Effect,
    Element { node: NodeId, children: Vec<Rendered> },
    Text { node: NodeId },
    Listener { id: ListenerId, binding: Rc<RefCell<Binding>> },
    /// if, switchUse
    Branch { witness: NodeId, developed: Option<Box<Rendered>> },
    Each { witness: NodeId, items: Vec<Rendered> },
    Raw { witness: NodeId, nodes: Vec<NodeId> },
    Hook { node: NodeId },
    Component(ComponentHandle),
    Compound(Box<Rendered>),
}

/// Retained result of a pass: the sentence plus the state of each lexem.
///
/// Keep it between passes and hand it back to the next
/// [`diff`](crate::Reconciler::diff).
pub struct Rendered {
    pub(crate) sentence: Rc<Sentence>,
    pub(crate) states: Vec<LexemState>,
}

impl Rendered {
    pub fn sentence(&self) -> &Rc<Sentence> {
        &self.sentence
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&crate::lexem::Lexem, &LexemState)> {
        self.sentence.lexems().iter().zip(self.states.iter())
    }

    /// Top-level host nodes created for this sentence, in document order.
    /// Witness markers are included.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        for state in &self.states {
            match state {
                LexemState::Element { node, .. } | LexemState::Text { node } => out.push(*node),
                LexemState::Branch { witness, developed } => {
                    if let Some(developed) = developed {
                        developed.collect_nodes(out);
                    }
                    out.push(*witness);
                }
                LexemState::Each { witness, items } => {
                    for item in items {
                        item.collect_nodes(out);
                    }
                    out.push(*witness);
                }
                LexemState::Raw { witness, nodes } => {
                    out.extend(nodes.iter().copied());
                    out.push(*witness);
                }
                LexemState::Component(handle) => {
                    out.extend(handle.top_nodes());
                }
                LexemState::Compound(developed) => developed.collect_nodes(out),
                LexemState::Skipped
                | LexemState::Attribute
                | LexemState::Effect
                | LexemState::Listener { .. }
                | LexemState::Hook { .. } => {}
            }
        }
    }

    /// Components mounted by this sentence, in document order. Components
    /// mounted inside those are not included.
    pub fn components(&self) -> Vec<ComponentHandle> {
        let mut out = Vec::new();
        self.collect_components(&mut out);
        out
    }

    fn collect_components(&self, out: &mut Vec<ComponentHandle>) {
        for state in &self.states {
            match state {
                LexemState::Component(handle) => out.push(handle.clone()),
                LexemState::Element { children, .. } => children.iter().for_each(|c| c.collect_components(out)),
                LexemState::Each { items, .. } => items.iter().for_each(|c| c.collect_components(out)),
                LexemState::Branch { developed: Some(developed), .. } | LexemState::Compound(developed) => {
                    developed.collect_components(out)
                }
                _ => {}
            }
        }
    }
}

impl std::fmt::Debug for Rendered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rendered").field("sentence", &self.sentence).finish()
    }
}
