use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use super::render::{
    bind_args, branch_sentence, component_arg, each_sentences, hook_arg, hook_args, listener, present_class,
    run_callback, scalar_arg, split_classes, string_arg, tag_children,
};
use super::state::{Cursor, Instruction, LexemState, Rendered};
use super::{ReconcileError, Reconciler};
use crate::arg::ArgList;
use crate::component::LifecycleError;
use crate::host::{HostTree, NodeId};
use crate::lexem::Lexem;
use crate::sentence::Sentence;

fn qualified(lexem: &Lexem) -> String {
    format!("{}:{}", lexem.namespace(), lexem.name())
}

/// Change test for `(head, [rest..])` lexems whose trailing list is rebuilt by
/// the alias on every pass: the list is compared item by item.
fn packed_changed(lexem: &Lexem, old: &Lexem) -> bool {
    let (args, old_args) = (lexem.args(), old.args());
    if !args.at(0).same(&old_args.at(0)) {
        return true;
    }
    match (args.at(1).as_list(), old_args.at(1).as_list()) {
        (Some(items), Some(old_items)) => {
            items.len() != old_items.len() || items.iter().zip(old_items).any(|(a, b)| !a.same(b))
        }
        _ => lexem.args_changed(old),
    }
}

impl Reconciler {
    pub(crate) fn diff_sentence(
        &self,
        host: &mut dyn HostTree,
        at: Cursor<'_>,
        sentence: Rc<Sentence>,
        previous: Rendered,
    ) -> Result<Rendered, ReconcileError> {
        if self.config().reuse_identical && Rc::ptr_eq(&sentence, &previous.sentence) {
            return Ok(previous);
        }
        let Rendered { sentence: old_sentence, states } = previous;
        if sentence.len() != old_sentence.len() {
            return Err(ReconcileError::LengthMismatch { expected: old_sentence.len(), found: sentence.len() });
        }

        let mut next = Vec::with_capacity(states.len());
        let pairs = sentence.lexems().iter().zip(old_sentence.lexems());
        for (index, ((lexem, old), state)) in pairs.zip(states).enumerate() {
            if !lexem.is_congruent(old) {
                return Err(ReconcileError::Incongruent { index, expected: qualified(old), found: qualified(lexem) });
            }
            next.push(self.diff_lexem(host, at, index, lexem, old, state)?);
        }
        Ok(Rendered { sentence, states: next })
    }

    fn diff_lexem(
        &self,
        host: &mut dyn HostTree,
        at: Cursor<'_>,
        index: usize,
        lexem: &Lexem,
        old: &Lexem,
        state: LexemState,
    ) -> Result<LexemState, ReconcileError> {
        if !self.is_target(lexem.namespace()) || lexem.args().is_empty() {
            return Ok(state);
        }
        let Some(instruction) = self.instruction(lexem) else {
            let LexemState::Compound(previous) = state else {
                return Err(ReconcileError::Incongruent { index, expected: qualified(old), found: qualified(lexem) });
            };
            if !lexem.args_changed(old) {
                trace!(word = lexem.name(), "arguments unchanged, keeping development");
                return Ok(LexemState::Compound(previous));
            }
            trace!(word = lexem.name(), "redeveloping compound");
            let developed = self.develop(lexem)?;
            let rendered = self.diff_sentence(host, at, Rc::new(developed), *previous)?;
            return Ok(LexemState::Compound(Box::new(rendered)));
        };

        let node = at.parent;
        let (args, old_args) = (lexem.args(), old.args());
        let state = match (instruction, state) {
            (Instruction::Tag, LexemState::Element { node: element, children }) => {
                self.diff_tag(host, at, lexem, old, element, children)?
            }
            (Instruction::Text, LexemState::Text { node: text }) => {
                if !args.at(0).same(&old_args.at(0)) {
                    host.set_text(text, &args.at(0).to_text());
                }
                LexemState::Text { node: text }
            }
            (Instruction::Attr, state) => {
                let (name, old_name) = (string_arg(lexem, 0)?, string_arg(old, 0)?);
                if name != old_name {
                    host.remove_attribute(node, &old_name);
                    host.set_attribute(node, &name, &args.at(1).to_text());
                } else if !args.at(1).same(&old_args.at(1)) {
                    host.set_attribute(node, &name, &args.at(1).to_text());
                }
                state
            }
            (Instruction::Prop, state) => {
                let (name, old_name) = (string_arg(lexem, 0)?, string_arg(old, 0)?);
                let value = scalar_arg(lexem, 1)?;
                if name != old_name {
                    host.remove_property(node, &old_name);
                    host.set_property(node, &name, &value);
                } else if self.config().live_properties {
                    if host.property(node, &name).as_ref() != Some(&value) {
                        host.set_property(node, &name, &value);
                    }
                } else if !args.at(1).same(&old_args.at(1)) {
                    host.set_property(node, &name, &value);
                }
                state
            }
            (Instruction::Data, state) => {
                let (key, old_key) = (string_arg(lexem, 0)?, string_arg(old, 0)?);
                if key != old_key {
                    host.remove_dataset_entry(node, &old_key);
                    host.set_dataset_entry(node, &key, &args.at(1).to_text());
                } else if !args.at(1).same(&old_args.at(1)) {
                    host.set_dataset_entry(node, &key, &args.at(1).to_text());
                }
                state
            }
            (Instruction::Style, state) => {
                let (key, old_key) = (string_arg(lexem, 0)?, string_arg(old, 0)?);
                if key != old_key {
                    host.remove_style_entry(node, &old_key);
                    host.set_style_entry(node, &key, &args.at(1).to_text());
                } else if !args.at(1).same(&old_args.at(1)) {
                    host.set_style_entry(node, &key, &args.at(1).to_text());
                }
                state
            }
            (Instruction::Class, state) => {
                match (present_class(args), present_class(old_args)) {
                    (Some(class), Some(old_class)) if class != old_class => {
                        host.remove_class(node, &old_class);
                        host.add_class(node, &class);
                    }
                    (Some(class), None) => host.add_class(node, &class),
                    (None, Some(old_class)) => host.remove_class(node, &old_class),
                    _ => {}
                }
                state
            }
            (Instruction::Classes, state) => {
                if !args.at(0).same(&old_args.at(0)) {
                    let (classes, old_classes) = (split_classes(&args.at(0)), split_classes(&old_args.at(0)));
                    for class in old_classes.iter().filter(|c| !classes.contains(c)) {
                        host.remove_class(node, class);
                    }
                    for class in classes.iter().filter(|c| !old_classes.contains(c)) {
                        host.add_class(node, class);
                    }
                }
                state
            }
            (Instruction::Id, state) => {
                if !args.at(0).same(&old_args.at(0)) {
                    host.set_id(node, &args.at(0).to_text());
                }
                state
            }
            (Instruction::On, LexemState::Listener { id, binding }) => {
                let (event, old_event) = (string_arg(lexem, 0)?, string_arg(old, 0)?);
                let next = bind_args(lexem)?;
                if event != old_event {
                    host.remove_event_listener(node, &old_event, id);
                    let binding = Rc::new(RefCell::new(next));
                    let id = host.add_event_listener(node, &event, listener(&binding));
                    LexemState::Listener { id, binding }
                } else {
                    *binding.borrow_mut() = next;
                    LexemState::Listener { id, binding }
                }
            }
            (Instruction::If, LexemState::Branch { witness, developed }) => {
                let branch = branch_sentence(lexem)?;
                let flipped = args.at(0).is_truthy() != old_args.at(0).is_truthy();
                let developed = self.diff_branch(host, at.before(witness), branch, developed, flipped)?;
                LexemState::Branch { witness, developed }
            }
            (Instruction::SwitchUse, LexemState::Branch { witness, developed }) => {
                if !packed_changed(lexem, old) {
                    LexemState::Branch { witness, developed }
                } else {
                    let branch = self.switch_sentence(lexem)?;
                    let replaced = !args.at(0).same(&old_args.at(0));
                    let developed = self.diff_branch(host, at.before(witness), branch, developed, replaced)?;
                    LexemState::Branch { witness, developed }
                }
            }
            (Instruction::Each, LexemState::Each { witness, items }) => {
                let inside = at.before(witness);
                let mut previous = items.into_iter();
                let mut next = Vec::new();
                for sentence in each_sentences(lexem)? {
                    next.push(match previous.next() {
                        Some(item) => self.diff_sentence(host, inside, sentence, item)?,
                        None => self.render_sentence(host, inside, sentence)?,
                    });
                }
                for extra in previous {
                    self.teardown(host, at.parent, extra);
                }
                LexemState::Each { witness, items: next }
            }
            (Instruction::Html, LexemState::Raw { witness, nodes }) => {
                if args.at(0).same(&old_args.at(0)) {
                    LexemState::Raw { witness, nodes }
                } else {
                    for raw in nodes {
                        host.remove_child(at.parent, raw);
                    }
                    let nodes = host.insert_raw_markup(at.parent, &args.at(0).to_text(), Some(witness));
                    LexemState::Raw { witness, nodes }
                }
            }
            (Instruction::OnDom, LexemState::Hook { node: target }) => {
                let (hook, old_hook) = (hook_arg(lexem)?, hook_arg(old)?);
                if args.at(0).same(&old_args.at(0)) {
                    hook.diff(host, target, hook_args(lexem), hook_args(old));
                } else {
                    old_hook.remove(host, target, hook_args(old));
                    hook.render(host, target, hook_args(lexem));
                }
                LexemState::Hook { node: target }
            }
            (Instruction::Execute, state) => {
                if packed_changed(lexem, old) {
                    run_callback(lexem)?;
                }
                state
            }
            (Instruction::Ref, state) => {
                if let Some(component) = at.component {
                    component.set_ref(&string_arg(lexem, 0)?, node);
                }
                state
            }
            (Instruction::Component, LexemState::Component(handle)) => {
                let factory = component_arg(lexem)?;
                if !handle.factory().same(&factory) {
                    return Err(LifecycleError::ComponentTypeChanged {
                        previous: handle.name().to_string(),
                        next: factory.name().to_string(),
                    }
                    .into());
                }
                if !args.at(1).same(&old_args.at(1)) {
                    handle.receive_props(host, &args.at(1))?;
                }
                LexemState::Component(handle)
            }
            _ => return Err(ReconcileError::Incongruent { index, expected: qualified(old), found: qualified(lexem) }),
        };
        Ok(state)
    }

    /// Patch a tag. A changed tag name replaces the element in place.
    fn diff_tag(
        &self,
        host: &mut dyn HostTree,
        at: Cursor<'_>,
        lexem: &Lexem,
        old: &Lexem,
        element: NodeId,
        children: Vec<Rendered>,
    ) -> Result<LexemState, ReconcileError> {
        if string_arg(lexem, 0)? != string_arg(old, 0)? {
            let replacement = self.render_tag(host, at.before(element), lexem)?;
            self.teardown_state(host, at.parent, old, LexemState::Element { node: element, children });
            return Ok(replacement);
        }

        let inner = at.inside(element);
        let old_children = tag_children(old);
        let mut previous = children.into_iter();
        let mut next = Vec::new();
        for (index, child) in tag_children(lexem).iter().enumerate() {
            next.push(match previous.next() {
                Some(rendered) if old_children.get(index).map_or(false, |old| old.same(child)) => rendered,
                Some(rendered) => self.diff_sentence(host, inner, self.child_sentence(lexem, child)?, rendered)?,
                None => self.render_sentence(host, inner, self.child_sentence(lexem, child)?)?,
            });
        }
        for extra in previous {
            self.teardown(host, element, extra);
        }
        Ok(LexemState::Element { node: element, children: next })
    }

    /// Patch a conditional slot. When `replace` is set the previous branch is
    /// torn down and the new one rendered before the witness.
    fn diff_branch(
        &self,
        host: &mut dyn HostTree,
        at: Cursor<'_>,
        branch: Option<Rc<Sentence>>,
        developed: Option<Box<Rendered>>,
        replace: bool,
    ) -> Result<Option<Box<Rendered>>, ReconcileError> {
        let developed = match (branch, developed) {
            (Some(sentence), Some(previous)) if !replace => Some(self.diff_sentence(host, at, sentence, *previous)?),
            (branch, previous) => {
                if let Some(previous) = previous {
                    self.teardown(host, at.parent, *previous);
                }
                match branch {
                    Some(sentence) => Some(self.render_sentence(host, at, sentence)?),
                    None => None,
                }
            }
        };
        Ok(developed.map(Box::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::html::{self, HtmlWords};
    use crate::memory::{MemoryHost, Mutation};

    #[test]
    fn test_class_flag_flip_adds_then_removes() {
        let lexicon = html::lexicon();
        let engine = Reconciler::new().target(&lexicon);
        let mut host = MemoryHost::new();
        let root = host.root();
        let h = lexicon.first_level();

        let view = |done: bool| h.div(args![h.class_if("done", done)]);
        let rendered = engine.render(&mut host, root, view(false)).unwrap();
        host.clear_mutations();
        let rendered = engine.diff(&mut host, root, view(true), rendered).unwrap();
        assert!(matches!(host.mutations(), [Mutation::AddClass { class, .. }] if class == "done"));
        host.clear_mutations();
        engine.diff(&mut host, root, view(false), rendered).unwrap();
        assert!(matches!(host.mutations(), [Mutation::RemoveClass { class, .. }] if class == "done"));
        assert_eq!(host.to_html(root), "<div></div>");
    }

    #[test]
    fn test_tag_rename_replaces_in_place() {
        let lexicon = html::lexicon();
        let engine = Reconciler::new().target(&lexicon);
        let mut host = MemoryHost::new();
        let root = host.root();
        let h = lexicon.first_level();

        let view = |tag: &str| h.empty().p(args!["before"]).tag(tag, args!["x"]).p(args!["after"]);
        let rendered = engine.render(&mut host, root, view("span")).unwrap();
        engine.diff(&mut host, root, view("em"), rendered).unwrap();
        assert_eq!(host.to_html(root), "<p>before</p><em>x</em><p>after</p>");
    }

    #[test]
    fn test_incongruent_sentences_fail() {
        let lexicon = html::lexicon();
        let engine = Reconciler::new().target(&lexicon);
        let mut host = MemoryHost::new();
        let root = host.root();
        let h = lexicon.first_level();

        let rendered = engine.render(&mut host, root, h.div(args![])).unwrap();
        let error = engine.diff(&mut host, root, h.span(args![]), rendered).unwrap_err();
        assert!(matches!(error, ReconcileError::Incongruent { index: 0, .. }));

        let rendered = engine.render(&mut host, root, h.div(args![])).unwrap();
        let error = engine.diff(&mut host, root, h.div(args![]).div(args![]), rendered).unwrap_err();
        assert!(matches!(error, ReconcileError::LengthMismatch { expected: 1, found: 2 }));
    }
}
