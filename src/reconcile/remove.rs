use tracing::debug;

use super::render::{hook_arg, hook_args, present_class, split_classes};
use super::state::{Instruction, LexemState, Rendered};
use super::Reconciler;
use crate::arg::ArgList;
use crate::component::ComponentHandle;
use crate::host::{HostTree, NodeId};
use crate::lexem::Lexem;

impl Reconciler {
    /// Full removal of a retained result from `parent`.
    ///
    /// Components are collected innermost first. All of them get `will_unmount`
    /// before any node leaves the host and `did_unmount` after the subtree is
    /// gone.
    pub(crate) fn teardown(&self, host: &mut dyn HostTree, parent: NodeId, rendered: Rendered) {
        let mut found = Vec::new();
        self.seek(host, &rendered, &mut found);
        debug!(components = found.len(), lexems = rendered.len(), "removing sentence");
        found.iter().for_each(ComponentHandle::will_unmount);
        self.detach(host, parent, &rendered);
        found.iter().for_each(ComponentHandle::did_unmount);
    }

    /// Same as [`teardown`](Self::teardown) for a single lexem state.
    pub(super) fn teardown_state(&self, host: &mut dyn HostTree, parent: NodeId, lexem: &Lexem, state: LexemState) {
        let mut found = Vec::new();
        self.seek_state(host, lexem, &state, &mut found);
        found.iter().for_each(ComponentHandle::will_unmount);
        self.detach_state(host, parent, lexem, &state);
        found.iter().for_each(ComponentHandle::did_unmount);
    }

    /// Walk a retained result, running host hook removals and collecting
    /// mounted components depth first.
    pub(crate) fn seek(&self, host: &mut dyn HostTree, rendered: &Rendered, found: &mut Vec<ComponentHandle>) {
        for (lexem, state) in rendered.entries() {
            self.seek_state(host, lexem, state, found);
        }
    }

    fn seek_state(&self, host: &mut dyn HostTree, lexem: &Lexem, state: &LexemState, found: &mut Vec<ComponentHandle>) {
        match state {
            LexemState::Element { children, .. } => {
                for child in children {
                    self.seek(host, child, found);
                }
            }
            LexemState::Branch { developed: Some(developed), .. } | LexemState::Compound(developed) => {
                self.seek(host, developed, found);
            }
            LexemState::Each { items, .. } => {
                for item in items {
                    self.seek(host, item, found);
                }
            }
            LexemState::Hook { node } => {
                if let Ok(hook) = hook_arg(lexem) {
                    hook.remove(host, *node, hook_args(lexem));
                }
            }
            LexemState::Component(handle) => handle.seek(host, found),
            _ => {}
        }
    }

    /// Take the host nodes of a retained result out of `parent`. Elements are
    /// removed whole, so their contents are not visited.
    pub(crate) fn detach(&self, host: &mut dyn HostTree, parent: NodeId, rendered: &Rendered) {
        for (lexem, state) in rendered.entries() {
            self.detach_state(host, parent, lexem, state);
        }
    }

    fn detach_state(&self, host: &mut dyn HostTree, parent: NodeId, lexem: &Lexem, state: &LexemState) {
        match state {
            LexemState::Attribute => clear_attribute(host, parent, lexem),
            LexemState::Element { node, .. } | LexemState::Text { node } => host.remove_child(parent, *node),
            LexemState::Listener { id, .. } => {
                host.remove_event_listener(parent, &lexem.args().at(0).to_text(), *id);
            }
            LexemState::Branch { witness, developed } => {
                if let Some(developed) = developed {
                    self.detach(host, parent, developed);
                }
                host.remove_child(parent, *witness);
            }
            LexemState::Each { witness, items } => {
                for item in items {
                    self.detach(host, parent, item);
                }
                host.remove_child(parent, *witness);
            }
            LexemState::Raw { witness, nodes } => {
                for node in nodes {
                    host.remove_child(parent, *node);
                }
                host.remove_child(parent, *witness);
            }
            LexemState::Component(handle) => handle.detach(host),
            LexemState::Compound(developed) => self.detach(host, parent, developed),
            LexemState::Skipped | LexemState::Effect | LexemState::Hook { .. } => {}
        }
    }
}

/// Undo what an attribute-like lexem set on a surviving parent.
fn clear_attribute(host: &mut dyn HostTree, node: NodeId, lexem: &Lexem) {
    let args = lexem.args();
    match Instruction::from_name(lexem.name()) {
        Some(Instruction::Attr) => host.remove_attribute(node, &args.at(0).to_text()),
        Some(Instruction::Prop) => host.remove_property(node, &args.at(0).to_text()),
        Some(Instruction::Data) => host.remove_dataset_entry(node, &args.at(0).to_text()),
        Some(Instruction::Style) => host.remove_style_entry(node, &args.at(0).to_text()),
        Some(Instruction::Class) => {
            if let Some(class) = present_class(args) {
                host.remove_class(node, &class);
            }
        }
        Some(Instruction::Classes) => {
            for class in split_classes(&args.at(0)) {
                host.remove_class(node, &class);
            }
        }
        Some(Instruction::Id) => host.clear_id(node),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::html::{self, HtmlWords};
    use crate::memory::MemoryHost;

    #[test]
    fn test_branch_attributes_are_cleared_from_surviving_parent() {
        let lexicon = html::lexicon();
        let engine = Reconciler::new().target(&lexicon);
        let mut host = MemoryHost::new();
        let root = host.root();
        let h = lexicon.first_level();

        let view = |on: bool| h.div(args![h.if_(on, h.empty().class("lit").attr("title", "t"), None)]);
        let rendered = engine.render(&mut host, root, view(true)).unwrap();
        assert_eq!(host.to_html(root), r#"<div class="lit" title="t"></div>"#);
        engine.diff(&mut host, root, view(false), rendered).unwrap();
        assert_eq!(host.to_html(root), "<div></div>");
    }

    #[test]
    fn test_remove_empties_parent() {
        let lexicon = html::lexicon();
        let engine = Reconciler::new().target(&lexicon);
        let mut host = MemoryHost::new();
        let root = host.root();
        let h = lexicon.first_level();

        let item_view = h.clone();
        let sentence = h
            .empty()
            .p(args!["a"])
            .each(args![1, 2], move |item, _| item_view.span(args![item.clone()]));
        let rendered = engine.render(&mut host, root, sentence).unwrap();
        assert_eq!(host.to_html(root), "<p>a</p><span>1</span><span>2</span>");
        engine.remove(&mut host, root, rendered);
        assert!(host.children(root).is_empty());
    }
}
