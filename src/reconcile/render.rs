use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use super::state::{Binding, Cursor, Instruction, LexemState, Rendered};
use super::{ReconcileError, Reconciler};
use crate::arg::{Arg, ArgList, Callback, Event, RenderFn, Scalar};
use crate::component::{ComponentFactory, ComponentHandle};
use crate::host::{place, DomHook, HostTree, Listener};
use crate::lexem::Lexem;
use crate::sentence::{Level, Sentence};

impl Reconciler {
    pub(crate) fn render_sentence(
        &self,
        host: &mut dyn HostTree,
        at: Cursor<'_>,
        sentence: Rc<Sentence>,
    ) -> Result<Rendered, ReconcileError> {
        let mut states = Vec::with_capacity(sentence.len());
        for lexem in sentence.lexems() {
            states.push(self.render_lexem(host, at, lexem)?);
        }
        Ok(Rendered { sentence, states })
    }

    fn render_lexem(&self, host: &mut dyn HostTree, at: Cursor<'_>, lexem: &Lexem) -> Result<LexemState, ReconcileError> {
        if !self.is_target(lexem.namespace()) {
            return Ok(LexemState::Skipped);
        }
        let Some(instruction) = self.instruction(lexem) else {
            trace!(word = lexem.name(), "developing compound");
            let developed = self.develop(lexem)?;
            let rendered = self.render_sentence(host, at, Rc::new(developed))?;
            return Ok(LexemState::Compound(Box::new(rendered)));
        };

        let node = at.parent;
        let args = lexem.args();
        let state = match instruction {
            Instruction::Tag => self.render_tag(host, at, lexem)?,
            Instruction::Text => {
                let text = host.create_text(&args.at(0).to_text());
                place(host, at.parent, text, at.anchor);
                LexemState::Text { node: text }
            }
            Instruction::Attr => {
                host.set_attribute(node, &string_arg(lexem, 0)?, &args.at(1).to_text());
                LexemState::Attribute
            }
            Instruction::Prop => {
                host.set_property(node, &string_arg(lexem, 0)?, &scalar_arg(lexem, 1)?);
                LexemState::Attribute
            }
            Instruction::Data => {
                host.set_dataset_entry(node, &string_arg(lexem, 0)?, &args.at(1).to_text());
                LexemState::Attribute
            }
            Instruction::Style => {
                host.set_style_entry(node, &string_arg(lexem, 0)?, &args.at(1).to_text());
                LexemState::Attribute
            }
            Instruction::Class => {
                if let Some(class) = present_class(args) {
                    host.add_class(node, &class);
                }
                LexemState::Attribute
            }
            Instruction::Classes => {
                for class in split_classes(&args.at(0)) {
                    host.add_class(node, &class);
                }
                LexemState::Attribute
            }
            Instruction::Id => {
                host.set_id(node, &args.at(0).to_text());
                LexemState::Attribute
            }
            Instruction::On => {
                let event = string_arg(lexem, 0)?;
                let binding = Rc::new(RefCell::new(bind_args(lexem)?));
                let id = host.add_event_listener(node, &event, listener(&binding));
                LexemState::Listener { id, binding }
            }
            Instruction::If => {
                let branch = branch_sentence(lexem)?;
                self.render_branch(host, at, branch, "if")?
            }
            Instruction::SwitchUse => {
                let branch = self.switch_sentence(lexem)?;
                self.render_branch(host, at, branch, "switchUse")?
            }
            Instruction::Each => {
                let mut items = Vec::new();
                for sentence in each_sentences(lexem)? {
                    items.push(self.render_sentence(host, at, sentence)?);
                }
                let witness = self.witness(host, at, "each");
                LexemState::Each { witness, items }
            }
            Instruction::Html => {
                let nodes = host.insert_raw_markup(at.parent, &args.at(0).to_text(), at.anchor);
                let witness = self.witness(host, at, "html");
                LexemState::Raw { witness, nodes }
            }
            Instruction::OnDom => {
                hook_arg(lexem)?.render(host, node, hook_args(lexem));
                LexemState::Hook { node }
            }
            Instruction::Execute => {
                run_callback(lexem)?;
                LexemState::Effect
            }
            Instruction::Ref => {
                if let Some(component) = at.component {
                    component.set_ref(&string_arg(lexem, 0)?, node);
                }
                LexemState::Effect
            }
            Instruction::Component => {
                let factory = component_arg(lexem)?;
                let handle = ComponentHandle::mount(self, host, at.parent, at.anchor, factory, &args.at(1))?;
                LexemState::Component(handle)
            }
        };
        Ok(state)
    }

    pub(super) fn render_tag(
        &self,
        host: &mut dyn HostTree,
        at: Cursor<'_>,
        lexem: &Lexem,
    ) -> Result<LexemState, ReconcileError> {
        let node = host.create_element(&string_arg(lexem, 0)?);
        place(host, at.parent, node, at.anchor);
        let inner = at.inside(node);
        let mut children = Vec::new();
        for child in tag_children(lexem) {
            let sentence = self.child_sentence(lexem, &child)?;
            children.push(self.render_sentence(host, inner, sentence)?);
        }
        Ok(LexemState::Element { node, children })
    }

    pub(super) fn render_branch(
        &self,
        host: &mut dyn HostTree,
        at: Cursor<'_>,
        branch: Option<Rc<Sentence>>,
        label: &str,
    ) -> Result<LexemState, ReconcileError> {
        let developed = match branch {
            Some(sentence) => Some(Box::new(self.render_sentence(host, at, sentence)?)),
            None => None,
        };
        let witness = self.witness(host, at, label);
        Ok(LexemState::Branch { witness, developed })
    }

    /// A tag child as a sentence. Anything that is not a sentence becomes a
    /// text lexem, `Null` included, so the child keeps its slot.
    pub(super) fn child_sentence(&self, tag: &Lexem, child: &Arg) -> Result<Rc<Sentence>, ReconcileError> {
        if let Arg::Sentence(sentence) = child {
            return Ok(Rc::clone(sentence));
        }
        let lexicon = self.targets().get(tag.namespace())?;
        let text = Sentence::new(Rc::clone(lexicon), Level::FirstLevel).append(tag.namespace(), "text", vec![child.clone()]);
        Ok(Rc::new(text))
    }

    /// FirstLevel sentence selected by a `switchUse` lexem.
    pub(super) fn switch_sentence(&self, lexem: &Lexem) -> Result<Option<Rc<Sentence>>, ReconcileError> {
        match lexem.args().at(0) {
            Arg::Null => Ok(None),
            Arg::Sentence(sentence) => Ok(Some(sentence)),
            Arg::Str(reference) => {
                let lexicon_name = reference.split_once(':').map_or(&*reference, |(name, _)| name);
                let lexicon = self.targets().get(lexicon_name)?;
                let args = lexem.args().at(1).as_list().map(<[Arg]>::to_vec).unwrap_or_default();
                let sentence = Sentence::new(Rc::clone(lexicon), Level::FirstLevel).use_ref(self.targets(), &reference, args)?;
                Ok(Some(Rc::new(sentence)))
            }
            other => Err(invalid(lexem, 0, "a reference or a sentence", &other)),
        }
    }
}

pub(super) fn invalid(lexem: &Lexem, index: usize, expected: &'static str, found: &Arg) -> ReconcileError {
    ReconcileError::InvalidArgument { word: lexem.name().to_string(), index, expected, found: found.kind() }
}

pub(super) fn string_arg(lexem: &Lexem, index: usize) -> Result<String, ReconcileError> {
    match lexem.args().at(index) {
        Arg::Str(value) => Ok(value.to_string()),
        other => Err(invalid(lexem, index, "a string", &other)),
    }
}

pub(super) fn scalar_arg(lexem: &Lexem, index: usize) -> Result<Scalar, ReconcileError> {
    let value = lexem.args().at(index);
    value.to_scalar().ok_or_else(|| invalid(lexem, index, "a scalar", &value))
}

/// Class a `class(name, flag?)` lexem puts on its node, if any.
pub(super) fn present_class(args: &[Arg]) -> Option<String> {
    let name = args.at(0).to_text();
    let present = args.len() == 1 || args.at(1).is_truthy();
    (present && !name.is_empty()).then_some(name)
}

pub(super) fn split_classes(value: &Arg) -> Vec<String> {
    value.to_text().split_whitespace().map(str::to_string).collect()
}

pub(super) fn bind_args(lexem: &Lexem) -> Result<Binding, ReconcileError> {
    let args = lexem.args();
    match args.at(1) {
        Arg::Handler(handler) => {
            let extra = args.at(2).as_list().map(<[Arg]>::to_vec).unwrap_or_default();
            Ok(Binding { handler, extra })
        }
        _ => Err(ReconcileError::NotAListener { event: args.at(0).to_text() }),
    }
}

/// Host listener that forwards to whatever the binding holds when it fires.
pub(super) fn listener(binding: &Rc<RefCell<Binding>>) -> Listener {
    let binding = Rc::clone(binding);
    Rc::new(move |event: &Event| {
        let (handler, extra) = {
            let current = binding.borrow();
            (Rc::clone(&current.handler), current.extra.clone())
        };
        handler(event, &extra);
    })
}

pub(super) fn tag_children(lexem: &Lexem) -> Vec<Arg> {
    match lexem.args().at(1) {
        Arg::List(items) => items.to_vec(),
        Arg::Null => Vec::new(),
        single => vec![single],
    }
}

pub(super) fn branch_sentence(lexem: &Lexem) -> Result<Option<Rc<Sentence>>, ReconcileError> {
    let args = lexem.args();
    let cond = args.at(0);
    let index = if cond.is_truthy() { 1 } else { 2 };
    match args.at(index) {
        Arg::Null => Ok(None),
        Arg::Sentence(sentence) => Ok(Some(sentence)),
        Arg::Render(render) => Ok(Some(Rc::new(render(&cond, 0)))),
        other => Err(invalid(lexem, index, "a sentence or a render function", &other)),
    }
}

pub(super) fn each_sentences(lexem: &Lexem) -> Result<Vec<Rc<Sentence>>, ReconcileError> {
    let args = lexem.args();
    let items = args.at(0);
    let items: &[Arg] = match &items {
        Arg::List(items) => &items[..],
        Arg::Null => &[],
        other => return Err(invalid(lexem, 0, "a list", other)),
    };
    let render: RenderFn = match args.at(1) {
        Arg::Render(render) => render,
        other => return Err(invalid(lexem, 1, "a render function", &other)),
    };
    Ok(items.iter().enumerate().map(|(index, item)| Rc::new(render(item, index))).collect())
}

pub(super) fn hook_arg(lexem: &Lexem) -> Result<Rc<dyn DomHook>, ReconcileError> {
    match lexem.args().at(0) {
        Arg::Hook(hook) => Ok(hook),
        other => Err(invalid(lexem, 0, "a host hook", &other)),
    }
}

pub(super) fn hook_args(lexem: &Lexem) -> &[Arg] {
    lexem.args().get(1..).unwrap_or(&[])
}

pub(super) fn run_callback(lexem: &Lexem) -> Result<(), ReconcileError> {
    let callback: Callback = match lexem.args().at(0) {
        Arg::Callback(callback) => callback,
        other => return Err(invalid(lexem, 0, "a callback", &other)),
    };
    let args = lexem.args().at(1);
    callback(args.as_list().unwrap_or(&[]));
    Ok(())
}

pub(super) fn component_arg(lexem: &Lexem) -> Result<ComponentFactory, ReconcileError> {
    match lexem.args().at(0) {
        Arg::Component(factory) => Ok(factory),
        other => Err(invalid(lexem, 0, "a component factory", &other)),
    }
}
