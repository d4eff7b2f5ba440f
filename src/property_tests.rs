use quickcheck::{Arbitrary, Gen, QuickCheck};

use crate::arg::Arg;
use crate::args;
use crate::html::{self, HtmlWords};
use crate::initializer::Initializer;
use crate::memory::MemoryHost;
use crate::reconcile::Reconciler;
use crate::sentence::Sentence;

const TAGS: &[&str] = &["div", "span", "p", "li"];
const WORDS: &[&str] = &["", "a", "bb", "todo", "done"];
const CLASSES: &[&str] = &["x", "selected", "hidden"];

// A view shape whose leaves can be re-rolled without changing its structure
#[derive(Clone, Debug)]
enum Node {
    Text(String),
    Element { tag: &'static str, class: &'static str, flag: bool, children: Vec<Node> },
    Cond(bool, Box<Node>),
    List(Vec<String>),
}

#[derive(Clone, Debug)]
struct Plan(Vec<Node>);

/// Two plans with the same structure and different leaves.
#[derive(Clone, Debug)]
struct PlanPair(Plan, Plan);

fn word(g: &mut Gen) -> String {
    g.choose(WORDS).unwrap().to_string()
}

fn words(g: &mut Gen) -> Vec<String> {
    let len = *g.choose(&[0, 1, 2, 3]).unwrap();
    (0..len).map(|_| word(g)).collect()
}

fn generate_node(g: &mut Gen, depth: usize) -> Node {
    let choice = if depth == 0 { *g.choose(&[0, 3]).unwrap() } else { *g.choose(&[0, 1, 1, 2, 3]).unwrap() };
    match choice {
        0 => Node::Text(word(g)),
        1 => {
            let count = *g.choose(&[0, 1, 2]).unwrap();
            Node::Element {
                tag: *g.choose(TAGS).unwrap(),
                class: *g.choose(CLASSES).unwrap(),
                flag: bool::arbitrary(g),
                children: (0..count).map(|_| generate_node(g, depth - 1)).collect(),
            }
        }
        2 => Node::Cond(bool::arbitrary(g), Box::new(generate_node(g, depth - 1))),
        _ => Node::List(words(g)),
    }
}

fn reroll(node: &Node, g: &mut Gen) -> Node {
    match node {
        Node::Text(_) => Node::Text(word(g)),
        Node::Element { tag, class, children, .. } => Node::Element {
            tag: *tag,
            class: *class,
            flag: bool::arbitrary(g),
            children: children.iter().map(|child| reroll(child, g)).collect(),
        },
        Node::Cond(_, inner) => Node::Cond(bool::arbitrary(g), Box::new(reroll(inner, g))),
        Node::List(_) => Node::List(words(g)),
    }
}

impl Arbitrary for Plan {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = *g.choose(&[1, 2, 3]).unwrap();
        let count = *g.choose(&[1, 2, 3]).unwrap();
        Plan((0..count).map(|_| generate_node(g, depth)).collect())
    }
}

impl Arbitrary for PlanPair {
    fn arbitrary(g: &mut Gen) -> Self {
        let first = Plan::arbitrary(g);
        let second = Plan(first.0.iter().map(|node| reroll(node, g)).collect());
        PlanPair(first, second)
    }
}

fn build_node(h: &Initializer, node: &Node) -> Sentence {
    match node {
        Node::Text(text) => h.text(text.as_str()),
        Node::Element { tag, class, flag, children } => {
            let mut args = args![h.class_if(*class, *flag)];
            args.extend(children.iter().map(|child| Arg::from(build_node(h, child))));
            h.call(tag, args)
        }
        Node::Cond(flag, inner) => h.if_(*flag, build_node(h, inner), None),
        Node::List(items) => {
            let item_view = h.clone();
            let items: Vec<Arg> = items.iter().map(|item| Arg::from(item.as_str())).collect();
            h.each(items, move |item, _| item_view.li(args![item.clone()]))
        }
    }
}

fn build(h: &Initializer, plan: &Plan) -> Sentence {
    plan.0.iter().fold(h.empty(), |sentence, node| sentence.use_sentence(&build_node(h, node)))
}

fn render_markup(plan: &Plan, atomic: bool) -> String {
    let lexicon = html::lexicon();
    let engine = Reconciler::new().target(&lexicon);
    let h = if atomic { lexicon.atomic() } else { lexicon.first_level() };
    let mut host = MemoryHost::new();
    let root = host.root();
    engine.render(&mut host, root, build(&h, plan)).unwrap();
    host.to_html_with_markers(root)
}

fn prop_diff_is_idempotent(plan: Plan) -> bool {
    let lexicon = html::lexicon();
    let engine = Reconciler::new().target(&lexicon);
    let h = lexicon.first_level();
    let mut host = MemoryHost::new();
    let root = host.root();

    let rendered = engine.render(&mut host, root, build(&h, &plan)).unwrap();
    host.clear_mutations();
    engine.diff(&mut host, root, build(&h, &plan), rendered).unwrap();
    host.mutations().is_empty()
}

fn prop_expansion_is_equivalent(plan: Plan) -> bool {
    render_markup(&plan, false) == render_markup(&plan, true)
}

fn prop_diff_matches_fresh_render(pair: PlanPair) -> bool {
    let PlanPair(first, second) = pair;
    let lexicon = html::lexicon();
    let engine = Reconciler::new().target(&lexicon);
    let h = lexicon.first_level();
    let mut host = MemoryHost::new();
    let root = host.root();

    let rendered = engine.render(&mut host, root, build(&h, &first)).unwrap();
    engine.diff(&mut host, root, build(&h, &second), rendered).unwrap();
    host.to_html_with_markers(root) == render_markup(&second, false)
}

#[test]
fn test_diff_is_idempotent() {
    QuickCheck::new().tests(100).quickcheck(prop_diff_is_idempotent as fn(Plan) -> bool);
}

#[test]
fn test_expansion_is_equivalent() {
    QuickCheck::new().tests(100).quickcheck(prop_expansion_is_equivalent as fn(Plan) -> bool);
}

#[test]
fn test_diff_matches_fresh_render() {
    QuickCheck::new().tests(100).quickcheck(prop_diff_matches_fresh_render as fn(PlanPair) -> bool);
}
