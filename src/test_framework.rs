use crate::html;
use crate::initializer::Initializer;
use crate::memory::MemoryHost;
use crate::reconcile::Reconciler;
use crate::sentence::Sentence;

/// A render, optionally followed by a diff, checked against expected markup.
pub struct ReconcileCase {
    pub name: &'static str,
    pub first: fn(&Initializer) -> Sentence,
    pub next: Option<fn(&Initializer) -> Sentence>,
    pub expected_html: &'static str,
    /// Number of host mutations the diff may perform
    pub expected_mutations: Option<usize>,
}

pub fn run_case(case: &ReconcileCase) -> Result<(), String> {
    println!("Running case: {}", case.name);

    let lexicon = html::lexicon();
    let engine = Reconciler::new().target(&lexicon);
    let h = lexicon.first_level();
    let mut host = MemoryHost::new();
    let root = host.root();

    let rendered = engine
        .render(&mut host, root, (case.first)(&h))
        .map_err(|e| format!("Render error: {}", e))?;

    if let Some(next) = case.next {
        host.clear_mutations();
        engine
            .diff(&mut host, root, next(&h), rendered)
            .map_err(|e| format!("Diff error: {}", e))?;

        if let Some(expected) = case.expected_mutations {
            let found = host.mutations().len();
            if found != expected {
                return Err(format!(
                    "Mutation count mismatch.\nExpected: {}\nGot: {} {:#?}",
                    expected,
                    found,
                    host.mutations()
                ));
            }
        }

        let mut fresh = MemoryHost::new();
        let fresh_root = fresh.root();
        engine
            .render(&mut fresh, fresh_root, next(&h))
            .map_err(|e| format!("Fresh render error: {}", e))?;
        if fresh.to_html_with_markers(fresh_root) != host.to_html_with_markers(root) {
            return Err(format!(
                "Diff result differs from a fresh render.\nFresh: {}\nDiffed: {}",
                fresh.to_html_with_markers(fresh_root),
                host.to_html_with_markers(root)
            ));
        }
    }

    let html = host.to_html(root);
    if html != case.expected_html {
        return Err(format!("Markup mismatch.\nExpected: {}\nGot: {}", case.expected_html, html));
    }
    Ok(())
}

/// Generate one `#[test]` per case function.
#[macro_export]
macro_rules! reconcile_suite {
    ($($case:ident),* $(,)?) => {
    };
}
