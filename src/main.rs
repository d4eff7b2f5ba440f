#[cfg(not(target_arch = "wasm32"))]
use colored::Colorize;

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::{Path, PathBuf};

    use anyhow::{bail, Context, Result};
    use colored::Colorize;
    use tracing_subscriber::EnvFilter;

    use lexidom::memory::describe;
    use lexidom::{html, EngineConfig, MemoryHost, Reconciler, Registry, Sentence, SentenceVisualizer};

    const USAGE: &str = "Usage: lexidom <sentence.json> [next.json] [--tree] [--config <file>]";

    struct Options {
        first: PathBuf,
        next: Option<PathBuf>,
        tree: bool,
        config: Option<PathBuf>,
    }

    fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options> {
        let mut files = Vec::new();
        let mut tree = false;
        let mut config = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--tree" => tree = true,
                "--config" => match args.next() {
                    Some(path) => config = Some(PathBuf::from(path)),
                    None => bail!("--config needs a file\n{}", USAGE),
                },
                flag if flag.starts_with("--") => bail!("Unknown option {}\n{}", flag, USAGE),
                _ => files.push(PathBuf::from(arg)),
            }
        }
        let mut files = files.into_iter();
        let Some(first) = files.next() else {
            bail!(USAGE);
        };
        let next = files.next();
        if files.next().is_some() {
            bail!("Too many documents\n{}", USAGE);
        }
        Ok(Options { first, next, tree, config })
    }

    fn load(path: &Path, registry: &Registry) -> Result<Sentence> {
        let source = fs::read_to_string(path).with_context(|| format!("Error reading file {}", path.display()))?;
        Sentence::from_json(&source, registry).with_context(|| format!("Invalid sentence document {}", path.display()))
    }

    fn print_tree(sentence: &Sentence) {
        println!("{}", "=== Sentence ===".bold());
        print!("{}", SentenceVisualizer::visualize(sentence));
    }

    pub fn run() -> Result<()> {
        let filter = EnvFilter::try_from_env("LEXIDOM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

        let options = parse_args(std::env::args().skip(1))?;
        let config = match &options.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        }
        .from_env()?;

        let lexicon = html::lexicon();
        let mut registry = Registry::new();
        registry.register(&lexicon);
        let engine = Reconciler::with_config(config).target(&lexicon);

        let first = load(&options.first, &registry)?;
        if options.tree {
            print_tree(&first);
        }
        let mut host = MemoryHost::new();
        let root = host.root();
        let rendered = engine.render(&mut host, root, first).context("Render failed")?;
        println!("{}", "=== Markup ===".bold());
        println!("{}", host.to_html(root));

        if let Some(path) = &options.next {
            let next = load(path, &registry)?;
            if options.tree {
                print_tree(&next);
            }
            host.clear_mutations();
            engine.diff(&mut host, root, next, rendered).context("Diff failed")?;

            println!("{}", "=== Mutations ===".bold());
            if host.mutations().is_empty() {
                println!("  {}", "(none)".dimmed());
            }
            for mutation in host.mutations() {
                println!("  {}", describe(mutation).cyan());
            }
            println!("{}", "=== Markup after diff ===".bold());
            println!("{}", host.to_html(root));
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(error) = cli::run() {
        eprintln!("{} {:#}", "error:".red().bold(), error);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
