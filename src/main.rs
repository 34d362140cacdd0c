use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use zenreg::Registry;
use zenreg::diagnostics::{CollectingLogger, render_error};
use zenreg::manifest::Manifest;
use zenreg::span::Span;

#[derive(Parser)]
#[command(name = "zenreg", version, about = "Build and inspect script symbol registries")]
struct Cli {
    /// Log filter, e.g. "debug" or "zenreg=trace". Defaults to RUST_LOG, then "warn"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the registry described by a manifest and report diagnostics
    Check {
        /// Manifest path (.toml)
        manifest: PathBuf,
    },
    /// Resolve a bracket literal such as "<ore:ingotIron>"
    Resolve {
        /// Manifest path (.toml)
        manifest: PathBuf,
        /// The literal, including its angle brackets
        literal: String,
    },
    /// Print the namespace tree, globals, expansions and bracket handlers
    Dump {
        /// Manifest path (.toml)
        manifest: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Check { manifest } => {
            let (registry, logger) = build_registry(&manifest);
            let errors = logger.errors().len();
            let warnings = logger.warnings().len();
            eprintln!(
                "checked {}: {} symbol(s), {} global(s), {} expansion(s), {} bracket handler(s); {errors} error(s), {warnings} warning(s)",
                manifest.display(),
                registry.root().symbols().len(),
                registry.globals().len(),
                registry.expansions().len(),
                registry.bracket_handlers().len(),
            );
        }
        Commands::Resolve { manifest, literal } => {
            let (registry, _logger) = build_registry(&manifest);
            let env = registry.make_global_environment(BTreeMap::new());
            match zenreg::resolve_literal(&env, &literal) {
                Ok(Some(symbol)) => println!("{symbol}: {}", symbol.ty()),
                Ok(None) => {
                    report(&literal, "unresolved bracket literal", "no bracket handler produced a symbol", Span::new(0, literal.len()));
                    std::process::exit(1);
                }
                Err(err) => {
                    report(&literal, &err.to_string(), "here", err.span());
                    std::process::exit(1);
                }
            }
        }
        Commands::Dump { manifest, json } => {
            let (registry, _logger) = build_registry(&manifest);
            let dump = RegistryDump::of(&registry);
            if json {
                match serde_json::to_string_pretty(&dump) {
                    Ok(text) => println!("{text}"),
                    Err(err) => {
                        eprintln!("error: {err}");
                        std::process::exit(1);
                    }
                }
            } else {
                dump.print();
            }
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
}

/// Load and build a manifest, printing soft diagnostics. Exits on hard errors.
fn build_registry(path: &Path) -> (Registry, Arc<CollectingLogger>) {
    let manifest = match Manifest::load(path) {
        Ok(manifest) => manifest,
        Err(err) => {
            eprintln!("error [{}]: {err}", path.display());
            std::process::exit(1);
        }
    };

    let logger = Arc::new(CollectingLogger::new());
    let registry = match manifest.build(logger.clone()) {
        Ok(registry) => registry,
        Err(err) => {
            for diagnostic in logger.diagnostics() {
                eprintln!("{diagnostic}");
            }
            eprintln!("error [{}]: {err}", path.display());
            std::process::exit(1);
        }
    };
    for diagnostic in logger.diagnostics() {
        eprintln!("{diagnostic}");
    }
    (registry, logger)
}

fn report(source: &str, message: &str, label: &str, span: Span) {
    if let Err(err) = render_error(source, message, label, span) {
        eprintln!("error: {message} ({err})");
    }
}

#[derive(Serialize)]
struct RegistryDump {
    root: String,
    symbols: Vec<SymbolDump>,
    globals: Vec<SymbolDump>,
    expansions: Vec<ExpansionDump>,
    bracket_handlers: Vec<HandlerDump>,
}

#[derive(Serialize)]
struct SymbolDump {
    name: String,
    kind: &'static str,
    #[serde(rename = "type")]
    ty: String,
    value: String,
}

#[derive(Serialize)]
struct ExpansionDump {
    target: String,
    contributors: Vec<String>,
    instance_members: Vec<String>,
    static_members: Vec<String>,
}

#[derive(Serialize)]
struct HandlerDump {
    priority: i32,
    identity: String,
    pattern: String,
}

impl RegistryDump {
    fn of(registry: &Registry) -> Self {
        let symbol = |name: String, symbol: &zenreg::Symbol| SymbolDump {
            name,
            kind: symbol.kind(),
            ty: symbol.ty().to_string(),
            value: symbol.to_string(),
        };

        let symbols = registry
            .root()
            .symbols()
            .into_iter()
            .map(|(path, s)| symbol(path, &**s))
            .collect();

        let mut globals: Vec<SymbolDump> =
            registry.globals().iter().map(|(name, s)| symbol(name.clone(), &**s)).collect();
        globals.sort_by(|a, b| a.name.cmp(&b.name));

        let mut expansions: Vec<ExpansionDump> = registry
            .expansions()
            .values()
            .map(|e| ExpansionDump {
                target: e.target().to_string(),
                contributors: e.contributors().iter().cloned().collect(),
                instance_members: e.instance_members().keys().cloned().collect(),
                static_members: e.static_members().keys().cloned().collect(),
            })
            .collect();
        expansions.sort_by(|a, b| a.target.cmp(&b.target));

        let bracket_handlers = registry
            .bracket_handlers()
            .iter()
            .map(|h| HandlerDump {
                priority: h.priority(),
                identity: h.identity().into_owned(),
                pattern: h.pattern().as_str().to_string(),
            })
            .collect();

        Self { root: registry.root().name().to_string(), symbols, globals, expansions, bracket_handlers }
    }

    fn print(&self) {
        println!("{}", self.root);
        for s in &self.symbols {
            println!("  {} [{}] {}", s.name, s.kind, s.value);
        }
        println!("globals");
        for s in &self.globals {
            println!("  {}: {} = {}", s.name, s.ty, s.value);
        }
        println!("expansions");
        for e in &self.expansions {
            println!("  {} <- {}", e.target, e.contributors.join(", "));
            for m in &e.instance_members {
                println!("    .{m}");
            }
            for m in &e.static_members {
                println!("    ::{m}");
            }
        }
        println!("bracket handlers");
        for h in &self.bracket_handlers {
            println!("  {:>4} {} /{}/", h.priority, h.identity, h.pattern);
        }
    }
}
