//! Spindle CLI
//!
//! Command-line interface for:
//! - Resolving per-class rule maps from RDF rule graphs (`resolve`)
//! - Summarizing rule graphs: statements, templates, declarations (`inspect`)
//!
//! Inputs are Turtle / N-Triples / RDF-XML files, or directories that
//! are scanned for them. Everything loads into one graph, which then
//! serves as both the declaration and the definition side of
//! resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

use spindle_rdf::{load_path, Graph, RdfFormat};
use spindle_resolve::{
    class_rule_map, templates_in, vocab, CommandWrapper, Resolution, ResolveOptions,
};

#[derive(Parser)]
#[command(name = "spindle")]
#[command(
    author,
    version,
    about = "Spindle: class-scoped rule resolution over RDF graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the per-class rule map of one or more rule graphs.
    Resolve {
        /// Input files or directories (.ttl / .nt / .rdf)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Association predicate IRI
        #[arg(long, default_value = vocab::RULE)]
        predicate: String,
        /// Leave `?this` patterns unscoped
        #[arg(long)]
        no_scoping: bool,
        /// Accept ASK commands alongside CONSTRUCT and UPDATE
        #[arg(long)]
        allow_ask: bool,
        /// Emit the resolution as JSON instead of the listing
        #[arg(long)]
        json: bool,
    },
    /// Summarize a rule graph: statements, templates, declarations.
    Inspect {
        /// Input files or directories (.ttl / .nt / .rdf)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Resolve {
            inputs,
            predicate,
            no_scoping,
            allow_ask,
            json,
        } => {
            let opts = ResolveOptions {
                with_scoping: !no_scoping,
                allow_ask,
            };
            cmd_resolve(&inputs, &predicate, opts, json)
        }
        Commands::Inspect { inputs } => cmd_inspect(&inputs),
    }
}

/// Load every input into one graph. Files are loaded as given;
/// directories are walked in file-name order and files with unknown
/// extensions are passed over.
fn load_inputs(inputs: &[PathBuf]) -> Result<Graph> {
    let mut graph = Graph::new();
    let mut files = 0usize;
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.with_context(|| format!("walking {}", input.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if known_format(entry.path()) {
                    load_path(&mut graph, entry.path())
                        .with_context(|| format!("loading {}", entry.path().display()))?;
                    files += 1;
                }
            }
        } else {
            load_path(&mut graph, input)
                .with_context(|| format!("loading {}", input.display()))?;
            files += 1;
        }
    }
    eprintln!(
        "{} loaded {} file(s), {} statement(s)",
        "ok".green().bold(),
        files,
        graph.len()
    );
    Ok(graph)
}

fn known_format(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(RdfFormat::from_extension)
        .is_some()
}

fn cmd_resolve(inputs: &[PathBuf], predicate: &str, opts: ResolveOptions, json: bool) -> Result<()> {
    let graph = load_inputs(inputs)?;
    let resolution = class_rule_map(&graph, &graph, predicate, opts, None);

    if json {
        let report = resolution_report(&resolution);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (class, rules) in resolution.rules.iter() {
        println!(
            "{} {}",
            class.display_form().bold(),
            format!("({} rule(s))", rules.len()).cyan()
        );
        for wrapper in rules {
            print_rule(wrapper);
        }
    }
    if !resolution.faults.is_empty() {
        eprintln!(
            "{} {} declaration(s) carried unparseable commands",
            "warning:".yellow().bold(),
            resolution.faults.len()
        );
        for fault in &resolution.faults {
            eprintln!("  {} {}: {}", "→".red(), fault.source, fault.error);
        }
    }
    eprintln!(
        "{} resolved {} rule(s) across {} class(es)",
        "ok".green().bold(),
        resolution.rules.total_rules(),
        resolution.rules.len()
    );
    Ok(())
}

fn print_rule(wrapper: &CommandWrapper) {
    let label = wrapper.label.as_deref().unwrap_or("-");
    println!(
        "  {} {} {}",
        "→".cyan(),
        wrapper.command.kind().green().bold(),
        label
    );
    println!("      {}", wrapper.command.render());
    if let Some(bindings) = &wrapper.bindings {
        let pairs: Vec<String> = bindings
            .iter()
            .map(|(var, value)| format!("{var}={}", value.display_form()))
            .collect();
        println!("      {} {}", "bindings:".yellow(), pairs.join(", "));
    }
    if wrapper.this_unbound {
        println!("      {}", "thisUnbound".yellow());
    }
}

fn cmd_inspect(inputs: &[PathBuf]) -> Result<()> {
    let graph = load_inputs(inputs)?;
    println!("{} {}", "statements:".bold(), graph.len());

    let templates = templates_in(&graph);
    println!("{} {}", "templates:".bold(), templates.len());
    for template in &templates {
        let args: Vec<String> = template
            .arguments
            .iter()
            .map(|a| {
                if a.optional {
                    format!("{}?", a.var_name)
                } else {
                    a.var_name.clone()
                }
            })
            .collect();
        println!(
            "  {} {}({})",
            "→".cyan(),
            template.resource.display_form(),
            args.join(", ")
        );
        if let Some(pattern) = &template.label_template {
            println!("      label: {pattern}");
        }
    }

    for predicate in [vocab::RULE, vocab::CONSTRAINT] {
        let count = graph
            .iri_id(predicate)
            .map(|id| graph.statements_with_predicate(id).count())
            .unwrap_or(0);
        if count > 0 {
            println!("{} {} via {}", "declarations:".bold(), count, predicate);
        }
    }
    Ok(())
}

// ============================================================================
// JSON report
// ============================================================================

#[derive(Serialize)]
struct ResolutionReport {
    classes: Vec<ClassReport>,
    faults: Vec<FaultReport>,
}

#[derive(Serialize)]
struct ClassReport {
    class: String,
    rules: Vec<RuleReport>,
}

#[derive(Serialize)]
struct RuleReport {
    kind: String,
    source: String,
    label: Option<String>,
    text: String,
    command: String,
    this_unbound: bool,
    this_deep: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bindings: Option<BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct FaultReport {
    class: String,
    source: String,
    error: String,
}

fn resolution_report(resolution: &Resolution) -> ResolutionReport {
    let classes = resolution
        .rules
        .iter()
        .map(|(class, rules)| ClassReport {
            class: class.to_string(),
            rules: rules.iter().map(rule_report).collect(),
        })
        .collect();
    let faults = resolution
        .faults
        .iter()
        .map(|fault| FaultReport {
            class: fault.class.to_string(),
            source: fault.source.to_string(),
            error: fault.error.to_string(),
        })
        .collect();
    ResolutionReport { classes, faults }
}

fn rule_report(wrapper: &CommandWrapper) -> RuleReport {
    RuleReport {
        kind: wrapper.command.kind().to_string(),
        source: wrapper.source.to_string(),
        label: wrapper.label.clone(),
        text: wrapper.text.clone(),
        command: wrapper.command.render(),
        this_unbound: wrapper.this_unbound,
        this_deep: wrapper.this_deep,
        bindings: wrapper.bindings.as_ref().map(|b| {
            b.iter()
                .map(|(var, value)| (var.clone(), value.to_string()))
                .collect()
        }),
    }
}
