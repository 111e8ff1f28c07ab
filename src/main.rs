use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

use xbrl_dts::cli::{Cli, OutputFormat};
use xbrl_dts::loader::{DtsSnapshot, EntryDocument, Loader};
use xbrl_dts::model::{Instance, SchemaId};
use xbrl_dts::traverse::{find_roots, traverse_presentation_links};
use xbrl_dts::{collect_elements, collect_role_types};

#[derive(Debug, Serialize)]
struct DtsSummary {
    entry: String,
    entry_kind: &'static str,
    schemas: usize,
    elements: usize,
    role_types: usize,
    linkbases: LinkbaseCounts,
    presentation_roles: usize,
    presentation_roots: usize,
    instances: Vec<InstanceSummary>,
}

#[derive(Debug, Default, Serialize)]
struct LinkbaseCounts {
    label: usize,
    reference: usize,
    presentation: usize,
    definition: usize,
    calculation: usize,
    generic: usize,
}

#[derive(Debug, Serialize)]
struct InstanceSummary {
    path: String,
    facts: usize,
    contexts: usize,
    units: usize,
    role_refs: usize,
}

impl InstanceSummary {
    fn of(instance: &Instance) -> Self {
        Self {
            path: instance.path.clone(),
            facts: instance.facts.len(),
            contexts: instance.contexts.len(),
            units: instance.units.len(),
            role_refs: instance.role_refs.len(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loader = Loader::new(cli.fetcher_config())?;
    let entry = loader
        .load_entry(&cli.entry)
        .await
        .with_context(|| format!("failed to load entry document {}", cli.entry))?;

    let snapshot = loader.snapshot();
    let summary = summarize(&cli.entry, &entry, &snapshot)?;

    match cli.format {
        OutputFormat::Human => print_human(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn summarize(
    entry_path: &str,
    entry: &EntryDocument,
    snapshot: &DtsSnapshot,
) -> anyhow::Result<DtsSummary> {
    let (entry_kind, root, instances) = match entry {
        EntryDocument::Manifest(manifest) => (
            "manifest",
            manifest
                .list
                .instances
                .first()
                .and_then(|i| i.schema_ref.schema),
            manifest.list.instances.iter().map(InstanceSummary::of).collect(),
        ),
        EntryDocument::Instance(instance) => (
            "instance",
            instance.schema_ref.schema,
            vec![InstanceSummary::of(instance)],
        ),
        EntryDocument::Schema(id) => ("schema", Some(*id), Vec::new()),
    };

    let mut summary = DtsSummary {
        entry: entry_path.to_string(),
        entry_kind,
        schemas: snapshot.len(),
        elements: 0,
        role_types: 0,
        linkbases: LinkbaseCounts::default(),
        presentation_roles: 0,
        presentation_roots: 0,
        instances,
    };

    for (_, schema) in snapshot.iter() {
        summary.linkbases.label += schema.label_linkbases.len();
        summary.linkbases.reference += schema.reference_linkbases.len();
        summary.linkbases.presentation += schema.presentation_linkbases.len();
        summary.linkbases.definition += schema.definition_linkbases.len();
        summary.linkbases.calculation += schema.calculation_linkbases.len();
        summary.linkbases.generic += schema.generic_linkbases.len();
    }

    if let Some(root) = root {
        summary.elements = count_elements(snapshot, root);
        summary.role_types = count_role_types(snapshot, root);

        let presentation = traverse_presentation_links(snapshot, root)
            .context("presentation traversal failed")?;
        summary.presentation_roles = presentation.len();
        summary.presentation_roots = presentation
            .values()
            .map(|relations| find_roots(relations).len())
            .sum();
    }

    Ok(summary)
}

fn count_elements(snapshot: &DtsSnapshot, root: SchemaId) -> usize {
    let mut elements = HashMap::new();
    collect_elements(snapshot, root, &mut elements);
    elements.len()
}

fn count_role_types(snapshot: &DtsSnapshot, root: SchemaId) -> usize {
    let mut role_types = HashMap::new();
    collect_role_types(snapshot, root, &mut role_types);
    role_types.len()
}

fn print_human(summary: &DtsSummary) {
    println!("Entry:               {} ({})", summary.entry, summary.entry_kind);
    println!("Schemas:             {}", summary.schemas);
    println!("Elements:            {}", summary.elements);
    println!("Role types:          {}", summary.role_types);
    println!(
        "Linkbases:           label={} reference={} presentation={} definition={} calculation={} generic={}",
        summary.linkbases.label,
        summary.linkbases.reference,
        summary.linkbases.presentation,
        summary.linkbases.definition,
        summary.linkbases.calculation,
        summary.linkbases.generic,
    );
    println!("Presentation roles:  {}", summary.presentation_roles);
    println!("Presentation roots:  {}", summary.presentation_roots);

    for instance in &summary.instances {
        println!(
            "Instance {}: facts={} contexts={} units={} roleRefs={}",
            instance.path, instance.facts, instance.contexts, instance.units, instance.role_refs,
        );
    }
}
