/* Analyze command - structure report and dependency analysis */

use super::common::{build_resolver, load_files};
use anyhow::Context as _;
use serde::Serialize;
use std::path::PathBuf;
use wire_gen::dependency::DependencyAnalyzer;
use wire_gen::schema::resolved::{ResolvedMember, ResolvedType};
use wire_gen::schema::{Context, Struct};
use wire_gen::{Resolver, RustCodeGenerator, RustCodeGeneratorOptions};

#[derive(Debug, Serialize)]
struct UnionSummary {
    name: String,
    cases: usize,
    disallowed: usize,
    has_default: bool,
}

#[derive(Debug, Serialize)]
struct StructSummary {
    name: String,
    #[serde(rename = "extern")]
    is_extern: bool,
    contexts: Vec<String>,
    members: usize,
    unions: Vec<UnionSummary>,
    /* Fields whose struct reference is boxed to break recursion */
    boxed: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AnalysisReport {
    structs: Vec<StructSummary>,
    contexts: Vec<String>,
    constants: usize,
    dependency_order: Option<Vec<String>>,
    cycles: Vec<Vec<String>>,
    errors: Vec<String>,
}

/* Execute the analyze command */
pub fn run(
    files: Vec<PathBuf>,
    include_dirs: Vec<PathBuf>,
    json: bool,
    print_struct: Option<String>,
) -> anyhow::Result<()> {
    let loaded = load_files(&files, include_dirs, !json)?;
    let resolver = build_resolver(&loaded)?;
    if let Some(name) = print_struct.as_deref() {
        if resolver.lookup_struct(name).is_none() {
            anyhow::bail!("--print-struct: no struct named '{}' in the loaded files", name);
        }
    }
    let report = build_report(&resolver)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.errors.is_empty() || !report.cycles.is_empty() {
        anyhow::bail!("Analysis failed. Cannot generate code for these format descriptions.");
    }

    if let Some(name) = print_struct.as_deref() {
        let generator = RustCodeGenerator::new(&resolver, RustCodeGeneratorOptions::default());
        let code = generator
            .emit_struct_code(name)
            .with_context(|| format!("Failed to generate code for struct '{}'", name))?;
        println!("\n[~] Generated code for '{}':\n", name);
        println!("{}", code);
    }

    Ok(())
}

fn build_report(resolver: &Resolver) -> anyhow::Result<AnalysisReport> {
    let structs: Vec<&Struct> = resolver.structs().collect();
    let contexts: Vec<&Context> = resolver.contexts().collect();
    let analysis = DependencyAnalyzer::new().analyze(&structs, &contexts);

    let mut summaries = Vec::with_capacity(structs.len());
    for def in &structs {
        let mut summary = StructSummary {
            name: def.name.clone(),
            is_extern: def.is_extern(),
            contexts: def.contexts.clone(),
            members: def.members.len(),
            unions: Vec::new(),
            boxed: Vec::new(),
        };
        if !def.is_extern() {
            let resolved = resolver
                .resolve_struct(def)
                .with_context(|| format!("Failed to resolve struct '{}'", def.name))?;
            collect_members(&resolved.members, &mut summary);
        }
        summaries.push(summary);
    }

    Ok(AnalysisReport {
        structs: summaries,
        contexts: contexts.iter().map(|c| c.name.clone()).collect(),
        constants: resolver.constants().count(),
        dependency_order: analysis.topological_order.clone(),
        cycles: analysis.cycles.iter().map(|c| c.cycle.clone()).collect(),
        errors: analysis.validation_errors.iter().map(|e| e.to_string()).collect(),
    })
}

fn collect_members(members: &[ResolvedMember<'_>], summary: &mut StructSummary) {
    for member in members {
        match member {
            ResolvedMember::Field(field) => {
                if is_boxed(&field.ty) {
                    summary.boxed.push(field.name.to_string());
                }
            }
            ResolvedMember::Union(union) => {
                summary.unions.push(UnionSummary {
                    name: union.name.to_string(),
                    cases: union.cases.len(),
                    disallowed: union.cases.iter().filter(|c| c.disallowed).count(),
                    has_default: union.cases.iter().any(|c| c.labels.is_none()),
                });
                for case in &union.cases {
                    collect_members(&case.members, summary);
                }
            }
            ResolvedMember::Eos | ResolvedMember::Ignore | ResolvedMember::Fail => {}
        }
    }
}

fn is_boxed(ty: &ResolvedType<'_>) -> bool {
    match ty {
        ResolvedType::Struct { boxed, .. } => *boxed,
        ResolvedType::FixedArray { base, .. } => is_boxed(base),
        _ => false,
    }
}

fn print_report(report: &AnalysisReport) {
    println!("\n[~] Structure Summary:");
    println!("=====================");
    for summary in &report.structs {
        if summary.is_extern {
            println!("  - {} (extern)", summary.name);
            continue;
        }
        println!("  - {} ({} members)", summary.name, summary.members);
        if !summary.contexts.is_empty() {
            println!("      contexts: {}", summary.contexts.join(", "));
        }
        for union in &summary.unions {
            println!(
                "      union {}: {} case(s), {} disallowed{}",
                union.name,
                union.cases,
                union.disallowed,
                if union.has_default { ", with default" } else { "" }
            );
        }
        if !summary.boxed.is_empty() {
            println!("      boxed: {}", summary.boxed.join(", "));
        }
    }
    println!("[~] {} context(s), {} constant(s)", report.contexts.len(), report.constants);

    println!("\n[~] Dependency Analysis Results:");
    println!("==============================");
    match &report.dependency_order {
        Some(order) => println!("[✓] Dependency order: {}", order.join(", ")),
        None => println!("[~] No dependency order: some structs are recursive"),
    }

    if report.cycles.is_empty() {
        println!("[✓] No infinite containment cycles detected");
    } else {
        println!("[✗] {} infinite containment cycle(s) detected:", report.cycles.len());
        for cycle in &report.cycles {
            println!("  [~] Cycle: {}", cycle.join(" -> "));
        }
    }

    if report.errors.is_empty() {
        println!("[✓] No validation errors");
    } else {
        println!("[✗] {} validation error(s):", report.errors.len());
        for error in &report.errors {
            println!("  [!] {}", error);
        }
    }
}
