//! `vbook import`: two-step review of an uploaded supplier list.
//!
//! `analyze` parses the file, diffs it against the store and writes a plan
//! file. `apply` reads that plan back and writes the approved part. Nothing is
//! remembered between the two calls except the plan file itself.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

use vendorbook_core::ApplyMode;
use vendorbook_io::{parse_import, ParseReport};
use vendorbook_recon::{
    analyze, apply, ApplyOutcome, Approval, ConflictCandidate, ImportPlan, PlanSummary,
};

use crate::util::{print_json, render_table};
use crate::{CliError, Context};

#[derive(Subcommand)]
pub enum ImportCommands {
    /// Compare an uploaded file with the store and write a plan
    #[command(after_help = "\
Examples:
  vbook import analyze fournisseurs.xlsx --plan plan.json
  vbook import analyze export.csv --plan plan.json --json

The file needs the columns 'Raison Sociale', 'ID Oracle' and 'Adresse'.")]
    Analyze {
        /// Uploaded .csv, .xlsx, .xls, .xlsb or .ods file
        file: PathBuf,

        /// Where to write the plan
        #[arg(long, value_name = "PLAN.json")]
        plan: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Apply a plan: insert new suppliers, update approved conflicts
    #[command(after_help = "\
Examples:
  vbook import apply plan.json                       # new suppliers only
  vbook import apply plan.json --approve 'Acme SA' --approve Globex
  vbook import apply plan.json --approve-all --mode best-effort")]
    Apply {
        plan: PathBuf,

        /// Legal name of a conflict to accept (repeatable)
        #[arg(long, value_name = "NAME", conflicts_with = "approve_all")]
        approve: Vec<String>,

        /// Accept every conflict in the plan
        #[arg(long)]
        approve_all: bool,

        /// transactional or best-effort [default: from settings]
        #[arg(long)]
        mode: Option<ApplyMode>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    plan_file: &'a Path,
    parse: ParseReport,
    summary: PlanSummary,
    plan: &'a ImportPlan,
}

#[derive(Serialize)]
struct ApplyOutput {
    mode: ApplyMode,
    #[serde(flatten)]
    outcome: ApplyOutcome,
}

pub fn cmd_import(ctx: &Context, cmd: ImportCommands) -> Result<(), CliError> {
    match cmd {
        ImportCommands::Analyze { file, plan, json } => cmd_import_analyze(ctx, &file, &plan, json),
        ImportCommands::Apply { plan, approve, approve_all, mode, json } => {
            let approval = if approve_all {
                Approval::All
            } else if approve.is_empty() {
                Approval::None
            } else {
                Approval::names(&approve)
            };
            let mode = mode.unwrap_or(ctx.settings.apply_mode);
            cmd_import_apply(ctx, &plan, &approval, mode, json)
        }
    }
}

fn cmd_import_analyze(
    ctx: &Context,
    file: &Path,
    plan_path: &Path,
    json: bool,
) -> Result<(), CliError> {
    let parsed = parse_import(file)?;
    let store = ctx.open_store()?;

    let mut plan = analyze(&store, &parsed.rows)?;
    plan.source = file.file_name().map(|n| n.to_string_lossy().into_owned());
    plan.save(plan_path)?;

    if json {
        return print_json(&AnalyzeOutput {
            plan_file: plan_path,
            parse: parsed.report,
            summary: plan.summary(),
            plan: &plan,
        });
    }

    let s = plan.summary();
    println!(
        "{}: {} row(s) read, {} without a legal name dropped",
        file.display(),
        parsed.report.rows,
        parsed.report.dropped
    );
    println!(
        "{} new, {} conflict(s), {} unchanged, {} ambiguous",
        s.new, s.conflicts, s.unchanged, s.ambiguous
    );

    if !plan.new.is_empty() {
        let rows: Vec<Vec<String>> = plan
            .new
            .iter()
            .map(|r| {
                vec![
                    r.legal_name.clone(),
                    r.external_id.clone().unwrap_or_default(),
                    r.address.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!("\nNew suppliers:");
        print!("{}", render_table(&["legal_name", "external_id", "address"], &rows, 40));
    }

    if !plan.conflicts.is_empty() {
        println!("\nConflicts:");
        let headers = ["legal_name", "field", "current", "uploaded"];
        print!("{}", render_table(&headers, &conflict_rows(&plan.conflicts), 40));
    }

    for a in &plan.ambiguous {
        let ids: Vec<String> = a.record_ids.iter().map(|id| id.to_string()).collect();
        eprintln!(
            "warning: '{}' matches suppliers {}; not imported",
            a.row.legal_name,
            ids.join(", ")
        );
    }

    println!("\nplan written to {}", plan_path.display());
    if plan.is_noop() {
        println!("nothing to apply");
    } else if plan.conflicts.is_empty() {
        println!("next: vbook import apply {}", plan_path.display());
    } else {
        println!(
            "next: vbook import apply {} --approve NAME... (or --approve-all)",
            plan_path.display()
        );
    }
    Ok(())
}

/// One line per changed field.
fn conflict_rows(conflicts: &[ConflictCandidate]) -> Vec<Vec<String>> {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(empty)".to_string());
    let mut rows = Vec::new();
    for c in conflicts {
        if c.external_id_changed {
            rows.push(vec![
                c.legal_name.clone(),
                "external_id".to_string(),
                show(&c.old_external_id),
                show(&c.new_external_id),
            ]);
        }
        if c.address_changed {
            rows.push(vec![
                if c.external_id_changed { String::new() } else { c.legal_name.clone() },
                "address".to_string(),
                show(&c.old_address),
                show(&c.new_address),
            ]);
        }
    }
    rows
}

fn cmd_import_apply(
    ctx: &Context,
    plan_path: &Path,
    approval: &Approval,
    mode: ApplyMode,
    json: bool,
) -> Result<(), CliError> {
    let mut plan = ImportPlan::load(plan_path)?;
    let mut store = ctx.open_store()?;

    let outcome = apply(&mut store, &mut plan, approval, mode)?;
    plan.save(plan_path)?;

    if json {
        return print_json(&ApplyOutput { mode, outcome });
    }

    println!(
        "{} inserted, {} updated, {} declined",
        outcome.inserted, outcome.updated, outcome.declined
    );
    if outcome.skipped > 0 {
        eprintln!(
            "warning: {} write(s) skipped; the store changed after analysis",
            outcome.skipped
        );
    }
    Ok(())
}
