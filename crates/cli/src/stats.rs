//! `vbook stats`: dashboard indicators over the whole register.

use clap::Args;

use vendorbook_core::{AuditStatus, Region};
use vendorbook_store::{QuickFilter, Stats, StatsFilter};

use crate::util::{print_json, render_table};
use crate::{CliError, Context};

#[derive(Args)]
pub struct StatsArgs {
    /// all, critical, prospects or audit-to-schedule
    #[arg(long, default_value = "all")]
    pub quick: QuickFilter,

    /// Restrict to a region (repeatable)
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<Region>,

    /// Restrict to an audit status (repeatable)
    #[arg(long = "status", value_name = "STATUS")]
    pub statuses: Vec<AuditStatus>,

    #[arg(long)]
    pub json: bool,
}

pub fn cmd_stats(ctx: &Context, args: StatsArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let filter = StatsFilter {
        quick: args.quick,
        regions: args.regions,
        statuses: args.statuses,
    };
    let stats = Stats::compute(&store.records()?, &filter);

    if args.json {
        return print_json(&stats);
    }

    println!("suppliers   {}", stats.total);
    println!("critical    {}", stats.critical);
    println!("prospects   {}", stats.prospects);

    let by_region: Vec<Vec<String>> = stats
        .by_region
        .iter()
        .map(|(region, n)| vec![region.to_string(), n.to_string()])
        .collect();
    println!();
    print!("{}", render_table(&["region", "count"], &by_region, 30));

    let by_status: Vec<Vec<String>> = stats
        .by_audit_status
        .iter()
        .map(|(status, n)| vec![status.to_string(), n.to_string()])
        .collect();
    println!();
    print!("{}", render_table(&["audit_status", "count"], &by_status, 30));

    let per_month: Vec<Vec<String>> = stats
        .created_per_month
        .iter()
        .map(|(month, n)| vec![month.clone(), n.to_string()])
        .collect();
    println!();
    print!("{}", render_table(&["created", "count"], &per_month, 30));
    Ok(())
}
