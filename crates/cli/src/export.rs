//! `vbook export`: the current view as CSV or XLSX.

use std::path::PathBuf;

use clap::Args;

use vendorbook_core::ExportFormat;
use vendorbook_store::ListQuery;

use crate::records::ViewArgs;
use crate::{CliError, Context};

#[derive(Args)]
pub struct ExportArgs {
    /// Output file; .csv or .xlsx picks the format
    pub output: PathBuf,

    /// csv or xlsx [default: from extension, then settings]
    #[arg(long)]
    pub format: Option<ExportFormat>,

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn cmd_export(ctx: &Context, args: ExportArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let query = args.view.query(ListQuery::default());
    let records = store.list(&query)?.records;

    let format = args
        .format
        .or_else(|| vendorbook_io::export::format_for(&args.output))
        .unwrap_or(ctx.settings.export_format);
    vendorbook_io::export_as(&records, &args.output, format)?;

    println!(
        "exported {} supplier(s) to {} ({})",
        records.len(),
        args.output.display(),
        format
    );
    Ok(())
}
