//! Record commands: `add`, `show`, `edit`, `delete`, `delete-all`, `list`, `names`.

use chrono::SecondsFormat;
use clap::Args;
use serde::Serialize;

use vendorbook_core::{
    AuditStatus, Region, SupplierFields, SupplierId, SupplierRecord, Tag, TagSet,
};
use vendorbook_store::{ListQuery, SortKey};

use crate::util::{print_json, render_table};
use crate::{CliError, Context};

/// Widest column in human tables before truncation.
const MAX_COLUMN_WIDTH: usize = 40;

#[derive(Args)]
pub struct AddArgs {
    /// Legal name (required, non-empty)
    pub name: String,

    /// Identifier in the financial system
    #[arg(long)]
    pub external_id: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Not yet a contracted supplier
    #[arg(long)]
    pub prospect: bool,

    /// Region label or code, e.g. 'Genève' or geneva [default: geneva]
    #[arg(long)]
    pub region: Option<Region>,

    #[arg(long, default_value = "")]
    pub contacts: String,

    /// Tag label or code (repeatable), e.g. critical, 'RSE+'
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<Tag>,

    /// Audit status label or code [default: not_concerned]
    #[arg(long)]
    pub status: Option<AuditStatus>,

    #[arg(long, default_value = "")]
    pub comments: String,

    /// Copy external id and address from the supplier with this legal name
    #[arg(long, value_name = "NAME")]
    pub prefill: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: i64,

    /// New legal name
    #[arg(long)]
    pub name: Option<String>,

    /// New external id ('' clears it)
    #[arg(long)]
    pub external_id: Option<String>,

    /// New address ('' clears it)
    #[arg(long)]
    pub address: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub prospect: Option<bool>,

    #[arg(long)]
    pub region: Option<Region>,

    #[arg(long)]
    pub contacts: Option<String>,

    /// Replace the tag set (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<Tag>,

    /// Remove every tag
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,

    #[arg(long)]
    pub status: Option<AuditStatus>,

    #[arg(long)]
    pub comments: Option<String>,

    #[arg(long)]
    pub json: bool,
}

impl EditArgs {
    fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.external_id.is_some()
            || self.address.is_some()
            || self.prospect.is_some()
            || self.region.is_some()
            || self.contacts.is_some()
            || !self.tags.is_empty()
            || self.clear_tags
            || self.status.is_some()
            || self.comments.is_some()
    }

    fn apply_to(self, fields: &mut SupplierFields) {
        if let Some(name) = self.name {
            fields.legal_name = name;
        }
        if let Some(external_id) = self.external_id {
            fields.external_id = Some(external_id);
        }
        if let Some(address) = self.address {
            fields.address = Some(address);
        }
        if let Some(prospect) = self.prospect {
            fields.is_prospect = prospect;
        }
        if let Some(region) = self.region {
            fields.region = region;
        }
        if let Some(contacts) = self.contacts {
            fields.contacts = contacts;
        }
        if self.clear_tags {
            fields.tags = TagSet::new();
        } else if !self.tags.is_empty() {
            fields.tags = self.tags.into_iter().collect();
        }
        if let Some(status) = self.status {
            fields.audit_status = status;
        }
        if let Some(comments) = self.comments {
            fields.comments = comments;
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Records per page [default: from settings]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    #[command(flatten)]
    pub view: ViewArgs,

    #[arg(long)]
    pub json: bool,
}

/// Filters and ordering shared by `list` and `export`.
#[derive(Args)]
pub struct ViewArgs {
    /// Keep names containing this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,

    /// Keep records with this text in any column (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Keep records carrying at least one of these tags (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<Tag>,

    /// Keep records in one of these regions (repeatable)
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<Region>,

    /// Keep records with one of these audit statuses (repeatable)
    #[arg(long = "status", value_name = "STATUS")]
    pub statuses: Vec<AuditStatus>,

    /// id, name, external-id, region, audit-status, created-at, updated-at
    #[arg(long, default_value = "id")]
    pub sort: SortKey,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl ViewArgs {
    /// Apply these filters and ordering on top of `base` (paging).
    pub fn query(self, base: ListQuery) -> ListQuery {
        base.with_filter(self.filter)
            .with_search(self.search)
            .with_tags(self.tags)
            .in_regions(self.regions)
            .with_statuses(self.statuses)
            .sorted_by(self.sort, !self.desc)
    }
}

#[derive(Serialize)]
struct ListOutput<'a> {
    page: u32,
    page_size: u32,
    page_count: u64,
    total: u64,
    records: &'a [SupplierRecord],
}

// ============================================================================
// add / show / edit
// ============================================================================

pub fn cmd_add(ctx: &Context, args: AddArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;

    let mut fields = SupplierFields {
        legal_name: args.name,
        external_id: args.external_id,
        is_prospect: args.prospect,
        address: args.address,
        region: args.region.unwrap_or_default(),
        contacts: args.contacts,
        tags: args.tags.into_iter().collect(),
        audit_status: args.status.unwrap_or_default(),
        comments: args.comments,
    };

    if let Some(source) = args.prefill {
        let names = store.lookup_by_name()?;
        let summary = names.get(source.trim()).ok_or_else(|| {
            CliError::not_found(format!("no supplier named '{}'", source.trim()))
                .with_hint("run `vbook names` to see legal names")
        })?;
        if fields.external_id.is_none() {
            fields.external_id = summary.external_id.clone();
        }
        if fields.address.is_none() {
            fields.address = summary.address.clone();
        }
    }

    let id = store.create(&fields)?;
    let record = store.get(id)?;

    if args.json {
        print_json(&record)
    } else {
        println!("created supplier {}: {}", id, record.fields.legal_name);
        Ok(())
    }
}

pub fn cmd_show(ctx: &Context, id: i64, json: bool) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let record = store.get(SupplierId(id))?;

    if json {
        print_json(&record)
    } else {
        print!("{}", describe(&record));
        Ok(())
    }
}

pub fn cmd_edit(ctx: &Context, args: EditArgs) -> Result<(), CliError> {
    if !args.has_changes() {
        return Err(CliError::usage("nothing to change")
            .with_hint("pass at least one field flag, see `vbook edit --help`"));
    }

    let store = ctx.open_store()?;
    let id = SupplierId(args.id);
    let json = args.json;

    let mut fields = store.get(id)?.fields;
    args.apply_to(&mut fields);
    store.update(id, &fields)?;

    let record = store.get(id)?;
    if json {
        print_json(&record)
    } else {
        println!("updated supplier {}: {}", id, record.fields.legal_name);
        Ok(())
    }
}

fn describe(record: &SupplierRecord) -> String {
    let f = &record.fields;
    let lines = [
        ("id", record.id.to_string()),
        ("legal_name", f.legal_name.clone()),
        ("external_id", f.external_id.clone().unwrap_or_default()),
        ("prospect", if f.is_prospect { "yes" } else { "no" }.to_string()),
        ("address", f.address.clone().unwrap_or_default()),
        ("region", f.region.to_string()),
        ("contacts", f.contacts.clone()),
        ("tags", f.tags.to_string()),
        ("audit_status", f.audit_status.to_string()),
        ("comments", f.comments.clone()),
        ("created_at", record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ("updated_at", record.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
    ];

    let mut out = String::new();
    for (key, value) in lines {
        out.push_str(&format!("{:<13} {}\n", key, value));
    }
    out
}

// ============================================================================
// delete / delete-all
// ============================================================================

pub fn cmd_delete(ctx: &Context, ids: Vec<i64>) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let mut deleted = 0;
    for id in &ids {
        if store.delete(SupplierId(*id))? {
            deleted += 1;
        } else {
            eprintln!("note: no supplier {id}; nothing to delete");
        }
    }
    println!("deleted {} of {} supplier(s)", deleted, ids.len());
    Ok(())
}

/// Two-step: the first run reports the count, the second must repeat it.
pub fn cmd_delete_all(ctx: &Context, confirm: Option<u64>) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let count = store.count()?;

    match confirm {
        None => Err(CliError::usage(format!(
            "this permanently deletes all {count} supplier(s)"
        ))
        .with_hint(format!("re-run with --confirm {count}"))),
        Some(n) if n != count => Err(CliError::usage(format!(
            "--confirm {n} does not match the current count ({count}); nothing deleted"
        ))
        .with_hint(format!("re-run with --confirm {count}"))),
        Some(_) => {
            let removed = store.delete_all()?;
            println!("deleted {removed} supplier(s)");
            Ok(())
        }
    }
}

// ============================================================================
// list / names
// ============================================================================

pub fn cmd_list(ctx: &Context, args: ListArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let page_size = args.page_size.unwrap_or(ctx.settings.page_size);

    let query = args.view.query(ListQuery::page(args.page, page_size));
    let page = store.list(&query)?;
    let page_count = page.page_count(page_size);

    if args.json {
        return print_json(&ListOutput {
            page: args.page,
            page_size,
            page_count,
            total: page.total,
            records: &page.records,
        });
    }

    let rows: Vec<Vec<String>> = page
        .records
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.fields.legal_name.clone(),
                r.fields.external_id.clone().unwrap_or_default(),
                r.fields.region.to_string(),
                r.fields.audit_status.to_string(),
                if r.fields.is_prospect { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();

    print!(
        "{}",
        render_table(
            &["id", "legal_name", "external_id", "region", "audit_status", "prospect"],
            &rows,
            MAX_COLUMN_WIDTH,
        )
    );
    println!("page {} of {}, {} supplier(s)", args.page, page_count, page.total);
    Ok(())
}

pub fn cmd_names(ctx: &Context, json: bool) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let names = store.lookup_by_name()?;

    if json {
        return print_json(&names);
    }

    let rows: Vec<Vec<String>> = names
        .iter()
        .map(|(name, summary)| {
            vec![
                name.clone(),
                summary.id.to_string(),
                summary.external_id.clone().unwrap_or_default(),
                summary.address.clone().unwrap_or_default(),
            ]
        })
        .collect();

    print!(
        "{}",
        render_table(&["legal_name", "id", "external_id", "address"], &rows, MAX_COLUMN_WIDTH)
    );
    Ok(())
}
