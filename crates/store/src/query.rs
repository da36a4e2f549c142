use std::fmt;
use std::str::FromStr;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use vendorbook_core::{AuditStatus, Region, SupplierRecord, Tag};

/// Column a listing is ordered by. Ties always fall back to `id` ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    LegalName,
    ExternalId,
    Region,
    AuditStatus,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    /// ORDER BY expression. Closed set, never built from user text.
    pub(crate) fn order_expr(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::LegalName => "legal_name COLLATE NOCASE",
            Self::ExternalId => "external_id",
            Self::Region => "region",
            Self::AuditStatus => "audit_status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Id => "id",
            Self::LegalName => "legal_name",
            Self::ExternalId => "external_id",
            Self::Region => "region",
            Self::AuditStatus => "audit_status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        };
        f.write_str(name)
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "id" => Ok(Self::Id),
            "legal_name" | "name" => Ok(Self::LegalName),
            "external_id" => Ok(Self::ExternalId),
            "region" => Ok(Self::Region),
            "audit_status" => Ok(Self::AuditStatus),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            other => Err(format!("unknown sort key: '{other}'")),
        }
    }
}

/// Parameters of one `list` call. Stateless: the caller owns the page cursor.
///
/// Text filters match as given, surrounding spaces included, ignoring case.
/// Empty `tags` / `regions` / `statuses` mean "no restriction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Page size; `None` returns every matching record.
    pub limit: Option<u32>,
    pub offset: u32,
    /// Substring of the legal name.
    pub name_filter: Option<String>,
    /// Substring of any text column: name, external id, address, region,
    /// contacts, tags, audit status or comments.
    pub search: Option<String>,
    /// Keep records carrying at least one of these.
    pub tags: Vec<Tag>,
    pub regions: Vec<Region>,
    pub statuses: Vec<AuditStatus>,
    pub sort: SortKey,
    pub ascending: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: None,
            offset: 0,
            name_filter: None,
            search: None,
            tags: Vec::new(),
            regions: Vec::new(),
            statuses: Vec::new(),
            sort: SortKey::Id,
            ascending: true,
        }
    }
}

impl ListQuery {
    /// Query for 1-based page `page` of size `page_size`.
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            limit: Some(page_size),
            offset: page.saturating_sub(1).saturating_mul(page_size),
            ..Self::default()
        }
    }

    /// Blank filters are dropped; anything else is kept verbatim.
    pub fn with_filter(mut self, filter: Option<impl Into<String>>) -> Self {
        self.name_filter = non_blank(filter);
        self
    }

    pub fn with_search(mut self, search: Option<impl Into<String>>) -> Self {
        self.search = non_blank(search);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn in_regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.regions = regions.into_iter().collect();
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = AuditStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn sorted_by(mut self, sort: SortKey, ascending: bool) -> Self {
        self.sort = sort;
        self.ascending = ascending;
        self
    }
}

impl ListQuery {
    /// WHERE clause (without the keyword) and its positional parameters.
    pub(crate) fn predicate(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(name) = &self.name_filter {
            clauses.push("instr(vb_fold(legal_name), ?) > 0".to_string());
            params.push(Value::Text(name.to_lowercase()));
        }

        if let Some(search) = &self.search {
            let any = SEARCH_COLUMNS
                .iter()
                .map(|col| format!("instr(vb_fold(coalesce({col}, '')), ?) > 0"))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({any})"));
            let needle = search.to_lowercase();
            params.extend(SEARCH_COLUMNS.iter().map(|_| Value::Text(needle.clone())));
        }

        if !self.tags.is_empty() {
            // Stored tags are joined with ", " and labels never contain a comma
            let any = vec!["instr(', ' || tags || ', ', ?) > 0"; self.tags.len()].join(" OR ");
            clauses.push(format!("({any})"));
            params.extend(self.tags.iter().map(|t| Value::Text(format!(", {}, ", t.label()))));
        }

        push_in(&mut clauses, &mut params, "region", self.regions.iter().map(|r| r.label()));
        push_in(&mut clauses, &mut params, "audit_status", self.statuses.iter().map(|s| s.label()));

        if clauses.is_empty() {
            ("1".to_string(), params)
        } else {
            (clauses.join(" AND "), params)
        }
    }
}

const SEARCH_COLUMNS: &[&str] = &[
    "legal_name",
    "external_id",
    "address",
    "region",
    "contacts",
    "tags",
    "audit_status",
    "comments",
];

fn push_in<'a>(
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
    column: &str,
    labels: impl ExactSizeIterator<Item = &'a str>,
) {
    if labels.len() == 0 {
        return;
    }
    let marks = vec!["?"; labels.len()].join(", ");
    clauses.push(format!("{column} IN ({marks})"));
    params.extend(labels.map(|l| Value::Text(l.to_string())));
}

fn non_blank(value: Option<impl Into<String>>) -> Option<String> {
    value.map(Into::into).filter(|v: &String| !v.trim().is_empty())
}

/// One page of records plus the filtered total (ignoring limit/offset).
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub records: Vec<SupplierRecord>,
    pub total: u64,
}

impl Page {
    /// Number of pages of size `page_size` needed for `total`; at least 1.
    pub fn page_count(&self, page_size: u32) -> u64 {
        if self.total == 0 || page_size == 0 {
            1
        } else {
            self.total.div_ceil(u64::from(page_size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offsets() {
        assert_eq!(ListQuery::page(1, 10).offset, 0);
        assert_eq!(ListQuery::page(3, 10).offset, 20);
        assert_eq!(ListQuery::page(0, 10).offset, 0);
    }

    #[test]
    fn blank_filter_is_dropped() {
        assert_eq!(ListQuery::default().with_filter(Some("  ")).name_filter, None);
        assert_eq!(
            ListQuery::default().with_filter(Some("acm")).name_filter.as_deref(),
            Some("acm")
        );
    }

    #[test]
    fn filters_are_kept_verbatim() {
        let query = ListQuery::default().with_filter(Some("Acme ")).with_search(Some(" jane"));
        assert_eq!(query.name_filter.as_deref(), Some("Acme "));
        assert_eq!(query.search.as_deref(), Some(" jane"));
    }

    #[test]
    fn predicate_binds_one_param_per_placeholder() {
        let query = ListQuery::default()
            .with_filter(Some("acme"))
            .with_search(Some("jane"))
            .with_tags([Tag::Critical, Tag::CsrPlus])
            .in_regions([Region::Vaud])
            .with_statuses([AuditStatus::Pending, AuditStatus::Done]);
        let (sql, params) = query.predicate();
        assert_eq!(sql.matches('?').count(), params.len());
        assert_eq!(params.len(), 1 + SEARCH_COLUMNS.len() + 2 + 1 + 2);
        assert!(sql.contains("region IN (?)"));

        let (sql, params) = ListQuery::default().predicate();
        assert_eq!(sql, "1");
        assert!(params.is_empty());
    }

    #[test]
    fn page_count_rounds_up() {
        let page = Page { records: vec![], total: 21 };
        assert_eq!(page.page_count(10), 3);
        let empty = Page { records: vec![], total: 0 };
        assert_eq!(empty.page_count(10), 1);
    }

    #[test]
    fn sort_key_parses_aliases() {
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::LegalName);
        assert_eq!("updated-at".parse::<SortKey>().unwrap(), SortKey::UpdatedAt);
        assert!("color".parse::<SortKey>().is_err());
    }
}
