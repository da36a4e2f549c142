//! Dashboard indicators computed over a snapshot of records.

use std::collections::BTreeMap;

use serde::Serialize;

use vendorbook_core::{AuditStatus, Region, SupplierRecord, Tag};

/// Quick filter applied before the region / status filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickFilter {
    #[default]
    All,
    /// Tagged "Fournisseur critique".
    Critical,
    Prospects,
    /// Tagged "Audit à planifier".
    AuditToSchedule,
}

impl std::str::FromStr for QuickFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Self::All),
            "critical" => Ok(Self::Critical),
            "prospects" | "prospect" => Ok(Self::Prospects),
            "audit_to_schedule" | "audit" => Ok(Self::AuditToSchedule),
            other => Err(format!("unknown quick filter: '{other}'")),
        }
    }
}

/// Empty `regions` / `statuses` mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub quick: QuickFilter,
    pub regions: Vec<Region>,
    pub statuses: Vec<AuditStatus>,
}

impl StatsFilter {
    pub fn matches(&self, record: &SupplierRecord) -> bool {
        let fields = &record.fields;
        let quick = match self.quick {
            QuickFilter::All => true,
            QuickFilter::Critical => fields.tags.contains(Tag::Critical),
            QuickFilter::Prospects => fields.is_prospect,
            QuickFilter::AuditToSchedule => fields.tags.contains(Tag::AuditToSchedule),
        };
        quick
            && (self.regions.is_empty() || self.regions.contains(&fields.region))
            && (self.statuses.is_empty() || self.statuses.contains(&fields.audit_status))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub critical: usize,
    pub prospects: usize,
    pub by_region: BTreeMap<Region, usize>,
    pub by_audit_status: BTreeMap<AuditStatus, usize>,
    /// "YYYY-MM" of `created_at` → count.
    pub created_per_month: BTreeMap<String, usize>,
}

impl Stats {
    pub fn compute(records: &[SupplierRecord], filter: &StatsFilter) -> Self {
        let mut stats = Stats::default();

        for record in records.iter().filter(|r| filter.matches(r)) {
            let fields = &record.fields;
            stats.total += 1;
            if fields.tags.contains(Tag::Critical) {
                stats.critical += 1;
            }
            if fields.is_prospect {
                stats.prospects += 1;
            }
            *stats.by_region.entry(fields.region).or_default() += 1;
            *stats.by_audit_status.entry(fields.audit_status).or_default() += 1;
            *stats
                .created_per_month
                .entry(record.created_at.format("%Y-%m").to_string())
                .or_default() += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vendorbook_core::{SupplierFields, SupplierId};

    fn record(
        id: i64,
        region: Region,
        status: AuditStatus,
        critical: bool,
        prospect: bool,
    ) -> SupplierRecord {
        let mut fields = SupplierFields::named(format!("S{id}"));
        fields.region = region;
        fields.audit_status = status;
        fields.is_prospect = prospect;
        if critical {
            fields.tags.insert(Tag::Critical);
        }
        let month = if id % 2 == 0 { 1 } else { 2 };
        let at = Utc.with_ymd_and_hms(2024, month, 10, 8, 0, 0).unwrap();
        SupplierRecord {
            id: SupplierId(id),
            fields,
            created_at: at,
            updated_at: at,
        }
    }

    fn sample() -> Vec<SupplierRecord> {
        vec![
            record(1, Region::Geneva, AuditStatus::Pending, true, false),
            record(2, Region::Vaud, AuditStatus::Done, false, true),
            record(3, Region::Geneva, AuditStatus::Done, true, true),
            record(4, Region::France, AuditStatus::NotConcerned, false, false),
        ]
    }

    #[test]
    fn unfiltered_counts() {
        let stats = Stats::compute(&sample(), &StatsFilter::default());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.critical, 2);
        assert_eq!(stats.prospects, 2);
        assert_eq!(stats.by_region[&Region::Geneva], 2);
        assert_eq!(stats.by_audit_status[&AuditStatus::Done], 2);
        assert_eq!(stats.created_per_month["2024-01"], 2);
        assert_eq!(stats.created_per_month["2024-02"], 2);
    }

    #[test]
    fn quick_filter_then_region_filter() {
        let filter = StatsFilter {
            quick: QuickFilter::Critical,
            regions: vec![Region::Geneva],
            statuses: vec![AuditStatus::Done],
        };
        let stats = Stats::compute(&sample(), &filter);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.prospects, 1);
    }

    #[test]
    fn prospects_filter() {
        let filter = StatsFilter {
            quick: QuickFilter::Prospects,
            ..StatsFilter::default()
        };
        assert_eq!(Stats::compute(&sample(), &filter).total, 2);
    }

    #[test]
    fn audit_to_schedule_filter_uses_the_tag() {
        let mut records = sample();
        records[3].fields.tags.insert(Tag::AuditToSchedule);
        let filter = StatsFilter {
            quick: "audit-to-schedule".parse().unwrap(),
            ..StatsFilter::default()
        };
        let stats = Stats::compute(&records, &filter);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_region[&Region::France], 1);
    }
}
