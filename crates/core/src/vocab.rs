//! Closed vocabularies: region, audit status and tags.
//!
//! Each value has a stable snake_case code (used in JSON and CLI flags) and a
//! label (the text stored in the table and shown to people). Parsing accepts
//! either, case-insensitively.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A value that is not part of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabel {}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal, default = $default:ident) {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant ),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Stable machine code.
            pub fn code(&self) -> &'static str {
                match self {
                    $( Self::$variant => $code ),+
                }
            }

            /// Stored / displayed label.
            pub fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                let code = wanted.replace('-', "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().to_lowercase() == wanted || v.code() == code)
                    .ok_or_else(|| UnknownLabel { kind: $kind, value: s.trim().to_string() })
            }
        }
    };
}

vocabulary! {
    /// Country or canton a supplier is attached to.
    pub enum Region ("region", default = Geneva) {
        Geneva => ("geneva", "Genève"),
        Vaud => ("vaud", "Vaud"),
        Valais => ("valais", "Valais"),
        France => ("france", "France"),
        Germany => ("germany", "Allemagne"),
        Italy => ("italy", "Italie"),
        Other => ("other", "Autre"),
    }
}

vocabulary! {
    /// Compliance audit progress.
    pub enum AuditStatus ("audit status", default = NotConcerned) {
        NotConcerned => ("not_concerned", "Non concerné"),
        Pending => ("pending", "En attente"),
        Planned => ("planned", "Planifié"),
        Done => ("done", "Réalisé"),
        MajorNonConformity => ("major_non_conformity", "Non-conformité majeure"),
    }
}

vocabulary! {
    /// Classification tag.
    pub enum Tag ("tag", default = NonCritical) {
        Critical => ("critical", "Fournisseur critique"),
        NonCritical => ("non_critical", "Fournisseur non critique"),
        Compliant => ("compliant", "Conforme"),
        NonCompliant => ("non_compliant", "Non conforme"),
        AuditToSchedule => ("audit_to_schedule", "Audit à planifier"),
        CsrPlus => ("csr_plus", "RSE+"),
        Innovation => ("innovation", "Innovation"),
    }
}

/// Written between labels in the stored form. Reading splits on the comma alone.
const TAG_SEPARATOR: &str = ", ";

/// Set of tags. Order and duplicates carry no meaning; iteration follows the
/// vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    pub fn remove(&mut self, tag: Tag) -> bool {
        self.0.remove(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }

    /// Labels joined with `", "`, the form kept in the `tags` column.
    pub fn to_storage(&self) -> String {
        let labels: Vec<&str> = self.0.iter().map(|t| t.label()).collect();
        labels.join(TAG_SEPARATOR)
    }

    /// Parse the stored form. Accepts `,` and `, ` separators; empty segments
    /// are skipped.
    pub fn from_storage(text: &str) -> Result<Self, UnknownLabel> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Tag::from_str)
            .collect()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage())
    }
}
