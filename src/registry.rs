use std::collections::BTreeMap;

use crate::amount::AmountDerivation;
use crate::error::{Result, TallyError};
use crate::format::{ColumnSlot, FormatDescriptor};
use crate::normalizer::RowNormalizer;

// Format keys are persisted on accounts. Never rename or reuse one.
pub const SOFI_SAVINGS: &str = "sofi-savings";
pub const SOFI_CHECKING: &str = "sofi-checking";
pub const CO_CHECKING: &str = "co-checking";
pub const CO_SAVINGS: &str = "co-savings";
pub const CO_QUICKSILVER: &str = "co-quicksilver";
pub const AMEX_DELTA: &str = "amex-delta";
pub const CHASE: &str = "chase";
pub const DISCOVER: &str = "discover";
pub const WF_CHECKING: &str = "wf-checking";
pub const WF_SAVINGS: &str = "wf-savings";

const WELLS_FARGO_LAYOUT: &[ColumnSlot] = &[
    ColumnSlot::Named("Date"),
    ColumnSlot::Named("Amount"),
    ColumnSlot::Placeholder,
    ColumnSlot::Placeholder,
    ColumnSlot::Named("Description"),
];

/// Immutable map from format key to a normalizer bound to its descriptor.
/// Built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    normalizers: BTreeMap<&'static str, RowNormalizer>,
}

impl FormatRegistry {
    pub fn new(normalizers: impl IntoIterator<Item = RowNormalizer>) -> Self {
        Self {
            normalizers: normalizers.into_iter().map(|n| (n.key(), n)).collect(),
        }
    }

    /// Every format this build supports.
    pub fn builtin() -> Self {
        Self::new([
            RowNormalizer::new(
                SOFI_SAVINGS,
                FormatDescriptor::new("SoFi Savings", "%Y-%m-%d", "Date", "Description", "Amount"),
            ),
            RowNormalizer::new(
                SOFI_CHECKING,
                FormatDescriptor::new("SoFi Checking", "%Y-%m-%d", "Date", "Description", "Amount"),
            ),
            RowNormalizer::new(
                CO_CHECKING,
                FormatDescriptor::new(
                    "CO Checking",
                    "%m/%d/%y",
                    "Transaction Date",
                    "Transaction Description",
                    "Amount",
                )
                .derived(AmountDerivation::sign_by_type()),
            ),
            RowNormalizer::new(
                CO_SAVINGS,
                FormatDescriptor::new(
                    "CO Savings",
                    "%m/%d/%y",
                    "Transaction Date",
                    "Transaction Description",
                    "Amount",
                )
                .derived(AmountDerivation::sign_by_type()),
            ),
            RowNormalizer::new(
                CO_QUICKSILVER,
                FormatDescriptor::new("Quicksilver", "%Y-%m-%d", "Transaction Date", "Description", "Amount")
                    .derived(AmountDerivation::credit_minus_debit()),
            ),
            RowNormalizer::new(
                AMEX_DELTA,
                FormatDescriptor::new("Delta", "%m/%d/%Y", "Date", "Description", "Amount").negated(),
            ),
            RowNormalizer::new(
                CHASE,
                FormatDescriptor::new("Chase", "%m/%d/%Y", "Transaction Date", "Description", "Amount"),
            ),
            RowNormalizer::new(
                DISCOVER,
                FormatDescriptor::new("Discover", "%m/%d/%Y", "Trans. Date", "Description", "Amount").negated(),
            ),
            RowNormalizer::new(
                WF_CHECKING,
                FormatDescriptor::new("WF Checking", "%m/%d/%Y", "Date", "Description", "Amount")
                    .headerless(WELLS_FARGO_LAYOUT),
            ),
            RowNormalizer::new(
                WF_SAVINGS,
                FormatDescriptor::new("WF Savings", "%m/%d/%Y", "Date", "Description", "Amount")
                    .headerless(WELLS_FARGO_LAYOUT),
            ),
        ])
    }

    /// An unknown key means an account references a format this build
    /// no longer ships: a configuration error, not a data error.
    pub fn get(&self, key: &str) -> Result<&RowNormalizer> {
        self.normalizers
            .get(key)
            .ok_or_else(|| TallyError::UnknownFormatKey(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.normalizers.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowNormalizer> {
        self.normalizers.values()
    }

    pub fn len(&self) -> usize {
        self.normalizers.len()
    }
}
