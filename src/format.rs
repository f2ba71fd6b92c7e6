use encoding_rs::Encoding;

use crate::amount::AmountDerivation;

/// One position in a headerless file's column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    Named(&'static str),
    /// A column that is read (and hashed) but never looked up by name.
    Placeholder,
}

impl ColumnSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Named(name) => name,
            Self::Placeholder => "",
        }
    }
}

/// Everything needed to parse one bank's CSV export. Pure data.
#[derive(Debug, Clone)]
pub struct FormatDescriptor {
    pub display_name: &'static str,
    /// strftime-style pattern, e.g. `%m/%d/%Y`
    pub date_format: &'static str,
    pub date_column: &'static str,
    pub concept_column: &'static str,
    pub amount_column: &'static str,
    pub encoding: &'static Encoding,
    pub negate_amount: bool,
    /// Positional names for files without a header row.
    pub headerless_columns: Option<&'static [ColumnSlot]>,
    pub amount_derivation: AmountDerivation,
}

impl FormatDescriptor {
    /// Header-row CSV, Latin-1 text, direct amount, no negation.
    pub fn new(
        display_name: &'static str,
        date_format: &'static str,
        date_column: &'static str,
        concept_column: &'static str,
        amount_column: &'static str,
    ) -> Self {
        Self {
            display_name,
            date_format,
            date_column,
            concept_column,
            amount_column,
            // WHATWG maps the "latin1" label to windows-1252
            encoding: encoding_rs::WINDOWS_1252,
            negate_amount: false,
            headerless_columns: None,
            amount_derivation: AmountDerivation::Direct,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate_amount = true;
        self
    }

    pub fn headerless(mut self, columns: &'static [ColumnSlot]) -> Self {
        self.headerless_columns = Some(columns);
        self
    }

    pub fn derived(mut self, derivation: AmountDerivation) -> Self {
        self.amount_derivation = derivation;
        self
    }

    /// Columns that must be present for a file to match this format.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.date_column, self.concept_column];
        for column in self.amount_derivation.columns(self.amount_column) {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}
