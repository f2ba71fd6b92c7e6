use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// How the signed canonical amount is computed from the raw columns of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountDerivation {
    /// The descriptor's amount column, as-is.
    Direct,
    /// An unsigned amount column whose sign comes from a parallel type column.
    /// Negated unless the type cell equals `credit_marker`.
    SignByType {
        amount_column: &'static str,
        type_column: &'static str,
        credit_marker: &'static str,
    },
    /// Separate credit and debit columns; blank cells count as zero.
    CreditMinusDebit {
        credit_column: &'static str,
        debit_column: &'static str,
    },
}

impl AmountDerivation {
    pub fn sign_by_type() -> Self {
        Self::SignByType {
            amount_column: "Transaction Amount",
            type_column: "Transaction Type",
            credit_marker: "Credit",
        }
    }

    pub fn credit_minus_debit() -> Self {
        Self::CreditMinusDebit {
            credit_column: "Credit",
            debit_column: "Debit",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::SignByType { .. } => "sign_by_type",
            Self::CreditMinusDebit { .. } => "credit_minus_debit",
        }
    }

    /// Raw columns this derivation reads. `amount_column` is the
    /// descriptor's amount column, only used by `Direct`.
    pub fn columns(&self, amount_column: &'static str) -> Vec<&'static str> {
        match *self {
            Self::Direct => vec![amount_column],
            Self::SignByType {
                amount_column,
                type_column,
                ..
            } => vec![amount_column, type_column],
            Self::CreditMinusDebit {
                credit_column,
                debit_column,
            } => vec![credit_column, debit_column],
        }
    }

    /// Compute the amount for one row. `cell` returns the raw text of a
    /// named column (empty when the row has no value there).
    pub fn derive<'r, F>(&self, amount_column: &str, cell: F) -> Result<Decimal, String>
    where
        F: Fn(&str) -> &'r str,
    {
        match *self {
            Self::Direct => parse_amount(cell(amount_column)),
            Self::SignByType {
                amount_column,
                type_column,
                credit_marker,
            } => {
                let amount = parse_amount(cell(amount_column))?;
                if cell(type_column).trim() == credit_marker {
                    Ok(amount)
                } else {
                    Ok(negate(amount))
                }
            }
            Self::CreditMinusDebit {
                credit_column,
                debit_column,
            } => {
                let credit = parse_amount_or_zero(cell(credit_column))?;
                let debit = parse_amount_or_zero(cell(debit_column))?;
                let net = credit.checked_sub(debit).ok_or_else(out_of_range)?;
                to_cents(net)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse a bank amount cell into a decimal with exactly two fraction digits.
/// Accepts `$`, thousands separators and accounting-style `(12.34)` negatives.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let s = raw.trim().replace(&[',', '$', '"'][..], "");
    let s = s.trim();
    if s.is_empty() {
        return Err("empty amount".to_string());
    }
    let (negative, digits) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };
    let value = Decimal::from_str(digits).map_err(|_| format!("invalid amount {raw:?}"))?;
    let value = to_cents(value)?;
    Ok(if negative { negate(value) } else { value })
}

/// Like [`parse_amount`], but a blank cell is zero.
pub fn parse_amount_or_zero(raw: &str) -> Result<Decimal, String> {
    if raw.trim().is_empty() {
        to_cents(Decimal::ZERO)
    } else {
        parse_amount(raw)
    }
}

/// Flip the sign without producing a negative zero.
pub fn negate(value: Decimal) -> Decimal {
    let mut flipped = -value;
    if flipped.is_zero() {
        flipped.set_sign_positive(true);
    }
    flipped
}

/// Round to cents and force exactly two fraction digits. Values too large
/// to carry two digits are rejected rather than stored at a different scale.
fn to_cents(value: Decimal) -> Result<Decimal, String> {
    let mut cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    cents.rescale(2);
    if cents.scale() != 2 {
        return Err(out_of_range());
    }
    Ok(cents)
}

fn out_of_range() -> String {
    "amount out of range".to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    use super::*;

    fn row<'a>(cells: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> &'a str + 'a {
        move |name| cells.get(name).copied().unwrap_or("")
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-45.50").unwrap(), dec!(-45.50));
        assert_eq!(parse_amount("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("  2.45 ").unwrap(), dec!(2.45));
        assert_eq!(parse_amount("$1,000").unwrap().to_string(), "1000.00");
        assert_eq!(parse_amount("(50.00)").unwrap(), dec!(-50.00));
    }

    #[test]
    fn test_parse_amount_always_two_digits() {
        assert_eq!(parse_amount("45.5").unwrap().to_string(), "45.50");
        assert_eq!(parse_amount("3").unwrap().to_string(), "3.00");
        assert_eq!(parse_amount("0.125").unwrap().to_string(), "0.12");
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12.3.4").is_err());
    }

    #[test]
    fn test_direct_passes_amount_through() {
        let cells = HashMap::from([("Amount", "-45.50")]);
        let amount = AmountDerivation::Direct.derive("Amount", row(&cells)).unwrap();
        assert_eq!(amount, dec!(-45.50));
    }

    #[test]
    fn test_sign_by_type_negates_debits() {
        let cells = HashMap::from([("Transaction Amount", "45.50"), ("Transaction Type", "Debit")]);
        let amount = AmountDerivation::sign_by_type().derive("Amount", row(&cells)).unwrap();
        assert_eq!(amount, dec!(-45.50));
    }

    #[test]
    fn test_sign_by_type_keeps_credits() {
        let cells = HashMap::from([("Transaction Amount", "1152.91"), ("Transaction Type", "Credit")]);
        let amount = AmountDerivation::sign_by_type().derive("Amount", row(&cells)).unwrap();
        assert_eq!(amount, dec!(1152.91));
    }

    #[test]
    fn test_sign_by_type_uses_custom_marker() {
        let derivation = AmountDerivation::SignByType {
            amount_column: "Amt",
            type_column: "Kind",
            credit_marker: "CR",
        };
        let credit = HashMap::from([("Amt", "10.00"), ("Kind", "CR")]);
        let other = HashMap::from([("Amt", "10.00"), ("Kind", "Credit")]);
        assert_eq!(derivation.derive("Amount", row(&credit)).unwrap(), dec!(10.00));
        assert_eq!(derivation.derive("Amount", row(&other)).unwrap(), dec!(-10.00));
    }

    #[test]
    fn test_credit_minus_debit_treats_blank_as_zero() {
        let derivation = AmountDerivation::credit_minus_debit();
        let debit_only = HashMap::from([("Credit", ""), ("Debit", "12.34")]);
        let credit_only = HashMap::from([("Credit", "100.00"), ("Debit", " ")]);
        let both = HashMap::from([("Credit", "5.00"), ("Debit", "2.50")]);
        assert_eq!(derivation.derive("Amount", row(&debit_only)).unwrap(), dec!(-12.34));
        assert_eq!(derivation.derive("Amount", row(&credit_only)).unwrap(), dec!(100.00));
        assert_eq!(derivation.derive("Amount", row(&both)).unwrap(), dec!(2.50));
    }

    #[test]
    fn test_amount_out_of_range_is_parse_failure() {
        let err = parse_amount("79228162514264337593543950335").unwrap_err();
        assert_eq!(err, "amount out of range");

        let derivation = AmountDerivation::credit_minus_debit();
        let extreme = HashMap::from([
            ("Credit", "792281625142643375935439503.35"),
            ("Debit", "-792281625142643375935439503.35"),
        ]);
        assert_eq!(derivation.derive("Amount", row(&extreme)).unwrap_err(), "amount out of range");

        let largest = parse_amount("792281625142643375935439503.35").unwrap();
        assert_eq!(largest.scale(), 2);
    }

    #[test]
    fn test_negate_never_yields_negative_zero() {
        assert_eq!(negate(dec!(0.00)).to_string(), "0.00");
        assert_eq!(negate(dec!(2.45)), dec!(-2.45));
    }

    #[test]
    fn test_columns_per_variant() {
        assert_eq!(AmountDerivation::Direct.columns("Amount"), vec!["Amount"]);
        assert_eq!(
            AmountDerivation::sign_by_type().columns("Amount"),
            vec!["Transaction Amount", "Transaction Type"]
        );
        assert_eq!(
            AmountDerivation::credit_minus_debit().columns("Amount"),
            vec!["Credit", "Debit"]
        );
    }
}
