//! Fixed category sets shown by the income and expense forms.
//!
//! Labels coming from outside (the AI service, imported rows) are matched
//! against these sets ignoring case, underscores, hyphens and spaces. A label
//! that does not match is reported as no match; it is never guessed.

use serde::{Deserialize, Serialize};

/// Expense categories offered by the expense form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Rent and leases.
    Rent,
    /// Staff salaries and wages.
    Salaries,
    /// Stock and inventory purchases.
    Stock,
    /// Fuel, fares, deliveries.
    Transport,
    /// Power, water, bills.
    Utilities,
    /// Advertising and promotion.
    Marketing,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Every category, in form order.
    pub const ALL: [Self; 7] = [
        Self::Rent,
        Self::Salaries,
        Self::Stock,
        Self::Transport,
        Self::Utilities,
        Self::Marketing,
        Self::Other,
    ];

    /// Stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Salaries => "salaries",
            Self::Stock => "stock",
            Self::Transport => "transport",
            Self::Utilities => "utilities",
            Self::Marketing => "marketing",
            Self::Other => "other",
        }
    }

    /// Maps a free-text label onto the fixed set.
    #[must_use]
    pub fn match_label(label: &str) -> Option<Self> {
        match_in(&Self::ALL, label, Self::as_str)
    }
}

/// Income categories offered by the income form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeCategory {
    /// Goods sold.
    ProductSale,
    /// Services rendered.
    Service,
    /// Commission earned.
    Commission,
    /// Anything else.
    Other,
}

impl IncomeCategory {
    /// Every category, in form order.
    pub const ALL: [Self; 4] = [
        Self::ProductSale,
        Self::Service,
        Self::Commission,
        Self::Other,
    ];

    /// Stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductSale => "product_sale",
            Self::Service => "service",
            Self::Commission => "commission",
            Self::Other => "other",
        }
    }

    /// Maps a free-text label onto the fixed set.
    #[must_use]
    pub fn match_label(label: &str) -> Option<Self> {
        match_in(&Self::ALL, label, Self::as_str)
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for IncomeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercases and strips separators: `"Product Sale"` and `"product_sale"`
/// both become `"productsale"`.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn match_in<T: Copy>(all: &[T], label: &str, as_str: fn(T) -> &'static str) -> Option<T> {
    let wanted = normalize_label(label);
    if wanted.is_empty() {
        return None;
    }
    all.iter()
        .copied()
        .find(|candidate| normalize_label(as_str(*candidate)) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rent", Some(ExpenseCategory::Rent))]
    #[case("RENT", Some(ExpenseCategory::Rent))]
    #[case("  Salaries ", Some(ExpenseCategory::Salaries))]
    #[case("uti_lities", Some(ExpenseCategory::Utilities))]
    #[case("Marketing", Some(ExpenseCategory::Marketing))]
    #[case("groceries", None)]
    #[case("salary", None)]
    #[case("", None)]
    #[case("___", None)]
    fn test_expense_matching(#[case] label: &str, #[case] expected: Option<ExpenseCategory>) {
        assert_eq!(ExpenseCategory::match_label(label), expected);
    }

    #[rstest]
    #[case("product_sale", Some(IncomeCategory::ProductSale))]
    #[case("Product Sale", Some(IncomeCategory::ProductSale))]
    #[case("PRODUCT-SALE", Some(IncomeCategory::ProductSale))]
    #[case("commission", Some(IncomeCategory::Commission))]
    #[case("refund", None)]
    fn test_income_matching(#[case] label: &str, #[case] expected: Option<IncomeCategory>) {
        assert_eq!(IncomeCategory::match_label(label), expected);
    }

    #[test]
    fn test_every_label_round_trips() {
        for category in ExpenseCategory::ALL {
            assert_eq!(ExpenseCategory::match_label(category.as_str()), Some(category));
        }
        for category in IncomeCategory::ALL {
            assert_eq!(IncomeCategory::match_label(&category.to_string()), Some(category));
        }
    }

    #[test]
    fn test_serde_matches_stored_label() {
        let json = serde_json::to_string(&IncomeCategory::ProductSale).unwrap();
        assert_eq!(json, "\"product_sale\"");
    }
}
