// 🧮 Aggregation - Category Buckets
// Per-category totals, per-period subtotals and the matched raw records

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::TotalOverflow;

/// Accumulator for one category key.
///
/// `total` always equals the sum of `period_totals` and the sum of every
/// amount added; `transactions` only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBucket {
    pub total: Decimal,
    pub period_totals: BTreeMap<String, Decimal>,
    pub transactions: Vec<String>,
}

impl CategoryBucket {
    pub fn new() -> Self {
        CategoryBucket::default()
    }

    /// Add one amount. Returns `None` and leaves the bucket untouched when
    /// either running total would leave the decimal range.
    pub fn add(&mut self, period: &str, amount: Decimal, raw: &str) -> Option<()> {
        let total = self.total.checked_add(amount)?;
        let current = self.period_totals.get(period).copied().unwrap_or_default();
        let subtotal = current.checked_add(amount)?;

        self.total = total;
        self.period_totals.insert(period.to_string(), subtotal);
        self.transactions.push(raw.to_string());
        Some(())
    }
}

/// Category key -> bucket, created empty per run and only ever grown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    buckets: BTreeMap<String, CategoryBucket>,
}

impl Aggregation {
    pub fn new() -> Self {
        Aggregation::default()
    }

    /// Add one record's amount, creating the bucket on first use
    pub fn add(
        &mut self,
        category: &str,
        period: &str,
        amount: Decimal,
        raw: &str,
    ) -> Result<(), TotalOverflow> {
        let added = match self.buckets.get_mut(category) {
            Some(bucket) => bucket.add(period, amount, raw),
            None => {
                let mut bucket = CategoryBucket::new();
                let added = bucket.add(period, amount, raw);
                self.buckets.insert(category.to_string(), bucket);
                added
            }
        };

        added.ok_or_else(|| TotalOverflow {
            category: category.to_string(),
        })
    }

    pub fn get(&self, category: &str) -> Option<&CategoryBucket> {
        self.buckets.get(category)
    }

    /// Buckets in lexicographic key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryBucket)> + '_ {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of every bucket total, `None` if it leaves the decimal range
    pub fn grand_total(&self) -> Option<Decimal> {
        self.buckets
            .values()
            .try_fold(Decimal::ZERO, |sum, b| sum.checked_add(b.total))
    }

    pub fn transaction_count(&self) -> usize {
        self.buckets.values().map(|b| b.transactions.len()).sum()
    }
}
