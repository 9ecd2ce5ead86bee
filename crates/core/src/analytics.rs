use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// Crop categories the marketplace lists. Also the fixed axis for the
/// category sales rollup.
pub const PRODUCT_CATEGORIES: &[&str] =
    &["Rice", "Wheat", "Corn", "Pulses", "Fruits", "Vegetables", "Sugarcane", "Spices"];

/// One submitted order row joined with its product's current price and
/// category. Rows whose product was deleted since the order leave both
/// fields empty and are skipped by the rollups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub product_id: ProductId,
    pub order_qty: u32,
    pub price_per_unit: Option<Decimal>,
    pub category: Option<String>,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSales {
    pub date: NaiveDate,
    pub total_sales: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: Decimal,
}

fn resolvable(record: &SalesRecord) -> Option<(Decimal, &SalesRecord)> {
    record.price_per_unit.map(|price| (price, record))
}

/// Daily sales totals over records ordered by date; consecutive runs of the
/// same date collapse into one point.
pub fn sales_by_date(records: &[SalesRecord]) -> Vec<DateSales> {
    let mut points: Vec<DateSales> = Vec::new();
    for (price, record) in records.iter().filter_map(resolvable) {
        let amount = price * Decimal::from(record.order_qty);
        match points.last_mut() {
            Some(last) if last.date == record.date => last.total_sales += amount,
            _ => points.push(DateSales { date: record.date, total_sales: amount }),
        }
    }
    points
}

/// Sales totals per category over the fixed category axis. Categories with
/// no sales still appear with a zero total so charts keep a stable shape.
pub fn sales_by_category(records: &[SalesRecord]) -> Vec<CategorySales> {
    let mut totals: Vec<CategorySales> = PRODUCT_CATEGORIES
        .iter()
        .map(|category| CategorySales {
            category: (*category).to_string(),
            total_sales: Decimal::ZERO,
        })
        .collect();

    for (price, record) in records.iter().filter_map(resolvable) {
        let Some(category) = record.category.as_deref() else {
            continue;
        };
        if let Some(entry) = totals.iter_mut().find(|entry| entry.category == category) {
            entry.total_sales += price * Decimal::from(record.order_qty);
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{sales_by_category, sales_by_date, SalesRecord, PRODUCT_CATEGORIES};
    use crate::domain::product::ProductId;

    fn record(
        id: &str,
        qty: u32,
        price: Option<i64>,
        category: Option<&str>,
        day: u32,
    ) -> SalesRecord {
        SalesRecord {
            product_id: ProductId(id.to_string()),
            order_qty: qty,
            price_per_unit: price.map(Decimal::from),
            category: category.map(str::to_string),
            date: NaiveDate::from_ymd_opt(2026, 3, day).expect("valid date"),
        }
    }

    #[test]
    fn groups_consecutive_same_date_records() {
        let records = vec![
            record("p-1", 2, Some(100), Some("Rice"), 1),
            record("p-2", 1, Some(50), Some("Wheat"), 1),
            record("p-3", 3, Some(10), Some("Rice"), 2),
        ];

        let points = sales_by_date(&records);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].total_sales, Decimal::from(250));
        assert_eq!(points[1].total_sales, Decimal::from(30));
    }

    #[test]
    fn skips_records_without_a_resolvable_price() {
        let records = vec![
            record("p-1", 2, None, Some("Rice"), 1),
            record("p-2", 1, Some(40), Some("Rice"), 1),
        ];

        let points = sales_by_date(&records);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].total_sales, Decimal::from(40));
    }

    #[test]
    fn empty_input_yields_empty_series() {
        assert!(sales_by_date(&[]).is_empty());
    }

    #[test]
    fn category_rollup_keeps_zero_categories() {
        let records = vec![
            record("p-1", 2, Some(100), Some("Rice"), 1),
            record("p-2", 4, Some(25), Some("Rice"), 2),
            record("p-3", 1, Some(60), Some("Fruits"), 2),
            record("p-4", 1, Some(60), None, 2),
        ];

        let totals = sales_by_category(&records);

        assert_eq!(totals.len(), PRODUCT_CATEGORIES.len());
        let rice = totals.iter().find(|entry| entry.category == "Rice").expect("rice");
        assert_eq!(rice.total_sales, Decimal::from(300));
        let fruits = totals.iter().find(|entry| entry.category == "Fruits").expect("fruits");
        assert_eq!(fruits.total_sales, Decimal::from(60));
        let wheat = totals.iter().find(|entry| entry.category == "Wheat").expect("wheat");
        assert_eq!(wheat.total_sales, Decimal::ZERO);
    }
}
