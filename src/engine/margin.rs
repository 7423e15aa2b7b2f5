// ==========================================
// DR Margin Tool - 毛利引擎
// ==========================================
// 职责: 由规范销售表派生行级营业额 / 毛利额 / 毛利率
// 红线: 不修改输入，返回新表
// 红线: 毛利率分母为销售价（非营业额）；销售价为 0 或 NaN → NaN
// ==========================================

use crate::domain::sales::{EnrichedRow, EnrichedTable, SalesRow, SalesTable};

pub struct MarginEngine;

impl MarginEngine {
    pub fn new() -> Self {
        Self
    }

    /// 派生毛利列
    pub fn enrich(&self, table: &SalesTable) -> EnrichedTable {
        EnrichedTable {
            columns: table.columns.clone(),
            extra_columns: table.extra_columns.clone(),
            rows: table.rows.iter().map(|row| self.enrich_row(row)).collect(),
        }
    }

    /// 单行派生（NaN 按 IEEE-754 传播）
    pub fn enrich_row(&self, row: &SalesRow) -> EnrichedRow {
        let unit_margin = row.sale_price - row.last_purchase_price;

        EnrichedRow {
            sale: row.clone(),
            revenue: row.sale_price * row.quantity,
            margin_amount: unit_margin * row.quantity,
            margin_pct: margin_ratio(unit_margin, row.sale_price),
        }
    }
}

impl Default for MarginEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 比率，分母为 0 或 NaN 时返回 NaN
pub fn margin_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || denominator.is_nan() {
        f64::NAN
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_row(quantity: f64, purchase: f64, sale: f64) -> SalesRow {
        SalesRow {
            source_row: 2,
            customer_category: 46.0,
            brand_article: "A / x".to_string(),
            brand: "A".to_string(),
            article: "x".to_string(),
            quantity,
            last_purchase_price: purchase,
            sale_price: sale,
            extras: Vec::new(),
        }
    }

    fn table(rows: Vec<SalesRow>) -> SalesTable {
        SalesTable {
            header_row: 0,
            columns: Vec::new(),
            extra_columns: Vec::new(),
            rows,
        }
    }

    #[test]
    fn test_enrich_known_case() {
        let engine = MarginEngine::new();
        let enriched = engine.enrich(&table(vec![sales_row(2.0, 6.0, 10.0)]));
        let row = &enriched.rows[0];

        assert!((row.revenue - 20.0).abs() < 1e-9);
        assert!((row.margin_amount - 8.0).abs() < 1e-9);
        assert!((row.margin_pct - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_margin_pct_nan_iff_sale_price_zero_or_nan() {
        let engine = MarginEngine::new();
        let cases = [
            (sales_row(1.0, 5.0, 0.0), true),
            (sales_row(1.0, 5.0, f64::NAN), true),
            (sales_row(f64::NAN, 5.0, 10.0), false),
            (sales_row(1.0, 12.0, 10.0), false),
        ];
        for (row, expect_nan) in cases {
            let enriched = engine.enrich_row(&row);
            assert_eq!(enriched.margin_pct.is_nan(), expect_nan, "{:?}", row);
        }
    }

    #[test]
    fn test_nan_operands_propagate() {
        let engine = MarginEngine::new();
        let enriched = engine.enrich_row(&sales_row(f64::NAN, 5.0, 10.0));
        assert!(enriched.revenue.is_nan());
        assert!(enriched.margin_amount.is_nan());

        let enriched = engine.enrich_row(&sales_row(2.0, f64::NAN, 10.0));
        assert!((enriched.revenue - 20.0).abs() < 1e-9);
        assert!(enriched.margin_amount.is_nan());
        assert!(enriched.margin_pct.is_nan());
    }

    #[test]
    fn test_enrich_does_not_mutate_input() {
        let engine = MarginEngine::new();
        let input = table(vec![sales_row(2.0, 6.0, 10.0)]);
        let snapshot = input.clone();
        let enriched = engine.enrich(&input);

        assert_eq!(input, snapshot);
        assert_eq!(enriched.rows[0].sale, input.rows[0]);
    }
}
