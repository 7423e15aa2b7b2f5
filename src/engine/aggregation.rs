// ==========================================
// DR Margin Tool - 聚合引擎
// ==========================================
// 职责: 分段 KPI / 品牌汇总 / 改善机会 / 低毛利商品 / 商品下钻
// 红线: 无状态引擎，所有方法都是纯函数，不修改输入
// 口径: 求和跳过 NaN；比率分母为 0 → NaN；
//       改善额 NaN 保持 NaN，仅将非 NaN 负值截为 0
// ==========================================

use crate::config::AnalysisConfig;
use crate::domain::report::{
    ArticleOpportunityRow, ArticleSummaryRow, BrandSummaryRow, OpportunityRow, SegmentKpi,
};
use crate::domain::sales::EnrichedRow;
use crate::domain::segment::Segment;
use crate::engine::margin::margin_ratio;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// 默认车队客户类别代码
pub const DEFAULT_FLOTTE_CODE: f64 = 46.0;

// ==========================================
// 累加器（求和跳过 NaN）
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    quantity: f64,
    revenue: f64,
    margin_amount: f64,
}

impl Totals {
    fn add(&mut self, row: &EnrichedRow) {
        self.quantity = add_skip_nan(self.quantity, row.sale.quantity);
        self.revenue = add_skip_nan(self.revenue, row.revenue);
        self.margin_amount = add_skip_nan(self.margin_amount, row.margin_amount);
    }

    fn margin_pct(&self) -> f64 {
        margin_ratio(self.margin_amount, self.revenue)
    }
}

fn add_skip_nan(acc: f64, value: f64) -> f64 {
    if value.is_nan() {
        acc
    } else {
        acc + value
    }
}

/// 可改善金额 = max(0, (目标 - 实际) × 营业额)，NaN 保持 NaN
pub fn improvable_amount(target_pct: f64, margin_pct: f64, revenue: f64) -> f64 {
    let gap = (target_pct - margin_pct) * revenue;
    if gap.is_nan() {
        f64::NAN
    } else {
        gap.max(0.0)
    }
}

/// 升序，NaN 置后
fn asc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// 降序，NaN 置后
fn desc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        _ => asc_nan_last(a, b),
    }
}

// ==========================================
// AggregationEngine
// ==========================================
pub struct AggregationEngine {
    flotte_code: f64,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::with_flotte_code(DEFAULT_FLOTTE_CODE)
    }

    pub fn with_flotte_code(flotte_code: f64) -> Self {
        Self { flotte_code }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::with_flotte_code(config.flotte_category_code)
    }

    /// 按分段过滤
    pub fn filter_segment<'a>(
        &self,
        rows: &'a [EnrichedRow],
        segment: Segment,
    ) -> impl Iterator<Item = &'a EnrichedRow> {
        let code = self.flotte_code;
        rows.iter()
            .filter(move |row| segment.contains(row.customer_category(), code))
    }

    // ==========================================
    // 分段 KPI
    // ==========================================

    /// 车队 / 非车队 / 合计 三段 KPI（固定顺序）
    pub fn segment_kpis(&self, rows: &[EnrichedRow]) -> Vec<SegmentKpi> {
        Segment::KPI_ORDER
            .iter()
            .map(|segment| {
                let mut totals = Totals::default();
                for row in self.filter_segment(rows, *segment) {
                    totals.add(row);
                }

                SegmentKpi {
                    segment: *segment,
                    revenue_total: totals.revenue,
                    margin_total: totals.margin_amount,
                    avg_margin_pct: totals.margin_pct(),
                }
            })
            .collect()
    }

    // ==========================================
    // 品牌汇总与改善机会
    // ==========================================

    /// 按品牌汇总（空品牌单独成组，不丢弃），按品牌名排序
    pub fn brand_summary<'a, I>(&self, rows: I) -> Vec<BrandSummaryRow>
    where
        I: IntoIterator<Item = &'a EnrichedRow>,
    {
        let mut groups: BTreeMap<&'a str, Totals> = BTreeMap::new();
        for row in rows {
            groups.entry(row.brand()).or_default().add(row);
        }

        groups
            .into_iter()
            .map(|(brand, totals)| BrandSummaryRow {
                brand: brand.to_string(),
                revenue: totals.revenue,
                margin_amount: totals.margin_amount,
                margin_pct: totals.margin_pct(),
            })
            .collect()
    }

    /// 追加目标毛利率与可改善金额（不修改输入）
    pub fn add_opportunity(
        &self,
        summary: &[BrandSummaryRow],
        target_pct: f64,
    ) -> Vec<OpportunityRow> {
        summary
            .iter()
            .map(|row| OpportunityRow {
                brand: row.brand.clone(),
                revenue: row.revenue,
                margin_amount: row.margin_amount,
                margin_pct: row.margin_pct,
                target_pct,
                improvable_amount: improvable_amount(target_pct, row.margin_pct, row.revenue),
            })
            .collect()
    }

    /// 分段品牌改善机会，按可改善金额降序（NaN 置后）
    pub fn segment_brand_opportunities(
        &self,
        rows: &[EnrichedRow],
        segment: Segment,
        target_pct: f64,
    ) -> Vec<OpportunityRow> {
        let summary = self.brand_summary(self.filter_segment(rows, segment));
        let mut opportunities = self.add_opportunity(&summary, target_pct);
        opportunities.sort_by(|a, b| desc_nan_last(a.improvable_amount, b.improvable_amount));
        opportunities
    }

    /// 车队品牌改善机会
    pub fn flotte_brand_opportunities(
        &self,
        rows: &[EnrichedRow],
        target_pct: f64,
    ) -> Vec<OpportunityRow> {
        self.segment_brand_opportunities(rows, Segment::Flotte, target_pct)
    }

    /// 非车队品牌改善机会
    pub fn non_flotte_brand_opportunities(
        &self,
        rows: &[EnrichedRow],
        target_pct: f64,
    ) -> Vec<OpportunityRow> {
        self.segment_brand_opportunities(rows, Segment::NonFlotte, target_pct)
    }

    /// 客户（非车队）品牌改善机会，保留旧接口名
    pub fn clienti_brand_opportunities(
        &self,
        rows: &[EnrichedRow],
        target_pct: f64,
    ) -> Vec<OpportunityRow> {
        self.non_flotte_brand_opportunities(rows, target_pct)
    }

    // ==========================================
    // 商品级视图
    // ==========================================

    /// 低毛利商品：按 (品牌, 商品) 汇总后毛利率 < 阈值，按毛利率升序
    ///
    /// NaN 毛利率不计入结果
    pub fn low_margin_articles(
        &self,
        rows: &[EnrichedRow],
        segment: Segment,
        threshold_pct: f64,
    ) -> Vec<ArticleSummaryRow> {
        let mut groups: BTreeMap<(&str, &str), Totals> = BTreeMap::new();
        for row in self.filter_segment(rows, segment) {
            groups
                .entry((row.brand(), row.article()))
                .or_default()
                .add(row);
        }

        let mut result: Vec<ArticleSummaryRow> = groups
            .into_iter()
            .map(|((brand, article), totals)| ArticleSummaryRow {
                brand: brand.to_string(),
                article: article.to_string(),
                quantity: totals.quantity,
                revenue: totals.revenue,
                margin_amount: totals.margin_amount,
                margin_pct: totals.margin_pct(),
            })
            .filter(|row| row.margin_pct < threshold_pct)
            .collect();

        result.sort_by(|a, b| asc_nan_last(a.margin_pct, b.margin_pct));
        result
    }

    /// 分段 + 品牌下钻到商品，按毛利率升序（最差在前，NaN 置后）
    pub fn segment_article_drilldown(
        &self,
        rows: &[EnrichedRow],
        segment: Segment,
        selected_brand: &str,
        target_pct: f64,
    ) -> Vec<ArticleOpportunityRow> {
        let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
        for row in self
            .filter_segment(rows, segment)
            .filter(|row| row.brand() == selected_brand)
        {
            groups.entry(row.article()).or_default().add(row);
        }

        let mut result: Vec<ArticleOpportunityRow> = groups
            .into_iter()
            .map(|(article, totals)| {
                let margin_pct = totals.margin_pct();
                ArticleOpportunityRow {
                    brand: selected_brand.to_string(),
                    article: article.to_string(),
                    quantity: totals.quantity,
                    revenue: totals.revenue,
                    margin_amount: totals.margin_amount,
                    margin_pct,
                    target_pct,
                    improvable_amount: improvable_amount(target_pct, margin_pct, totals.revenue),
                }
            })
            .collect();

        result.sort_by(|a, b| asc_nan_last(a.margin_pct, b.margin_pct));
        result
    }

    /// 分段内可下钻的品牌列表（去重、排序）
    pub fn brands(&self, rows: &[EnrichedRow], segment: Segment) -> Vec<String> {
        self.filter_segment(rows, segment)
            .map(|row| row.brand())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sales::SalesRow;

    fn row(
        category: f64,
        brand: &str,
        article: &str,
        revenue: f64,
        margin_amount: f64,
    ) -> EnrichedRow {
        EnrichedRow {
            sale: SalesRow {
                source_row: 0,
                customer_category: category,
                brand_article: format!("{} / {}", brand, article),
                brand: brand.to_string(),
                article: article.to_string(),
                quantity: 10.0,
                last_purchase_price: f64::NAN,
                sale_price: f64::NAN,
                extras: Vec::new(),
            },
            revenue,
            margin_amount,
            margin_pct: margin_ratio(margin_amount, revenue),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_segment_kpis_handles_flotte_non_flotte_and_totale() {
        let engine = AggregationEngine::new();
        let rows = vec![row(46.0, "A", "x", 100.0, 20.0), row(12.0, "B", "y", 80.0, 10.0)];

        let kpis = engine.segment_kpis(&rows);
        let segments: Vec<Segment> = kpis.iter().map(|k| k.segment).collect();
        assert_eq!(segments, vec![Segment::Flotte, Segment::NonFlotte, Segment::All]);

        assert_close(kpis[0].revenue_total, 100.0);
        assert_close(kpis[0].margin_total, 20.0);
        assert_close(kpis[0].avg_margin_pct, 0.2);
        assert_close(kpis[1].revenue_total, 80.0);
        assert_close(kpis[1].margin_total, 10.0);
        assert_close(kpis[1].avg_margin_pct, 0.125);
        assert_close(kpis[2].revenue_total, 180.0);
        assert_close(kpis[2].margin_total, 30.0);
        assert_close(kpis[2].avg_margin_pct, 30.0 / 180.0);
    }

    #[test]
    fn test_segment_kpis_empty_segment_is_nan_pct() {
        let engine = AggregationEngine::new();
        let kpis = engine.segment_kpis(&[row(12.0, "B", "y", 80.0, 10.0)]);
        assert_close(kpis[0].revenue_total, 0.0);
        assert!(kpis[0].avg_margin_pct.is_nan());
    }

    #[test]
    fn test_segment_kpis_nan_category_is_non_flotte() {
        let engine = AggregationEngine::new();
        let kpis = engine.segment_kpis(&[row(f64::NAN, "B", "y", 80.0, 10.0)]);
        assert_close(kpis[1].revenue_total, 80.0);
        assert_close(kpis[0].revenue_total, 0.0);
    }

    #[test]
    fn test_add_opportunity_computes_improvable_amount() {
        let engine = AggregationEngine::new();
        let summary = vec![
            BrandSummaryRow {
                brand: "A".to_string(),
                revenue: 100.0,
                margin_amount: 30.0,
                margin_pct: 0.30,
            },
            BrandSummaryRow {
                brand: "B".to_string(),
                revenue: 200.0,
                margin_amount: 120.0,
                margin_pct: 0.60,
            },
        ];

        let result = engine.add_opportunity(&summary, 0.50);

        assert_close(result[0].target_pct, 0.50);
        assert_close(result[1].target_pct, 0.50);
        assert_close(result[0].improvable_amount, 20.0);
        assert_eq!(result[1].improvable_amount, 0.0);
        // 输入不变
        assert_eq!(summary[0].brand, "A");
    }

    #[test]
    fn test_add_opportunity_keeps_nan_margin_as_nan() {
        let engine = AggregationEngine::new();
        let summary = vec![BrandSummaryRow {
            brand: "Z".to_string(),
            revenue: 0.0,
            margin_amount: 0.0,
            margin_pct: f64::NAN,
        }];
        let result = engine.add_opportunity(&summary, 0.50);
        assert!(result[0].improvable_amount.is_nan());
    }

    #[test]
    fn test_brand_summary_groups_and_keeps_empty_brand() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "B", "x", 100.0, 10.0),
            row(46.0, "A", "y", 50.0, 5.0),
            row(46.0, "B", "z", 100.0, f64::NAN),
            row(46.0, "", "w", 0.0, 0.0),
        ];

        let summary = engine.brand_summary(&rows);
        let brands: Vec<&str> = summary.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(brands, vec!["", "A", "B"]);

        assert!(summary[0].margin_pct.is_nan());
        assert_close(summary[2].revenue, 200.0);
        // NaN 毛利不计入合计
        assert_close(summary[2].margin_amount, 10.0);
        assert_close(summary[2].margin_pct, 0.05);
    }

    #[test]
    fn test_brand_opportunities_filter_segments_correctly() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "Fleet", "a", 100.0, 20.0),
            row(46.0, "Fleet2", "b", 150.0, 60.0),
            row(10.0, "Client", "c", 200.0, 40.0),
            row(f64::NAN, "Client2", "d", 50.0, 10.0),
        ];

        let flotte = engine.flotte_brand_opportunities(&rows, 0.50);
        let clienti = engine.clienti_brand_opportunities(&rows, 0.45);

        let flotte_brands: BTreeSet<&str> = flotte.iter().map(|r| r.brand.as_str()).collect();
        let clienti_brands: BTreeSet<&str> = clienti.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(flotte_brands, BTreeSet::from(["Fleet", "Fleet2"]));
        assert_eq!(clienti_brands, BTreeSet::from(["Client", "Client2"]));

        // 降序：Fleet (0.5-0.2)*100=30 > Fleet2 (0.5-0.4)*150=15
        assert_eq!(flotte[0].brand, "Fleet");
        assert_close(flotte[0].improvable_amount, 30.0);
        assert_close(flotte[1].improvable_amount, 15.0);
    }

    #[test]
    fn test_clienti_brand_opportunities_is_wrapper_for_non_flotte() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "Fleet", "a", 100.0, 20.0),
            row(10.0, "Client", "c", 200.0, 40.0),
        ];

        assert_eq!(
            engine.clienti_brand_opportunities(&rows, 0.45),
            engine.non_flotte_brand_opportunities(&rows, 0.45)
        );
    }

    #[test]
    fn test_opportunities_sort_nan_last() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "Zero", "a", 0.0, 0.0),
            row(46.0, "Low", "b", 100.0, 45.0),
            row(46.0, "High", "c", 100.0, 10.0),
        ];
        let result = engine.flotte_brand_opportunities(&rows, 0.50);
        let brands: Vec<&str> = result.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(brands, vec!["High", "Low", "Zero"]);
        assert!(result[2].improvable_amount.is_nan());
    }

    #[test]
    fn test_low_margin_articles_returns_only_rows_below_threshold() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "A", "x", 100.0, 5.0),
            row(46.0, "A", "y", 100.0, 20.0),
            row(10.0, "B", "z", 100.0, 8.0),
        ];

        let result = engine.low_margin_articles(&rows, Segment::All, 0.10);
        let articles: Vec<&str> = result.iter().map(|r| r.article.as_str()).collect();
        assert_eq!(articles, vec!["x", "z"]);
        assert!(result.iter().all(|r| r.margin_pct < 0.10));

        let flotte_only = engine.low_margin_articles(&rows, Segment::Flotte, 0.10);
        assert_eq!(flotte_only.len(), 1);
        assert_eq!(flotte_only[0].article, "x");
    }

    #[test]
    fn test_low_margin_articles_groups_row_level_input() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "A", "x", 100.0, 5.0),
            row(46.0, "A", "x", 100.0, 25.0),
        ];
        // 汇总后 30/200 = 0.15，不低于阈值
        assert!(engine.low_margin_articles(&rows, Segment::All, 0.10).is_empty());
        let result = engine.low_margin_articles(&rows, Segment::All, 0.20);
        assert_eq!(result.len(), 1);
        assert_close(result[0].quantity, 20.0);
    }

    #[test]
    fn test_segment_article_drilldown_filters_brand_and_sorts_by_margin_pct() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "A", "high", 100.0, 30.0),
            row(46.0, "A", "low", 100.0, 5.0),
            row(46.0, "A", "mid", 100.0, 20.0),
            row(10.0, "A", "other-segment", 100.0, 1.0),
            row(46.0, "B", "other", 100.0, 1.0),
        ];

        let result = engine.segment_article_drilldown(&rows, Segment::Flotte, "A", 0.25);

        assert!(result.iter().all(|r| r.brand == "A"));
        let articles: Vec<&str> = result.iter().map(|r| r.article.as_str()).collect();
        assert_eq!(articles, vec!["low", "mid", "high"]);
        assert!(result.windows(2).all(|w| w[0].margin_pct < w[1].margin_pct));

        assert_close(result[0].improvable_amount, 20.0);
        assert_close(result[1].improvable_amount, 5.0);
        assert_eq!(result[2].improvable_amount, 0.0);
    }

    #[test]
    fn test_brands_are_distinct_and_sorted() {
        let engine = AggregationEngine::new();
        let rows = vec![
            row(46.0, "B", "x", 1.0, 1.0),
            row(46.0, "A", "y", 1.0, 1.0),
            row(46.0, "B", "z", 1.0, 1.0),
            row(10.0, "C", "w", 1.0, 1.0),
        ];
        assert_eq!(engine.brands(&rows, Segment::Flotte), vec!["A", "B"]);
        assert_eq!(engine.brands(&rows, Segment::All), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_improvable_amount_clips_only_non_nan() {
        assert_close(improvable_amount(0.5, 0.3, 100.0), 20.0);
        assert_eq!(improvable_amount(0.5, 0.6, 100.0), 0.0);
        assert!(improvable_amount(0.5, f64::NAN, 100.0).is_nan());
    }
}
