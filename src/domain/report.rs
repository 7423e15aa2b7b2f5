// ==========================================
// DR Margin Tool - 聚合结果模型
// ==========================================
// 用途: 引擎层输出，展示层只读
// 说明: 比率字段 NaN 表示"未知"，序列化为 null
// ==========================================

use crate::domain::segment::Segment;
use serde::Serialize;

/// 分段 KPI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentKpi {
    pub segment: Segment,
    pub revenue_total: f64,
    pub margin_total: f64,
    pub avg_margin_pct: f64,
}

/// 品牌汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandSummaryRow {
    pub brand: String,
    pub revenue: f64,
    pub margin_amount: f64,
    pub margin_pct: f64,
}

/// 品牌改善机会
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRow {
    pub brand: String,
    pub revenue: f64,
    pub margin_amount: f64,
    pub margin_pct: f64,
    pub target_pct: f64,
    pub improvable_amount: f64,
}

/// 品牌 + 商品汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSummaryRow {
    pub brand: String,
    pub article: String,
    pub quantity: f64,
    pub revenue: f64,
    pub margin_amount: f64,
    pub margin_pct: f64,
}

/// 商品下钻（带改善机会）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleOpportunityRow {
    pub brand: String,
    pub article: String,
    pub quantity: f64,
    pub revenue: f64,
    pub margin_amount: f64,
    pub margin_pct: f64,
    pub target_pct: f64,
    pub improvable_amount: f64,
}
