// ==========================================
// DR Margin Tool - 引擎层
// ==========================================
// 职责: 行级毛利派生 + 分段 / 品牌 / 商品聚合
// 红线: 引擎无状态，不修改输入
// ==========================================

pub mod aggregation;
pub mod margin;

// 重导出核心引擎
pub use aggregation::{improvable_amount, AggregationEngine};
pub use margin::{margin_ratio, MarginEngine};
