// ==========================================
// DR Margin Tool - 核心库
// ==========================================
// 职责: 销售明细导入 → 毛利派生 → 分段 / 品牌 / 商品改善机会
// 系统定位: 分析核心，展示层只做调用与渲染
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "it");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 毛利与聚合
pub mod engine;

// 导入层 - Excel 读取与表头识别
pub mod importer;

// 配置层 - 分析参数
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ArticleOpportunityRow, ArticleSummaryRow, BrandSummaryRow, CanonicalColumn, CellValue,
    EnrichedRow, EnrichedTable, OpportunityRow, RawTable, SalesRow, SalesTable, Segment,
    SegmentKpi,
};

// 引擎
pub use engine::{AggregationEngine, MarginEngine};

// 导入
pub use importer::{HeaderResolver, ImportError, NumberParser, SalesLoader};

// 配置
pub use config::{AnalysisConfig, MarginTargets};

// API
pub use api::{ApiError, ApiResult, MarginApi, MarginReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "DR Margin Tool";
