// ==========================================
// DR Margin Tool - 导入层
// ==========================================
// 职责: 外部 Excel 文件 → 规范销售表
// 支持: .xlsx（其他格式在读取前拒绝）
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod header_resolver;
pub mod number_parser;
pub mod sales_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{ensure_supported_format, FileParser, XlsxParser};
pub use header_resolver::{HeaderResolver, ResolvedColumn};
pub use number_parser::NumberParser;
pub use sales_loader::{split_brand_article, SalesLoader};
