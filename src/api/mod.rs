// ==========================================
// DR Margin Tool - API 层
// ==========================================
// 职责: 提供业务 API 接口,供展示层调用
// ==========================================

pub mod error;
pub mod margin_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use margin_api::{MarginApi, MarginReport};
