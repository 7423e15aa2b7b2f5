// ==========================================
// DR Margin Tool - 配置层
// ==========================================
// 职责: 分析参数（默认值 + 环境变量覆写）
// 说明: 目标毛利率由调用方每次提供，不持久化
// ==========================================

pub mod analysis_config;

pub use analysis_config::{env_keys, AnalysisConfig, ConfigError, MarginTargets};
