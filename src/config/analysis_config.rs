// ==========================================
// DR Margin Tool - 分析配置
// ==========================================
// 职责: 预览行数 / 车队类别代码 / 目标毛利率 / 低毛利阈值
// 来源: 默认值 + 环境变量覆写（不落盘）
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// 配置键（环境变量）
pub mod env_keys {
    pub const PREVIEW_ROWS: &str = "DR_MARGIN_PREVIEW_ROWS";
    pub const FLOTTE_CODE: &str = "DR_MARGIN_FLOTTE_CODE";
    pub const TARGET_FLOTTE: &str = "DR_MARGIN_TARGET_FLOTTE";
    pub const TARGET_CLIENTI: &str = "DR_MARGIN_TARGET_CLIENTI";
    pub const LOW_MARGIN_THRESHOLD: &str = "DR_MARGIN_LOW_MARGIN_THRESHOLD";
}

/// 配置错误
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Percentuale non valida per {field}: {value} (atteso un valore tra 0 e 1)")]
    PercentOutOfRange { field: &'static str, value: f64 },
}

// ==========================================
// MarginTargets - 目标毛利率（每次调用由调用方提供）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginTargets {
    pub flotte_pct: f64,
    pub non_flotte_pct: f64,
}

impl MarginTargets {
    /// 创建并校验（两者均须在 [0, 1] 内）
    pub fn new(flotte_pct: f64, non_flotte_pct: f64) -> Result<Self, ConfigError> {
        let targets = Self {
            flotte_pct,
            non_flotte_pct,
        };
        targets.validate()?;
        Ok(targets)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pct("flotte_pct", self.flotte_pct)?;
        validate_pct("non_flotte_pct", self.non_flotte_pct)?;
        Ok(())
    }
}

impl Default for MarginTargets {
    fn default() -> Self {
        Self {
            flotte_pct: 0.30,
            non_flotte_pct: 0.30,
        }
    }
}

fn validate_pct(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::PercentOutOfRange { field, value })
    }
}

// ==========================================
// AnalysisConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 表头探测预览行数
    pub preview_rows: usize,
    /// 车队客户类别代码
    pub flotte_category_code: f64,
    /// 默认目标毛利率
    pub default_targets: MarginTargets,
    /// 低毛利商品阈值
    pub low_margin_threshold_pct: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preview_rows: 30,
            flotte_category_code: 46.0,
            default_targets: MarginTargets::default(),
            low_margin_threshold_pct: 0.10,
        }
    }
}

impl AnalysisConfig {
    /// 默认值 + 环境变量覆写
    ///
    /// 无法解析或超出范围的值忽略并记录警告
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// 按键读取覆写值（便于测试注入）
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override::<usize>(&lookup, env_keys::PREVIEW_ROWS) {
            if v > 0 {
                self.preview_rows = v;
            } else {
                warn!(key = env_keys::PREVIEW_ROWS, "预览行数必须大于 0，已忽略");
            }
        }
        if let Some(v) = parse_override::<f64>(&lookup, env_keys::FLOTTE_CODE) {
            self.flotte_category_code = v;
        }
        if let Some(v) = parse_pct_override(&lookup, env_keys::TARGET_FLOTTE) {
            self.default_targets.flotte_pct = v;
        }
        if let Some(v) = parse_pct_override(&lookup, env_keys::TARGET_CLIENTI) {
            self.default_targets.non_flotte_pct = v;
        }
        if let Some(v) = parse_pct_override(&lookup, env_keys::LOW_MARGIN_THRESHOLD) {
            self.low_margin_threshold_pct = v;
        }
        self
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "配置值无法解析，已忽略");
            None
        }
    }
}

fn parse_pct_override(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Option<f64> {
    let value = parse_override::<f64>(lookup, key)?;
    match validate_pct(key, value) {
        Ok(()) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "配置值超出范围，已忽略");
            None
        }
    }
}
