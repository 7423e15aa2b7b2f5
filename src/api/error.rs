// ==========================================
// DR Margin Tool - API层错误类型
// ==========================================
// 职责: 将导入/配置错误归入三类：格式错误 / 缺列错误 / 意外错误
// 说明: 意外错误保留技术细节供日志使用，展示层只显示通用重试提示
// ==========================================

use crate::config::ConfigError;
use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 带结构化信息的业务错误
    // ==========================================
    #[error("Formato file non supportato: '{0}'. Caricare un file Excel .xlsx")]
    UnsupportedFormat(String),

    #[error("Colonne mancanti nel file Excel: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Input non valido: {0}")]
    InvalidInput(String),

    // ==========================================
    // 意外错误（文件损坏、无法读取等）
    // ==========================================
    #[error("Errore imprevisto: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 面向用户的提示（按当前语言）
    ///
    /// 意外错误不暴露内部细节
    pub fn user_message(&self) -> String {
        match self {
            ApiError::UnsupportedFormat(file_name) => {
                t_with_args("error.unsupported_format", &[("file", file_name)])
            }
            ApiError::MissingColumns(columns) => {
                t_with_args("error.missing_columns", &[("columns", &columns.join(", "))])
            }
            ApiError::InvalidInput(detail) => {
                t_with_args("error.invalid_input", &[("detail", detail)])
            }
            ApiError::Unexpected(_) | ApiError::Other(_) => t("error.unexpected"),
        }
    }

    /// 是否为意外错误（展示层应显示通用重试提示）
    pub fn is_unexpected(&self) -> bool {
        matches!(self, ApiError::Unexpected(_) | ApiError::Other(_))
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedFormat(file_name) => ApiError::UnsupportedFormat(file_name),
            ImportError::MissingColumns(columns) => ApiError::MissingColumns(columns),
            ImportError::EmptyWorkbook | ImportError::Unreadable(_) => {
                ApiError::Unexpected(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
