// ==========================================
// DR Margin Tool - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单元格级数值解析失败不属于错误（就地转为 NaN）
// 说明: 面向用户的文案为意大利语
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 格式错误（解析前快速失败）=====
    #[error("Formato file non supportato: '{0}'. Caricare un file Excel .xlsx")]
    UnsupportedFormat(String),

    // ===== 必需列缺失 =====
    #[error("Colonne mancanti nel file Excel: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    // ===== 文件读取错误（归入"意外错误"）=====
    #[error("Il file Excel non contiene fogli di lavoro")]
    EmptyWorkbook,

    #[error("Lettura del file Excel non riuscita: {0}")]
    Unreadable(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::Unreadable(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::Unreadable(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_every_column() {
        let err = ImportError::MissingColumns(vec![
            "quantità".to_string(),
            "prezzo vendita".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Colonne mancanti nel file Excel: quantità, prezzo vendita"
        );
    }

    #[test]
    fn test_io_error_is_unreadable() {
        let err = ImportError::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        ));
        assert!(matches!(err, ImportError::Unreadable(_)));
    }
}
