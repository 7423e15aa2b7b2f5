// ==========================================
// DR Margin Tool - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx)，仅读取第一个工作表
// 输出: RawTable（不假设表头位置）
// ==========================================

use crate::domain::cell::{CellValue, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, Reader, Xlsx};
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

/// 支持的扩展名
pub const SUPPORTED_EXTENSION: &str = "xlsx";

/// 按文件名扩展名校验格式（在任何读取之前调用）
pub fn ensure_supported_format(file_name: &str) -> ImportResult<()> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if ext == SUPPORTED_EXTENSION {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFormat(file_name.to_string()))
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件 → 原始网格
// 实现者: XlsxParser
pub trait FileParser {
    /// 读取整个工作表为原始网格
    ///
    /// # 说明
    /// - 读取前会将流重置到开头
    fn parse_to_raw_table<R: Read + Seek>(&self, reader: R) -> ImportResult<RawTable>;
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct XlsxParser;

impl FileParser for XlsxParser {
    fn parse_to_raw_table<R: Read + Seek>(&self, mut reader: R) -> ImportResult<RawTable> {
        reader.rewind()?;

        let mut workbook: Xlsx<_> = Xlsx::new(reader)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::EmptyWorkbook)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // used range 从首个非空单元格开始
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let rows: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        debug!(sheet = %sheet_name, rows = rows.len(), first_row, "工作表读取完成");
        Ok(RawTable::with_first_row(rows, first_row))
    }
}

/// calamine 单元格 → CellValue
fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        // #N/A、#DIV/0! 等公式错误视为缺失
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_supported_format_by_extension() {
        assert!(ensure_supported_format("vendite.xlsx").is_ok());
        assert!(ensure_supported_format("VENDITE.XLSX").is_ok());
        assert!(matches!(
            ensure_supported_format("vendite.csv"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(ensure_supported_format("vendite.xls").is_err());
        assert!(ensure_supported_format("vendite").is_err());
    }

    #[test]
    fn test_xlsx_parser_rejects_garbage_bytes() {
        let parser = XlsxParser;
        let result = parser.parse_to_raw_table(Cursor::new(b"not a zip archive".to_vec()));
        assert!(matches!(result, Err(ImportError::Unreadable(_))));
    }

    #[test]
    fn test_cell_from_data_maps_errors_to_empty() {
        assert_eq!(cell_from_data(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(
            cell_from_data(&Data::String("x".to_string())),
            CellValue::from("x")
        );
        assert_eq!(
            cell_from_data(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Empty
        );
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2026-01-31".to_string())),
            CellValue::from("2026-01-31")
        );
    }
}
