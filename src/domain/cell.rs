// ==========================================
// DR Margin Tool - 单元格与原始表格
// ==========================================
// 职责: 表格原始单元格值（未定型）与原始网格
// 用途: 导入层读取 Excel 后的中间结构，读一次即丢弃
// ==========================================

use serde::Serialize;
use std::fmt;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// 日期单元格（Excel 序列值），不参与数值解析
    DateTime(f64),
}

impl CellValue {
    /// 是否为空（空单元格、空白文本或 NaN）
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            CellValue::Bool(_) | CellValue::DateTime(_) => false,
        }
    }

    /// 转为文本（空值 → 空字符串）
    pub fn as_text(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // f64 的 Display 对整数值不输出小数部分（12.0 → "12"）
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(serial) => write!(f, "{}", serial),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

// ==========================================
// RawTable - 原始网格（无表头位置假设）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<CellValue>>,
    /// rows[0] 在工作表中的行下标（0 起；工作表开头的空行不在网格内）
    pub first_row: usize,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self::with_first_row(rows, 0)
    }

    pub fn with_first_row(rows: Vec<Vec<CellValue>>, first_row: usize) -> Self {
        Self { rows, first_row }
    }

    /// 网格行下标 → 工作表行号（1 起）
    pub fn sheet_row_number(&self, row_idx: usize) -> usize {
        self.first_row + row_idx + 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 前 n 行预览（用于表头行探测）
    pub fn preview(&self, n: usize) -> &[Vec<CellValue>] {
        &self.rows[..self.rows.len().min(n)]
    }
}
