// ==========================================
// DR Margin Tool - 意大利格式数值解析
// ==========================================
// 规则: 去除 '+' 与 '%'，去除空白；
//       同时含 ',' 与 '.' 时 '.' 视为千分位；',' 一律视为小数点
// 红线: 永不报错，无法解析 → NaN
// ==========================================

use crate::domain::cell::CellValue;

pub struct NumberParser;

impl NumberParser {
    /// 解析单元格为 f64（失败 → NaN）
    pub fn parse(value: &CellValue) -> f64 {
        match value {
            CellValue::Empty => f64::NAN,
            CellValue::Number(n) => *n,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Text(s) => Self::parse_str(s),
            // 日期不是数值
            CellValue::DateTime(_) => f64::NAN,
        }
    }

    /// 解析意大利格式文本
    ///
    /// # 示例
    /// - "6,17000" → 6.17
    /// - "1,000" → 1.0（单个逗号总是小数点）
    /// - "+102,59%" → 102.59
    /// - "1.234,5" → 1234.5
    pub fn parse_str(value: &str) -> f64 {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return f64::NAN;
        }

        let mut s: String = trimmed
            .chars()
            .filter(|c| *c != '+' && *c != '%' && !c.is_whitespace())
            .collect();
        if s.is_empty() {
            return f64::NAN;
        }

        if s.contains(',') && s.contains('.') {
            s.retain(|c| c != '.');
        }
        let s = s.replace(',', ".");

        s.parse::<f64>().unwrap_or(f64::NAN)
    }
}
