// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 在内存中生成 .xlsx 测试文件（rust_xlsxwriter）
// ==========================================

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// 测试单元格
#[derive(Debug, Clone)]
pub enum TestCell {
    Text(&'static str),
    Number(f64),
    Empty,
}

pub use self::TestCell::{Empty as E, Number as N, Text as S};

/// 生成 .xlsx 字节（单个工作表，从 A1 开始写入）
pub fn build_xlsx(rows: &[Vec<TestCell>]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                TestCell::Text(s) => {
                    worksheet.write_string(r, c, *s)?;
                }
                TestCell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                TestCell::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// 写入临时 .xlsx 文件（需要保持 NamedTempFile 存活）
pub fn write_temp_xlsx(rows: &[Vec<TestCell>]) -> Result<NamedTempFile, Box<dyn Error>> {
    let bytes = build_xlsx(rows)?;
    let mut temp_file = tempfile::Builder::new().suffix(".xlsx").tempfile()?;
    temp_file.write_all(&bytes)?;
    temp_file.flush()?;
    Ok(temp_file)
}

/// 典型的销售导出：两行抬头噪声 + 缩写表头 + 意大利格式数值
pub fn sample_sales_rows() -> Vec<Vec<TestCell>> {
    vec![
        vec![S("Report vendite DR"), E, E, E, E, E],
        vec![S("Periodo: 01/2026"), E, E, E, E, E],
        vec![S("CT"), S("Marca / Articolo"), S("Q.TA’"), S("prz. ult.acq."), S("Prezzo Sc."), S("CFR")],
        // 车队
        vec![N(46.0), S("ACME / Filtro olio"), S("10"), S("6,00"), S("10,00"), S("C001")],
        vec![N(46.0), S("ACME / Pastiglie"), N(5.0), S("9,50"), S("10,00"), S("C001")],
        vec![N(46.0), S("BOSCO / Spazzole"), S("2"), S("4,00"), S("5,00"), S("C002")],
        // 非车队
        vec![N(12.0), S("ACME / Filtro olio"), S("4"), S("6,00"), S("12,00"), S("C003")],
        vec![S("Farmacia"), S("CARTA"), S("1"), S("1.000,00"), S("0"), S("C004")],
    ]
}
