// ==========================================
// DR Margin Tool - 销售明细导入器
// ==========================================
// 流程: 格式校验 → 读取工作表 → 表头探测 → 别名映射
//       → 必需列校验 → 数值解析 → 品牌/商品拆分
// 红线: 无跨调用状态，每次上传独立生成一张表
// ==========================================

use crate::config::AnalysisConfig;
use crate::domain::cell::{CellValue, RawTable};
use crate::domain::sales::{CanonicalColumn, SalesRow, SalesTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{ensure_supported_format, FileParser, XlsxParser};
use crate::importer::header_resolver::HeaderResolver;
use crate::importer::number_parser::NumberParser;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// 默认表头预览行数
pub const DEFAULT_PREVIEW_ROWS: usize = 30;

/// 按首个 '/' 拆分 "MARCA / ARTICOLO"
///
/// - 左侧 TRIM → 品牌
/// - 右侧 TRIM → 商品（无 '/' → ""）
pub fn split_brand_article(text: &str) -> (String, String) {
    match text.split_once('/') {
        Some((brand, article)) => (brand.trim().to_string(), article.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

// ==========================================
// SalesLoader
// ==========================================
pub struct SalesLoader<P: FileParser = XlsxParser> {
    parser: P,
    header_resolver: HeaderResolver,
    preview_rows: usize,
}

impl SalesLoader<XlsxParser> {
    pub fn new() -> Self {
        Self::with_parser(XlsxParser, DEFAULT_PREVIEW_ROWS)
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::with_parser(XlsxParser, config.preview_rows)
    }
}

impl Default for SalesLoader<XlsxParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FileParser> SalesLoader<P> {
    pub fn with_parser(parser: P, preview_rows: usize) -> Self {
        Self {
            parser,
            header_resolver: HeaderResolver,
            preview_rows: preview_rows.max(1),
        }
    }

    /// 从上传流导入
    ///
    /// # 参数
    /// - reader: 文件流（读取前会重置到开头）
    /// - file_name: 文件名（用于扩展名校验）
    ///
    /// # 返回
    /// - Ok(SalesTable): 规范销售表
    /// - Err(UnsupportedFormat): 非 .xlsx，未做任何读取
    /// - Err(MissingColumns): 必需列缺失
    /// - Err(EmptyWorkbook / Unreadable): 文件损坏或无法读取
    #[instrument(skip(self, reader))]
    pub fn load<R: Read + Seek>(&self, reader: R, file_name: &str) -> ImportResult<SalesTable> {
        ensure_supported_format(file_name)?;

        let raw = self.parser.parse_to_raw_table(reader)?;
        info!(raw_rows = raw.row_count(), "文件解析完成");

        self.build_table(&raw)
    }

    /// 从文件路径导入
    pub fn load_path<Q: AsRef<Path>>(&self, path: Q) -> ImportResult<SalesTable> {
        let path = path.as_ref();
        let file_name = path.display().to_string();
        ensure_supported_format(&file_name)?;

        let file = File::open(path)?;
        self.load(BufReader::new(file), &file_name)
    }

    /// 原始网格 → 规范销售表
    pub fn build_table(&self, raw: &RawTable) -> ImportResult<SalesTable> {
        // === 步骤 1: 表头探测 ===
        let header_row = self
            .header_resolver
            .detect_header_row(raw.preview(self.preview_rows));
        let header_cells = raw.rows.get(header_row).map(Vec::as_slice).unwrap_or(&[]);

        // === 步骤 2: 列名归一 + 别名映射 ===
        let resolved = self.header_resolver.resolve_columns(header_cells);
        let positions: HashMap<CanonicalColumn, usize> = resolved
            .iter()
            .enumerate()
            .filter_map(|(idx, col)| col.canonical.map(|c| (c, idx)))
            .collect();

        // === 步骤 3: 必需列校验 ===
        let missing: Vec<String> = CanonicalColumn::REQUIRED
            .iter()
            .filter(|c| !positions.contains_key(c))
            .map(|c| c.header().to_string())
            .collect();
        if !missing.is_empty() {
            warn!(missing = ?missing, header_row, "必需列缺失");
            return Err(ImportError::MissingColumns(missing));
        }

        let column_at = |c: CanonicalColumn| positions[&c];
        let category_idx = column_at(CanonicalColumn::CustomerCategory);
        let brand_article_idx = column_at(CanonicalColumn::BrandArticle);
        let quantity_idx = column_at(CanonicalColumn::Quantity);
        let purchase_idx = column_at(CanonicalColumn::LastPurchasePrice);
        let sale_idx = column_at(CanonicalColumn::SalePrice);

        let extra_indices: Vec<usize> = resolved
            .iter()
            .enumerate()
            .filter(|(_, col)| !col.canonical.map(|c| c.is_required()).unwrap_or(false))
            .map(|(idx, _)| idx)
            .collect();
        let extra_columns: Vec<String> = extra_indices
            .iter()
            .map(|idx| resolved[*idx].name.clone())
            .collect();

        // === 步骤 4: 逐行解析 ===
        let empty = CellValue::Empty;
        let mut rows = Vec::new();
        let mut skipped_blank = 0usize;
        for (row_idx, raw_row) in raw.rows.iter().enumerate().skip(header_row + 1) {
            if raw_row.iter().all(CellValue::is_empty) {
                skipped_blank += 1;
                continue;
            }

            let cell = |idx: usize| raw_row.get(idx).unwrap_or(&empty);
            let brand_article = cell(brand_article_idx).as_text();
            let (brand, article) = split_brand_article(&brand_article);

            rows.push(SalesRow {
                source_row: raw.sheet_row_number(row_idx),
                customer_category: NumberParser::parse(cell(category_idx)),
                brand_article,
                brand,
                article,
                quantity: NumberParser::parse(cell(quantity_idx)),
                last_purchase_price: NumberParser::parse(cell(purchase_idx)),
                sale_price: NumberParser::parse(cell(sale_idx)),
                extras: extra_indices.iter().map(|idx| cell(*idx).clone()).collect(),
            });
        }

        debug!(skipped_blank, "空白行已跳过");
        info!(
            header_row,
            rows = rows.len(),
            extra_columns = extra_columns.len(),
            "销售明细导入完成"
        );

        Ok(SalesTable {
            header_row,
            columns: resolved.into_iter().map(|c| c.name).collect(),
            extra_columns,
            rows,
        })
    }
}
