// ==========================================
// DR Margin Tool - 表头识别与别名映射
// ==========================================
// 职责: 探测表头所在行 + 缩写/变体表头 → 规范列
// 规则: 匹配前统一 TRIM / 折叠空白 / 小写 / 撇号归一
// 说明: 别名表为静态配置，首次使用时构建，之后只读
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::sales::CanonicalColumn;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// 表头行判定所需的三个概念组
const HEADER_ANCHORS: [CanonicalColumn; 3] = [
    CanonicalColumn::CustomerCategory,
    CanonicalColumn::BrandArticle,
    CanonicalColumn::Quantity,
];

/// 别名表原始数据（键写成归一化后的形式）
const ALIAS_ENTRIES: &[(&str, CanonicalColumn)] = &[
    // 客户类别
    ("categoria cliente", CanonicalColumn::CustomerCategory),
    ("cat. cliente", CanonicalColumn::CustomerCategory),
    ("cat cliente", CanonicalColumn::CustomerCategory),
    ("ct", CanonicalColumn::CustomerCategory),
    // 品牌 / 商品
    ("marca / articolo", CanonicalColumn::BrandArticle),
    ("marca/articolo", CanonicalColumn::BrandArticle),
    ("marca articolo", CanonicalColumn::BrandArticle),
    ("marca - articolo", CanonicalColumn::BrandArticle),
    // 数量
    ("quantità", CanonicalColumn::Quantity),
    ("quantita", CanonicalColumn::Quantity),
    ("quantita'", CanonicalColumn::Quantity),
    ("q.ta", CanonicalColumn::Quantity),
    ("q.ta'", CanonicalColumn::Quantity),
    ("q.tà", CanonicalColumn::Quantity),
    ("qta", CanonicalColumn::Quantity),
    ("qta'", CanonicalColumn::Quantity),
    ("qtà", CanonicalColumn::Quantity),
    // 最近采购价
    ("ultimo prezzo acquisto", CanonicalColumn::LastPurchasePrice),
    ("prz. ult.acq", CanonicalColumn::LastPurchasePrice),
    ("prz. ult.acq.", CanonicalColumn::LastPurchasePrice),
    ("prz.ult.acq.", CanonicalColumn::LastPurchasePrice),
    ("ult. prezzo acq.", CanonicalColumn::LastPurchasePrice),
    ("u.p.a.", CanonicalColumn::LastPurchasePrice),
    ("u.p.a", CanonicalColumn::LastPurchasePrice),
    ("upa", CanonicalColumn::LastPurchasePrice),
    // 销售价
    ("prezzo vendita", CanonicalColumn::SalePrice),
    ("prz. vendita", CanonicalColumn::SalePrice),
    ("prezzo sc", CanonicalColumn::SalePrice),
    ("prezzo sc.", CanonicalColumn::SalePrice),
    ("p.v.", CanonicalColumn::SalePrice),
    ("p.v", CanonicalColumn::SalePrice),
    ("pv", CanonicalColumn::SalePrice),
    // 客户代码
    ("codice cliente", CanonicalColumn::CustomerCode),
    ("cod. cliente", CanonicalColumn::CustomerCode),
    ("cfr", CanonicalColumn::CustomerCode),
    // 客户子类别
    ("sottocategoria cliente", CanonicalColumn::CustomerSubcategory),
    ("cs", CanonicalColumn::CustomerSubcategory),
    // 加价率
    ("ricarico", CanonicalColumn::Markup),
    ("%ric.", CanonicalColumn::Markup),
    ("%ric", CanonicalColumn::Markup),
    ("% ric.", CanonicalColumn::Markup),
];

static HEADER_ALIASES: Lazy<HashMap<String, CanonicalColumn>> = Lazy::new(|| {
    ALIAS_ENTRIES
        .iter()
        .map(|(alias, column)| (normalize_header(alias), *column))
        .collect()
});

/// 表头清洗（TRIM + 折叠连续空白），保留大小写
pub fn clean_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 表头归一化：清洗 + 小写 + 撇号归一（用作别名表键）
pub fn normalize_header(raw: &str) -> String {
    clean_header(raw)
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\u{02BC}' | '\u{00B4}' | '`' => '\'',
            other => other,
        })
        .collect()
}

/// 解析后的列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub name: String,
    pub canonical: Option<CanonicalColumn>,
}

pub struct HeaderResolver;

impl HeaderResolver {
    /// 别名查找（大小写、空白、撇号不敏感）
    pub fn resolve(&self, header: &str) -> Option<CanonicalColumn> {
        HEADER_ALIASES.get(&normalize_header(header)).copied()
    }

    /// 在预览窗口中探测表头行
    ///
    /// # 规则
    /// - 逐行扫描，某行同时包含"客户类别 / 品牌商品 / 数量"三组别名时即为表头行
    /// - 取首个满足条件的行；窗口内均不满足 → 0
    pub fn detect_header_row(&self, preview: &[Vec<CellValue>]) -> usize {
        for (idx, row) in preview.iter().enumerate() {
            let found: HashSet<CanonicalColumn> = row
                .iter()
                .filter(|cell| !cell.is_empty())
                .filter_map(|cell| self.resolve(&cell.as_text()))
                .collect();

            if HEADER_ANCHORS.iter().all(|anchor| found.contains(anchor)) {
                debug!(header_row = idx, "表头行已识别");
                return idx;
            }
        }

        warn!(scanned = preview.len(), "预览窗口内未识别到表头行，默认使用第 0 行");
        0
    }

    /// 将表头行映射为列名
    ///
    /// # 规则
    /// - 识别的别名 → 规范表头
    /// - 未识别的表头保持原样（仅清洗空白）
    /// - 空表头 → "colonna N"（N 从 1 起）
    /// - 同一规范列出现多次时只认第一列，其余保留原名
    pub fn resolve_columns(&self, header_cells: &[CellValue]) -> Vec<ResolvedColumn> {
        let mut claimed: HashSet<CanonicalColumn> = HashSet::new();

        header_cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let cleaned = clean_header(&cell.as_text());
                if cleaned.is_empty() {
                    return ResolvedColumn {
                        name: format!("colonna {}", idx + 1),
                        canonical: None,
                    };
                }

                match self.resolve(&cleaned) {
                    Some(column) if claimed.insert(column) => ResolvedColumn {
                        name: column.header().to_string(),
                        canonical: Some(column),
                    },
                    Some(column) => {
                        warn!(header = %cleaned, canonical = %column, "规范列重复出现，保留原列名");
                        ResolvedColumn {
                            name: cleaned,
                            canonical: None,
                        }
                    }
                    None => ResolvedColumn {
                        name: cleaned,
                        canonical: None,
                    },
                }
            })
            .collect()
    }
}
