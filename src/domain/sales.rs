// ==========================================
// DR Margin Tool - 销售明细领域模型
// ==========================================
// 职责: 规范列定义 / 规范行 / 毛利派生行
// 红线: 规范表必须包含 5 个必需列，缺失即失败
// 红线: 数值缺失以 NaN 表示，不得默认为 0
// ==========================================

use crate::domain::cell::CellValue;
use serde::Serialize;
use std::fmt;

// ==========================================
// CanonicalColumn - 规范列
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalColumn {
    CustomerCategory,
    BrandArticle,
    Quantity,
    LastPurchasePrice,
    SalePrice,
    CustomerCode,
    CustomerSubcategory,
    Markup,
}

impl CanonicalColumn {
    /// 必需列（顺序即缺失列报错顺序）
    pub const REQUIRED: [CanonicalColumn; 5] = [
        CanonicalColumn::CustomerCategory,
        CanonicalColumn::BrandArticle,
        CanonicalColumn::Quantity,
        CanonicalColumn::LastPurchasePrice,
        CanonicalColumn::SalePrice,
    ];

    /// 规范表头（意大利语，用于列名与报错信息）
    pub fn header(&self) -> &'static str {
        match self {
            CanonicalColumn::CustomerCategory => "categoria cliente",
            CanonicalColumn::BrandArticle => "MARCA / ARTICOLO",
            CanonicalColumn::Quantity => "quantità",
            CanonicalColumn::LastPurchasePrice => "ultimo prezzo acquisto",
            CanonicalColumn::SalePrice => "prezzo vendita",
            CanonicalColumn::CustomerCode => "codice cliente",
            CanonicalColumn::CustomerSubcategory => "sottocategoria cliente",
            CanonicalColumn::Markup => "ricarico",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

// ==========================================
// SalesRow - 规范销售行
// ==========================================
// 用途: 导入层写入，引擎层只读
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRow {
    pub source_row: usize,           // Excel 行号（1 起，便于定位问题）
    pub customer_category: f64,      // 客户类别代码（缺失/非数值 → NaN）
    pub brand_article: String,       // 原始 "MARCA / ARTICOLO"
    pub brand: String,               // 派生：首个 '/' 左侧
    pub article: String,             // 派生：首个 '/' 右侧（无 '/' → ""）
    pub quantity: f64,               // 数量
    pub last_purchase_price: f64,    // 最近采购价
    pub sale_price: f64,             // 销售价
    pub extras: Vec<CellValue>,      // 非必需列，与 SalesTable::extra_columns 对齐
}

// ==========================================
// SalesTable - 规范销售表（单次上传的长生命周期产物）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTable {
    pub header_row: usize,           // RawTable 中的表头行下标
    pub columns: Vec<String>,        // 解析后的全部列名（表格原顺序）
    pub extra_columns: Vec<String>,  // 非必需列名
    pub rows: Vec<SalesRow>,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 读取某一非必需列的值
    pub fn extra_value<'a>(&self, row: &'a SalesRow, column: &str) -> Option<&'a CellValue> {
        let idx = self.extra_columns.iter().position(|c| c == column)?;
        row.extras.get(idx)
    }
}

// ==========================================
// EnrichedRow - 毛利派生行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRow {
    #[serde(flatten)]
    pub sale: SalesRow,
    pub revenue: f64,        // 行营业额 = 销售价 × 数量
    pub margin_amount: f64,  // 行毛利额 = (销售价 - 采购价) × 数量
    pub margin_pct: f64,     // 行毛利率 = (销售价 - 采购价) / 销售价
}

impl EnrichedRow {
    pub fn customer_category(&self) -> f64 {
        self.sale.customer_category
    }

    pub fn brand(&self) -> &str {
        &self.sale.brand
    }

    pub fn article(&self) -> &str {
        &self.sale.article
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTable {
    pub columns: Vec<String>,
    pub extra_columns: Vec<String>,
    pub rows: Vec<EnrichedRow>,
}

impl EnrichedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
