// ==========================================
// DR Margin Tool - 领域层
// ==========================================

pub mod cell;
pub mod report;
pub mod sales;
pub mod segment;

pub use cell::{CellValue, RawTable};
pub use report::{
    ArticleOpportunityRow, ArticleSummaryRow, BrandSummaryRow, OpportunityRow, SegmentKpi,
};
pub use sales::{CanonicalColumn, EnrichedRow, EnrichedTable, SalesRow, SalesTable};
pub use segment::Segment;
