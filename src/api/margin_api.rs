// ==========================================
// 毛利分析API
// ==========================================
// 职责: 供展示层调用的门面：导入 → 毛利派生 → 聚合
// 说明: 每次上传独立计算，结果不跨上传缓存
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AnalysisConfig, MarginTargets};
use crate::domain::report::{ArticleOpportunityRow, ArticleSummaryRow, OpportunityRow, SegmentKpi};
use crate::domain::sales::EnrichedTable;
use crate::domain::segment::Segment;
use crate::engine::{AggregationEngine, MarginEngine};
use crate::importer::SalesLoader;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

/// 分析报告（单个文件）
#[derive(Debug, Clone, Serialize)]
pub struct MarginReport {
    /// 读取的文件名
    pub file_name: String,
    /// 使用的目标毛利率
    pub targets: MarginTargets,
    /// 明细（含毛利派生列）
    pub table: EnrichedTable,
    /// 分段 KPI（flotte / non_flotte / totale）
    pub segment_kpis: Vec<SegmentKpi>,
    /// 车队品牌改善机会
    pub flotte_opportunities: Vec<OpportunityRow>,
    /// 非车队（客户）品牌改善机会
    pub non_flotte_opportunities: Vec<OpportunityRow>,
    /// 处理耗时（毫秒）
    pub elapsed_ms: u128,
}

pub struct MarginApi {
    loader: SalesLoader,
    margin_engine: MarginEngine,
    aggregation_engine: AggregationEngine,
    config: AnalysisConfig,
}

impl MarginApi {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            loader: SalesLoader::from_config(&config),
            margin_engine: MarginEngine::new(),
            aggregation_engine: AggregationEngine::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 分析上传的文件流
    ///
    /// # 参数
    /// - reader: 文件流
    /// - file_name: 文件名（用于格式校验）
    /// - targets: 车队 / 非车队目标毛利率
    ///
    /// # 返回
    /// - Ok(MarginReport)
    /// - Err(UnsupportedFormat / MissingColumns): 结构化业务错误
    /// - Err(InvalidInput): 目标毛利率超出 [0, 1]
    /// - Err(Unexpected): 文件损坏或无法读取
    #[instrument(skip(self, reader, targets))]
    pub fn analyze<R: Read + Seek>(
        &self,
        reader: R,
        file_name: &str,
        targets: &MarginTargets,
    ) -> ApiResult<MarginReport> {
        let start_time = Instant::now();
        targets.validate()?;

        let sales = self.loader.load(reader, file_name)?;
        let table = self.margin_engine.enrich(&sales);

        let segment_kpis = self.aggregation_engine.segment_kpis(&table.rows);
        let flotte_opportunities = self
            .aggregation_engine
            .flotte_brand_opportunities(&table.rows, targets.flotte_pct);
        let non_flotte_opportunities = self
            .aggregation_engine
            .non_flotte_brand_opportunities(&table.rows, targets.non_flotte_pct);

        let elapsed_ms = start_time.elapsed().as_millis();
        info!(
            rows = table.len(),
            flotte_brands = flotte_opportunities.len(),
            non_flotte_brands = non_flotte_opportunities.len(),
            elapsed_ms = elapsed_ms as u64,
            "毛利分析完成"
        );

        Ok(MarginReport {
            file_name: file_name.to_string(),
            targets: *targets,
            table,
            segment_kpis,
            flotte_opportunities,
            non_flotte_opportunities,
            elapsed_ms,
        })
    }

    /// 分析本地文件
    pub fn analyze_path<P: AsRef<Path>>(
        &self,
        path: P,
        targets: &MarginTargets,
    ) -> ApiResult<MarginReport> {
        let path = path.as_ref();
        let file_name = path.display().to_string();
        // 格式错误优先于文件打开错误
        crate::importer::file_parser::ensure_supported_format(&file_name)?;

        let file = File::open(path).map_err(|e| ApiError::Unexpected(e.to_string()))?;
        self.analyze(BufReader::new(file), &file_name, targets)
    }

    /// 商品下钻
    pub fn drilldown(
        &self,
        table: &EnrichedTable,
        segment: Segment,
        brand: &str,
        target_pct: f64,
    ) -> ApiResult<Vec<ArticleOpportunityRow>> {
        if !(0.0..=1.0).contains(&target_pct) {
            return Err(ApiError::InvalidInput(format!(
                "target_pct={} fuori dall'intervallo [0, 1]",
                target_pct
            )));
        }

        Ok(self
            .aggregation_engine
            .segment_article_drilldown(&table.rows, segment, brand, target_pct))
    }

    /// 低毛利商品（阈值缺省时使用配置值）
    pub fn low_margin(
        &self,
        table: &EnrichedTable,
        segment: Segment,
        threshold_pct: Option<f64>,
    ) -> Vec<ArticleSummaryRow> {
        let threshold = threshold_pct.unwrap_or(self.config.low_margin_threshold_pct);
        self.aggregation_engine
            .low_margin_articles(&table.rows, segment, threshold)
    }

    /// 分段内可选品牌
    pub fn brands(&self, table: &EnrichedTable, segment: Segment) -> Vec<String> {
        self.aggregation_engine.brands(&table.rows, segment)
    }
}

impl Default for MarginApi {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
