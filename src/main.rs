// ==========================================
// DR Margin Tool - 命令行入口
// ==========================================
// 职责: 薄展示层：调用 MarginApi，输出 JSON 报表
// 错误: 业务错误显示结构化提示；意外错误只显示通用重试提示
// ==========================================

use anyhow::Context;
use clap::Parser;
use dr_margin_tool::api::{ApiError, MarginApi, MarginReport};
use dr_margin_tool::domain::{ArticleOpportunityRow, ArticleSummaryRow, Segment};
use dr_margin_tool::{i18n, logging, AnalysisConfig, MarginTargets};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "dr-margin", version, about = "Analisi margini da export vendite .xlsx")]
struct Cli {
    /// File Excel vendite (.xlsx)
    file: PathBuf,

    /// Margine obiettivo flotte (0-1)
    #[arg(long)]
    target_flotte: Option<f64>,

    /// Margine obiettivo clienti / non flotte (0-1)
    #[arg(long)]
    target_clienti: Option<f64>,

    /// Segmento per drilldown e articoli a basso margine (flotte / non_flotte / tutti)
    #[arg(long, default_value = "tutti")]
    segment: Segment,

    /// Marca da analizzare per articolo
    #[arg(long)]
    brand: Option<String>,

    /// Includi gli articoli sotto questa soglia di margine (0-1)
    #[arg(long)]
    low_margin_threshold: Option<f64>,

    /// Lingua dei messaggi (it / en; predefinita: it)
    #[arg(long)]
    lang: Option<String>,

    /// JSON indentato
    #[arg(long)]
    pretty: bool,

    /// Log in formato JSON
    #[arg(long)]
    log_json: bool,
}

#[derive(Serialize)]
struct CliOutput {
    report: MarginReport,
    brands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    drilldown: Option<Vec<ArticleOpportunityRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    low_margin_articles: Option<Vec<ArticleSummaryRow>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志系统
    logging::init(cli.log_json);
    if let Some(lang) = &cli.lang {
        i18n::set_locale(lang);
    }

    tracing::info!("{} v{}", dr_margin_tool::APP_NAME, dr_margin_tool::VERSION);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(api_err) => {
                    if api_err.is_unexpected() {
                        tracing::error!(error = %api_err, "分析失败（意外错误）");
                    }
                    eprintln!("{}", api_err.user_message());
                }
                None => {
                    tracing::error!(error = %err, "分析失败");
                    eprintln!("{}", i18n::t("error.unexpected"));
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let api = MarginApi::new(AnalysisConfig::from_env());
    let defaults = api.config().default_targets;
    let targets = MarginTargets {
        flotte_pct: cli.target_flotte.unwrap_or(defaults.flotte_pct),
        non_flotte_pct: cli.target_clienti.unwrap_or(defaults.non_flotte_pct),
    };
    let report = api.analyze_path(&cli.file, &targets)?;

    let brands = api.brands(&report.table, cli.segment);
    let drilldown = match &cli.brand {
        Some(brand) => {
            let target_pct = match cli.segment {
                Segment::Flotte => targets.flotte_pct,
                _ => targets.non_flotte_pct,
            };
            Some(api.drilldown(&report.table, cli.segment, brand, target_pct)?)
        }
        None => None,
    };
    let low_margin_articles = cli
        .low_margin_threshold
        .map(|threshold| api.low_margin(&report.table, cli.segment, Some(threshold)));

    let output = CliOutput {
        report,
        brands,
        drilldown,
        low_margin_articles,
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if cli.pretty {
        serde_json::to_writer_pretty(&mut handle, &output)
    } else {
        serde_json::to_writer(&mut handle, &output)
    }
    .context("scrittura del report su stdout non riuscita")?;
    writeln!(handle)?;

    Ok(())
}
