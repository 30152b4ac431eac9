// ==========================================
// 钢材库存匹配系统 - 命令行入口
// ==========================================
// 子命令:
//   match - 供应表 × 需求表 → 推荐表
//   clean - 多个库存表清洗合并
// 退出码: 0 成功；1 任何致命错误
// ==========================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use steel_stock_matcher::{
    logging, CsvTableWriter, InventoryCleaningPipeline, MatchConfig, RecommendationPipeline,
    RunSummary, APP_NAME, VERSION,
};
use tracing::{error, info};

/// 钢材库存匹配系统
#[derive(Parser, Debug)]
#[command(name = "steel-stock-matcher")]
#[command(about = "Match steel supplier inventory against buyer preferences")]
#[command(version)]
struct Cli {
    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 生成供需推荐表
    Match {
        #[command(flatten)]
        common: CommonArgs,

        /// 采购方需求表 (.csv/.xlsx/.xls)
        #[arg(short, long)]
        buyer: PathBuf,
    },

    /// 清洗并合并库存表
    Clean {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// 供应方库存表，可重复 (.csv/.xlsx/.xls)
    #[arg(short, long = "supplier", required = true)]
    suppliers: Vec<PathBuf>,

    /// 输出 CSV 路径
    #[arg(short, long)]
    output: PathBuf,

    /// 配置文件 (JSON)
    #[arg(short, long, env = "STEEL_STOCK_MATCHER_CONFIG")]
    config: Option<PathBuf>,

    /// 运行汇总 (JSON) 输出路径
    #[arg(long)]
    report: Option<PathBuf>,
}

fn write_report(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("运行汇总序列化失败")?;
    std::fs::write(path, json)
        .with_context(|| format!("运行汇总写入失败: {}", path.display()))?;
    info!(report = %path.display(), "运行汇总已写出");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let (common, summary) = match cli.command {
        Command::Match { common, buyer } => {
            let config = MatchConfig::load(common.config.as_deref()).context("配置加载失败")?;
            let pipeline = RecommendationPipeline::new(config);
            let summary = pipeline
                .run(&common.suppliers, &buyer, &common.output, &CsvTableWriter::default())
                .context("推荐管道执行失败")?;
            (common, summary)
        }
        Command::Clean { common } => {
            let config = MatchConfig::load(common.config.as_deref()).context("配置加载失败")?;
            let pipeline = InventoryCleaningPipeline::new(config);
            let summary = pipeline
                .run(&common.suppliers, &common.output, &CsvTableWriter::default())
                .context("库存清洗管道执行失败")?;
            (common, summary)
        }
    };

    for stage in &summary.stages {
        info!(
            stage = %stage.stage,
            label = %stage.label,
            rows_in = stage.rows_in,
            rows_out = stage.rows_out,
            "阶段统计"
        );
    }
    info!(
        run_id = %summary.run_id,
        output = %common.output.display(),
        rows = summary.output_rows,
        "输出已写出"
    );

    if let Some(report) = &common.report {
        write_report(report, &summary)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    info!("{} v{}", APP_NAME, VERSION);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("错误: {:#}", e);
            ExitCode::from(1)
        }
    }
}
