// ==========================================
// 钢材库存匹配系统 - 管道编排器
// ==========================================
// 推荐管道:
//   加载 → 列名规范化 → 默认值填充 → 类型转换 → 派生回填
//   → 完整性过滤 → 匹配 → 约束过滤链 → 展示标签 → 导出
// 库存清洗管道:
//   加载 → 列名规范化 → 默认值填充 → 数值转换 → 拼接 → 导出
// 红线: 所有输入加载成功后才开始处理；任何致命错误都不写输出
// ==========================================

use crate::config::MatchConfig;
use crate::domain::{Diagnostics, RunSummary, Stage, Table, TableRole, TableSchema};
use crate::engine::completeness_filter::CompletenessFilter;
use crate::engine::constraint_filter::ConstraintChain;
use crate::engine::error::{PipelineError, PipelineResult};
use crate::engine::fallback_resolver::{DefaultFiller, FallbackResolver};
use crate::engine::field_coercion::FieldCoercion;
use crate::engine::match_engine::MatchEngine;
use crate::engine::presentation::PresentationFormatter;
use crate::engine::schema_normalizer::SchemaNormalizer;
use crate::exporter::TableSink;
use crate::importer::{FileParser, UniversalFileParser};
use crate::perf::PerfGuard;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub const RECOMMENDATION_PIPELINE: &str = "recommendation";
pub const INVENTORY_PIPELINE: &str = "inventory_cleaning";

// ==========================================
// PipelineOutput - 内存运行结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: Table,
    pub summary: RunSummary,
}

fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

fn load_table(
    parser: &dyn FileParser,
    path: &Path,
    role: TableRole,
    diagnostics: &mut Diagnostics,
) -> PipelineResult<Table> {
    let table = parser
        .parse_table(path, role)
        .map_err(|e| PipelineError::source_unavailable(role, path.to_path_buf(), e))?;

    info!(
        role = %role,
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "输入表加载完成"
    );
    diagnostics.stage(
        Stage::Load,
        format!("{} {}", role, path.display()),
        table.row_count(),
        table.row_count(),
    );
    Ok(table)
}

fn export(
    sink: &dyn TableSink,
    table: &Table,
    output: &Path,
    diagnostics: &mut Diagnostics,
) -> PipelineResult<usize> {
    let _perf = PerfGuard::new("export");
    let written = sink.write_table(table, output)?;
    diagnostics.stage(
        Stage::Export,
        output.display().to_string(),
        table.row_count(),
        written,
    );
    Ok(written)
}

// ==========================================
// RecommendationPipeline - 供需推荐管道
// ==========================================
pub struct RecommendationPipeline {
    config: MatchConfig,
    parser: Box<dyn FileParser>,
}

impl RecommendationPipeline {
    /// 创建管道（按扩展名自动选择 CSV / Excel 解析器）
    pub fn new(config: MatchConfig) -> Self {
        Self::with_parser(config, Box::new(UniversalFileParser))
    }

    pub fn with_parser(config: MatchConfig, parser: Box<dyn FileParser>) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// 供应侧准备: 各来源分别规范化 → 拼接 → 填充 → 转换 → 回填 → 完整性过滤
    pub fn prepare_supply(&self, sources: Vec<Table>, diagnostics: &mut Diagnostics) -> Table {
        let _perf = PerfGuard::new("prepare_supply");

        // ==========================================
        // 步骤1: 列名规范化（每个来源独立）
        // ==========================================
        let normalizer = SchemaNormalizer::for_role(TableRole::Supply, &self.config);
        let mut normalized = Vec::with_capacity(sources.len());
        for source in sources {
            let rows = source.row_count();
            normalized.push(normalizer.normalize(source, diagnostics));
            diagnostics.stage(Stage::Normalize, "supply", rows, rows);
        }

        let mut supply = Table::concat(TableRole::Supply, normalized);
        debug!(
            rows = supply.row_count(),
            columns = ?supply.columns(),
            "供应表拼接完成"
        );

        // ==========================================
        // 步骤2: 默认值填充（类型转换前）
        // ==========================================
        let rows = supply.row_count();
        let filled = DefaultFiller::new(&self.config.match_default_fills).apply(&mut supply, diagnostics);
        diagnostics.stage(Stage::DefaultFill, "supply", rows, rows);

        // ==========================================
        // 步骤3: 类型转换
        // ==========================================
        let schema = TableSchema::supply();
        let malformed = FieldCoercion::new(&schema).coerce(&mut supply, diagnostics);
        diagnostics.stage(Stage::Coerce, "supply", rows, rows);

        // ==========================================
        // 步骤4: 派生回填
        // ==========================================
        let derived = FallbackResolver::new(&self.config.fallback_rules).resolve(&mut supply, diagnostics);
        diagnostics.stage(Stage::Fallback, "supply", rows, rows);

        // ==========================================
        // 步骤5: 完整性过滤
        // ==========================================
        let excluded =
            CompletenessFilter::new(&self.config.required_supply_fields).apply(&mut supply, diagnostics);
        diagnostics.stage(Stage::Completeness, "supply", rows, supply.row_count());

        info!(
            rows_in = rows,
            rows_out = supply.row_count(),
            filled,
            malformed,
            derived,
            excluded,
            "供应表准备完成"
        );
        supply
    }

    /// 需求侧准备: 规范化 → 转换（不做完整性过滤）
    pub fn prepare_demand(&self, source: Table, diagnostics: &mut Diagnostics) -> Table {
        let _perf = PerfGuard::new("prepare_demand");

        let rows = source.row_count();
        let normalizer = SchemaNormalizer::for_role(TableRole::Demand, &self.config);
        let mut demand = normalizer.normalize(source, diagnostics);
        diagnostics.stage(Stage::Normalize, "demand", rows, rows);

        let schema = TableSchema::demand();
        let malformed = FieldCoercion::new(&schema).coerce(&mut demand, diagnostics);
        diagnostics.stage(Stage::Coerce, "demand", rows, rows);

        info!(rows, malformed, "需求表准备完成");
        demand
    }

    fn execute(&self, supply: Vec<Table>, demand: Table, diagnostics: &mut Diagnostics) -> Table {
        let supply = self.prepare_supply(supply, diagnostics);
        let demand = self.prepare_demand(demand, diagnostics);

        // ==========================================
        // 匹配
        // ==========================================
        let mut matched = {
            let _perf = PerfGuard::new("match");
            MatchEngine::new().join(&demand, &supply, diagnostics)
        };
        diagnostics.stage(
            Stage::Match,
            format!("{} demand × {} supply", demand.row_count(), supply.row_count()),
            demand.row_count(),
            matched.row_count(),
        );
        info!(
            demand_rows = demand.row_count(),
            supply_rows = supply.row_count(),
            matched_rows = matched.row_count(),
            "等值匹配完成"
        );

        // ==========================================
        // 约束过滤链
        // ==========================================
        let rows_before = matched.row_count();
        let rejected = {
            let _perf = PerfGuard::new("constraints");
            ConstraintChain::standard(self.config.strict_constraint_nulls)
                .apply(&mut matched, diagnostics)
        };
        info!(
            rows_in = rows_before,
            rows_out = matched.row_count(),
            rejected,
            "约束过滤完成"
        );

        // ==========================================
        // 展示标签
        // ==========================================
        PresentationFormatter::new(&self.config.display_labels).apply(&mut matched, diagnostics);
        matched
    }

    /// 内存运行（不涉及文件）
    pub fn recommend(&self, supply: Vec<Table>, demand: Table) -> PipelineOutput {
        let run_id = new_run_id();
        let started_at = Utc::now();
        let mut diagnostics = Diagnostics::new();

        let table = self.execute(supply, demand, &mut diagnostics);
        let summary = RunSummary::from_diagnostics(
            run_id,
            RECOMMENDATION_PIPELINE,
            started_at,
            table.row_count(),
            diagnostics,
        );
        PipelineOutput { table, summary }
    }

    /// 文件运行: 加载全部输入 → 处理 → 写出推荐表
    ///
    /// # 错误
    /// - SourceUnavailable: 任一输入无法读取（不写输出）
    /// - SinkWriteFailure: 输出写入失败
    #[instrument(skip_all, fields(output = %output.display()))]
    pub fn run(
        &self,
        supply_paths: &[PathBuf],
        demand_path: &Path,
        output: &Path,
        sink: &dyn TableSink,
    ) -> PipelineResult<RunSummary> {
        let _perf = PerfGuard::new("recommendation_run");
        let run_id = new_run_id();
        let started_at = Utc::now();
        let mut diagnostics = Diagnostics::new();

        info!(
            run_id = %run_id,
            suppliers = supply_paths.len(),
            buyer = %demand_path.display(),
            "开始执行推荐管道"
        );

        let mut supply = Vec::with_capacity(supply_paths.len());
        for path in supply_paths {
            supply.push(load_table(
                self.parser.as_ref(),
                path,
                TableRole::Supply,
                &mut diagnostics,
            )?);
        }
        let demand = load_table(
            self.parser.as_ref(),
            demand_path,
            TableRole::Demand,
            &mut diagnostics,
        )?;

        let table = self.execute(supply, demand, &mut diagnostics);
        let written = export(sink, &table, output, &mut diagnostics)?;
        let warnings = diagnostics.warning_count();

        let summary = RunSummary::from_diagnostics(
            run_id,
            RECOMMENDATION_PIPELINE,
            started_at,
            written,
            diagnostics,
        );
        info!(
            run_id = %summary.run_id,
            output_rows = summary.output_rows,
            warnings,
            "推荐管道执行完成"
        );
        Ok(summary)
    }
}

// ==========================================
// InventoryCleaningPipeline - 库存清洗管道
// ==========================================
pub struct InventoryCleaningPipeline {
    config: MatchConfig,
    parser: Box<dyn FileParser>,
}

impl InventoryCleaningPipeline {
    pub fn new(config: MatchConfig) -> Self {
        Self::with_parser(config, Box::new(UniversalFileParser))
    }

    pub fn with_parser(config: MatchConfig, parser: Box<dyn FileParser>) -> Self {
        Self { config, parser }
    }

    fn execute(&self, sources: Vec<Table>, diagnostics: &mut Diagnostics) -> Table {
        let _perf = PerfGuard::new("clean_inventory");

        let normalizer = SchemaNormalizer::for_role(TableRole::Supply, &self.config);
        let filler = DefaultFiller::new(&self.config.inventory_default_fills);
        let schema = TableSchema::inventory_numeric();
        let coercion = FieldCoercion::new(&schema).without_synthesis();

        let mut cleaned = Vec::with_capacity(sources.len());
        for source in sources {
            let rows = source.row_count();
            let mut table = normalizer.normalize(source, diagnostics);
            diagnostics.stage(Stage::Normalize, "inventory", rows, rows);

            filler.apply(&mut table, diagnostics);
            diagnostics.stage(Stage::DefaultFill, "inventory", rows, rows);

            coercion.coerce(&mut table, diagnostics);
            diagnostics.stage(Stage::Coerce, "inventory", rows, rows);

            cleaned.push(table);
        }

        let merged = Table::concat(TableRole::Supply, cleaned);
        info!(
            rows = merged.row_count(),
            columns = merged.columns().len(),
            "库存表清洗合并完成"
        );
        merged
    }

    /// 内存运行
    pub fn clean(&self, sources: Vec<Table>) -> PipelineOutput {
        let run_id = new_run_id();
        let started_at = Utc::now();
        let mut diagnostics = Diagnostics::new();

        let table = self.execute(sources, &mut diagnostics);
        let summary = RunSummary::from_diagnostics(
            run_id,
            INVENTORY_PIPELINE,
            started_at,
            table.row_count(),
            diagnostics,
        );
        PipelineOutput { table, summary }
    }

    /// 文件运行: 加载全部库存表 → 清洗 → 合并写出
    #[instrument(skip_all, fields(output = %output.display()))]
    pub fn run(
        &self,
        supply_paths: &[PathBuf],
        output: &Path,
        sink: &dyn TableSink,
    ) -> PipelineResult<RunSummary> {
        let run_id = new_run_id();
        let started_at = Utc::now();
        let mut diagnostics = Diagnostics::new();

        info!(run_id = %run_id, suppliers = supply_paths.len(), "开始执行库存清洗管道");

        let mut sources = Vec::with_capacity(supply_paths.len());
        for path in supply_paths {
            sources.push(load_table(
                self.parser.as_ref(),
                path,
                TableRole::Supply,
                &mut diagnostics,
            )?);
        }

        let table = self.execute(sources, &mut diagnostics);
        let written = export(sink, &table, output, &mut diagnostics)?;

        Ok(RunSummary::from_diagnostics(
            run_id,
            INVENTORY_PIPELINE,
            started_at,
            written,
            diagnostics,
        ))
    }
}
