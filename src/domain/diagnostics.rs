// ==========================================
// 钢材库存匹配系统 - 运行诊断收集器
// ==========================================
// 职责: 各阶段返回结构化事件，替代共享日志流
// 说明: Diagnostics 由编排器创建并显式传入每个阶段
// ==========================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// Stage - 管道阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Load,
    Normalize,
    DefaultFill,
    Coerce,
    Fallback,
    Completeness,
    Match,
    WeightConstraint,
    QuantityConstraint,
    Present,
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "LOAD",
            Stage::Normalize => "NORMALIZE",
            Stage::DefaultFill => "DEFAULT_FILL",
            Stage::Coerce => "COERCE",
            Stage::Fallback => "FALLBACK",
            Stage::Completeness => "COMPLETENESS",
            Stage::Match => "MATCH",
            Stage::WeightConstraint => "WEIGHT_CONSTRAINT",
            Stage::QuantityConstraint => "QUANTITY_CONSTRAINT",
            Stage::Present => "PRESENT",
            Stage::Export => "EXPORT",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 事件级别 / 类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// 列标签被映射为标准字段
    ColumnRenamed,
    /// 多个源列折叠到同一标准字段
    DuplicateColumnMerged,
    /// schema 声明字段在源中缺失，已补建 Null 列
    ColumnSynthesized,
    /// 默认值填充
    DefaultFilled,
    /// 值无法转换为声明类型，已置 Null
    MalformedValue,
    /// 派生回填
    FallbackApplied,
    /// 供应记录必填字段缺失，已排除
    IncompleteRecord,
    /// 需求记录匹配键缺失，不参与匹配
    DemandKeyMissing,
    /// 约束阶段因列缺失而跳过
    ConstraintSkipped,
    /// 约束阶段剔除行
    ConstraintRejected,
}

// ==========================================
// DiagnosticEvent - 单条诊断事件
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEvent {
    pub stage: Stage,
    pub level: DiagLevel,
    pub kind: EventKind,
    pub row: Option<usize>, // 阶段输入表中的行下标（0 起）
    pub field: Option<String>,
    pub message: String,
}

// ==========================================
// StageReport - 阶段行数统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub label: String,
    pub rows_in: usize,
    pub rows_out: usize,
}

// ==========================================
// Diagnostics - 收集器
// ==========================================
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    events: Vec<DiagnosticEvent>,
    stages: Vec<StageReport>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DiagnosticEvent) {
        self.events.push(event);
    }

    pub fn info(&mut self, stage: Stage, kind: EventKind, message: impl Into<String>) {
        self.push(stage, DiagLevel::Info, kind, None, None, message.into());
    }

    pub fn field_info(
        &mut self,
        stage: Stage,
        kind: EventKind,
        field: &str,
        message: impl Into<String>,
    ) {
        self.push(
            stage,
            DiagLevel::Info,
            kind,
            None,
            Some(field.to_string()),
            message.into(),
        );
    }

    pub fn row_info(
        &mut self,
        stage: Stage,
        kind: EventKind,
        row: usize,
        field: &str,
        message: impl Into<String>,
    ) {
        self.push(
            stage,
            DiagLevel::Info,
            kind,
            Some(row),
            Some(field.to_string()),
            message.into(),
        );
    }

    pub fn row_warning(
        &mut self,
        stage: Stage,
        kind: EventKind,
        row: usize,
        field: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(
            stage,
            DiagLevel::Warning,
            kind,
            Some(row),
            field.map(str::to_string),
            message.into(),
        );
    }

    fn push(
        &mut self,
        stage: Stage,
        level: DiagLevel,
        kind: EventKind,
        row: Option<usize>,
        field: Option<String>,
        message: String,
    ) {
        self.events.push(DiagnosticEvent {
            stage,
            level,
            kind,
            row,
            field,
            message,
        });
    }

    /// 记录阶段行数
    pub fn stage(&mut self, stage: Stage, label: impl Into<String>, rows_in: usize, rows_out: usize) {
        self.stages.push(StageReport {
            stage,
            label: label.into(),
            rows_in,
            rows_out,
        });
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    pub fn stage_reports(&self) -> &[StageReport] {
        &self.stages
    }

    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &DiagnosticEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events_of(kind).count()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<EventKind, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn warning_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.level == DiagLevel::Warning)
            .count()
    }
}

// ==========================================
// RunSummary - 一次运行的汇总
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub output_rows: usize,
    pub stages: Vec<StageReport>,
    pub event_counts: BTreeMap<EventKind, usize>,
    pub events: Vec<DiagnosticEvent>,
}

impl RunSummary {
    pub fn from_diagnostics(
        run_id: String,
        pipeline: &str,
        started_at: DateTime<Utc>,
        output_rows: usize,
        diagnostics: Diagnostics,
    ) -> Self {
        let event_counts = diagnostics.counts_by_kind();
        Self {
            run_id,
            pipeline: pipeline.to_string(),
            started_at,
            finished_at: Utc::now(),
            output_rows,
            stages: diagnostics.stages,
            event_counts,
            events: diagnostics.events,
        }
    }

    /// 查找某阶段最后一次的行数统计
    pub fn stage_report(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().rev().find(|s| s.stage == stage)
    }
}
