// ==========================================
// 钢材库存匹配系统 - 引擎层
// ==========================================
// 职责: 规范化 / 转换 / 回填 / 过滤 / 匹配 / 展示，各阶段无 I/O
// 红线: 阶段只通过 Diagnostics 报告问题，值级问题不中断运行
// ==========================================

pub mod completeness_filter;
pub mod constraint_filter;
pub mod error;
pub mod fallback_resolver;
pub mod field_coercion;
pub mod match_engine;
pub mod orchestrator;
pub mod presentation;
pub mod schema_normalizer;

// 重导出核心引擎
pub use completeness_filter::CompletenessFilter;
pub use constraint_filter::{Comparison, ConstraintChain, ConstraintOutcome, ConstraintSpec};
pub use error::{PipelineError, PipelineResult};
pub use fallback_resolver::{DefaultFiller, FallbackResolver};
pub use field_coercion::{coerce_numeric, coerce_text, FieldCoercion};
pub use match_engine::{MatchEngine, MATCH_KEYS};
pub use orchestrator::{
    InventoryCleaningPipeline, PipelineOutput, RecommendationPipeline, INVENTORY_PIPELINE,
    RECOMMENDATION_PIPELINE,
};
pub use presentation::PresentationFormatter;
pub use schema_normalizer::SchemaNormalizer;
