// ==========================================
// 钢材库存匹配系统 - 管道错误类型
// ==========================================
// 致命错误只有三类: 输入不可用 / 输出写入失败 / 配置非法
// 值级问题（格式错误、记录不完整）在阶段内恢复，记入 Diagnostics
// ==========================================

use crate::config::ConfigError;
use crate::domain::{Stage, TableRole};
use crate::exporter::ExportError;
use crate::importer::ImportError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[{stage}] {role} 输入不可用 ({path}): {source}")]
    SourceUnavailable {
        stage: Stage,
        role: TableRole,
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    #[error("[{stage}] 输出写入失败: {source}")]
    SinkWriteFailure {
        stage: Stage,
        #[source]
        source: ExportError,
    },

    #[error("配置非法: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub fn source_unavailable(role: TableRole, path: PathBuf, source: ImportError) -> Self {
        PipelineError::SourceUnavailable {
            stage: Stage::Load,
            role,
            path,
            source,
        }
    }
}

impl From<ExportError> for PipelineError {
    fn from(source: ExportError) -> Self {
        PipelineError::SinkWriteFailure {
            stage: Stage::Export,
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
