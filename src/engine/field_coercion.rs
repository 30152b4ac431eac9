// ==========================================
// 钢材库存匹配系统 - 字段类型转换
// ==========================================
// 职责: 按 schema 把单元格转换为声明的语义类型
// 规则:
// - 数值: 宽松解析，失败/非有限值 → Null（MalformedValue 事件）
// - 文本: 数值转字符串，不报错
// - 声明字段在表中缺失 → 补建全 Null 列
// ==========================================

use crate::domain::{Diagnostics, EventKind, FieldType, Stage, Table, TableSchema, Value};

/// 数值转换（宽松）
pub fn coerce_numeric(value: &Value) -> Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Number(n) if n.is_finite() => Ok(Value::Number(*n)),
        Value::Number(n) => Err(format!("非有限数值: {}", n)),
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(format!("无法解析为数值: {}", s)),
        },
    }
}

/// 文本转换（数值 → 字符串；整数值不带小数部分）
pub fn coerce_text(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Number(n) => Value::Text(n.to_string()),
        Value::Text(s) => Value::Text(s.clone()),
    }
}

pub struct FieldCoercion<'a> {
    schema: &'a TableSchema,
    synthesize_missing: bool,
}

impl<'a> FieldCoercion<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            synthesize_missing: true,
        }
    }

    /// 缺失的声明字段保持缺失（库存清洗口径）
    pub fn without_synthesis(mut self) -> Self {
        self.synthesize_missing = false;
        self
    }

    /// 原地转换；返回置 Null 的单元格数
    pub fn coerce(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> usize {
        let mut malformed = 0;

        for spec in &self.schema.fields {
            let idx = match table.column_index(&spec.name) {
                Some(idx) => idx,
                None if self.synthesize_missing => {
                    table.add_synthesized_column(&spec.name);
                    diagnostics.field_info(
                        Stage::Coerce,
                        EventKind::ColumnSynthesized,
                        &spec.name,
                        format!("源表缺少字段 '{}'，已补建 Null 列", spec.name),
                    );
                    continue;
                }
                None => continue,
            };

            for (row_idx, row) in table.rows_mut().iter_mut().enumerate() {
                let cell = &mut row[idx];
                match spec.field_type {
                    FieldType::Text => *cell = coerce_text(cell),
                    FieldType::Numeric => match coerce_numeric(cell) {
                        Ok(v) => *cell = v,
                        Err(message) => {
                            malformed += 1;
                            diagnostics.row_warning(
                                Stage::Coerce,
                                EventKind::MalformedValue,
                                row_idx,
                                Some(&spec.name),
                                message,
                            );
                            *cell = Value::Null;
                        }
                    },
                }
            }
        }

        malformed
    }
}
