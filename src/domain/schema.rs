// ==========================================
// 钢材库存匹配系统 - 字段 Schema 声明
// ==========================================
// 职责: 按表角色声明标准字段、语义类型、必填性
// 说明: 在表构造时（字段类型转换阶段）统一检查一次，
//       下游阶段可假设声明字段一定存在（值可为 Null）
// ==========================================

use crate::domain::types::{FieldType, TableRole};
use serde::{Deserialize, Serialize};

// ==========================================
// 标准字段名
// ==========================================
pub mod fields {
    // ===== 供应方 =====
    pub const GRADE: &str = "grade";
    pub const FINISH: &str = "finish";
    pub const THICKNESS: &str = "thickness";
    pub const WIDTH: &str = "width";
    pub const WEIGHT: &str = "weight";
    pub const GROSS_WEIGHT: &str = "gross_weight";
    pub const QUANTITY: &str = "quantity";

    // ===== 需求方 =====
    pub const BUYER_ID: &str = "buyer_id";
    pub const PREFERRED_GRADE: &str = "preferred_grade";
    pub const PREFERRED_FINISH: &str = "preferred_finish";
    pub const PREFERRED_THICKNESS: &str = "preferred_thickness";
    pub const PREFERRED_WIDTH: &str = "preferred_width";
    pub const MAX_WEIGHT: &str = "max_weight";
    pub const MIN_QUANTITY: &str = "min_quantity";
}

/// 列标签基础规范化: TRIM → 小写 → 内部空白（连续视为一个）替换为 `_`
///
/// 幂等: normalize_label(normalize_label(x)) == normalize_label(x)
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub presence: Presence,
}

impl FieldSpec {
    fn new(name: &str, field_type: FieldType, presence: Presence) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            presence,
        }
    }
}

// ==========================================
// TableSchema - 表角色字段声明
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub role: TableRole,
    pub fields: Vec<FieldSpec>,
}

impl TableSchema {
    /// 供应方库存表
    pub fn supply() -> Self {
        use fields::*;
        use FieldType::*;
        use Presence::*;

        Self {
            role: TableRole::Supply,
            fields: vec![
                FieldSpec::new(GRADE, Text, Required),
                FieldSpec::new(FINISH, Text, Required),
                FieldSpec::new(THICKNESS, Numeric, Required),
                FieldSpec::new(WIDTH, Numeric, Required),
                FieldSpec::new(WEIGHT, Numeric, Required),
                FieldSpec::new(GROSS_WEIGHT, Numeric, Optional),
                FieldSpec::new(QUANTITY, Numeric, Required),
            ],
        }
    }

    /// 采购方需求表
    pub fn demand() -> Self {
        use fields::*;
        use FieldType::*;
        use Presence::*;

        Self {
            role: TableRole::Demand,
            fields: vec![
                FieldSpec::new(BUYER_ID, Text, Required),
                FieldSpec::new(PREFERRED_GRADE, Text, Required),
                FieldSpec::new(PREFERRED_FINISH, Text, Required),
                FieldSpec::new(PREFERRED_THICKNESS, Numeric, Required),
                FieldSpec::new(PREFERRED_WIDTH, Numeric, Required),
                FieldSpec::new(MAX_WEIGHT, Numeric, Optional),
                FieldSpec::new(MIN_QUANTITY, Numeric, Optional),
            ],
        }
    }

    /// 库存清洗口径：只转换数值列，不补建缺失列
    pub fn inventory_numeric() -> Self {
        use fields::*;

        Self {
            role: TableRole::Supply,
            fields: [QUANTITY, GROSS_WEIGHT, WEIGHT, THICKNESS, WIDTH]
                .iter()
                .map(|name| FieldSpec::new(name, FieldType::Numeric, Presence::Optional))
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.presence == Presence::Required)
            .map(|f| f.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Thickness (mm) "), "thickness_(mm)");
        assert_eq!(normalize_label("Gross\tWeight  (KG)"), "gross_weight_(kg)");
        assert_eq!(normalize_label("buyer_id"), "buyer_id");
        assert_eq!(normalize_label("   "), "");
    }

    #[test]
    fn test_supply_required_fields() {
        let schema = TableSchema::supply();
        assert_eq!(
            schema.required_fields(),
            vec!["grade", "finish", "thickness", "width", "weight", "quantity"]
        );
        assert_eq!(
            schema.field("gross_weight").map(|f| f.presence),
            Some(Presence::Optional)
        );
    }

    #[test]
    fn test_demand_constraints_optional() {
        let schema = TableSchema::demand();
        assert_eq!(
            schema.field("max_weight").map(|f| f.presence),
            Some(Presence::Optional)
        );
        assert_eq!(
            schema.field("min_quantity").map(|f| f.presence),
            Some(Presence::Optional)
        );
        assert_eq!(
            schema.field("preferred_thickness").map(|f| f.field_type),
            Some(FieldType::Numeric)
        );
    }
}
