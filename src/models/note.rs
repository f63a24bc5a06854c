// ============================================================================
// CardGen - 生成笔记数据模型
// ============================================================================
//
// 文件: src/models/note.rs
// 职责: 生成结果（笔记/字段/来源）数据结构定义
// 边界:
//   - ✅ 笔记字段数据结构定义
//   - ✅ 来源元数据结构定义
//   - ✅ 序列化/反序列化支持
//   - ❌ 不应包含解析逻辑
//   - ❌ 不应包含输出格式化逻辑
//   - ❌ 不应包含网络请求逻辑
//
// ============================================================================

use serde::{Deserialize, Serialize};

/// 笔记上的单个生成字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedField {
    pub name: String,
    pub value: String,
}

impl GeneratedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 来源的可选元数据
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedSource {
    pub url: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
}

/// 一张完整的待导入笔记
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedNote {
    pub fields: Vec<GeneratedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<GeneratedSource>,
    /// 目标笔记类型名称（由约束或配置标注）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,
    /// 目标牌组名称（由约束或配置标注）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck: Option<String>,
}

impl GeneratedNote {
    pub fn new(fields: Vec<GeneratedField>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// 按字段名查找字段值（忽略大小写）
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.value.as_str())
    }
}
