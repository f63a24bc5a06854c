// ============================================================================
// CardGen - 数据模型模块
// ============================================================================
//
// 文件: src/models/mod.rs
// 职责: 数据模型模块入口
// 边界:
//   - ✅ 数据模型子模块导出
//   - ❌ 不应包含业务逻辑
//   - ❌ 不应包含具体模型实现
//
// ============================================================================

pub mod config;
pub mod note;
pub mod request;
