// ============================================================================
// CardGen - Core 核心模块
// ============================================================================
//
// 文件: src/core/mod.rs
// 职责: 核心业务逻辑模块入口
// 边界:
//   - ✅ 核心子模块导出
//   - ❌ 不应包含具体业务实现
//   - ❌ 不应包含 CLI 相关逻辑
//   - ❌ 不应包含数据模型定义
//
// ============================================================================

pub mod catalog;
pub mod error;
pub mod input;
pub mod parser;
pub mod pipeline;
