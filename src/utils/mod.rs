// ============================================================================
// CardGen - 工具模块
// ============================================================================
//
// 文件: src/utils/mod.rs
// 职责: 通用工具模块入口
// 边界:
//   - ✅ 工具子模块导出
//   - ❌ 不应包含业务逻辑
//   - ❌ 不应包含具体工具实现
//
// ============================================================================

pub mod colors;
pub mod constants;
pub mod logger;
pub mod styles;
