// ============================================================================
// CardGen - UI 模块声明
// ============================================================================
//
// 文件: src/ui/mod.rs
// 职责: 终端界面组件模块导出
//
// ============================================================================

pub mod spinner;
pub mod summary;
