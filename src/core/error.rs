// ============================================================================
// CardGen - 领域错误定义
// ============================================================================
//
// 文件: src/core/error.rs
// 职责: 生成流程的领域错误类型定义
// 边界:
//   - ✅ 错误枚举定义
//   - ✅ 底层错误转换实现
//   - ✅ 错误构造辅助函数
//   - ❌ 不应包含错误展示逻辑
//   - ❌ 不应包含业务逻辑
//   - ❌ 不应包含日志输出
//
// ============================================================================

use thiserror::Error;

/// 生成流程统一结果别名
pub type GenResult<T> = Result<T, GenerationError>;

/// 闪卡生成层的领域错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 用户输入或供应商响应不可用
    #[error("{0}")]
    InvalidInput(String),

    /// 网络请求失败
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON 序列化/反序列化失败
    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// 文件读取失败
    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    /// 构造输入类错误
    pub fn invalid(message: impl Into<String>) -> GenerationError {
        GenerationError::InvalidInput(message.into())
    }
}
