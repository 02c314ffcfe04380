// ==========================================
// 资本工程计划书编制系统 - 核心错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 可失败操作一律返回 Result, 不在核心层 panic
// ==========================================

use thiserror::Error;

use crate::repository::RepositoryError;

/// 核心层错误类型
#[derive(Error, Debug)]
pub enum PlanningError {
    // ===== 输入校验错误 =====
    #[error("数据验证失败: {0}")]
    Validation(String),

    // ===== 业务规则错误 =====
    #[error("业务规则违反: {0}")]
    BusinessRule(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== 实体缺失 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== 权限限制 =====
    #[error("禁止访问: {0}")]
    Forbidden(String),

    // ===== 不可恢复的内部错误 =====
    #[error("内部错误: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlanningError {
    /// 实体缺失错误的便捷构造
    pub fn not_found(entity: &str, id: &str) -> Self {
        PlanningError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

// 仓储层错误统一归入不可恢复错误, 由调用方转换为对外 5xx 语义
impl From<RepositoryError> for PlanningError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => PlanningError::NotFound { entity, id },
            other => PlanningError::Unexpected(other.to_string()),
        }
    }
}

// 参照数据读取错误 (trait 对象错误) 同样归入不可恢复错误
impl From<Box<dyn std::error::Error>> for PlanningError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        PlanningError::Unexpected(err.to_string())
    }
}

/// Result 类型别名
pub type PlanningResult<T> = Result<T, PlanningError>;
