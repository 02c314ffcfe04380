// ==========================================
// 资本工程计划书编制系统 - 审计戳
// ==========================================
// 职责: 聚合与子实体的创建/修改审计信息
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 审计戳
///
/// 创建时写入 created_*, 每次修改刷新 updated_*
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: DateTime<Utc>,          // 创建时间
    pub created_by: Option<String>,         // 创建人
    pub updated_at: Option<DateTime<Utc>>,  // 最近修改时间
    pub updated_by: Option<String>,         // 最近修改人
}

impl Audit {
    /// 系统写入的审计戳
    pub fn system() -> Self {
        Self::created_by("system")
    }

    /// 指定创建人的审计戳
    pub fn created_by(author: &str) -> Self {
        Self {
            created_at: Utc::now(),
            created_by: Some(author.to_string()),
            updated_at: None,
            updated_by: None,
        }
    }

    /// 刷新修改审计信息
    pub fn touch(&mut self, author: &str) {
        self.updated_at = Some(Utc::now());
        self.updated_by = Some(author.to_string());
    }
}

impl Default for Audit {
    fn default() -> Self {
        Self::system()
    }
}
