// ==========================================
// 资本工程计划书编制系统 - 年度计划领域模型
// ==========================================
// 职责: 年度计划聚合 (按执行单位、按年度的预算封套)
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::audit::Audit;
use crate::domain::types::AnnualProgramStatus;

// ==========================================
// AnnualProgram - 年度计划聚合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualProgram {
    pub id: String,                  // 年度计划ID
    pub executor_id: String,         // 执行单位代码
    pub year: i32,                   // 预算年度
    pub status: AnnualProgramStatus, // 状态
    pub shared_roles: Vec<String>,   // 共享角色列表
    pub audit: Audit,                // 审计戳
}

impl AnnualProgram {
    pub fn new(id: &str, executor_id: &str, year: i32) -> Self {
        Self {
            id: id.to_string(),
            executor_id: executor_id.to_string(),
            year,
            status: AnnualProgramStatus::New,
            shared_roles: Vec::new(),
            audit: Audit::system(),
        }
    }
}
