// ==========================================
// 资本工程计划书编制系统 - 计划书领域模型
// ==========================================
// 职责: 计划书聚合、目标及其业务不变量
// 红线: 不含数据访问逻辑; 目标累计算法见 engine/objective.rs
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::audit::Audit;
use crate::domain::priority_scenario::PriorityScenario;
use crate::domain::project::Intervention;
use crate::domain::types::{ObjectiveType, ProgramBookStatus};
use crate::error::{PlanningError, PlanningResult};

/// 每个计划书允许钉住的关键目标上限
pub const MAX_PINNED_OBJECTIVES: usize = 3;

// ==========================================
// ObjectiveValues - 目标数值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveValues {
    pub calculated: f64, // 当前项目集的计算值
    pub reference: f64,  // 参考值 (分母)
}

// ==========================================
// Objective - 目标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,                   // 目标ID
    pub name: String,                 // 目标名称
    pub target_type: String,          // 指标类型代码 (budget / length)
    pub objective_type: ObjectiveType, // 目标类型 (阈值/绩效指标)
    pub requestor_id: Option<String>, // 过滤: 需求部门
    pub asset_type_ids: Vec<String>,  // 过滤: 资产类型
    pub work_type_ids: Vec<String>,   // 过滤: 工程类型
    pub pin: bool,                    // 钉住为关键目标
    pub values: ObjectiveValues,      // 数值
    pub audit: Audit,                 // 审计戳
}

impl Objective {
    /// 干预是否落入本目标的过滤范围
    ///
    /// 空的过滤条件 = 通配
    pub fn matches_intervention(&self, intervention: &Intervention) -> bool {
        if let Some(requestor) = &self.requestor_id {
            if &intervention.requestor_id != requestor {
                return false;
            }
        }
        if !self.asset_type_ids.is_empty()
            && !self.asset_type_ids.contains(&intervention.asset_type_id)
        {
            return false;
        }
        if !self.work_type_ids.is_empty()
            && !self.work_type_ids.contains(&intervention.work_type_id)
        {
            return false;
        }
        true
    }

    /// 是否为阈值型目标
    pub fn is_threshold(&self) -> bool {
        self.objective_type == ObjectiveType::Threshold
    }
}

// ==========================================
// ProgramBook - 计划书聚合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramBook {
    pub id: String,                              // 计划书ID
    pub annual_program_id: String,               // 所属年度计划
    pub name: String,                            // 计划书名称
    pub status: ProgramBookStatus,               // 计划书状态
    pub shared_roles: Vec<String>,               // 共享角色列表
    pub objectives: Vec<Objective>,              // 目标列表
    pub priority_scenarios: Vec<PriorityScenario>, // 优先级场景 (当前设计单场景)
    pub audit: Audit,                            // 审计戳
}

impl ProgramBook {
    /// 新建计划书, 附带系统默认场景
    pub fn new(id: &str, annual_program_id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            annual_program_id: annual_program_id.to_string(),
            name: name.to_string(),
            status: ProgramBookStatus::New,
            shared_roles: Vec::new(),
            objectives: Vec::new(),
            priority_scenarios: vec![PriorityScenario::default_scenario("default")],
            audit: Audit::system(),
        }
    }

    /// 默认场景 (当前设计恰有一个)
    pub fn default_scenario(&self) -> Option<&PriorityScenario> {
        self.priority_scenarios.first()
    }

    /// 按ID查找场景
    pub fn scenario(&self, scenario_id: &str) -> Option<&PriorityScenario> {
        self.priority_scenarios.iter().find(|s| s.id == scenario_id)
    }

    /// 按ID查找场景 (可变)
    pub fn scenario_mut(&mut self, scenario_id: &str) -> Option<&mut PriorityScenario> {
        self.priority_scenarios
            .iter_mut()
            .find(|s| s.id == scenario_id)
    }

    /// 将全部场景标记为过期 (项目进出计划书时触发)
    pub fn outdate_priority_scenarios(&mut self) {
        for scenario in &mut self.priority_scenarios {
            scenario.mark_outdated();
        }
    }

    /// 新增或替换目标 (按ID), 校验钉住上限
    pub fn upsert_objective(&mut self, objective: Objective) -> PlanningResult<()> {
        let pinned = self
            .objectives
            .iter()
            .filter(|o| o.pin && o.id != objective.id)
            .count();
        if objective.pin && pinned >= MAX_PINNED_OBJECTIVES {
            return Err(PlanningError::BusinessRule(format!(
                "关键目标数量已达上限 {}",
                MAX_PINNED_OBJECTIVES
            )));
        }

        match self.objectives.iter_mut().find(|o| o.id == objective.id) {
            Some(existing) => *existing = objective,
            None => self.objectives.push(objective),
        }
        Ok(())
    }

    /// 删除目标
    pub fn remove_objective(&mut self, objective_id: &str) -> PlanningResult<()> {
        let before = self.objectives.len();
        self.objectives.retain(|o| o.id != objective_id);
        if self.objectives.len() == before {
            return Err(PlanningError::not_found("Objective", objective_id));
        }
        Ok(())
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OBJECTIVE_TARGET_BUDGET;

    fn objective(id: &str, pin: bool) -> Objective {
        Objective {
            id: id.to_string(),
            name: format!("objective {}", id),
            target_type: OBJECTIVE_TARGET_BUDGET.to_string(),
            objective_type: ObjectiveType::Threshold,
            requestor_id: None,
            asset_type_ids: Vec::new(),
            work_type_ids: Vec::new(),
            pin,
            values: ObjectiveValues {
                calculated: 0.0,
                reference: 1000.0,
            },
            audit: Audit::system(),
        }
    }

    #[test]
    fn test_new_program_book_carries_default_scenario() {
        let book = ProgramBook::new("PB1", "AP1", "2026 主干网");
        let scenario = book.default_scenario().expect("默认场景缺失");
        assert_eq!(scenario.priority_levels.len(), 1);
        assert!(scenario.priority_levels[0].is_system_defined);
    }

    #[test]
    fn test_pinned_objective_limit() {
        let mut book = ProgramBook::new("PB1", "AP1", "2026 主干网");
        for i in 0..MAX_PINNED_OBJECTIVES {
            book.upsert_objective(objective(&format!("O{}", i), true))
                .expect("钉住目标未超限");
        }
        // 第4个钉住目标被拒绝
        let err = book.upsert_objective(objective("O9", true)).unwrap_err();
        assert!(matches!(err, PlanningError::BusinessRule(_)));
        // 不钉住的目标不受限
        assert!(book.upsert_objective(objective("O10", false)).is_ok());
    }

    #[test]
    fn test_upsert_replaces_same_id() {
        let mut book = ProgramBook::new("PB1", "AP1", "2026 主干网");
        book.upsert_objective(objective("O1", true)).unwrap();
        let mut updated = objective("O1", true);
        updated.values.reference = 2000.0;
        book.upsert_objective(updated).unwrap();

        assert_eq!(book.objectives.len(), 1);
        assert_eq!(book.objectives[0].values.reference, 2000.0);
    }
}
