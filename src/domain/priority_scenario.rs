// ==========================================
// 资本工程计划书编制系统 - 优先级场景领域模型
// ==========================================
// 职责: 优先级场景/优先级/排序项目及其不变量校验
// 红线: 不含排序算法 (见 engine/ranking.rs), 不含数据访问逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::audit::Audit;
use crate::domain::project::ServicePriority;
use crate::domain::types::{ScenarioStatus, SortCriterionName, PROJECT_CATEGORY_COMPLETING};
use crate::error::{PlanningError, PlanningResult};

// ==========================================
// ProjectCategoryCriterion - 类别匹配条件
// ==========================================
// sub_category 指定时, 项目须同时持有该子类别
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectCategoryCriterion {
    pub category: String,             // 类别代码
    pub sub_category: Option<String>, // 子类别代码
}

// ==========================================
// PriorityLevelCriteria - 优先级匹配条件
// ==========================================
// 空的条件组 = 通配; 非空条件组之间为 AND, 组内为 OR
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriorityLevelCriteria {
    pub project_category: Vec<ProjectCategoryCriterion>, // 类别/子类别
    pub intervention_type: Vec<String>,                  // 干预类型代码
    pub work_type_id: Vec<String>,                       // 工程类型代码
    pub requestor_id: Vec<String>,                       // 需求部门代码
    pub asset_type_id: Vec<String>,                      // 资产类型代码
    pub service_priorities: Vec<ServicePriority>,        // 部门优先级对
}

impl PriorityLevelCriteria {
    /// 是否全部条件组为空
    pub fn is_empty(&self) -> bool {
        self.project_category.is_empty()
            && self.intervention_type.is_empty()
            && self.work_type_id.is_empty()
            && self.requestor_id.is_empty()
            && self.asset_type_id.is_empty()
            && self.service_priorities.is_empty()
    }

    /// 是否为默认优先级的固定形态: 仅一条 "续建" 类别条件
    pub fn is_default_shape(&self) -> bool {
        self.project_category.len() == 1
            && self.project_category[0].category == PROJECT_CATEGORY_COMPLETING
            && self.project_category[0].sub_category.is_none()
            && self.intervention_type.is_empty()
            && self.work_type_id.is_empty()
            && self.requestor_id.is_empty()
            && self.asset_type_id.is_empty()
            && self.service_priorities.is_empty()
    }

    /// 归一化副本 (各条件组排序), 用于重复性比较
    fn normalized(&self) -> Self {
        let mut c = self.clone();
        c.project_category.sort();
        c.intervention_type.sort();
        c.work_type_id.sort();
        c.requestor_id.sort();
        c.asset_type_id.sort();
        c.service_priorities
            .sort_by(|a, b| (&a.service, a.priority_id).cmp(&(&b.service, b.priority_id)));
        c
    }

    /// 默认优先级的条件 (仅 "续建" 类别)
    pub fn default_criteria() -> Self {
        Self {
            project_category: vec![ProjectCategoryCriterion {
                category: PROJECT_CATEGORY_COMPLETING.to_string(),
                sub_category: None,
            }],
            ..Self::default()
        }
    }
}

// ==========================================
// PriorityLevelSortCriterion - 排序条件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityLevelSortCriterion {
    pub name: SortCriterionName, // 条件名 (绑定固定方向)
    pub service: Option<String>, // SERVICE_PRIORITY 条件的目标部门
}

impl PriorityLevelSortCriterion {
    pub fn by(name: SortCriterionName) -> Self {
        Self { name, service: None }
    }

    pub fn by_service_priority(service: &str) -> Self {
        Self {
            name: SortCriterionName::ServicePriority,
            service: Some(service.to_string()),
        }
    }
}

// ==========================================
// PriorityLevel - 优先级
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityLevel {
    pub rank: u32,                                      // 级别序号 (1 = 默认级)
    pub criteria: PriorityLevelCriteria,                // 匹配条件
    pub sort_criteria: Vec<PriorityLevelSortCriterion>, // 排序条件 (有序)
    pub project_count: usize,                           // 命中项目数 (计算值)
    pub is_system_defined: bool,                        // 系统内置标志
}

impl PriorityLevel {
    /// 系统内置的默认优先级 (rank 1, 仅匹配 "续建")
    pub fn default_level() -> Self {
        Self {
            rank: 1,
            criteria: PriorityLevelCriteria::default_criteria(),
            sort_criteria: vec![PriorityLevelSortCriterion::by(SortCriterionName::ProjectId)],
            project_count: 0,
            is_system_defined: true,
        }
    }
}

// ==========================================
// ObjectivesCalculation - 目标累计结果
// ==========================================
// 随排序项目按需计算, 不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectivesCalculation {
    pub objective_id: String, // 目标ID
    pub objective_sum: f64,   // 截至本项目的累计值
    pub objective_percent: f64, // round(累计值 / 参考值 * 100)
}

// ==========================================
// OrderedProject - 排序项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedProject {
    pub project_id: String,        // 项目ID
    pub level_rank: u32,           // 命中的优先级序号 (0 = 未命中)
    pub initial_rank: u32,         // 系统计算的初始名次 (0 = 未定)
    pub rank: u32,                 // 当前生效名次
    pub is_manually_ordered: bool, // 人工钉住标志
    pub note: Option<String>,      // 人工调整备注
    #[serde(skip)]
    pub objectives_calculation: Option<Vec<ObjectivesCalculation>>, // 目标累计 (按需计算)
    pub audit: Audit,              // 审计戳
}

impl OrderedProject {
    /// 追加在末尾的未排序项目
    pub fn unordered(project_id: &str, rank: u32) -> Self {
        Self {
            project_id: project_id.to_string(),
            level_rank: 0,
            initial_rank: rank,
            rank,
            is_manually_ordered: false,
            note: None,
            objectives_calculation: None,
            audit: Audit::system(),
        }
    }
}

// ==========================================
// ProjectRankChange - 人工调整请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRankChange {
    pub new_rank: u32,             // 目标名次
    pub is_manually_ordered: bool, // false = 解除钉住, 回到系统名次
    pub note: Option<String>,      // 调整备注
}

// ==========================================
// PriorityScenario - 优先级场景
// ==========================================
// 当前设计: 每个计划书保有单个默认场景
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityScenario {
    pub id: String,                            // 场景ID
    pub name: String,                          // 场景名称
    pub priority_levels: Vec<PriorityLevel>,   // 优先级列表 (有序)
    pub ordered_projects: Vec<OrderedProject>, // 排序项目列表
    pub status: ScenarioStatus,                // 场景状态
    pub is_outdated: bool,                     // 排序结果过期标志
    pub audit: Audit,                          // 审计戳
}

impl PriorityScenario {
    /// 计划书创建时附带的默认场景
    pub fn default_scenario(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            priority_levels: vec![PriorityLevel::default_level()],
            ordered_projects: Vec::new(),
            status: ScenarioStatus::Pending,
            is_outdated: false,
            audit: Audit::system(),
        }
    }

    /// 按项目ID查找排序项目
    pub fn ordered_project(&self, project_id: &str) -> Option<&OrderedProject> {
        self.ordered_projects
            .iter()
            .find(|op| op.project_id == project_id)
    }

    /// 当前全部生效名次
    pub fn ranks(&self) -> Vec<u32> {
        self.ordered_projects.iter().map(|op| op.rank).collect()
    }

    /// 项目加入计划书: 追加在 max(rank)+1, 未排序
    ///
    /// 已存在条目时不重复追加 (每项目至多一条)
    pub fn append_unordered_project(&mut self, project_id: &str) {
        if self.ordered_project(project_id).is_some() {
            return;
        }
        let next_rank = self
            .ordered_projects
            .iter()
            .map(|op| op.rank)
            .max()
            .unwrap_or(0)
            + 1;
        self.ordered_projects
            .push(OrderedProject::unordered(project_id, next_rank));
    }

    /// 项目退出计划书: 删除条目并压缩名次保持连续
    pub fn remove_ordered_project(&mut self, project_id: &str) {
        let Some(pos) = self
            .ordered_projects
            .iter()
            .position(|op| op.project_id == project_id)
        else {
            return;
        };
        let removed = self.ordered_projects.remove(pos);
        for op in &mut self.ordered_projects {
            if op.rank > removed.rank {
                op.rank -= 1;
            }
            if op.initial_rank > removed.initial_rank {
                op.initial_rank -= 1;
            }
        }
    }

    /// 标记排序结果过期 (优先级变更、项目进出时触发)
    pub fn mark_outdated(&mut self) {
        self.is_outdated = true;
        self.status = ScenarioStatus::Pending;
    }

    /// 写入新的排序结果
    pub fn set_ordered_projects(&mut self, ordered_projects: Vec<OrderedProject>) {
        self.ordered_projects = ordered_projects;
        self.is_outdated = false;
        self.status = ScenarioStatus::Calculated;
    }

    /// 校验优先级列表的不变量
    ///
    /// 规则:
    /// 1) 级别序号从 1 起连续无间断
    /// 2) rank 1 为系统默认级, 条件固定为单条 "续建" 类别
    /// 3) 非默认级条件不得全空
    /// 4) 任意两级条件不得重复 (比较前归一化)
    pub fn validate_priority_levels(levels: &[PriorityLevel]) -> PlanningResult<()> {
        if levels.is_empty() {
            return Err(PlanningError::BusinessRule(
                "优先级列表不能为空".to_string(),
            ));
        }

        let mut sorted: Vec<&PriorityLevel> = levels.iter().collect();
        sorted.sort_by_key(|l| l.rank);

        // 规则1: 序号连续
        for (idx, level) in sorted.iter().enumerate() {
            let expected = (idx + 1) as u32;
            if level.rank != expected {
                return Err(PlanningError::BusinessRule(format!(
                    "优先级序号必须从1起连续: 期望 {} 实际 {}",
                    expected, level.rank
                )));
            }
        }

        // 规则2: 默认级形态
        let default_level = sorted[0];
        if !default_level.is_system_defined || !default_level.criteria.is_default_shape() {
            return Err(PlanningError::BusinessRule(
                "rank 1 必须是系统默认级, 条件仅限单条 \"续建\" 类别".to_string(),
            ));
        }

        // 规则3: 非默认级条件非空
        for level in sorted.iter().skip(1) {
            if level.criteria.is_empty() {
                return Err(PlanningError::BusinessRule(format!(
                    "优先级 {} 的匹配条件不能全空",
                    level.rank
                )));
            }
        }

        // 规则4: 条件两两不重复
        let normalized: Vec<PriorityLevelCriteria> =
            sorted.iter().map(|l| l.criteria.normalized()).collect();
        for i in 0..normalized.len() {
            for j in (i + 1)..normalized.len() {
                if normalized[i] == normalized[j] {
                    return Err(PlanningError::BusinessRule(format!(
                        "优先级 {} 与 {} 的匹配条件重复",
                        sorted[i].rank, sorted[j].rank
                    )));
                }
            }
        }

        Ok(())
    }
}
