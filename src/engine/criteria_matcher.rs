// ==========================================
// 资本工程计划书编制系统 - 优先级条件匹配引擎
// ==========================================
// 职责: 判定项目是否满足某优先级的匹配条件
// 输入: 优先级条件 + 项目快照 + 目标年度
// 输出: bool (纯谓词, 无副作用)
// 红线: 空条件组 = 通配; 非空条件组之间为 AND
// ==========================================

use crate::domain::priority_scenario::{PriorityLevel, PriorityLevelCriteria, ProjectCategoryCriterion};
use crate::domain::project::{Intervention, Project, ServicePriority};

// ==========================================
// CriteriaMatcher - 条件匹配引擎
// ==========================================
pub struct CriteriaMatcher {
    // 无状态引擎,不需要注入依赖
}

impl CriteriaMatcher {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 判定项目是否命中优先级
    ///
    /// 所有非空条件组同时满足才算命中:
    /// 1) 类别/子类别
    /// 2) 部门优先级
    /// 3) 干预约束 (类型/年度过滤后的需求部门、工程类型、资产类型)
    ///
    /// # 参数
    /// - `level`: 优先级
    /// - `project`: 项目快照
    /// - `year`: 目标年度
    pub fn matches(&self, level: &PriorityLevel, project: &Project, year: i32) -> bool {
        self.matches_project_category(&level.criteria.project_category, project, year)
            && self.matches_service_priorities(&level.criteria.service_priorities, project)
            && self.matches_interventions(&level.criteria, project, year)
    }

    // ==========================================
    // 条件组谓词
    // ==========================================

    /// 类别/子类别条件
    ///
    /// 项目目标年度的类别须等于某条件对的类别;
    /// 条件对指定子类别时, 项目须同时持有该子类别
    fn matches_project_category(
        &self,
        criteria: &[ProjectCategoryCriterion],
        project: &Project,
        year: i32,
    ) -> bool {
        if criteria.is_empty() {
            return true;
        }
        let Some(category) = project.category_id(year) else {
            return false;
        };
        criteria.iter().any(|c| {
            c.category == category
                && c.sub_category
                    .as_ref()
                    .map_or(true, |sc| project.sub_category_ids.contains(sc))
        })
    }

    /// 部门优先级条件: 项目至少持有一对条件中的 (部门, 优先级)
    fn matches_service_priorities(
        &self,
        criteria: &[ServicePriority],
        project: &Project,
    ) -> bool {
        if criteria.is_empty() {
            return true;
        }
        project
            .service_priorities
            .iter()
            .any(|sp| criteria.contains(sp))
    }

    /// 干预约束条件
    ///
    /// 步骤:
    /// 1) 全部干预相关条件为空 → 通配
    /// 2) 无干预的项目视为通过 (空洞成立)
    /// 3) 按干预类型 (若指定) 与规划年度过滤, 过滤后必须有剩余
    /// 4) 剩余干预须满足需求部门/工程类型/资产类型约束 (组内 OR)
    fn matches_interventions(
        &self,
        criteria: &PriorityLevelCriteria,
        project: &Project,
        year: i32,
    ) -> bool {
        let has_intervention_criteria = !criteria.intervention_type.is_empty()
            || !criteria.requestor_id.is_empty()
            || !criteria.work_type_id.is_empty()
            || !criteria.asset_type_id.is_empty();
        if !has_intervention_criteria {
            return true;
        }
        if project.interventions.is_empty() {
            return true;
        }

        let retained: Vec<&Intervention> = project
            .interventions
            .iter()
            .filter(|i| {
                (criteria.intervention_type.is_empty()
                    || criteria.intervention_type.contains(&i.intervention_type_id))
                    && i.planification_year == year
            })
            .collect();
        if retained.is_empty() {
            return false;
        }

        self.constraint_holds(&criteria.requestor_id, &retained, |i| &i.requestor_id)
            && self.constraint_holds(&criteria.work_type_id, &retained, |i| &i.work_type_id)
            && self.constraint_holds(&criteria.asset_type_id, &retained, |i| &i.asset_type_id)
    }

    /// 单个约束列表: 为空通配, 否则至少一条剩余干预命中
    fn constraint_holds<'a, F>(
        &self,
        allowed: &[String],
        retained: &[&'a Intervention],
        key: F,
    ) -> bool
    where
        F: Fn(&'a Intervention) -> &'a String,
    {
        allowed.is_empty() || retained.iter().any(|&i| allowed.contains(key(i)))
    }
}

impl Default for CriteriaMatcher {
    fn default() -> Self {
        Self::new()
    }
}
