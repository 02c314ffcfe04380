// ==========================================
// 资本工程计划书编制系统 - 项目排序引擎
// ==========================================
// 职责: 同优先级内的项目多键稳定排序
// 输入: 项目列表 + 有序排序条件 + 辅助数据 (路网展示序/阈值贡献数)
// 输出: 排序后的项目列表
// ==========================================

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::priority_scenario::PriorityLevelSortCriterion;
use crate::domain::project::Project;
use crate::domain::types::SortCriterionName;

// ==========================================
// SortContext - 排序辅助数据
// ==========================================
// 由调用方预先计算: 路网类型展示序来自参照数据,
// 阈值贡献数来自目标累计 (engine/objective.rs)
#[derive(Debug, Clone, Default)]
pub struct SortContext {
    /// 路网类型代码 → 展示顺序 (0 = 最前)
    pub road_network_order: HashMap<String, usize>,
    /// 项目ID → 阈值贡献数
    pub threshold_contributions: HashMap<String, usize>,
}

// ==========================================
// ProjectSorter - 排序引擎
// ==========================================
pub struct ProjectSorter {
    // 无状态引擎,不需要注入依赖
}

impl ProjectSorter {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排序项目列表
    ///
    /// 排序条件按给定顺序逐键比较 (首键为主键), 稳定排序:
    /// 全键相等时保持输入顺序。条件为空时原样返回。
    ///
    /// # 参数
    /// - `projects`: 待排序项目
    /// - `criteria`: 有序排序条件
    /// - `ctx`: 辅助数据
    pub fn sort(
        &self,
        mut projects: Vec<Project>,
        criteria: &[PriorityLevelSortCriterion],
        ctx: &SortContext,
    ) -> Vec<Project> {
        if criteria.is_empty() {
            return projects;
        }
        projects.sort_by(|a, b| self.compare(a, b, criteria, ctx));
        projects
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// 逐键比较两个项目
    ///
    /// # 返回
    /// Ordering::Less 表示 a 排在 b 之前
    fn compare(
        &self,
        a: &Project,
        b: &Project,
        criteria: &[PriorityLevelSortCriterion],
        ctx: &SortContext,
    ) -> Ordering {
        for criterion in criteria {
            let ord = self.compare_by(a, b, criterion, ctx);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// 单键比较 (方向随条件固定)
    fn compare_by(
        &self,
        a: &Project,
        b: &Project,
        criterion: &PriorityLevelSortCriterion,
        ctx: &SortContext,
    ) -> Ordering {
        match criterion.name {
            // 项目总预算: 降序
            SortCriterionName::ProjectBudget => b
                .global_budget_allowance
                .total_cmp(&a.global_budget_allowance),

            // 项目编号: 升序 (字典序)
            SortCriterionName::ProjectId => a.id.cmp(&b.id),

            // 路网类型展示序: 升序, 缺失排末尾
            SortCriterionName::RoadNetworkType => {
                let order_of = |p: &Project| {
                    p.road_network_type_id
                        .as_ref()
                        .and_then(|code| ctx.road_network_order.get(code).copied())
                        .unwrap_or(usize::MAX)
                };
                order_of(a).cmp(&order_of(b))
            }

            // 部门优先级: 升序 (编号越小越优先), 缺失排末尾
            SortCriterionName::ServicePriority => {
                let priority_of = |p: &Project| {
                    criterion
                        .service
                        .as_deref()
                        .and_then(|service| p.service_priority_for(service))
                        .unwrap_or(i32::MAX)
                };
                priority_of(a).cmp(&priority_of(b))
            }

            // 干预数: 降序
            SortCriterionName::NumberOfInterventionsPerProject => {
                b.interventions.len().cmp(&a.interventions.len())
            }

            // 阈值贡献数: 降序, 缺失视为 0
            SortCriterionName::NumberOfContributionsToThreshold => {
                let contributions_of = |p: &Project| {
                    ctx.threshold_contributions.get(&p.id).copied().unwrap_or(0)
                };
                contributions_of(b).cmp(&contributions_of(a))
            }
        }
    }
}

impl Default for ProjectSorter {
    fn default() -> Self {
        Self::new()
    }
}
