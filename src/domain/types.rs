// ==========================================
// 资本工程计划书编制系统 - 领域类型定义
// ==========================================
// 职责: 定义状态枚举与分类代码常量
// 红线: 状态是封闭集合用枚举; 分类来自外部分类法, 保持字符串代码
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 分类法代码常量 (Taxonomy Codes)
// ==========================================
// 分类代码由参照数据服务下发, 系统内只依赖以下固定代码

/// 项目类别: 续建 (默认优先级所匹配的唯一类别)
pub const PROJECT_CATEGORY_COMPLETING: &str = "completing";

/// 项目类别: 新建
pub const PROJECT_CATEGORY_NEW: &str = "new";

/// 目标指标类型: 预算
pub const OBJECTIVE_TARGET_BUDGET: &str = "budget";

/// 目标指标类型: 长度
pub const OBJECTIVE_TARGET_LENGTH: &str = "length";

// ==========================================
// 年度计划状态 (Annual Program Status)
// ==========================================
// 流转: new → programming → submittedFinal, 允许 programming → new 回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnualProgramStatus {
    New,            // 新建
    Programming,    // 编制中
    SubmittedFinal, // 终版提交
}

impl fmt::Display for AnnualProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnualProgramStatus::New => write!(f, "new"),
            AnnualProgramStatus::Programming => write!(f, "programming"),
            AnnualProgramStatus::SubmittedFinal => write!(f, "submittedFinal"),
        }
    }
}

// ==========================================
// 计划书状态 (Program Book Status)
// ==========================================
// 流转: new → programming → submittedPreliminary → submittedFinal,
// 允许 submittedPreliminary → programming 回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgramBookStatus {
    New,                  // 新建
    Programming,          // 编制中
    SubmittedPreliminary, // 初版提交
    SubmittedFinal,       // 终版提交
}

impl fmt::Display for ProgramBookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramBookStatus::New => write!(f, "new"),
            ProgramBookStatus::Programming => write!(f, "programming"),
            ProgramBookStatus::SubmittedPreliminary => write!(f, "submittedPreliminary"),
            ProgramBookStatus::SubmittedFinal => write!(f, "submittedFinal"),
        }
    }
}

// ==========================================
// 项目状态 (Project Status)
// ==========================================
// 计划书状态级联只触及 programmed / preliminaryOrdered / finalOrdered,
// 其余状态的项目不受级联影响
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStatus {
    Planned,            // 已规划
    Programmed,         // 已编入计划书
    PreliminaryOrdered, // 初版排序
    FinalOrdered,       // 终版排序
    Postponed,          // 已延期
    Replanned,          // 重新规划
    Canceled,           // 已取消
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Planned => write!(f, "planned"),
            ProjectStatus::Programmed => write!(f, "programmed"),
            ProjectStatus::PreliminaryOrdered => write!(f, "preliminaryOrdered"),
            ProjectStatus::FinalOrdered => write!(f, "finalOrdered"),
            ProjectStatus::Postponed => write!(f, "postponed"),
            ProjectStatus::Replanned => write!(f, "replanned"),
            ProjectStatus::Canceled => write!(f, "canceled"),
        }
    }
}

// ==========================================
// 优先级场景状态 (Priority Scenario Status)
// ==========================================
// pending: 排序结果缺失或已过期; calculated: 排序结果有效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioStatus {
    Pending,    // 待计算
    Calculated, // 已计算
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioStatus::Pending => write!(f, "pending"),
            ScenarioStatus::Calculated => write!(f, "calculated"),
        }
    }
}

// ==========================================
// 目标类型 (Objective Type)
// ==========================================
// threshold 型目标参与 "阈值贡献数" 排序键的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveType {
    Threshold,            // 阈值目标
    PerformanceIndicator, // 绩效指标目标
}

impl fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveType::Threshold => write!(f, "threshold"),
            ObjectiveType::PerformanceIndicator => write!(f, "performanceIndicator"),
        }
    }
}

// ==========================================
// 排序条件名 (Sort Criterion Name)
// ==========================================
// 每个条件绑定固定方向, 见 engine/sorter.rs 的比较实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortCriterionName {
    ProjectBudget,                    // 项目总预算 (降序)
    ProjectId,                        // 项目编号 (升序)
    RoadNetworkType,                  // 路网类型展示序 (升序)
    ServicePriority,                  // 部门优先级 (升序)
    NumberOfInterventionsPerProject,  // 项目干预数 (降序)
    NumberOfContributionsToThreshold, // 阈值贡献数 (降序)
}

impl fmt::Display for SortCriterionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortCriterionName::ProjectBudget => write!(f, "PROJECT_BUDGET"),
            SortCriterionName::ProjectId => write!(f, "PROJECT_ID"),
            SortCriterionName::RoadNetworkType => write!(f, "ROAD_NETWORK_TYPE"),
            SortCriterionName::ServicePriority => write!(f, "SERVICE_PRIORITY"),
            SortCriterionName::NumberOfInterventionsPerProject => {
                write!(f, "NUMBER_OF_INTERVENTIONS_PER_PROJECT")
            }
            SortCriterionName::NumberOfContributionsToThreshold => {
                write!(f, "NUMBER_OF_CONTRIBUTIONS_TO_THRESHOLD")
            }
        }
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization_is_camel_case() {
        // 状态码与存储/接口约定一致 (camelCase)
        assert_eq!(
            serde_json::to_value(ProgramBookStatus::SubmittedPreliminary).unwrap(),
            "submittedPreliminary"
        );
        assert_eq!(
            serde_json::to_value(AnnualProgramStatus::SubmittedFinal).unwrap(),
            "submittedFinal"
        );
        assert_eq!(
            serde_json::to_value(ProjectStatus::PreliminaryOrdered).unwrap(),
            "preliminaryOrdered"
        );
    }

    #[test]
    fn test_sort_criterion_serialization_is_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(SortCriterionName::NumberOfContributionsToThreshold).unwrap(),
            "NUMBER_OF_CONTRIBUTIONS_TO_THRESHOLD"
        );
        let parsed: SortCriterionName =
            serde_json::from_str("\"PROJECT_BUDGET\"").unwrap();
        assert_eq!(parsed, SortCriterionName::ProjectBudget);
    }

    #[test]
    fn test_display_matches_serialized_code() {
        assert_eq!(ProgramBookStatus::New.to_string(), "new");
        assert_eq!(ScenarioStatus::Pending.to_string(), "pending");
        assert_eq!(ObjectiveType::Threshold.to_string(), "threshold");
    }
}
