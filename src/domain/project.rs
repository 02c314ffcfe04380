// ==========================================
// 资本工程计划书编制系统 - 项目领域模型
// ==========================================
// 职责: 项目聚合及其干预/年度分布子实体
// 红线: 只是排序与状态级联的输入快照, 不含数据访问逻辑
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::ProjectStatus;

// ==========================================
// ServicePriority - 部门优先级
// ==========================================
// priority_id 数值越小优先级越高 (1 = 最高)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServicePriority {
    pub service: String, // 部门代码
    pub priority_id: i32, // 优先级编号
}

// ==========================================
// InterventionAnnualPeriod - 干预年度分布
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionAnnualPeriod {
    pub year: i32,            // 年度
    pub annual_allowance: f64, // 年度预算 (千元)
    pub annual_length: f64,    // 年度长度 (米)
}

// ==========================================
// Intervention - 干预
// ==========================================
// 干预是目标累计与准入判定的计量单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: String,                   // 干预ID
    pub intervention_type_id: String, // 干预类型代码
    pub requestor_id: String,         // 需求部门代码
    pub work_type_id: String,         // 工程类型代码
    pub asset_type_id: String,        // 资产类型代码
    pub planification_year: i32,      // 规划年度
    pub annual_periods: Vec<InterventionAnnualPeriod>, // 年度分布
}

impl Intervention {
    /// 指定年度的年度预算, 无该年度分布时为 0
    pub fn annual_allowance(&self, year: i32) -> f64 {
        self.annual_periods
            .iter()
            .find(|p| p.year == year)
            .map(|p| p.annual_allowance)
            .unwrap_or(0.0)
    }

    /// 指定年度的年度长度, 无该年度分布时为 0
    pub fn annual_length(&self, year: i32) -> f64 {
        self.annual_periods
            .iter()
            .find(|p| p.year == year)
            .map(|p| p.annual_length)
            .unwrap_or(0.0)
    }
}

// ==========================================
// ProjectAnnualPeriod - 项目年度分布
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnnualPeriod {
    pub year: i32,                          // 年度
    pub category_id: String,                // 该年度的项目类别代码
    pub annual_budget: f64,                 // 年度预算 (千元)
    pub additional_costs_total_budget: f64, // 年度附加费用合计 (千元)
}

// ==========================================
// Project - 项目聚合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,                          // 项目ID
    pub program_book_id: Option<String>,     // 所属计划书
    pub status: ProjectStatus,               // 项目状态
    pub global_budget_allowance: f64,        // 项目总预算 (千元)
    pub road_network_type_id: Option<String>, // 路网类型代码
    pub sub_category_ids: Vec<String>,       // 子类别代码列表
    pub service_priorities: Vec<ServicePriority>, // 部门优先级列表
    pub interventions: Vec<Intervention>,    // 干预列表
    pub annual_periods: Vec<ProjectAnnualPeriod>, // 年度分布
}

impl Project {
    /// 指定年度的年度分布
    pub fn annual_period(&self, year: i32) -> Option<&ProjectAnnualPeriod> {
        self.annual_periods.iter().find(|p| p.year == year)
    }

    /// 指定年度的类别代码
    pub fn category_id(&self, year: i32) -> Option<&str> {
        self.annual_period(year).map(|p| p.category_id.as_str())
    }

    /// 指定年度的附加费用合计 (用于预算型目标累计)
    pub fn additional_costs(&self, year: i32) -> f64 {
        self.annual_period(year)
            .map(|p| p.additional_costs_total_budget)
            .unwrap_or(0.0)
    }

    /// 指定部门的优先级编号
    pub fn service_priority_for(&self, service: &str) -> Option<i32> {
        self.service_priorities
            .iter()
            .find(|sp| sp.service == service)
            .map(|sp| sp.priority_id)
    }
}
