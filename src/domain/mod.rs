// ==========================================
// 资本工程计划书编制系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务不变量
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod annual_program;
pub mod audit;
pub mod priority_scenario;
pub mod program_book;
pub mod project;
pub mod types;

// 重导出核心类型
pub use annual_program::AnnualProgram;
pub use audit::Audit;
pub use priority_scenario::{
    ObjectivesCalculation, OrderedProject, PriorityLevel, PriorityLevelCriteria,
    PriorityLevelSortCriterion, PriorityScenario, ProjectCategoryCriterion, ProjectRankChange,
};
pub use program_book::{Objective, ObjectiveValues, ProgramBook, MAX_PINNED_OBJECTIVES};
pub use project::{
    Intervention, InterventionAnnualPeriod, Project, ProjectAnnualPeriod, ServicePriority,
};
pub use types::{
    AnnualProgramStatus, ObjectiveType, ProgramBookStatus, ProjectStatus, ScenarioStatus,
    SortCriterionName,
};
