// ==========================================
// 资本工程计划书编制系统 - 核心库
// ==========================================
// 系统定位: 多年期资本工程计划书的优先级排序与状态流转核心
// 技术栈: Rust + tokio, 持久化与参照数据以接口形式注入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 仓储接口层 - 数据访问抽象
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 参照数据层 - 分类法与角色
pub mod config;

// 用例层 - 业务接口
pub mod api;

// 核心错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AnnualProgramStatus, ObjectiveType, ProgramBookStatus, ProjectStatus, ScenarioStatus,
    SortCriterionName,
};

// 领域实体
pub use domain::{
    AnnualProgram, Audit, Intervention, Objective, ObjectiveValues, ObjectivesCalculation,
    OrderedProject, PriorityLevel, PriorityLevelCriteria, PriorityLevelSortCriterion,
    PriorityScenario, ProgramBook, Project, ProjectCategoryCriterion, ProjectRankChange,
    ServicePriority,
};

// 引擎
pub use engine::{
    AnnualProgramStateMachine, CriteriaMatcher, ObjectiveCalculator,
    PriorityScenarioRankingEngine, ProgramBookStateMachine, ProjectSorter, StateMachine,
    StatefulAggregate,
};

// 用例
pub use api::{AnnualProgramApi, PriorityScenarioApi, ProgramBookApi};

// 错误
pub use error::{PlanningError, PlanningResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "资本工程计划书编制系统";
