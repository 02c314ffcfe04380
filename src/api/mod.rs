// ==========================================
// 资本工程计划书编制系统 - 用例层
// ==========================================
// 职责: 装配仓储/参照数据与引擎, 执行前置校验与持久化编排
// 红线: 引擎不触达仓储; 仓储不含业务规则
// ==========================================

pub mod annual_program_api;
pub mod priority_scenario_api;
pub mod program_book_api;

pub use annual_program_api::AnnualProgramApi;
pub use priority_scenario_api::PriorityScenarioApi;
pub use program_book_api::ProgramBookApi;
