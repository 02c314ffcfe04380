// ==========================================
// 资本工程计划书编制系统 - 引擎层
// ==========================================
// 职责: 实现排序与状态流转的业务规则引擎
// 红线: 引擎只消费不可变快照, 所有持久化由用例层负责
// ==========================================

pub mod annual_program_machine;
pub mod criteria_matcher;
pub mod objective;
pub mod program_book_machine;
pub mod ranking;
pub mod sorter;
pub mod state_machine;

// 重导出核心引擎
pub use annual_program_machine::{
    AnnualProgramStateMachine, AnnualProgramTransitionContext, AnnualProgramTransitionOutcome,
    ProgramBookSnapshot,
};
pub use criteria_matcher::CriteriaMatcher;
pub use objective::{ObjectiveCalculator, ProjectObjectives};
pub use program_book_machine::{
    ProgramBookStateMachine, ProgramBookTransitionContext, ProgramBookTransitionOutcome,
};
pub use ranking::PriorityScenarioRankingEngine;
pub use sorter::{ProjectSorter, SortContext};
pub use state_machine::{StateMachine, StateTransition, StatefulAggregate};
