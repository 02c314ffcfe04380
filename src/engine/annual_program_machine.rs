// ==========================================
// 资本工程计划书编制系统 - 年度计划状态机
// ==========================================
// 职责: 年度计划状态转换表及其计划书级联
// 转换: new → programming → submittedFinal, 允许 programming → new 回退
// 红线: 级联通过计划书状态机逐本执行, 首个失败即整体失败
// ==========================================

use tracing::debug;

use crate::domain::annual_program::AnnualProgram;
use crate::domain::program_book::ProgramBook;
use crate::domain::project::Project;
use crate::domain::types::{AnnualProgramStatus, ProgramBookStatus};
use crate::engine::program_book_machine::{
    ProgramBookStateMachine, ProgramBookTransitionContext,
};
use crate::engine::state_machine::{StateMachine, StateTransition, StatefulAggregate};
use crate::error::PlanningResult;

impl StatefulAggregate for AnnualProgram {
    type Status = AnnualProgramStatus;

    fn status(&self) -> AnnualProgramStatus {
        self.status
    }
}

// ==========================================
// ProgramBookSnapshot - 子计划书快照
// ==========================================
#[derive(Debug, Clone)]
pub struct ProgramBookSnapshot {
    pub program_book: ProgramBook,
    pub projects: Vec<Project>,
}

// ==========================================
// AnnualProgramTransitionContext - 转换上下文
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AnnualProgramTransitionContext {
    /// 终版提交写入的年度计划共享角色
    pub shareable_roles: Vec<String>,
    /// 级联终版提交时写入计划书的共享角色
    pub program_book_roles: Vec<String>,
    /// 本年度计划下的计划书及其项目快照
    pub program_books: Vec<ProgramBookSnapshot>,
}

// ==========================================
// AnnualProgramTransitionOutcome - 转换结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AnnualProgramTransitionOutcome {
    pub annual_program: AnnualProgram,
    /// 级联改写、需要保存的计划书
    pub program_books: Vec<ProgramBook>,
    /// 级联改写、需要批量保存的项目
    pub projects: Vec<Project>,
}

// ==========================================
// AnnualProgramStateMachine - 年度计划状态机
// ==========================================
pub struct AnnualProgramStateMachine {
    machine: StateMachine<
        AnnualProgram,
        AnnualProgramTransitionContext,
        AnnualProgramTransitionOutcome,
    >,
}

impl AnnualProgramStateMachine {
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(vec![
                StateTransition {
                    from: AnnualProgramStatus::New,
                    to: AnnualProgramStatus::Programming,
                    run: transitions::start_programming,
                },
                StateTransition {
                    from: AnnualProgramStatus::Programming,
                    to: AnnualProgramStatus::SubmittedFinal,
                    run: transitions::submit_final,
                },
                StateTransition {
                    from: AnnualProgramStatus::Programming,
                    to: AnnualProgramStatus::New,
                    run: transitions::back_to_new,
                },
            ]),
        }
    }

    /// 转换表查询, 无副作用
    pub fn is_state_transition_possible(
        &self,
        from: AnnualProgramStatus,
        to: AnnualProgramStatus,
    ) -> bool {
        self.machine.is_state_transition_possible(from, to)
    }

    /// 执行转换, 返回待持久化的变更集合
    pub fn execute(
        &self,
        annual_program: AnnualProgram,
        to: AnnualProgramStatus,
        context: &AnnualProgramTransitionContext,
    ) -> PlanningResult<AnnualProgramTransitionOutcome> {
        self.machine.execute(annual_program, to, context)
    }
}

impl Default for AnnualProgramStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 转换动作
// ==========================================
mod transitions {
    use super::*;

    /// new → programming: 仅写状态
    pub(super) fn start_programming(
        mut program: AnnualProgram,
        to: AnnualProgramStatus,
        _ctx: &AnnualProgramTransitionContext,
    ) -> PlanningResult<AnnualProgramTransitionOutcome> {
        program.status = to;
        program.audit.touch("system");
        Ok(AnnualProgramTransitionOutcome {
            annual_program: program,
            program_books: Vec::new(),
            projects: Vec::new(),
        })
    }

    /// programming → submittedFinal: 写状态与共享角色,
    /// 级联: submittedPreliminary 的计划书逐本走计划书状态机到 submittedFinal
    pub(super) fn submit_final(
        mut program: AnnualProgram,
        to: AnnualProgramStatus,
        ctx: &AnnualProgramTransitionContext,
    ) -> PlanningResult<AnnualProgramTransitionOutcome> {
        program.status = to;
        program.shared_roles = ctx.shareable_roles.clone();
        program.audit.touch("system");

        let book_machine = ProgramBookStateMachine::new();
        let mut program_books = Vec::new();
        let mut projects = Vec::new();
        for snapshot in &ctx.program_books {
            if snapshot.program_book.status != ProgramBookStatus::SubmittedPreliminary {
                continue;
            }
            let book_ctx = ProgramBookTransitionContext {
                shareable_roles: ctx.program_book_roles.clone(),
                parent_shared_roles: None,
                parent_status: None,
                projects: snapshot.projects.clone(),
            };
            // 任一子转换失败 → 整个年度计划转换失败
            let outcome = book_machine.execute(
                snapshot.program_book.clone(),
                ProgramBookStatus::SubmittedFinal,
                &book_ctx,
            )?;
            program_books.push(outcome.program_book);
            projects.extend(outcome.projects);
        }

        debug!(
            annual_program_id = %program.id,
            cascaded_books = program_books.len(),
            cascaded_projects = projects.len(),
            "年度计划终版提交级联"
        );
        Ok(AnnualProgramTransitionOutcome {
            annual_program: program,
            program_books,
            projects,
        })
    }

    /// programming → new: 仅写状态回退, 无级联
    pub(super) fn back_to_new(
        mut program: AnnualProgram,
        to: AnnualProgramStatus,
        _ctx: &AnnualProgramTransitionContext,
    ) -> PlanningResult<AnnualProgramTransitionOutcome> {
        program.status = to;
        program.audit.touch("system");
        Ok(AnnualProgramTransitionOutcome {
            annual_program: program,
            program_books: Vec::new(),
            projects: Vec::new(),
        })
    }
}
