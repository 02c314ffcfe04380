// ==========================================
// 资本工程计划书编制系统 - 计划书状态机
// ==========================================
// 职责: 计划书状态转换表及其项目级联
// 转换: new → programming → submittedPreliminary → submittedFinal,
//       允许 submittedPreliminary → programming 回退
// 红线: 级联变更只进结果, 不直接持久化; 父状态同步是排队信号不递归
// ==========================================

use tracing::debug;

use crate::domain::program_book::ProgramBook;
use crate::domain::project::Project;
use crate::domain::types::{AnnualProgramStatus, ProgramBookStatus, ProjectStatus};
use crate::engine::state_machine::{StateMachine, StateTransition, StatefulAggregate};
use crate::error::PlanningResult;

impl StatefulAggregate for ProgramBook {
    type Status = ProgramBookStatus;

    fn status(&self) -> ProgramBookStatus {
        self.status
    }
}

// ==========================================
// ProgramBookTransitionContext - 转换上下文
// ==========================================
// 调用方装配的不可变快照
#[derive(Debug, Clone, Default)]
pub struct ProgramBookTransitionContext {
    /// 终版提交写入的计划书共享角色
    pub shareable_roles: Vec<String>,
    /// 父年度计划的共享角色 (new → programming 时继承)
    pub parent_shared_roles: Option<Vec<String>>,
    /// 父年度计划的当前状态 (用于判定是否需要向上同步)
    pub parent_status: Option<AnnualProgramStatus>,
    /// 本计划书下的项目快照
    pub projects: Vec<Project>,
}

// ==========================================
// ProgramBookTransitionOutcome - 转换结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ProgramBookTransitionOutcome {
    pub program_book: ProgramBook,
    /// 状态被级联改写、需要批量保存的项目
    pub projects: Vec<Project>,
    /// 请求用例层把父年度计划同步到 programming (排队信号, 非递归调用)
    pub annual_program_sync_required: bool,
}

// ==========================================
// ProgramBookStateMachine - 计划书状态机
// ==========================================
pub struct ProgramBookStateMachine {
    machine: StateMachine<ProgramBook, ProgramBookTransitionContext, ProgramBookTransitionOutcome>,
}

impl ProgramBookStateMachine {
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(vec![
                StateTransition {
                    from: ProgramBookStatus::New,
                    to: ProgramBookStatus::Programming,
                    run: transitions::start_programming,
                },
                StateTransition {
                    from: ProgramBookStatus::Programming,
                    to: ProgramBookStatus::SubmittedPreliminary,
                    run: transitions::submit_preliminary,
                },
                StateTransition {
                    from: ProgramBookStatus::SubmittedPreliminary,
                    to: ProgramBookStatus::Programming,
                    run: transitions::reopen_programming,
                },
                StateTransition {
                    from: ProgramBookStatus::SubmittedPreliminary,
                    to: ProgramBookStatus::SubmittedFinal,
                    run: transitions::submit_final,
                },
            ]),
        }
    }

    /// 转换表查询, 无副作用
    pub fn is_state_transition_possible(
        &self,
        from: ProgramBookStatus,
        to: ProgramBookStatus,
    ) -> bool {
        self.machine.is_state_transition_possible(from, to)
    }

    /// 执行转换, 返回待持久化的变更集合
    pub fn execute(
        &self,
        program_book: ProgramBook,
        to: ProgramBookStatus,
        context: &ProgramBookTransitionContext,
    ) -> PlanningResult<ProgramBookTransitionOutcome> {
        self.machine.execute(program_book, to, context)
    }
}

impl Default for ProgramBookStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 转换动作
// ==========================================
mod transitions {
    use super::*;

    /// new → programming: 继承父共享角色 (若有), 请求向上同步
    pub(super) fn start_programming(
        mut book: ProgramBook,
        to: ProgramBookStatus,
        ctx: &ProgramBookTransitionContext,
    ) -> PlanningResult<ProgramBookTransitionOutcome> {
        if let Some(roles) = &ctx.parent_shared_roles {
            if !roles.is_empty() {
                book.shared_roles = roles.clone();
            }
        }
        book.status = to;
        book.audit.touch("system");

        // 父状态已是 programming 时无需同步
        let sync_required = ctx.parent_status != Some(AnnualProgramStatus::Programming);
        Ok(ProgramBookTransitionOutcome {
            program_book: book,
            projects: Vec::new(),
            annual_program_sync_required: sync_required,
        })
    }

    /// programming → submittedPreliminary: programmed 项目级联为 preliminaryOrdered
    pub(super) fn submit_preliminary(
        mut book: ProgramBook,
        to: ProgramBookStatus,
        ctx: &ProgramBookTransitionContext,
    ) -> PlanningResult<ProgramBookTransitionOutcome> {
        book.status = to;
        book.audit.touch("system");

        let projects = cascade_projects(&book.id, &ctx.projects, |status| {
            (status == ProjectStatus::Programmed).then_some(ProjectStatus::PreliminaryOrdered)
        });
        Ok(ProgramBookTransitionOutcome {
            program_book: book,
            projects,
            annual_program_sync_required: false,
        })
    }

    /// submittedPreliminary → programming: 反向级联 preliminaryOrdered → programmed
    pub(super) fn reopen_programming(
        mut book: ProgramBook,
        to: ProgramBookStatus,
        ctx: &ProgramBookTransitionContext,
    ) -> PlanningResult<ProgramBookTransitionOutcome> {
        book.status = to;
        book.audit.touch("system");

        let projects = cascade_projects(&book.id, &ctx.projects, |status| {
            (status == ProjectStatus::PreliminaryOrdered).then_some(ProjectStatus::Programmed)
        });
        Ok(ProgramBookTransitionOutcome {
            program_book: book,
            projects,
            annual_program_sync_required: false,
        })
    }

    /// submittedPreliminary → submittedFinal: 写入共享角色,
    /// 全部未达 finalOrdered 的项目级联为 finalOrdered
    pub(super) fn submit_final(
        mut book: ProgramBook,
        to: ProgramBookStatus,
        ctx: &ProgramBookTransitionContext,
    ) -> PlanningResult<ProgramBookTransitionOutcome> {
        book.status = to;
        book.shared_roles = ctx.shareable_roles.clone();
        book.audit.touch("system");

        let projects = cascade_projects(&book.id, &ctx.projects, |status| {
            (status != ProjectStatus::FinalOrdered).then_some(ProjectStatus::FinalOrdered)
        });
        Ok(ProgramBookTransitionOutcome {
            program_book: book,
            projects,
            annual_program_sync_required: false,
        })
    }

    /// 应用项目状态级联, 只返回实际改写的项目
    fn cascade_projects<F>(book_id: &str, projects: &[Project], next_status: F) -> Vec<Project>
    where
        F: Fn(ProjectStatus) -> Option<ProjectStatus>,
    {
        let changed: Vec<Project> = projects
            .iter()
            .filter_map(|p| {
                next_status(p.status).map(|status| {
                    let mut updated = p.clone();
                    updated.status = status;
                    updated
                })
            })
            .collect();
        debug!(
            program_book_id = book_id,
            cascaded_count = changed.len(),
            "项目状态级联"
        );
        changed
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ProjectStatus;
    use crate::error::PlanningError;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn create_test_project(id: &str, status: ProjectStatus) -> Project {
        Project {
            id: id.to_string(),
            program_book_id: Some("PB1".to_string()),
            status,
            global_budget_allowance: 100.0,
            road_network_type_id: None,
            sub_category_ids: Vec::new(),
            service_priorities: Vec::new(),
            interventions: Vec::new(),
            annual_periods: Vec::new(),
        }
    }

    fn book_at(status: ProgramBookStatus) -> ProgramBook {
        let mut book = ProgramBook::new("PB1", "AP1", "2026 主干网");
        book.status = status;
        book
    }

    // ==========================================
    // 转换合法性
    // ==========================================

    #[test]
    fn test_direct_final_submission_is_rejected() {
        let machine = ProgramBookStateMachine::new();
        let book = book_at(ProgramBookStatus::New);

        let err = machine
            .execute(
                book,
                ProgramBookStatus::SubmittedFinal,
                &ProgramBookTransitionContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, PlanningError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_possibility_check_covers_whole_table() {
        let machine = ProgramBookStateMachine::new();
        use ProgramBookStatus::*;
        let legal = [
            (New, Programming),
            (Programming, SubmittedPreliminary),
            (SubmittedPreliminary, Programming),
            (SubmittedPreliminary, SubmittedFinal),
        ];
        for from in [New, Programming, SubmittedPreliminary, SubmittedFinal] {
            for to in [New, Programming, SubmittedPreliminary, SubmittedFinal] {
                assert_eq!(
                    machine.is_state_transition_possible(from, to),
                    legal.contains(&(from, to)),
                    "({}, {}) 合法性判定不一致",
                    from,
                    to
                );
            }
        }
    }

    // ==========================================
    // 转换动作
    // ==========================================

    #[test]
    fn test_start_programming_adopts_parent_roles_and_requests_sync() {
        let machine = ProgramBookStateMachine::new();
        let book = book_at(ProgramBookStatus::New);
        let ctx = ProgramBookTransitionContext {
            parent_shared_roles: Some(vec!["planner".to_string()]),
            parent_status: Some(AnnualProgramStatus::New),
            ..ProgramBookTransitionContext::default()
        };

        let outcome = machine
            .execute(book, ProgramBookStatus::Programming, &ctx)
            .unwrap();

        assert_eq!(outcome.program_book.status, ProgramBookStatus::Programming);
        assert_eq!(outcome.program_book.shared_roles, vec!["planner".to_string()]);
        assert!(outcome.annual_program_sync_required);
    }

    #[test]
    fn test_start_programming_skips_sync_when_parent_already_programming() {
        let machine = ProgramBookStateMachine::new();
        let book = book_at(ProgramBookStatus::New);
        let ctx = ProgramBookTransitionContext {
            parent_status: Some(AnnualProgramStatus::Programming),
            ..ProgramBookTransitionContext::default()
        };

        let outcome = machine
            .execute(book, ProgramBookStatus::Programming, &ctx)
            .unwrap();
        assert!(!outcome.annual_program_sync_required);
    }

    #[test]
    fn test_submit_preliminary_cascades_only_programmed_projects() {
        // 3 个 programmed + 1 个 postponed → 3 个级联为 preliminaryOrdered
        let machine = ProgramBookStateMachine::new();
        let book = book_at(ProgramBookStatus::Programming);
        let ctx = ProgramBookTransitionContext {
            projects: vec![
                create_test_project("P1", ProjectStatus::Programmed),
                create_test_project("P2", ProjectStatus::Programmed),
                create_test_project("P3", ProjectStatus::Programmed),
                create_test_project("P4", ProjectStatus::Postponed),
            ],
            ..ProgramBookTransitionContext::default()
        };

        let outcome = machine
            .execute(book, ProgramBookStatus::SubmittedPreliminary, &ctx)
            .unwrap();

        assert_eq!(outcome.projects.len(), 3);
        assert!(outcome
            .projects
            .iter()
            .all(|p| p.status == ProjectStatus::PreliminaryOrdered));
        assert!(!outcome.projects.iter().any(|p| p.id == "P4"));
    }

    #[test]
    fn test_reopen_programming_reverses_cascade() {
        let machine = ProgramBookStateMachine::new();
        let book = book_at(ProgramBookStatus::SubmittedPreliminary);
        let ctx = ProgramBookTransitionContext {
            projects: vec![
                create_test_project("P1", ProjectStatus::PreliminaryOrdered),
                create_test_project("P2", ProjectStatus::Postponed),
            ],
            ..ProgramBookTransitionContext::default()
        };

        let outcome = machine
            .execute(book, ProgramBookStatus::Programming, &ctx)
            .unwrap();

        assert_eq!(outcome.projects.len(), 1);
        assert_eq!(outcome.projects[0].status, ProjectStatus::Programmed);
    }

    #[test]
    fn test_submit_final_moves_every_project_and_writes_roles() {
        let machine = ProgramBookStateMachine::new();
        let book = book_at(ProgramBookStatus::SubmittedPreliminary);
        let ctx = ProgramBookTransitionContext {
            shareable_roles: vec!["executor".to_string(), "planner".to_string()],
            projects: vec![
                create_test_project("P1", ProjectStatus::PreliminaryOrdered),
                create_test_project("P2", ProjectStatus::Postponed),
                create_test_project("P3", ProjectStatus::FinalOrdered),
            ],
            ..ProgramBookTransitionContext::default()
        };

        let outcome = machine
            .execute(book, ProgramBookStatus::SubmittedFinal, &ctx)
            .unwrap();

        assert_eq!(outcome.program_book.status, ProgramBookStatus::SubmittedFinal);
        assert_eq!(outcome.program_book.shared_roles.len(), 2);
        // 已是 finalOrdered 的 P3 不重复改写
        assert_eq!(outcome.projects.len(), 2);
        assert!(outcome
            .projects
            .iter()
            .all(|p| p.status == ProjectStatus::FinalOrdered));
    }
}
