// ==========================================
// 资本工程计划书编制系统 - 年度计划用例
// ==========================================
// 职责: 年度计划创建与状态流转的用例编排
// 红线: 级联变更按 项目 → 计划书 → 年度计划 的顺序持久化,
//       首个保存失败即整个转换失败 (已写入部分不回滚)
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::config::ReferenceDataReader;
use crate::domain::annual_program::AnnualProgram;
use crate::domain::types::AnnualProgramStatus;
use crate::engine::{
    AnnualProgramStateMachine, AnnualProgramTransitionContext, ProgramBookSnapshot,
};
use crate::error::{PlanningError, PlanningResult};
use crate::repository::{AnnualProgramRepository, ProgramBookRepository, ProjectRepository};

// ==========================================
// AnnualProgramApi - 年度计划用例
// ==========================================
pub struct AnnualProgramApi {
    annual_program_repo: Arc<dyn AnnualProgramRepository>,
    program_book_repo: Arc<dyn ProgramBookRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    reference_data: Arc<dyn ReferenceDataReader>,
    machine: AnnualProgramStateMachine,
}

impl AnnualProgramApi {
    pub fn new(
        annual_program_repo: Arc<dyn AnnualProgramRepository>,
        program_book_repo: Arc<dyn ProgramBookRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        reference_data: Arc<dyn ReferenceDataReader>,
    ) -> Self {
        Self {
            annual_program_repo,
            program_book_repo,
            project_repo,
            reference_data,
            machine: AnnualProgramStateMachine::new(),
        }
    }

    // ==========================================
    // 创建
    // ==========================================

    /// 新建年度计划 (new 状态)
    pub async fn create(
        &self,
        id: &str,
        executor_id: &str,
        year: i32,
    ) -> PlanningResult<AnnualProgram> {
        let program = AnnualProgram::new(id, executor_id, year);
        self.annual_program_repo.save(&program).await?;
        info!(annual_program_id = id, executor_id, year, "年度计划已创建");
        Ok(program)
    }

    // ==========================================
    // 状态流转
    // ==========================================

    /// 执行年度计划状态转换并持久化级联变更
    pub async fn update_status(
        &self,
        annual_program_id: &str,
        to: AnnualProgramStatus,
    ) -> PlanningResult<AnnualProgram> {
        let program = self
            .annual_program_repo
            .find_by_id(annual_program_id)
            .await?
            .ok_or_else(|| PlanningError::not_found("AnnualProgram", annual_program_id))?;

        // 终版提交才需要角色参照与子聚合快照
        let context = if to == AnnualProgramStatus::SubmittedFinal {
            // 独立读取并发等待: 两份角色列表
            let (shareable_roles, program_book_roles) = futures::try_join!(
                async {
                    self.reference_data
                        .shareable_roles_annual_program()
                        .await
                        .map_err(PlanningError::from)
                },
                async {
                    self.reference_data
                        .shareable_roles_program_book()
                        .await
                        .map_err(PlanningError::from)
                },
            )?;

            let books = self
                .program_book_repo
                .find_by_annual_program(annual_program_id)
                .await?;
            let mut snapshots = Vec::with_capacity(books.len());
            for book in books {
                let projects = self.project_repo.find_by_program_book(&book.id).await?;
                snapshots.push(ProgramBookSnapshot {
                    program_book: book,
                    projects,
                });
            }

            AnnualProgramTransitionContext {
                shareable_roles,
                program_book_roles,
                program_books: snapshots,
            }
        } else {
            AnnualProgramTransitionContext::default()
        };

        let outcome = self.machine.execute(program, to, &context)?;

        // 持久化顺序: 项目批量 → 计划书批量 → 年度计划
        if !outcome.projects.is_empty() {
            self.project_repo.save_bulk(&outcome.projects).await?;
        }
        if !outcome.program_books.is_empty() {
            self.program_book_repo
                .save_bulk(&outcome.program_books)
                .await?;
        }
        self.annual_program_repo
            .save(&outcome.annual_program)
            .await?;

        info!(
            annual_program_id,
            to = %to,
            cascaded_books = outcome.program_books.len(),
            cascaded_projects = outcome.projects.len(),
            "年度计划状态转换完成"
        );
        Ok(outcome.annual_program)
    }
}
