// ==========================================
// 资本工程计划书编制系统 - 计划书用例
// ==========================================
// 职责: 计划书创建、状态流转、项目进出、目标维护的用例编排
// 红线: 状态机只产出变更集合, 全部持久化在本层按序执行;
//       首个保存失败即整个用例失败 (已写入部分不回滚)
// ==========================================

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ReferenceDataReader;
use crate::domain::annual_program::AnnualProgram;
use crate::domain::program_book::{Objective, ProgramBook};
use crate::domain::project::Project;
use crate::domain::types::{AnnualProgramStatus, ProgramBookStatus, ProjectStatus};
use crate::engine::objective::ObjectiveCalculator;
use crate::engine::{
    AnnualProgramStateMachine, AnnualProgramTransitionContext, ProgramBookStateMachine,
    ProgramBookTransitionContext,
};
use crate::error::{PlanningError, PlanningResult};
use crate::repository::{AnnualProgramRepository, ProgramBookRepository, ProjectRepository};

// ==========================================
// ProgramBookApi - 计划书用例
// ==========================================
pub struct ProgramBookApi {
    program_book_repo: Arc<dyn ProgramBookRepository>,
    annual_program_repo: Arc<dyn AnnualProgramRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    reference_data: Arc<dyn ReferenceDataReader>,
    machine: ProgramBookStateMachine,
    calculator: ObjectiveCalculator,
}

impl ProgramBookApi {
    pub fn new(
        program_book_repo: Arc<dyn ProgramBookRepository>,
        annual_program_repo: Arc<dyn AnnualProgramRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        reference_data: Arc<dyn ReferenceDataReader>,
    ) -> Self {
        Self {
            program_book_repo,
            annual_program_repo,
            project_repo,
            reference_data,
            machine: ProgramBookStateMachine::new(),
            calculator: ObjectiveCalculator::new(),
        }
    }

    // ==========================================
    // 创建
    // ==========================================

    /// 新建计划书 (new 状态, 附带系统默认场景)
    pub async fn create(
        &self,
        id: &str,
        annual_program_id: &str,
        name: &str,
    ) -> PlanningResult<ProgramBook> {
        // 父年度计划必须存在
        self.load_annual_program(annual_program_id).await?;

        let book = ProgramBook::new(id, annual_program_id, name);
        self.program_book_repo.save(&book).await?;
        info!(program_book_id = id, annual_program_id, "计划书已创建");
        Ok(book)
    }

    // ==========================================
    // 状态流转
    // ==========================================

    /// 执行计划书状态转换并持久化级联变更
    ///
    /// 持久化顺序: 项目批量 → 计划书 → (如需) 父年度计划同步;
    /// 任一步失败则整个转换以失败上抛
    pub async fn update_status(
        &self,
        program_book_id: &str,
        to: ProgramBookStatus,
    ) -> PlanningResult<ProgramBook> {
        let book = self.load_program_book(program_book_id).await?;

        // 独立读取并发等待: 父年度计划与项目快照
        let (parent, projects) = futures::try_join!(
            self.load_annual_program(&book.annual_program_id),
            async {
                self.project_repo
                    .find_by_program_book(program_book_id)
                    .await
                    .map_err(PlanningError::from)
            },
        )?;

        let shareable_roles = if to == ProgramBookStatus::SubmittedFinal {
            self.reference_data.shareable_roles_program_book().await?
        } else {
            Vec::new()
        };

        let context = ProgramBookTransitionContext {
            shareable_roles,
            parent_shared_roles: Some(parent.shared_roles.clone()),
            parent_status: Some(parent.status),
            projects,
        };
        let outcome = self.machine.execute(book, to, &context)?;

        if !outcome.projects.is_empty() {
            self.project_repo.save_bulk(&outcome.projects).await?;
        }
        self.program_book_repo.save(&outcome.program_book).await?;

        // 排队的向上同步信号: 父年度计划仍为 new 时跟进到 programming
        if outcome.annual_program_sync_required {
            self.sync_parent_to_programming(parent).await?;
        }

        info!(
            program_book_id,
            to = %to,
            cascaded_projects = outcome.projects.len(),
            "计划书状态转换完成"
        );
        Ok(outcome.program_book)
    }

    /// 排队执行的父状态同步 (非递归: 计划书转换已完成并保存)
    async fn sync_parent_to_programming(&self, parent: AnnualProgram) -> PlanningResult<()> {
        if parent.status != AnnualProgramStatus::New {
            return Ok(());
        }
        let machine = AnnualProgramStateMachine::new();
        let outcome = machine.execute(
            parent,
            AnnualProgramStatus::Programming,
            &AnnualProgramTransitionContext::default(),
        )?;
        self.annual_program_repo
            .save(&outcome.annual_program)
            .await?;
        info!(
            annual_program_id = %outcome.annual_program.id,
            "父年度计划已同步到 programming"
        );
        Ok(())
    }

    // ==========================================
    // 项目进出
    // ==========================================

    /// 项目编入计划书
    ///
    /// 项目转为 programmed, 各场景末尾追加未排序条目并标记过期,
    /// 目标计算值随项目集刷新
    pub async fn add_project(
        &self,
        program_book_id: &str,
        project_id: &str,
    ) -> PlanningResult<ProgramBook> {
        let mut book = self.load_program_book(program_book_id).await?;
        let mut project = self.load_project(project_id).await?;
        if let Some(existing) = &project.program_book_id {
            if existing != program_book_id {
                return Err(PlanningError::BusinessRule(format!(
                    "项目 {} 已属于计划书 {}",
                    project_id, existing
                )));
            }
        }

        project.program_book_id = Some(program_book_id.to_string());
        project.status = ProjectStatus::Programmed;

        for scenario in &mut book.priority_scenarios {
            scenario.append_unordered_project(project_id);
            scenario.mark_outdated();
        }

        // 目标计算值随新项目集刷新
        let mut projects = self
            .project_repo
            .find_by_program_book(program_book_id)
            .await?;
        projects.retain(|p| p.id != project_id);
        projects.push(project.clone());
        let year = self.load_annual_program(&book.annual_program_id).await?.year;
        self.calculator
            .refresh_calculated_values(&mut book.objectives, &projects, year)?;

        self.project_repo.save(&project).await?;
        self.program_book_repo.save(&book).await?;
        info!(program_book_id, project_id, "项目已编入计划书");
        Ok(book)
    }

    /// 项目退出计划书 (决策转换)
    ///
    /// 项目回到 planned, 各场景删除其排序条目并标记过期
    pub async fn remove_project(
        &self,
        program_book_id: &str,
        project_id: &str,
    ) -> PlanningResult<ProgramBook> {
        let mut book = self.load_program_book(program_book_id).await?;
        let mut project = self.load_project(project_id).await?;
        if project.program_book_id.as_deref() != Some(program_book_id) {
            warn!(program_book_id, project_id, "项目不属于该计划书, 仅清理排序条目");
        }

        project.program_book_id = None;
        project.status = ProjectStatus::Planned;

        for scenario in &mut book.priority_scenarios {
            scenario.remove_ordered_project(project_id);
            scenario.mark_outdated();
        }

        let mut projects = self
            .project_repo
            .find_by_program_book(program_book_id)
            .await?;
        projects.retain(|p| p.id != project_id);
        let year = self.load_annual_program(&book.annual_program_id).await?.year;
        self.calculator
            .refresh_calculated_values(&mut book.objectives, &projects, year)?;

        self.project_repo.save(&project).await?;
        self.program_book_repo.save(&book).await?;
        info!(program_book_id, project_id, "项目已退出计划书");
        Ok(book)
    }

    // ==========================================
    // 目标维护
    // ==========================================

    /// 新增或更新目标 (含钉住上限校验), 并刷新计算值
    pub async fn upsert_objective(
        &self,
        program_book_id: &str,
        objective: Objective,
    ) -> PlanningResult<ProgramBook> {
        let mut book = self.load_program_book(program_book_id).await?;
        let objective_id = objective.id.clone();
        book.upsert_objective(objective)?;

        let (projects, year) = futures::try_join!(
            async {
                self.project_repo
                    .find_by_program_book(program_book_id)
                    .await
                    .map_err(PlanningError::from)
            },
            async {
                Ok(self
                    .load_annual_program(&book.annual_program_id)
                    .await?
                    .year)
            },
        )?;
        self.calculator
            .refresh_calculated_values(&mut book.objectives, &projects, year)?;

        self.program_book_repo.save(&book).await?;
        info!(program_book_id, objective_id = %objective_id, "目标已保存并刷新计算值");
        Ok(book)
    }

    /// 删除目标
    pub async fn remove_objective(
        &self,
        program_book_id: &str,
        objective_id: &str,
    ) -> PlanningResult<ProgramBook> {
        let mut book = self.load_program_book(program_book_id).await?;
        book.remove_objective(objective_id)?;
        self.program_book_repo.save(&book).await?;
        info!(program_book_id, objective_id, "目标已删除");
        Ok(book)
    }

    // ==========================================
    // 内部读取
    // ==========================================

    async fn load_program_book(&self, program_book_id: &str) -> PlanningResult<ProgramBook> {
        self.program_book_repo
            .find_by_id(program_book_id)
            .await?
            .ok_or_else(|| PlanningError::not_found("ProgramBook", program_book_id))
    }

    async fn load_annual_program(
        &self,
        annual_program_id: &str,
    ) -> PlanningResult<AnnualProgram> {
        self.annual_program_repo
            .find_by_id(annual_program_id)
            .await?
            .ok_or_else(|| PlanningError::not_found("AnnualProgram", annual_program_id))
    }

    async fn load_project(&self, project_id: &str) -> PlanningResult<Project> {
        self.project_repo
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| PlanningError::not_found("Project", project_id))
    }
}
