// ==========================================
// 资本工程计划书编制系统 - 优先级场景用例
// ==========================================
// 职责: 场景排序计算、优先级维护、人工名次调整的用例编排
// 红线: 前置校验在本层完成; 引擎只消费校验过的快照
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::ReferenceDataReader;
use crate::domain::priority_scenario::{
    OrderedProject, PriorityLevel, PriorityScenario, ProjectRankChange,
};
use crate::domain::program_book::ProgramBook;
use crate::engine::PriorityScenarioRankingEngine;
use crate::error::{PlanningError, PlanningResult};
use crate::repository::{AnnualProgramRepository, ProgramBookRepository, ProjectRepository};

// ==========================================
// PriorityScenarioApi - 场景用例
// ==========================================
pub struct PriorityScenarioApi {
    program_book_repo: Arc<dyn ProgramBookRepository>,
    annual_program_repo: Arc<dyn AnnualProgramRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    reference_data: Arc<dyn ReferenceDataReader>,
    ranking: PriorityScenarioRankingEngine,
}

impl PriorityScenarioApi {
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
            ranking: PriorityScenarioRankingEngine::new(),
        }
    }

    // ==========================================
    // 场景排序计算
    // ==========================================

    /// 重新计算场景排序并持久化
    ///
    /// 重新计算会清除全部人工调整, 并清除过期标志
    pub async fn calculate(
        &self,
        program_book_id: &str,
        scenario_id: &str,
    ) -> PlanningResult<PriorityScenario> {
        let mut book = self.load_program_book(program_book_id).await?;
        if book.scenario(scenario_id).is_none() {
            return Err(PlanningError::not_found("PriorityScenario", scenario_id));
        }

        // 独立读取并发等待: 项目、年度、路网展示序
        let (projects, year, road_order) = futures::try_join!(
            async {
                self.project_repo
                    .find_by_program_book(program_book_id)
                    .await
                    .map_err(PlanningError::from)
            },
            self.load_year(&book.annual_program_id),
            async {
                self.reference_data
                    .road_network_type_order()
                    .await
                    .map_err(PlanningError::from)
            },
        )?;
        let road_order: HashMap<String, usize> = road_order
            .into_iter()
            .enumerate()
            .map(|(idx, code)| (code, idx))
            .collect();

        let objectives = book.objectives.clone();
        let scenario = book
            .scenario_mut(scenario_id)
            .ok_or_else(|| PlanningError::not_found("PriorityScenario", scenario_id))?;
        let ordered = self.ranking.compute_ordered_projects(
            scenario,
            &projects,
            year,
            &objectives,
            &road_order,
        )?;
        scenario.set_ordered_projects(ordered);
        self.ranking
            .update_priority_levels_count(scenario, &projects, year);
        scenario.audit.touch("system");
        let result = scenario.clone();

        self.program_book_repo.save(&book).await?;
        info!(
            program_book_id,
            scenario_id,
            ordered_count = result.ordered_projects.len(),
            "场景排序已计算并保存"
        );
        Ok(result)
    }

    // ==========================================
    // 优先级维护
    // ==========================================

    /// 替换场景的优先级列表
    ///
    /// 校验不变量后刷新命中计数, 并把排序结果标记为过期
    pub async fn update_priority_levels(
        &self,
        program_book_id: &str,
        scenario_id: &str,
        levels: Vec<PriorityLevel>,
    ) -> PlanningResult<PriorityScenario> {
        PriorityScenario::validate_priority_levels(&levels)?;

        let mut book = self.load_program_book(program_book_id).await?;
        if book.scenario(scenario_id).is_none() {
            return Err(PlanningError::not_found("PriorityScenario", scenario_id));
        }

        let (projects, year) = futures::try_join!(
            async {
                self.project_repo
                    .find_by_program_book(program_book_id)
                    .await
                    .map_err(PlanningError::from)
            },
            self.load_year(&book.annual_program_id),
        )?;

        let scenario = book
            .scenario_mut(scenario_id)
            .ok_or_else(|| PlanningError::not_found("PriorityScenario", scenario_id))?;
        scenario.priority_levels = levels;
        self.ranking
            .update_priority_levels_count(scenario, &projects, year);
        scenario.mark_outdated();
        scenario.audit.touch("system");
        let result = scenario.clone();

        self.program_book_repo.save(&book).await?;
        info!(program_book_id, scenario_id, "优先级列表已更新, 排序结果标记过期");
        Ok(result)
    }

    // ==========================================
    // 人工名次调整
    // ==========================================

    /// 调整单个项目的名次
    ///
    /// 前置校验:
    /// 1) 目标项目在排序结果中
    /// 2) 目标名次已存在于当前名次集合
    /// 3) 目标名次未被其他钉住项目占用
    pub async fn update_ordered_project_rank(
        &self,
        program_book_id: &str,
        scenario_id: &str,
        project_id: &str,
        change: ProjectRankChange,
    ) -> PlanningResult<PriorityScenario> {
        let mut book = self.load_program_book(program_book_id).await?;
        let scenario = book
            .scenario(scenario_id)
            .ok_or_else(|| PlanningError::not_found("PriorityScenario", scenario_id))?;

        if scenario.ordered_project(project_id).is_none() {
            return Err(PlanningError::not_found("OrderedProject", project_id));
        }
        if change.is_manually_ordered {
            if !scenario.ranks().contains(&change.new_rank) {
                return Err(PlanningError::BusinessRule(format!(
                    "目标名次 {} 不存在",
                    change.new_rank
                )));
            }
            let collision = scenario.ordered_projects.iter().any(|op| {
                op.project_id != project_id
                    && op.is_manually_ordered
                    && op.rank == change.new_rank
            });
            if collision {
                return Err(PlanningError::BusinessRule(format!(
                    "目标名次 {} 已被其他钉住项目占用",
                    change.new_rank
                )));
            }
        }

        let reordered = self.ranking.update_ordered_projects_with_new_project_rank(
            scenario.ordered_projects.clone(),
            project_id,
            &change,
        )?;

        let scenario = book
            .scenario_mut(scenario_id)
            .ok_or_else(|| PlanningError::not_found("PriorityScenario", scenario_id))?;
        scenario.ordered_projects = reordered;
        scenario.audit.touch("system");
        let result = scenario.clone();

        self.program_book_repo.save(&book).await?;
        info!(
            program_book_id,
            scenario_id,
            project_id,
            new_rank = change.new_rank,
            manually_ordered = change.is_manually_ordered,
            "人工名次调整已保存"
        );
        Ok(result)
    }

    // ==========================================
    // 目标累计展示
    // ==========================================

    /// 读取排序项目并附加目标累计 (分页展示用, 不持久化)
    pub async fn ordered_projects_with_objectives(
        &self,
        program_book_id: &str,
        scenario_id: &str,
    ) -> PlanningResult<Vec<OrderedProject>> {
        let book = self.load_program_book(program_book_id).await?;
        let scenario = book
            .scenario(scenario_id)
            .ok_or_else(|| PlanningError::not_found("PriorityScenario", scenario_id))?;

        let (projects, year) = futures::try_join!(
            async {
                self.project_repo
                    .find_by_program_book(program_book_id)
                    .await
                    .map_err(PlanningError::from)
            },
            self.load_year(&book.annual_program_id),
        )?;

        self.ranking.ordered_projects_with_objectives(
            &scenario.ordered_projects,
            &projects,
            &book.objectives,
            year,
        )
    }

    // ==========================================
    // 场景过期
    // ==========================================

    /// 把计划书下全部场景标记为过期
    pub async fn outdate_program_book_priority_scenarios(
        &self,
        program_book_id: &str,
    ) -> PlanningResult<()> {
        let mut book = self.load_program_book(program_book_id).await?;
        book.outdate_priority_scenarios();
        self.program_book_repo.save(&book).await?;
        info!(program_book_id, "计划书全部场景已标记过期");
        Ok(())
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

    async fn load_year(&self, annual_program_id: &str) -> PlanningResult<i32> {
        let program = self
            .annual_program_repo
            .find_by_id(annual_program_id)
            .await?
            .ok_or_else(|| PlanningError::not_found("AnnualProgram", annual_program_id))?;
        Ok(program.year)
    }
}
