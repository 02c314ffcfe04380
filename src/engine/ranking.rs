// ==========================================
// 资本工程计划书编制系统 - 场景排序编排引擎
// ==========================================
// 职责: 协调条件匹配/排序/目标累计三个引擎, 产出场景的完整排序;
//       以及人工名次调整的冲突消解算法
// 输入: 场景快照 + 项目快照 + 目标年度 + 参照数据
// 输出: OrderedProject 列表 (调用方负责持久化)
// 红线: 逐级认领是显式顺序依赖, 不做并行化
// ==========================================

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::domain::audit::Audit;
use crate::domain::priority_scenario::{
    OrderedProject, PriorityScenario, ProjectRankChange,
};
use crate::domain::program_book::Objective;
use crate::domain::project::Project;
use crate::engine::criteria_matcher::CriteriaMatcher;
use crate::engine::objective::ObjectiveCalculator;
use crate::engine::sorter::{ProjectSorter, SortContext};
use crate::error::{PlanningError, PlanningResult};

// ==========================================
// PriorityScenarioRankingEngine - 排序编排引擎
// ==========================================
pub struct PriorityScenarioRankingEngine {
    matcher: CriteriaMatcher,
    sorter: ProjectSorter,
    calculator: ObjectiveCalculator,
}

impl PriorityScenarioRankingEngine {
    pub fn new() -> Self {
        Self {
            matcher: CriteriaMatcher::new(),
            sorter: ProjectSorter::new(),
            calculator: ObjectiveCalculator::new(),
        }
    }

    // ==========================================
    // 全量排序
    // ==========================================

    /// 计算场景的完整排序结果
    ///
    /// 步骤:
    /// 1) 用 rank 1 的排序条件对全池预排序 (为阈值贡献键提供稳定的平局种子)
    /// 2) 按级别序号升序逐级认领: 匹配 → 组内排序 → 移出候选池
    /// 3) 未被任何级别认领的项目按池内顺序追加 (level_rank = 0)
    /// 4) 按最终产出顺序重编名次: rank = initial_rank = 下标+1
    ///
    /// 同一输入必然产出同一结果; 重新计算会清除全部人工调整。
    pub fn compute_ordered_projects(
        &self,
        scenario: &PriorityScenario,
        projects: &[Project],
        year: i32,
        objectives: &[Objective],
        road_network_order: &HashMap<String, usize>,
    ) -> PlanningResult<Vec<OrderedProject>> {
        info!(
            scenario_id = %scenario.id,
            project_count = projects.len(),
            level_count = scenario.priority_levels.len(),
            "开始执行场景排序"
        );

        let mut levels: Vec<_> = scenario.priority_levels.iter().collect();
        levels.sort_by_key(|l| l.rank);

        // ==========================================
        // 步骤1: 预排序
        // ==========================================
        let first_level_criteria = levels
            .first()
            .map(|l| l.sort_criteria.as_slice())
            .unwrap_or(&[]);
        let pool: Vec<Project> = projects.to_vec();
        let ctx = self.build_sort_context(
            &pool.iter().collect::<Vec<_>>(),
            objectives,
            year,
            road_network_order,
        )?;
        let mut remaining = self.sorter.sort(pool, first_level_criteria, &ctx);

        // ==========================================
        // 步骤2: 逐级认领
        // ==========================================
        let mut claimed: Vec<(Project, u32)> = Vec::new();
        for level in &levels {
            if remaining.is_empty() {
                break;
            }
            let (matched, rest): (Vec<Project>, Vec<Project>) = remaining
                .into_iter()
                .partition(|p| self.matcher.matches(level, p, year));
            remaining = rest;
            if matched.is_empty() {
                continue;
            }

            // 阈值贡献键须基于 "已认领序列 + 当前候选集" 的累计重新计算
            let sequence: Vec<&Project> = claimed
                .iter()
                .map(|(p, _)| p)
                .chain(matched.iter())
                .collect();
            let ctx =
                self.build_sort_context(&sequence, objectives, year, road_network_order)?;
            let sorted = self.sorter.sort(matched, &level.sort_criteria, &ctx);

            debug!(
                level_rank = level.rank,
                matched_count = sorted.len(),
                "优先级认领完成"
            );
            claimed.extend(sorted.into_iter().map(|p| (p, level.rank)));
        }

        // ==========================================
        // 步骤3: 未命中项目追加
        // ==========================================
        let unmatched_count = remaining.len();
        claimed.extend(remaining.into_iter().map(|p| (p, 0)));

        // ==========================================
        // 步骤4: 重编名次
        // ==========================================
        let ordered: Vec<OrderedProject> = claimed
            .into_iter()
            .enumerate()
            .map(|(idx, (project, level_rank))| {
                let rank = (idx + 1) as u32;
                OrderedProject {
                    project_id: project.id,
                    level_rank,
                    initial_rank: rank,
                    rank,
                    is_manually_ordered: false,
                    note: None,
                    objectives_calculation: None,
                    audit: Audit::system(),
                }
            })
            .collect();

        info!(
            ordered_count = ordered.len(),
            unmatched_count, "场景排序完成"
        );
        Ok(ordered)
    }

    /// 装配排序辅助数据: 沿给定序列累计目标, 提取各项目的阈值贡献数
    fn build_sort_context(
        &self,
        sequence: &[&Project],
        objectives: &[Objective],
        year: i32,
        road_network_order: &HashMap<String, usize>,
    ) -> PlanningResult<SortContext> {
        let computed = self.calculator.compute(sequence, objectives, year)?;
        let threshold_contributions = computed
            .into_iter()
            .map(|r| (r.project_id, r.threshold_contributions))
            .collect();
        Ok(SortContext {
            road_network_order: road_network_order.clone(),
            threshold_contributions,
        })
    }

    // ==========================================
    // 级别命中计数
    // ==========================================

    /// 刷新各优先级的命中项目数 (与全量排序同一认领语义)
    pub fn update_priority_levels_count(
        &self,
        scenario: &mut PriorityScenario,
        projects: &[Project],
        year: i32,
    ) {
        let mut ranks: Vec<u32> = scenario.priority_levels.iter().map(|l| l.rank).collect();
        ranks.sort_unstable();

        let mut remaining: Vec<&Project> = projects.iter().collect();
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for rank in ranks {
            let Some(level) = scenario.priority_levels.iter().find(|l| l.rank == rank) else {
                continue;
            };
            let (matched, rest): (Vec<&Project>, Vec<&Project>) = remaining
                .into_iter()
                .partition(|p| self.matcher.matches(level, p, year));
            counts.insert(rank, matched.len());
            remaining = rest;
        }

        for level in &mut scenario.priority_levels {
            level.project_count = counts.get(&level.rank).copied().unwrap_or(0);
        }
    }

    // ==========================================
    // 目标累计展示
    // ==========================================

    /// 为排序项目按需附加目标累计结果 (分页展示用, 不持久化)
    pub fn ordered_projects_with_objectives(
        &self,
        ordered_projects: &[OrderedProject],
        projects: &[Project],
        objectives: &[Objective],
        year: i32,
    ) -> PlanningResult<Vec<OrderedProject>> {
        let by_id: HashMap<&str, &Project> =
            projects.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut sorted: Vec<OrderedProject> = ordered_projects.to_vec();
        sorted.sort_by_key(|op| op.rank);

        let sequence: Vec<&Project> = sorted
            .iter()
            .map(|op| {
                by_id
                    .get(op.project_id.as_str())
                    .copied()
                    .ok_or_else(|| PlanningError::not_found("Project", &op.project_id))
            })
            .collect::<PlanningResult<_>>()?;

        let computed = self.calculator.compute(&sequence, objectives, year)?;
        for (op, result) in sorted.iter_mut().zip(computed) {
            op.objectives_calculation = Some(result.calculations);
        }
        Ok(sorted)
    }

    // ==========================================
    // 人工名次调整
    // ==========================================

    /// 将目标项目移动到请求名次, 并消解受影响区间的名次冲突
    ///
    /// 规则:
    /// - is_manually_ordered = false 表示解除钉住, 目标名次取 initial_rank
    /// - 受影响区间内未钉住的项目整体让位一格
    /// - 让位撞上钉住项目的名次时继续顺延, 顺延次数以项目总数为界,
    ///   无空余名次时返回业务规则错误
    ///
    /// 前置校验 (目标名次存在、无其他钉住项目占用) 由用例层负责。
    pub fn update_ordered_projects_with_new_project_rank(
        &self,
        mut ordered_projects: Vec<OrderedProject>,
        target_project_id: &str,
        change: &ProjectRankChange,
    ) -> PlanningResult<Vec<OrderedProject>> {
        let pos = ordered_projects
            .iter()
            .position(|op| op.project_id == target_project_id)
            .ok_or_else(|| PlanningError::not_found("OrderedProject", target_project_id))?;
        let mut target = ordered_projects.remove(pos);

        let current_rank = target.rank;
        let rank_to_reach = if change.is_manually_ordered {
            change.new_rank
        } else {
            target.initial_rank
        };

        if rank_to_reach != current_rank {
            // 上移: 区间 [rank_to_reach, current) 让位 +1
            // 下移: 区间 (current, rank_to_reach] 让位 -1
            let direction: i64 = if current_rank > rank_to_reach { 1 } else { -1 };
            let in_band = |rank: u32| {
                if direction > 0 {
                    rank >= rank_to_reach && rank < current_rank
                } else {
                    rank > current_rank && rank <= rank_to_reach
                }
            };

            // 区间内钉住项目的名次不可移动
            let immutable_ranks: HashSet<u32> = ordered_projects
                .iter()
                .filter(|op| op.is_manually_ordered && in_band(op.rank))
                .map(|op| op.rank)
                .collect();

            let total = (ordered_projects.len() + 1) as i64;
            for op in &mut ordered_projects {
                if op.is_manually_ordered || !in_band(op.rank) {
                    continue;
                }
                let mut shifted = op.rank as i64 + direction;
                let mut steps: i64 = 0;
                while shifted >= 1
                    && shifted <= total
                    && immutable_ranks.contains(&(shifted as u32))
                {
                    shifted += direction;
                    steps += 1;
                    if steps > total {
                        break;
                    }
                }
                if shifted < 1 || shifted > total || steps > total {
                    return Err(PlanningError::BusinessRule(format!(
                        "名次 {} 让位失败: 区间内无空余名次",
                        op.rank
                    )));
                }
                op.rank = shifted as u32;
            }
        }

        target.rank = rank_to_reach;
        target.is_manually_ordered = change.is_manually_ordered;
        target.note = change.note.clone();
        target.audit.touch("system");
        ordered_projects.push(target);
        ordered_projects.sort_by_key(|op| op.rank);

        debug!(
            project_id = target_project_id,
            rank = rank_to_reach,
            manually_ordered = change.is_manually_ordered,
            "人工名次调整完成"
        );
        Ok(ordered_projects)
    }
}

impl Default for PriorityScenarioRankingEngine {
    fn default() -> Self {
        Self::new()
    }
}
