// ==========================================
// 资本工程计划书编制系统 - 目标累计引擎
// ==========================================
// 职责: 单项目目标贡献值计算 + 有序项目序列的累计/百分比
// 输入: 已排序的项目序列 + 计划书目标列表 + 目标年度
// 输出: 每个项目的累计结果与阈值贡献数
// 红线: 只消费已排序序列, 不改变顺序
// ==========================================

use crate::domain::priority_scenario::ObjectivesCalculation;
use crate::domain::program_book::Objective;
use crate::domain::project::{Intervention, Project};
use crate::domain::types::{OBJECTIVE_TARGET_BUDGET, OBJECTIVE_TARGET_LENGTH};
use crate::error::{PlanningError, PlanningResult};

// ==========================================
// ProjectObjectives - 单项目累计结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectObjectives {
    pub project_id: String,                       // 项目ID
    pub calculations: Vec<ObjectivesCalculation>, // 各目标累计
    pub threshold_contributions: usize,           // 阈值贡献数
}

// ==========================================
// ObjectiveCalculator - 目标累计引擎
// ==========================================
pub struct ObjectiveCalculator {
    // 无状态引擎,不需要注入依赖
}

impl ObjectiveCalculator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 单项目对单目标在指定年度的贡献值
    ///
    /// 步骤:
    /// 1) 按目标过滤条件 (需求部门/资产类型/工程类型) 筛选干预
    /// 2) budget 型: 累加该年度 annual_allowance, 再加附加费用
    ///    length 型: 累加该年度 annual_length
    /// 3) 未知指标类型代码 → 验证失败
    pub fn calculate_value(
        &self,
        objective: &Objective,
        interventions: &[Intervention],
        year: i32,
        additional_costs: f64,
    ) -> PlanningResult<f64> {
        let filtered = interventions
            .iter()
            .filter(|i| objective.matches_intervention(i));

        match objective.target_type.as_str() {
            OBJECTIVE_TARGET_BUDGET => {
                let sum: f64 = filtered.map(|i| i.annual_allowance(year)).sum();
                Ok(sum + additional_costs)
            }
            OBJECTIVE_TARGET_LENGTH => {
                Ok(filtered.map(|i| i.annual_length(year)).sum())
            }
            other => Err(PlanningError::Validation(format!(
                "未知的目标指标类型: {}",
                other
            ))),
        }
    }

    /// 百分比: round(累计值 / 参考值 * 100), 参考值为 0 时取 0
    pub fn objective_percent(objective_sum: f64, reference: f64) -> f64 {
        if reference == 0.0 {
            0.0
        } else {
            (objective_sum / reference * 100.0).round()
        }
    }

    /// 沿已排序的项目序列累计各目标
    ///
    /// 第 i 个项目: objective_sum_i = objective_sum_{i-1} + 贡献值;
    /// 阈值贡献数 = 使阈值型目标累计值实际增加的目标个数
    pub fn compute(
        &self,
        projects: &[&Project],
        objectives: &[Objective],
        year: i32,
    ) -> PlanningResult<Vec<ProjectObjectives>> {
        let mut running_sums: Vec<f64> = vec![0.0; objectives.len()];
        let mut results = Vec::with_capacity(projects.len());

        for project in projects {
            let mut calculations = Vec::with_capacity(objectives.len());
            let mut threshold_contributions = 0usize;

            for (idx, objective) in objectives.iter().enumerate() {
                let value = self.calculate_value(
                    objective,
                    &project.interventions,
                    year,
                    project.additional_costs(year),
                )?;
                let previous = running_sums[idx];
                running_sums[idx] = previous + value;

                if objective.is_threshold() && running_sums[idx] > previous {
                    threshold_contributions += 1;
                }

                calculations.push(ObjectivesCalculation {
                    objective_id: objective.id.clone(),
                    objective_sum: running_sums[idx],
                    objective_percent: Self::objective_percent(
                        running_sums[idx],
                        objective.values.reference,
                    ),
                });
            }

            results.push(ProjectObjectives {
                project_id: project.id.clone(),
                calculations,
                threshold_contributions,
            });
        }

        Ok(results)
    }

    /// 刷新目标的计算值 (项目/干预变动后调用)
    pub fn refresh_calculated_values(
        &self,
        objectives: &mut [Objective],
        projects: &[Project],
        year: i32,
    ) -> PlanningResult<()> {
        for objective in objectives.iter_mut() {
            let mut total = 0.0;
            for project in projects {
                total += self.calculate_value(
                    objective,
                    &project.interventions,
                    year,
                    project.additional_costs(year),
                )?;
            }
            objective.values.calculated = total;
        }
        Ok(())
    }
}

impl Default for ObjectiveCalculator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::Audit;
    use crate::domain::program_book::ObjectiveValues;
    use crate::domain::project::{InterventionAnnualPeriod, ProjectAnnualPeriod};
    use crate::domain::types::{ObjectiveType, ProjectStatus};

    const YEAR: i32 = 2026;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn create_test_intervention(
        id: &str,
        work_type: &str,
        allowance: f64,
        length: f64,
    ) -> Intervention {
        Intervention {
            id: id.to_string(),
            intervention_type_id: "initialNeed".to_string(),
            requestor_id: "dre".to_string(),
            work_type_id: work_type.to_string(),
            asset_type_id: "aqueduct".to_string(),
            planification_year: YEAR,
            annual_periods: vec![InterventionAnnualPeriod {
                year: YEAR,
                annual_allowance: allowance,
                annual_length: length,
            }],
        }
    }

    fn create_test_project(id: &str, interventions: Vec<Intervention>) -> Project {
        Project {
            id: id.to_string(),
            program_book_id: Some("PB1".to_string()),
            status: ProjectStatus::Programmed,
            global_budget_allowance: 0.0,
            road_network_type_id: None,
            sub_category_ids: Vec::new(),
            service_priorities: Vec::new(),
            interventions,
            annual_periods: vec![ProjectAnnualPeriod {
                year: YEAR,
                category_id: "new".to_string(),
                annual_budget: 0.0,
                additional_costs_total_budget: 0.0,
            }],
        }
    }

    fn create_test_objective(id: &str, target_type: &str, reference: f64) -> Objective {
        Objective {
            id: id.to_string(),
            name: format!("objective {}", id),
            target_type: target_type.to_string(),
            objective_type: ObjectiveType::Threshold,
            requestor_id: None,
            asset_type_ids: Vec::new(),
            work_type_ids: Vec::new(),
            pin: false,
            values: ObjectiveValues {
                calculated: 0.0,
                reference,
            },
            audit: Audit::system(),
        }
    }

    // ==========================================
    // 贡献值计算
    // ==========================================

    #[test]
    fn test_budget_value_sums_allowance_and_additional_costs() {
        let calculator = ObjectiveCalculator::new();
        let objective = create_test_objective("O1", OBJECTIVE_TARGET_BUDGET, 1000.0);
        let interventions = vec![
            create_test_intervention("I1", "reconstruction", 100.0, 10.0),
            create_test_intervention("I2", "rehabilitation", 50.0, 5.0),
        ];

        let value = calculator
            .calculate_value(&objective, &interventions, YEAR, 25.0)
            .unwrap();
        assert_eq!(value, 175.0);
    }

    #[test]
    fn test_length_value_ignores_additional_costs() {
        let calculator = ObjectiveCalculator::new();
        let objective = create_test_objective("O1", OBJECTIVE_TARGET_LENGTH, 100.0);
        let interventions = vec![create_test_intervention("I1", "reconstruction", 100.0, 12.5)];

        let value = calculator
            .calculate_value(&objective, &interventions, YEAR, 25.0)
            .unwrap();
        assert_eq!(value, 12.5);
    }

    #[test]
    fn test_work_type_filter_limits_contribution() {
        let calculator = ObjectiveCalculator::new();
        let mut objective = create_test_objective("O1", OBJECTIVE_TARGET_BUDGET, 1000.0);
        objective.work_type_ids = vec!["reconstruction".to_string()];
        let interventions = vec![
            create_test_intervention("I1", "reconstruction", 100.0, 10.0),
            create_test_intervention("I2", "rehabilitation", 50.0, 5.0),
        ];

        let value = calculator
            .calculate_value(&objective, &interventions, YEAR, 0.0)
            .unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_unknown_target_type_is_validation_error() {
        let calculator = ObjectiveCalculator::new();
        let objective = create_test_objective("O1", "carbonFootprint", 1000.0);

        let err = calculator
            .calculate_value(&objective, &[], YEAR, 0.0)
            .unwrap_err();
        assert!(matches!(err, PlanningError::Validation(_)));
    }

    // ==========================================
    // 百分比
    // ==========================================

    #[test]
    fn test_percent_rounding_and_boundaries() {
        assert_eq!(ObjectiveCalculator::objective_percent(333.0, 1000.0), 33.0);
        assert_eq!(ObjectiveCalculator::objective_percent(335.0, 1000.0), 34.0);
        // 累计值等于参考值 → 恰好 100
        assert_eq!(ObjectiveCalculator::objective_percent(1000.0, 1000.0), 100.0);
        // 参考值为 0 → 不做除法
        assert_eq!(ObjectiveCalculator::objective_percent(500.0, 0.0), 0.0);
    }

    // ==========================================
    // 序列累计
    // ==========================================

    #[test]
    fn test_running_sums_follow_sequence_order() {
        let calculator = ObjectiveCalculator::new();
        let objective = create_test_objective("O1", OBJECTIVE_TARGET_BUDGET, 1000.0);
        let p1 = create_test_project(
            "P1",
            vec![create_test_intervention("I1", "reconstruction", 400.0, 0.0)],
        );
        let p2 = create_test_project(
            "P2",
            vec![create_test_intervention("I2", "reconstruction", 600.0, 0.0)],
        );

        let results = calculator
            .compute(&[&p1, &p2], &[objective], YEAR)
            .unwrap();

        assert_eq!(results[0].calculations[0].objective_sum, 400.0);
        assert_eq!(results[0].calculations[0].objective_percent, 40.0);
        assert_eq!(results[1].calculations[0].objective_sum, 1000.0);
        assert_eq!(results[1].calculations[0].objective_percent, 100.0);
    }

    #[test]
    fn test_threshold_contributions_count_actual_increases() {
        let calculator = ObjectiveCalculator::new();
        // 阈值目标仅统计 reconstruction 工程
        let mut threshold = create_test_objective("O1", OBJECTIVE_TARGET_BUDGET, 1000.0);
        threshold.work_type_ids = vec!["reconstruction".to_string()];
        // 绩效指标型目标不参与贡献数统计
        let mut indicator = create_test_objective("O2", OBJECTIVE_TARGET_BUDGET, 1000.0);
        indicator.objective_type = ObjectiveType::PerformanceIndicator;

        let p1 = create_test_project(
            "P1",
            vec![create_test_intervention("I1", "reconstruction", 400.0, 0.0)],
        );
        let p2 = create_test_project(
            "P2",
            vec![create_test_intervention("I2", "rehabilitation", 600.0, 0.0)],
        );

        let results = calculator
            .compute(&[&p1, &p2], &[threshold, indicator], YEAR)
            .unwrap();

        // P1 抬高了阈值目标累计 → 1 次贡献; P2 未抬高 → 0 次
        assert_eq!(results[0].threshold_contributions, 1);
        assert_eq!(results[1].threshold_contributions, 0);
    }

    #[test]
    fn test_refresh_calculated_values() {
        let calculator = ObjectiveCalculator::new();
        let mut objectives = vec![create_test_objective("O1", OBJECTIVE_TARGET_BUDGET, 1000.0)];
        let projects = vec![
            create_test_project(
                "P1",
                vec![create_test_intervention("I1", "reconstruction", 400.0, 0.0)],
            ),
            create_test_project(
                "P2",
                vec![create_test_intervention("I2", "reconstruction", 100.0, 0.0)],
            ),
        ];

        calculator
            .refresh_calculated_values(&mut objectives, &projects, YEAR)
            .unwrap();
        assert_eq!(objectives[0].values.calculated, 500.0);
    }
}
