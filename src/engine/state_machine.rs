// ==========================================
// 资本工程计划书编制系统 - 通用状态机执行器
// ==========================================
// 职责: 按声明式转换表校验并执行状态转换
// 红线: 执行器不自动写状态 (由转换动作负责); 不重试, 不回滚级联
// ==========================================

use std::fmt;

use crate::error::{PlanningError, PlanningResult};

// ==========================================
// StatefulAggregate - 带状态聚合
// ==========================================
// 每个受状态机管理的聚合实现一个显式的类型化状态访问器
pub trait StatefulAggregate {
    type Status: Copy + PartialEq + fmt::Display;

    /// 当前状态
    fn status(&self) -> Self::Status;
}

/// 转换动作
///
/// 消费聚合快照, 自行写入目标状态, 返回包含全部待持久化变更的结果;
/// 级联产生的子聚合变更一并列入结果, 由调用方负责保存
pub type TransitionRun<T, C, R> =
    fn(T, <T as StatefulAggregate>::Status, &C) -> PlanningResult<R>;

// ==========================================
// StateTransition - 单条转换
// ==========================================
pub struct StateTransition<T: StatefulAggregate, C, R> {
    pub from: T::Status,            // 起始状态
    pub to: T::Status,              // 目标状态
    pub run: TransitionRun<T, C, R>, // 转换动作
}

// ==========================================
// StateMachine - 状态机执行器
// ==========================================
pub struct StateMachine<T: StatefulAggregate, C, R> {
    transitions: Vec<StateTransition<T, C, R>>,
}

impl<T: StatefulAggregate, C, R> StateMachine<T, C, R> {
    pub fn new(transitions: Vec<StateTransition<T, C, R>>) -> Self {
        Self { transitions }
    }

    /// 转换表查询, 无副作用
    pub fn is_state_transition_possible(&self, from: T::Status, to: T::Status) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == from && t.to == to)
    }

    /// 执行转换
    ///
    /// 按 (当前状态, 目标状态) 查表; 无匹配条目时返回转换错误,
    /// 否则调用转换动作并原样传出其结果
    pub fn execute(&self, entity: T, to: T::Status, context: &C) -> PlanningResult<R> {
        let from = entity.status();
        let Some(transition) = self
            .transitions
            .iter()
            .find(|t| t.from == from && t.to == to)
        else {
            return Err(PlanningError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        };
        (transition.run)(entity, to, context)
    }
}
