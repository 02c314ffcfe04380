// ==========================================
// 资本工程计划书编制系统 - 参照数据层
// ==========================================
// 职责: 定义核心所需的参照数据读取接口 (不包含实现)
// ==========================================

pub mod reference_data_trait;

pub use reference_data_trait::ReferenceDataReader;
