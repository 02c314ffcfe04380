// ==========================================
// 资本工程计划书编制系统 - 参照数据读取 Trait
// ==========================================
// 职责: 定义排序与状态流转所需的参照数据读取接口 (不包含实现)
// 红线: 不包含写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ReferenceDataReader Trait
// ==========================================
// 用途: 分类法与角色参照数据的读取接口
// 实现者: 调用方的参照数据服务 (缓存/远程)
#[async_trait]
pub trait ReferenceDataReader: Send + Sync {
    /// 获取路网类型展示顺序
    ///
    /// # 返回
    /// - Vec<String>: 路网类型代码列表, 下标即展示顺序 (0 = 最前)
    ///
    /// # 用途
    /// - 用于 ROAD_NETWORK_TYPE 排序键
    async fn road_network_type_order(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取年度计划终版提交时写入的共享角色列表
    async fn shareable_roles_annual_program(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取计划书终版提交时写入的共享角色列表
    async fn shareable_roles_program_book(&self) -> Result<Vec<String>, Box<dyn Error>>;
}
