// ==========================================
// 资本工程计划书编制系统 - 项目仓储接口
// ==========================================
// 职责: 项目聚合 (含干预与年度分布) 的读取与保存接口
// ==========================================

use async_trait::async_trait;

use crate::domain::project::Project;
use crate::repository::error::RepositoryResult;

// ==========================================
// ProjectRepository Trait
// ==========================================
// 实现者由调用方提供 (数据库/内存)
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// 按ID读取项目
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Project>>;

    /// 读取某计划书下的全部项目
    async fn find_by_program_book(&self, program_book_id: &str) -> RepositoryResult<Vec<Project>>;

    /// 保存单个项目
    async fn save(&self, project: &Project) -> RepositoryResult<()>;

    /// 批量保存项目 (状态级联使用)
    ///
    /// 任一条目失败时整体返回失败, 已写入条目不回滚
    async fn save_bulk(&self, projects: &[Project]) -> RepositoryResult<()>;
}
