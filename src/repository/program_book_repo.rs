// ==========================================
// 资本工程计划书编制系统 - 计划书仓储接口
// ==========================================

use async_trait::async_trait;

use crate::domain::program_book::ProgramBook;
use crate::repository::error::RepositoryResult;

#[async_trait]
pub trait ProgramBookRepository: Send + Sync {
    /// 按ID读取计划书
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<ProgramBook>>;

    /// 读取某年度计划下的全部计划书
    async fn find_by_annual_program(
        &self,
        annual_program_id: &str,
    ) -> RepositoryResult<Vec<ProgramBook>>;

    /// 保存单个计划书
    async fn save(&self, program_book: &ProgramBook) -> RepositoryResult<()>;

    /// 批量保存计划书 (年度计划级联使用)
    async fn save_bulk(&self, program_books: &[ProgramBook]) -> RepositoryResult<()>;
}
