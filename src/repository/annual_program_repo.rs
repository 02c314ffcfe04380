// ==========================================
// 资本工程计划书编制系统 - 年度计划仓储接口
// ==========================================

use async_trait::async_trait;

use crate::domain::annual_program::AnnualProgram;
use crate::repository::error::RepositoryResult;

#[async_trait]
pub trait AnnualProgramRepository: Send + Sync {
    /// 按ID读取年度计划
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AnnualProgram>>;

    /// 保存年度计划
    async fn save(&self, annual_program: &AnnualProgram) -> RepositoryResult<()>;
}
