// ==========================================
// 状态流转集成测试
// ==========================================
// 测试范围:
// 1. 年度计划与计划书的合法/非法转换
// 2. 项目状态级联 (初版提交/回退/终版提交)
// 3. 父状态向上同步 (排队信号)
// 4. 级联批量保存失败 → 整个转换失败
// ==========================================


use std::sync::atomic::Ordering;
use std::sync::Arc;

use capital_works_planning::{
    AnnualProgram, AnnualProgramApi, AnnualProgramStatus, PlanningError, ProgramBook,
    ProgramBookApi, ProgramBookStatus, ProjectStatus,
};

use test_helpers::{
    create_test_project, InMemoryAnnualProgramRepository, InMemoryProgramBookRepository,
    InMemoryProjectRepository, MockReferenceDataReader, YEAR,
};

// ==========================================
// 测试环境装配
// ==========================================

struct TestEnv {
    annual_program_api: AnnualProgramApi,
    program_book_api: ProgramBookApi,
    annual_program_repo: Arc<InMemoryAnnualProgramRepository>,
    program_book_repo: Arc<InMemoryProgramBookRepository>,
    project_repo: Arc<InMemoryProjectRepository>,
}

async fn setup() -> TestEnv {
    let annual_program_repo = Arc::new(InMemoryAnnualProgramRepository::default());
    let program_book_repo = Arc::new(InMemoryProgramBookRepository::default());
    let project_repo = Arc::new(InMemoryProjectRepository::default());
    let reference_data = Arc::new(MockReferenceDataReader::default());

    let annual_program_api = AnnualProgramApi::new(
        annual_program_repo.clone(),
        program_book_repo.clone(),
        project_repo.clone(),
        reference_data.clone(),
    );
    let program_book_api = ProgramBookApi::new(
        program_book_repo.clone(),
        annual_program_repo.clone(),
        project_repo.clone(),
        reference_data,
    );

    TestEnv {
        annual_program_api,
        program_book_api,
        annual_program_repo,
        program_book_repo,
        project_repo,
    }
}

async fn seed_program(env: &TestEnv, status: AnnualProgramStatus) {
    let mut program = AnnualProgram::new("AP1", "di", YEAR);
    program.status = status;
    env.annual_program_repo.seed(vec![program]).await;
}

async fn seed_book(env: &TestEnv, id: &str, status: ProgramBookStatus) {
    let mut book = ProgramBook::new(id, "AP1", "2026 计划书");
    book.status = status;
    env.program_book_repo.seed(vec![book]).await;
}

// ==========================================
// 年度计划转换
// ==========================================

#[tokio::test]
async fn test_annual_program_programming_and_regression() {
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::New).await;

    let program = env
        .annual_program_api
        .update_status("AP1", AnnualProgramStatus::Programming)
        .await
        .unwrap();
    assert_eq!(program.status, AnnualProgramStatus::Programming);

    // 回退 programming → new, 无级联
    let program = env
        .annual_program_api
        .update_status("AP1", AnnualProgramStatus::New)
        .await
        .unwrap();
    assert_eq!(program.status, AnnualProgramStatus::New);
}

#[tokio::test]
async fn test_annual_program_rejects_skipping_programming() {
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::New).await;

    let err = env
        .annual_program_api
        .update_status("AP1", AnnualProgramStatus::SubmittedFinal)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::InvalidStateTransition { .. }));

    // 失败的转换不落库
    let stored = env.annual_program_repo.get("AP1").unwrap();
    assert_eq!(stored.status, AnnualProgramStatus::New);
}

#[tokio::test]
async fn test_annual_submit_final_cascades_preliminary_books() {
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::Programming).await;
    seed_book(&env, "PB1", ProgramBookStatus::SubmittedPreliminary).await;
    seed_book(&env, "PB2", ProgramBookStatus::Programming).await;
    env.project_repo
        .seed(vec![
            create_test_project("P1", "new", ProjectStatus::PreliminaryOrdered, Vec::new()),
            create_test_project("P2", "new", ProjectStatus::Postponed, Vec::new()),
        ])
        .await;

    let program = env
        .annual_program_api
        .update_status("AP1", AnnualProgramStatus::SubmittedFinal)
        .await
        .unwrap();

    assert_eq!(program.status, AnnualProgramStatus::SubmittedFinal);
    assert_eq!(program.shared_roles, vec!["executor".to_string()]);

    // submittedPreliminary 的 PB1 级联到 submittedFinal 并写入计划书角色
    let pb1 = env.program_book_repo.get("PB1").unwrap();
    assert_eq!(pb1.status, ProgramBookStatus::SubmittedFinal);
    assert_eq!(pb1.shared_roles, vec!["planner".to_string()]);

    // programming 的 PB2 不受级联影响
    let pb2 = env.program_book_repo.get("PB2").unwrap();
    assert_eq!(pb2.status, ProgramBookStatus::Programming);

    // PB1 下全部项目级联为 finalOrdered (含 postponed)
    assert_eq!(
        env.project_repo.get("P1").unwrap().status,
        ProjectStatus::FinalOrdered
    );
    assert_eq!(
        env.project_repo.get("P2").unwrap().status,
        ProjectStatus::FinalOrdered
    );
}

// ==========================================
// 计划书转换
// ==========================================

#[tokio::test]
async fn test_book_programming_syncs_parent_upward() {
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::New).await;
    seed_book(&env, "PB1", ProgramBookStatus::New).await;

    let book = env
        .program_book_api
        .update_status("PB1", ProgramBookStatus::Programming)
        .await
        .unwrap();
    assert_eq!(book.status, ProgramBookStatus::Programming);

    // 排队信号: 父年度计划跟进到 programming
    let parent = env.annual_program_repo.get("AP1").unwrap();
    assert_eq!(parent.status, AnnualProgramStatus::Programming);
}

#[tokio::test]
async fn test_submit_preliminary_cascade_example() {
    // 3 个 programmed + 1 个 postponed:
    // 初版提交后 3 个变为 preliminaryOrdered, postponed 保持不变
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::Programming).await;
    seed_book(&env, "PB1", ProgramBookStatus::Programming).await;
    env.project_repo
        .seed(vec![
            create_test_project("P1", "new", ProjectStatus::Programmed, Vec::new()),
            create_test_project("P2", "new", ProjectStatus::Programmed, Vec::new()),
            create_test_project("P3", "new", ProjectStatus::Programmed, Vec::new()),
            create_test_project("P4", "new", ProjectStatus::Postponed, Vec::new()),
        ])
        .await;

    env.program_book_api
        .update_status("PB1", ProgramBookStatus::SubmittedPreliminary)
        .await
        .unwrap();

    for id in ["P1", "P2", "P3"] {
        assert_eq!(
            env.project_repo.get(id).unwrap().status,
            ProjectStatus::PreliminaryOrdered
        );
    }
    assert_eq!(
        env.project_repo.get("P4").unwrap().status,
        ProjectStatus::Postponed
    );
    assert_eq!(
        env.program_book_repo.get("PB1").unwrap().status,
        ProgramBookStatus::SubmittedPreliminary
    );
}

#[tokio::test]
async fn test_reopen_programming_reverses_preliminary_cascade() {
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::Programming).await;
    seed_book(&env, "PB1", ProgramBookStatus::SubmittedPreliminary).await;
    env.project_repo
        .seed(vec![
            create_test_project("P1", "new", ProjectStatus::PreliminaryOrdered, Vec::new()),
            create_test_project("P2", "new", ProjectStatus::Postponed, Vec::new()),
        ])
        .await;

    env.program_book_api
        .update_status("PB1", ProgramBookStatus::Programming)
        .await
        .unwrap();

    assert_eq!(
        env.project_repo.get("P1").unwrap().status,
        ProjectStatus::Programmed
    );
    assert_eq!(
        env.project_repo.get("P2").unwrap().status,
        ProjectStatus::Postponed
    );
}

#[tokio::test]
async fn test_book_rejects_direct_final_submission() {
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::Programming).await;
    seed_book(&env, "PB1", ProgramBookStatus::Programming).await;

    let err = env
        .program_book_api
        .update_status("PB1", ProgramBookStatus::SubmittedFinal)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::InvalidStateTransition { .. }));
}

// ==========================================
// 级联保存失败
// ==========================================

#[tokio::test]
async fn test_bulk_save_failure_fails_whole_transition() {
    let env = setup().await;
    seed_program(&env, AnnualProgramStatus::Programming).await;
    seed_book(&env, "PB1", ProgramBookStatus::Programming).await;
    env.project_repo
        .seed(vec![create_test_project(
            "P1",
            "new",
            ProjectStatus::Programmed,
            Vec::new(),
        )])
        .await;
    env.project_repo.fail_bulk_save.store(true, Ordering::SeqCst);

    let err = env
        .program_book_api
        .update_status("PB1", ProgramBookStatus::SubmittedPreliminary)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::Unexpected(_)));

    // 计划书保存发生在项目批量保存之后 → 状态保持不变
    assert_eq!(
        env.program_book_repo.get("PB1").unwrap().status,
        ProgramBookStatus::Programming
    );
}
