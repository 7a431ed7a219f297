use chrono::Duration;
use prep_core::model::{ProblemStatus, ProgressDraft};
use prep_core::time::fixed_now;
use storage::repository::{ProgressRepository, UiStateRepository};
use storage::sqlite::SqliteRepository;

fn draft(company: &str, title: &str, status: ProblemStatus) -> ProgressDraft {
    ProgressDraft {
        problem_id: title.to_string(),
        company: company.to_string(),
        difficulty: "Easy".to_string(),
        title: title.to_string(),
        status,
    }
}

#[tokio::test]
async fn sqlite_upsert_round_trips_and_stays_single_per_key() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let now = fixed_now();
    let first = repo
        .upsert_progress("u1", draft("Google", "Two Sum", ProblemStatus::InProgress), now)
        .await
        .unwrap();
    assert_eq!(first.status, ProblemStatus::InProgress);
    assert_eq!(first.completed_at, None);

    let later = now + Duration::hours(1);
    let second = repo
        .upsert_progress("u1", draft("Google", "Two Sum", ProblemStatus::Completed), later)
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.completed_at, Some(later));

    let records = repo.list_progress("u1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, ProblemStatus::Completed);
}

#[tokio::test]
async fn sqlite_completed_at_clears_when_status_regresses() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_regress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let now = fixed_now();
    repo.upsert_progress("u1", draft("Google", "Two Sum", ProblemStatus::Completed), now)
        .await
        .unwrap();

    let later = now + Duration::hours(1);
    let updated = repo
        .upsert_progress("u1", draft("Google", "Two Sum", ProblemStatus::InProgress), later)
        .await
        .unwrap();

    assert_eq!(updated.status, ProblemStatus::InProgress);
    assert_eq!(updated.completed_at, None);
    assert_eq!(updated.updated_at, later);
}

#[tokio::test]
async fn sqlite_lists_scope_by_user_and_company() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_scope?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let now = fixed_now();
    repo.upsert_progress("u1", draft("Google", "Two Sum", ProblemStatus::Completed), now)
        .await
        .unwrap();
    repo.upsert_progress(
        "u1",
        draft("Meta", "LRU Cache", ProblemStatus::InProgress),
        now + Duration::minutes(1),
    )
    .await
    .unwrap();
    repo.upsert_progress("u2", draft("Google", "Word Ladder", ProblemStatus::NotStarted), now)
        .await
        .unwrap();

    let all = repo.list_progress("u1").await.unwrap();
    assert_eq!(all.len(), 2);
    // Newest first.
    assert_eq!(all[0].problem_id, "LRU Cache");

    let google = repo.list_company_progress("u1", "Google").await.unwrap();
    assert_eq!(google.len(), 1);
    assert_eq!(google[0].problem_id, "Two Sum");
}

#[tokio::test]
async fn sqlite_ui_state_round_trips() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_uistate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get_value("selected_company").await.unwrap(), None);

    repo.set_value("selected_company", "Google").await.unwrap();
    repo.set_value("selected_company", "Meta").await.unwrap();
    repo.set_value("selected_timeframe", "Thirty Days").await.unwrap();

    assert_eq!(
        repo.get_value("selected_company").await.unwrap(),
        Some("Meta".to_string())
    );
    assert_eq!(
        repo.get_value("selected_timeframe").await.unwrap(),
        Some("Thirty Days".to_string())
    );
}
