mod support;

use std::sync::Arc;

use roadside_assist_client::controllers::AdminDashboardController;
use roadside_assist_client::dto::{AdminRequestRow, LoadState, NoticeLevel};
use roadside_assist_client::models::{ProblemType, RequestStatus};
use roadside_assist_client::RoadsideApi;

use support::{mechanic, request, FakeApi, Reply};

fn dashboard(fake: &Arc<FakeApi>) -> AdminDashboardController {
    AdminDashboardController::new(Arc::clone(fake) as Arc<dyn RoadsideApi>)
}

#[tokio::test]
async fn test_fallback_runs_steps_in_order_until_non_empty() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "CREATED", Some((18.5, 73.8)))]));
    FakeApi::set(&fake.nearest_by_center, Reply::Fail(404));
    FakeApi::set(&fake.nearest, Reply::Ok(vec![]));
    FakeApi::set(&fake.by_skill, Reply::Ok(vec![mechanic(7, "TOWING", None)]));

    let admin = dashboard(&fake);
    assert_eq!(admin.load().await, LoadState::Ready);

    let resolution_calls: Vec<String> = fake
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("nearest") || c.starts_with("by_skill"))
        .collect();
    assert_eq!(
        resolution_calls,
        vec!["nearest_by_center:TOWING", "nearest:TOWING", "by_skill:TOWING"]
    );

    let rows = admin.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].candidates.len(), 1);
    assert_eq!(rows[0].candidates[0].mechanic_id, 7);
    assert_eq!(rows[0].candidate_source.as_deref(), Some("Available"));
}

#[tokio::test]
async fn test_first_non_empty_step_ends_the_chain() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "BATTERY", "CREATED", Some((1.0, 2.0)))]));
    FakeApi::set(
        &fake.nearest_by_center,
        Reply::Ok(vec![
            mechanic(1, "BATTERY_EXPERT", Some(5.0)),
            mechanic(2, "BATTERY_EXPERT", None),
            mechanic(3, "BATTERY_EXPERT", Some(5.0)),
        ]),
    );

    let admin = dashboard(&fake);
    admin.load().await;

    assert_eq!(fake.count("nearest:"), 0);
    assert_eq!(fake.count("by_skill"), 0);
    let ids: Vec<i64> = admin.rows().await[0].candidates.iter().map(|c| c.mechanic_id).collect();
    assert_eq!(ids, vec![1, 3, 2]);
}

#[tokio::test]
async fn test_without_coordinates_distance_steps_are_skipped() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "FUEL", "CREATED", None)]));
    FakeApi::set(&fake.by_skill, Reply::Ok(vec![mechanic(4, "GENERAL_MECHANIC", None)]));

    let admin = dashboard(&fake);
    admin.load().await;

    assert_eq!(fake.count("nearest"), 0);
    assert_eq!(fake.count("by_skill:GENERAL_MECHANIC"), 1);
}

#[tokio::test]
async fn test_local_pool_is_filtered_by_eligibility() {
    let fake = Arc::new(FakeApi::new());
    let mut unverified = mechanic(4, "LOCKSMITH", None);
    unverified.verified = false;
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "LOCKOUT", "CREATED", None)]));
    FakeApi::set(
        &fake.available,
        Reply::Ok(vec![mechanic(3, "LOCKSMITH", None), unverified, mechanic(5, "TOWING", None)]),
    );
    FakeApi::set(&fake.by_skill, Reply::Fail(500));

    let admin = dashboard(&fake);
    admin.load().await;

    let row = &admin.rows().await[0];
    let ids: Vec<i64> = row.candidates.iter().map(|c| c.mechanic_id).collect();
    assert_eq!(ids, vec![3]);
    assert_eq!(row.candidate_source.as_deref(), Some("Available (local)"));
}

#[tokio::test]
async fn test_exhausted_chain_is_an_empty_result_not_an_error() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "CREATED", Some((1.0, 1.0)))]));
    FakeApi::set(&fake.nearest_by_center, Reply::Fail(500));
    FakeApi::set(&fake.nearest, Reply::Fail(405));
    FakeApi::set(&fake.by_skill, Reply::Fail(503));

    let admin = dashboard(&fake);
    assert_eq!(admin.load().await, LoadState::Ready);

    let row = &admin.rows().await[0];
    assert!(row.candidates.is_empty());
    assert_eq!(row.empty_candidates_label(), Some("No skilled mechanics available"));
    assert!(admin.notices().await.is_empty());
}

#[tokio::test]
async fn test_unauthorized_aborts_the_chain() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "CREATED", Some((1.0, 1.0)))]));
    FakeApi::set(&fake.nearest_by_center, Reply::Fail(401));

    let admin = dashboard(&fake);
    admin.load().await;

    assert_eq!(fake.count("nearest:"), 0);
    assert_eq!(fake.count("by_skill"), 0);
}

#[tokio::test]
async fn test_concurrent_assign_sends_one_request() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "CREATED", None)]));
    FakeApi::set(&fake.by_skill, Reply::Ok(vec![mechanic(9, "TOWING", Some(1.2))]));

    let admin = dashboard(&fake);
    admin.load().await;
    admin.select_mechanic(1, 9).await;

    let (first, second) = tokio::join!(admin.assign(1), admin.assign(1));

    assert_eq!(fake.count("assign:1:9"), 1);
    let mut levels = vec![first.level, second.level];
    levels.sort_by_key(|l| format!("{:?}", l));
    assert_eq!(levels, vec![NoticeLevel::Info, NoticeLevel::Success]);

    let row = &admin.rows().await[0];
    assert_eq!(row.status, "IN_PROGRESS");
    assert_eq!(row.mechanic_name.as_deref(), Some("Mechanic 9"));
    assert!(!row.actions.assign);
    assert!(!row.assigning);

    // Ya asignada: la precondición falla y no hay nueva llamada
    let again = admin.assign(1).await;
    assert_eq!(again.level, NoticeLevel::Error);
    assert_eq!(fake.count("assign:"), 1);
}

#[tokio::test]
async fn test_failed_assign_leaves_request_untouched_and_releases_marker() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "CREATED", None)]));
    FakeApi::set(&fake.by_skill, Reply::Ok(vec![mechanic(9, "TOWING", None)]));
    FakeApi::set(&fake.assign, Reply::Fail(500));

    let admin = dashboard(&fake);
    admin.load().await;
    admin.select_mechanic(1, 9).await;

    let notice = admin.assign(1).await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.request_id, Some(1));

    let row = &admin.rows().await[0];
    assert_eq!(row.status, "CREATED");
    assert!(row.mechanic_name.is_none());
    assert!(!row.assigning);

    FakeApi::set(&fake.assign, Reply::Ok(()));
    assert_eq!(admin.assign(1).await.level, NoticeLevel::Success);
    assert_eq!(fake.count("assign:1:9"), 2);
}

#[tokio::test]
async fn test_assign_without_selection_never_calls_backend() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "CREATED", None)]));

    let admin = dashboard(&fake);
    admin.load().await;

    assert_eq!(admin.assign(1).await.level, NoticeLevel::Error);
    assert_eq!(fake.count("assign:"), 0);
}

#[tokio::test]
async fn test_mechanics_failure_still_renders_requests() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(
        &fake.requests,
        Reply::Ok(vec![
            request(1, "TOWING", "CREATED", None),
            request(2, "FUEL", "PAID", None),
        ]),
    );
    FakeApi::set(&fake.available, Reply::Fail(503));

    let admin = dashboard(&fake);
    assert_eq!(admin.load().await, LoadState::Ready);
    assert_eq!(admin.pool_size().await, 0);

    let rows = admin.rows().await;
    assert_eq!(rows.len(), 2);
    // Más recientes primero
    assert_eq!(rows[0].request_id, 2);
    assert_eq!(rows[0].status_label, "Paid");
    assert_eq!(rows[1].status_label, "Unassigned");
}

#[tokio::test]
async fn test_requests_failure_is_page_level() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Fail(500));

    let admin = dashboard(&fake);
    let state = admin.load().await;

    assert!(matches!(state, LoadState::Failed { .. }));
    assert_eq!(admin.load_state().await, state);
    assert!(admin.rows().await.is_empty());
}

#[tokio::test]
async fn test_candidate_lists_are_isolated_per_request() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(
        &fake.requests,
        Reply::Ok(vec![
            request(1, "TOWING", "CREATED", Some((10.0, 70.0))),
            request(2, "TOWING", "CREATED", Some((20.0, 80.0))),
        ]),
    );
    FakeApi::set(
        &fake.nearest_by_center_at,
        vec![
            (10.0, vec![mechanic(11, "TOWING", Some(0.5))]),
            (20.0, vec![mechanic(22, "TOWING", Some(0.7))]),
        ],
    );

    let admin = dashboard(&fake);
    admin.load().await;

    let rows = admin.rows().await;
    let candidates = |id: i64| -> Vec<i64> {
        rows.iter()
            .find(|r| r.request_id == id)
            .unwrap()
            .candidates
            .iter()
            .map(|c| c.mechanic_id)
            .collect()
    };
    assert_eq!(candidates(1), vec![11]);
    assert_eq!(candidates(2), vec![22]);

    // Asignar la fila 1 no toca la lista de la fila 2
    admin.select_mechanic(1, 11).await;
    admin.assign(1).await;
    let rows = admin.rows().await;
    let row2 = rows.iter().find(|r| r.request_id == 2).unwrap();
    assert_eq!(row2.candidates.iter().map(|c| c.mechanic_id).collect::<Vec<_>>(), vec![22]);

    // Con cache no se vuelve a consultar
    fake.clear_calls();
    admin.candidates_for(2).await.unwrap();
    assert_eq!(fake.count("nearest_by_center"), 0);
}

#[tokio::test]
async fn test_problem_wide_candidates_fill_unresolved_rows() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(3, "TIRE_CHANGE", "CREATED", None)]));
    FakeApi::set(&fake.by_skill, Reply::Fail(503));

    let admin = dashboard(&fake);
    admin.load().await;
    assert!(admin.rows().await[0].candidates.is_empty());

    FakeApi::set(&fake.by_skill, Reply::Ok(vec![mechanic(6, "TIRE_SPECIALIST", None)]));
    let resolution = admin.candidates_for_problem(&ProblemType::TireChange).await;
    assert_eq!(resolution.mechanics.len(), 1);

    // La fila sin resolución propia usa la entrada general del tipo de problema
    let row = &admin.rows().await[0];
    assert_eq!(row.candidates.iter().map(|c| c.mechanic_id).collect::<Vec<_>>(), vec![6]);
}

#[tokio::test]
async fn test_reload_resolves_candidates_again() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(4, "TOWING", "CREATED", None)]));
    FakeApi::set(&fake.by_skill, Reply::Ok(vec![mechanic(3, "TOWING", None)]));

    let admin = dashboard(&fake);
    admin.load().await;
    let ids = |rows: &[AdminRequestRow]| -> Vec<i64> {
        rows[0].candidates.iter().map(|c| c.mechanic_id).collect()
    };
    assert_eq!(ids(&admin.rows().await), vec![3]);

    // El mecánico 3 ya no está libre; la recarga no reutiliza la lista anterior
    FakeApi::set(&fake.by_skill, Reply::Ok(vec![mechanic(5, "TOWING", None)]));
    admin.load().await;
    assert_eq!(ids(&admin.rows().await), vec![5]);
}

#[tokio::test]
async fn test_cancel_is_final() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "IN_PROGRESS", None)]));

    let admin = dashboard(&fake);
    admin.load().await;

    assert!(admin.rows().await[0].actions.cancel);
    assert_eq!(admin.cancel(1).await.level, NoticeLevel::Success);
    assert_eq!(fake.count("status:1:CANCELLED"), 1);

    let row = &admin.rows().await[0];
    assert_eq!(row.status, RequestStatus::Cancelled.to_string());
    assert_eq!(row.status_label, "Cancelled");
    assert!(!row.actions.assign);
    assert!(!row.actions.cancel);

    // Cancelar de nuevo no toca la red; asignar queda bloqueado
    admin.cancel(1).await;
    assert_eq!(fake.count("status:"), 1);
    admin.select_mechanic(1, 3).await;
    assert_eq!(admin.assign(1).await.level, NoticeLevel::Error);
    assert_eq!(fake.count("assign:"), 0);
}

#[tokio::test]
async fn test_failed_cancel_keeps_status() {
    let fake = Arc::new(FakeApi::new());
    FakeApi::set(&fake.requests, Reply::Ok(vec![request(1, "TOWING", "CREATED", None)]));
    FakeApi::set(&fake.status_update, Reply::Fail(500));

    let admin = dashboard(&fake);
    admin.load().await;

    let notice = admin.cancel(1).await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(admin.rows().await[0].status, "CREATED");

    assert!(admin.dismiss(notice.id).await);
    assert!(admin.notices().await.is_empty());
}

#[tokio::test]
async fn test_center_capacity_conflict_becomes_notice() {
    let fake = Arc::new(FakeApi::new());
    let admin = dashboard(&fake);

    let notice = admin.assign_center("ravi@example.com", 2).await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("no capacity"));
}
