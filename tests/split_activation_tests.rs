// SPDX-License-Identifier: MIT

//! Split composition and the single-active-split-per-user invariant.

use liftlog::error::AppError;
use liftlog::models::SplitDay;
use liftlog::services::refs::ChildRef;
use liftlog::services::split::{SplitCreate, SplitDayCreate, SplitPatch, SplitResponse};
use liftlog::AppState;

mod common;
use common::{seed_exercise, seed_workout, test_state, USER};

fn day(name: &str, workout_id: &str, number: u8) -> ChildRef<SplitDayCreate> {
    ChildRef::New(SplitDayCreate {
        day_name: name.to_string(),
        workout_id: workout_id.to_string(),
        day_number: number,
        rest_day: false,
    })
}

async fn seed_split(state: &AppState, name: &str, workout_id: &str) -> SplitResponse {
    state
        .splits
        .create(
            USER,
            SplitCreate {
                name: name.to_string(),
                description: None,
                days: vec![
                    day("Push", workout_id, 1),
                    day("Pull", workout_id, 2),
                ],
                split_type: "push_pull_legs".to_string(),
                weeks_duration: Some(8),
            },
        )
        .await
        .expect("seed split")
}

#[tokio::test]
async fn test_create_split_populates_days_in_day_order() {
    let state = test_state();
    let ex = seed_exercise(&state, "Bench").await;
    let workout = seed_workout(&state, USER, "Push", &[&ex]).await;

    let split = state
        .splits
        .create(
            USER,
            SplitCreate {
                name: "PPL".to_string(),
                description: None,
                days: vec![day("Pull", &workout.id, 2), day("Push", &workout.id, 1)],
                split_type: "push_pull_legs".to_string(),
                weeks_duration: None,
            },
        )
        .await
        .unwrap();

    assert!(!split.is_active);
    let numbers: Vec<u8> = split.days.iter().map(|d| d.day_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(split.days[0].day_name, "Push");
}

#[tokio::test]
async fn test_duplicate_day_number_is_rejected() {
    let state = test_state();
    let ex = seed_exercise(&state, "Bench").await;
    let workout = seed_workout(&state, USER, "Push", &[&ex]).await;

    let err = state
        .splits
        .create(
            USER,
            SplitCreate {
                name: "Broken".to_string(),
                description: None,
                days: vec![day("A", &workout.id, 3), day("B", &workout.id, 3)],
                split_type: "upper_lower".to_string(),
                weeks_duration: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_day_with_dangling_workout_is_rejected() {
    let state = test_state();

    let err = state
        .splits
        .create(
            USER,
            SplitCreate {
                name: "Broken".to_string(),
                description: None,
                days: vec![day("A", "no-such-workout", 1)],
                split_type: "full_body".to_string(),
                weeks_duration: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DanglingReference(_)));
}

#[tokio::test]
async fn test_activating_b_deactivates_a() {
    let state = test_state();
    let ex = seed_exercise(&state, "Bench").await;
    let workout = seed_workout(&state, USER, "Push", &[&ex]).await;
    let a = seed_split(&state, "Split A", &workout.id).await;
    let b = seed_split(&state, "Split B", &workout.id).await;

    state.splits.activate(&a.id).await.unwrap();
    state.splits.activate(&b.id).await.unwrap();

    let splits = state.splits.list(USER).await.unwrap();
    let active: Vec<&SplitResponse> = splits.iter().filter(|s| s.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);
    assert!(!splits.iter().find(|s| s.id == a.id).unwrap().is_active);
}

#[tokio::test]
async fn test_reactivating_active_split_is_a_no_op() {
    let state = test_state();
    let ex = seed_exercise(&state, "Bench").await;
    let workout = seed_workout(&state, USER, "Push", &[&ex]).await;
    let split = seed_split(&state, "Split A", &workout.id).await;

    let first = state.splits.activate(&split.id).await.unwrap();
    let second = state.splits.activate(&split.id).await.unwrap();

    assert!(first.is_active);
    assert!(second.is_active);
    // No state change on the second run.
    assert_eq!(first.updated_at, second.updated_at);

    let active_count = state
        .splits
        .list(USER)
        .await
        .unwrap()
        .iter()
        .filter(|s| s.is_active)
        .count();
    assert_eq!(active_count, 1);
}

#[tokio::test]
async fn test_patch_is_active_routes_through_activation() {
    let state = test_state();
    let ex = seed_exercise(&state, "Bench").await;
    let workout = seed_workout(&state, USER, "Push", &[&ex]).await;
    let a = seed_split(&state, "Split A", &workout.id).await;
    let b = seed_split(&state, "Split B", &workout.id).await;
    state.splits.activate(&a.id).await.unwrap();

    let patched = state
        .splits
        .update(
            &b.id,
            SplitPatch {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(patched.is_active);
    assert!(!state.splits.get(&a.id).await.unwrap().is_active);
}

#[tokio::test]
async fn test_delete_split_cascades_to_days() {
    let state = test_state();
    let ex = seed_exercise(&state, "Bench").await;
    let workout = seed_workout(&state, USER, "Push", &[&ex]).await;
    let split = seed_split(&state, "Split A", &workout.id).await;
    let day_id = split.days[0].id.clone();

    state.splits.delete(&split.id).await.unwrap();

    assert!(matches!(
        state.splits.get(&split.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(state
        .store
        .get::<SplitDay>(&day_id)
        .await
        .unwrap()
        .is_none());
}
