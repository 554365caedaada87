use chrono::Duration;
use replog_core::capture::ActiveWorkout;
use replog_core::model::{
    EmailAddress, Exercise, ExerciseId, FriendRequestStatus, NewNotification, NewWorkout,
    Profile, RequestTarget, SetInput, UserId,
};
use replog_core::time::fixed_now;
use storage::repository::{
    FriendRepository, NewFriendRequest, NotificationRepository, ProfileRepository, StorageError,
    WorkoutRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn leg_day(user: UserId, days_ago: i64) -> NewWorkout {
    let end = fixed_now() - Duration::days(days_ago);
    let mut active = ActiveWorkout::start(end - Duration::minutes(52));
    active.set_notes(Some("felt strong".into()));

    let squat = active.add_exercise("Squat").unwrap();
    let lunge = active.add_exercise("Walking Lunge").unwrap();
    let s1 = active.add_set(squat).unwrap();
    let s2 = active.add_set(squat).unwrap();
    active.add_set(squat).unwrap();
    let l1 = active.add_set(lunge).unwrap();

    active
        .complete_set(squat, s1, SetInput::new(5, 140.0))
        .unwrap();
    active
        .complete_set(squat, s2, SetInput::new(5, 142.5).with_notes("belt"))
        .unwrap();
    active
        .complete_set(lunge, l1, SetInput::new(12, 20.0))
        .unwrap();
    active.finish(user, end).unwrap()
}

#[tokio::test]
async fn workouts_round_trip_with_order_and_sets() {
    let repo = connect("memdb_workouts").await;
    let user = UserId::new(1);

    let draft = leg_day(user, 0);
    let id = repo.insert_workout(&draft).await.unwrap();
    let stored = repo.get_workout(id).await.unwrap().expect("stored workout");

    assert_eq!(stored, draft.clone().into_workout(id));
    assert_eq!(stored.duration_minutes(), 52);
    assert_eq!(stored.notes(), Some("felt strong"));

    let names: Vec<&str> = stored.exercises().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["Squat", "Walking Lunge"]);
    let squat_sets = stored.exercises()[0].sets();
    assert_eq!(squat_sets.len(), 3);
    assert_eq!(squat_sets[1].notes(), Some("belt"));
    assert!(!squat_sets[2].is_completed());
}

#[tokio::test]
async fn workouts_list_newest_first_per_user() {
    let repo = connect("memdb_listing").await;
    let me = UserId::new(1);
    let other = UserId::new(2);

    let older = repo.insert_workout(&leg_day(me, 3)).await.unwrap();
    let newest = repo.insert_workout(&leg_day(me, 0)).await.unwrap();
    repo.insert_workout(&leg_day(other, 1)).await.unwrap();

    let listed = repo.list_workouts(me).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|w| w.id()).collect();
    assert_eq!(ids, [newest, older]);
    assert!(repo.list_workouts(UserId::new(3)).await.unwrap().is_empty());
}

#[tokio::test]
async fn listed_workouts_keep_their_own_exercises() {
    let repo = connect("memdb_listing_grouped").await;
    let me = UserId::new(1);
    let drafts = [leg_day(me, 5), leg_day(me, 2), leg_day(me, 1)];
    let mut ids = Vec::new();
    for draft in &drafts {
        ids.push(repo.insert_workout(draft).await.unwrap());
    }

    let listed = repo.list_workouts(me).await.unwrap();
    let expected: Vec<_> = drafts
        .iter()
        .cloned()
        .zip(ids)
        .rev()
        .map(|(draft, id)| draft.into_workout(id))
        .collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn undated_workouts_round_trip_without_a_date() {
    let repo = connect("memdb_undated").await;
    let me = UserId::new(1);
    let mut undated = leg_day(me, 0);
    undated.date = None;

    let dated = repo.insert_workout(&leg_day(me, 4)).await.unwrap();
    let id = repo.insert_workout(&undated).await.unwrap();

    assert_eq!(repo.get_workout(id).await.unwrap().unwrap().date(), None);
    let ids: Vec<_> = repo.list_workouts(me).await.unwrap().iter().map(|w| w.id()).collect();
    assert_eq!(ids, [dated, id]);
}

#[tokio::test]
async fn workout_batches_are_all_or_nothing() {
    let repo = connect("memdb_batch").await;
    let me = UserId::new(1);

    let ids = repo
        .insert_workouts(&[leg_day(me, 2), leg_day(me, 1)])
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);

    let mut broken = leg_day(me, 0);
    broken
        .exercises
        .push(Exercise::new(ExerciseId::new(u64::MAX), "Row", Vec::new()).unwrap());
    let err = repo
        .insert_workouts(&[leg_day(me, 0), broken])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));

    let listed: Vec<_> = repo.list_workouts(me).await.unwrap().iter().map(|w| w.id()).collect();
    assert_eq!(listed, [ids[1], ids[0]]);
}

#[tokio::test]
async fn profiles_are_found_by_normalized_email() {
    let repo = connect("memdb_profiles").await;
    let email = EmailAddress::parse("Sarah@Demo.com").unwrap();
    let profile = Profile::new(UserId::new(2), "sarah", Some("Sarah Smith".into()), email)
        .unwrap()
        .with_avatar_url(Some("https://img.example/s.png".into()));
    repo.upsert_profile(&profile).await.unwrap();

    let lookup = EmailAddress::parse("sarah@demo.com").unwrap();
    let found = repo.find_by_email(&lookup).await.unwrap();
    assert_eq!(found.as_ref(), Some(&profile));

    let clash = Profile::new(
        UserId::new(3),
        "imposter",
        None,
        EmailAddress::parse("sarah@demo.com").unwrap(),
    )
    .unwrap();
    assert!(matches!(
        repo.upsert_profile(&clash).await,
        Err(StorageError::Conflict)
    ));
}

#[tokio::test]
async fn requests_friendships_and_notifications() {
    let repo = connect("memdb_social").await;
    let mike = UserId::new(1);
    let sarah = UserId::new(2);

    let target = RequestTarget::User(sarah);
    let request_id = repo
        .insert_request(&NewFriendRequest {
            from_user: mike,
            target: target.clone(),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let pending = repo.find_pending_request(mike, &target).await.unwrap();
    assert_eq!(pending.map(|r| r.id), Some(request_id));

    let invite = RequestTarget::Email(EmailAddress::parse("new@demo.com").unwrap());
    assert!(repo.find_pending_request(mike, &invite).await.unwrap().is_none());

    let notification_id = repo
        .insert_notification(&NewNotification::friend_request(
            sarah,
            "Mike",
            request_id,
            fixed_now(),
        ))
        .await
        .unwrap();

    repo.set_request_status(request_id, FriendRequestStatus::Accepted)
        .await
        .unwrap();
    repo.insert_friendship(mike, sarah, fixed_now()).await.unwrap();
    repo.insert_friendship(sarah, mike, fixed_now()).await.unwrap();
    repo.mark_read(notification_id).await.unwrap();

    let request = repo.get_request(request_id).await.unwrap().unwrap();
    assert_eq!(request.status, FriendRequestStatus::Accepted);
    assert!(request.is_addressed_to(sarah));

    let friends_of_sarah = repo.list_friends(sarah).await.unwrap();
    assert_eq!(friends_of_sarah.len(), 1);
    assert_eq!(friends_of_sarah[0].friend_user_id, mike);
    assert_eq!(repo.list_friends(mike).await.unwrap().len(), 1);

    let inbox = repo.list_notifications(sarah).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].read);
    assert_eq!(inbox[0].request_id, Some(request_id));
    assert_eq!(inbox[0].message, "Mike wants to be your workout buddy");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn sqlite_file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("replog.sqlite3").display());

    let first = SqliteRepository::connect(&url).await.unwrap();
    first.migrate().await.unwrap();
    let id = first.insert_workout(&leg_day(UserId::new(1), 1)).await.unwrap();
    first.pool().close().await;

    let second = SqliteRepository::connect(&url).await.unwrap();
    second.migrate().await.unwrap();
    let stored = second.get_workout(id).await.unwrap().unwrap();
    assert_eq!(stored.exercises().len(), 2);
}
