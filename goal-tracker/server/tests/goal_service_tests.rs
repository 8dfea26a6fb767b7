use goal_tracker_server::entities::{goal, task};
use goal_tracker_server::goal::{Goal, GoalService, GoalServiceError};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait};

mod common;

async fn insert_task(db: &DatabaseConnection, title: &str, goal_id: Option<i32>) -> task::Model {
    task::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        description: ActiveValue::Set("Some description".to_string()),
        completed_at: ActiveValue::Set(None),
        goal_id: ActiveValue::Set(goal_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create task")
}

async fn insert_goal(db: &DatabaseConnection, title: &str) -> goal::Model {
    goal::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create goal")
}

#[tokio::test]
async fn can_create_goal() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);

    let created_goal = goal_service
        .create_goal("Learn Rust".to_string())
        .await
        .expect("Failed to create goal");

    let expected_goal = Goal::new(created_goal.id(), "Learn Rust".to_string());
    assert_eq!(created_goal, expected_goal);

    let stored = goal::Entity::find_by_id(created_goal.id())
        .one(&db)
        .await
        .unwrap()
        .expect("goal was not stored");
    assert_eq!(stored.title, "Learn Rust");
}

#[tokio::test]
async fn can_update_goal() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);
    let initial = insert_goal(&db, "Learn Rust").await;

    let updated = goal_service
        .update_goal_by_id(&initial.goal_id.to_string(), "Learn Rust well".to_string())
        .await
        .expect("Failed to update goal");

    assert_eq!(updated, Goal::new(initial.goal_id, "Learn Rust well".to_string()));
}

#[tokio::test]
async fn can_handle_update_when_goal_not_found() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);
    let initial = insert_goal(&db, "Learn Rust").await;

    let non_existent_id = (initial.goal_id + 1).to_string();
    let result = goal_service
        .update_goal_by_id(&non_existent_id, "Another title".to_string())
        .await;

    assert!(matches!(result, Err(GoalServiceError::GoalNotFound(ref id)) if *id == non_existent_id));
    if let Err(e) = result {
        assert_eq!(e.to_string(), format!("Goal {} not found", non_existent_id));
    }
}

#[tokio::test]
async fn can_treat_malformed_goal_id_as_not_found() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);

    let result = goal_service.get_goal_by_id("first").await;

    assert!(matches!(result, Err(GoalServiceError::GoalNotFound(ref id)) if id == "first"));
}

#[tokio::test]
async fn can_get_all_goals() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);
    let first = insert_goal(&db, "Learn Rust").await;
    let second = insert_goal(&db, "Run a marathon").await;

    let goals = goal_service.get_all_goals().await.expect("Failed to get goals");

    assert_eq!(
        goals,
        vec![
            Goal::new(first.goal_id, first.title),
            Goal::new(second.goal_id, second.title),
        ]
    );
}

#[tokio::test]
async fn can_delete_goal_and_unassign_its_tasks() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);
    let doomed = insert_goal(&db, "Learn Rust").await;
    let kept = insert_goal(&db, "Run a marathon").await;
    let orphan = insert_task(&db, "Read the book", Some(doomed.goal_id)).await;
    let other = insert_task(&db, "Run 5k", Some(kept.goal_id)).await;

    let deleted = goal_service
        .delete_goal_by_id(&doomed.goal_id.to_string())
        .await
        .expect("Failed to delete goal");

    assert_eq!(deleted, Goal::new(doomed.goal_id, "Learn Rust".to_string()));
    assert!(goal::Entity::find_by_id(doomed.goal_id).one(&db).await.unwrap().is_none());

    let orphan = task::Entity::find_by_id(orphan.task_id).one(&db).await.unwrap().unwrap();
    assert_eq!(orphan.goal_id, None);
    let other = task::Entity::find_by_id(other.task_id).one(&db).await.unwrap().unwrap();
    assert_eq!(other.goal_id, Some(kept.goal_id));
}

#[tokio::test]
async fn can_assign_tasks_and_report_all_of_them() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);
    let goal = insert_goal(&db, "Learn Rust").await;
    let earlier = insert_task(&db, "Install rustup", Some(goal.goal_id)).await;
    let first = insert_task(&db, "Read the book", None).await;
    let second = insert_task(&db, "Write a CLI", None).await;

    let goal_tasks = goal_service
        .assign_tasks(
            &goal.goal_id.to_string(),
            &[first.task_id.to_string(), second.task_id.to_string()],
        )
        .await
        .expect("Failed to assign tasks");

    assert_eq!(goal_tasks.goal, Goal::new(goal.goal_id, goal.title));
    assert_eq!(
        goal_tasks.task_ids(),
        vec![earlier.task_id, first.task_id, second.task_id]
    );
    assert!(goal_tasks.tasks.iter().all(|task| task.goal_id() == Some(goal.goal_id)));
}

#[tokio::test]
async fn can_roll_back_assignment_when_a_task_is_missing() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);
    let goal = insert_goal(&db, "Learn Rust").await;
    let existing = insert_task(&db, "Read the book", None).await;

    let result = goal_service
        .assign_tasks(
            &goal.goal_id.to_string(),
            &[existing.task_id.to_string(), "404".to_string()],
        )
        .await;

    assert!(matches!(result, Err(GoalServiceError::TaskNotFound(ref id)) if id == "404"));
    let existing = task::Entity::find_by_id(existing.task_id).one(&db).await.unwrap().unwrap();
    assert_eq!(existing.goal_id, None);
}

#[tokio::test]
async fn can_get_goal_tasks() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let goal_service = GoalService::new(&db);
    let goal = insert_goal(&db, "Learn Rust").await;
    let assigned = insert_task(&db, "Read the book", Some(goal.goal_id)).await;
    insert_task(&db, "Buy groceries", None).await;

    let goal_tasks = goal_service
        .get_goal_tasks(&goal.goal_id.to_string())
        .await
        .expect("Failed to get goal tasks");

    assert_eq!(goal_tasks.task_ids(), vec![assigned.task_id]);
    assert_eq!(goal_tasks.tasks[0].title(), "Read the book");
}
