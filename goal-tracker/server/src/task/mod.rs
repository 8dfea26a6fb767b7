use crate::entities::*;
use crate::record::find_by_raw_id;
use chrono::{DateTime, Utc};
use sea_orm::*;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i32,
    title: String,
    description: String,
    completed_at: Option<DateTime<Utc>>,
    goal_id: Option<i32>,
}

impl Task {
    pub fn new(
        id: i32,
        title: String,
        description: String,
        completed_at: Option<DateTime<Utc>>,
        goal_id: Option<i32>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            completed_at,
            goal_id,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns when the task was completed, if it is complete.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns the ID of the goal this task belongs to, if any.
    pub fn goal_id(&self) -> Option<i32> {
        self.goal_id
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.task_id,
            model.title,
            model.description,
            model.completed_at,
            model.goal_id,
        )
    }
}

/// Ordering applied when listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// By title, smallest first.
    Ascending,
    /// By title, largest first.
    Descending,
}

impl SortOrder {
    /// Reads a sort order from its query-string form (`asc` or `desc`).
    /// Any other value means no explicit ordering.
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Ascending),
            "desc" => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// The task does not exist or its identifier is malformed.
    #[error("Task {0} not found")]
    TaskNotFound(String),
    /// A new task referenced a goal that does not exist.
    #[error("Goal {0} does not exist")]
    UnknownGoal(i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService {
        TaskService { db }
    }

    /// Creates a new, incomplete task.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the task.
    /// * `description` - What the task involves.
    /// * `goal_id` - The goal the task belongs to, if any. The goal must exist.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(
        &self,
        title: String,
        description: String,
        goal_id: Option<i32>,
    ) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        if let Some(goal_id) = goal_id {
            // Held until commit so the goal cannot disappear before the insert.
            let goal_exists = goal::Entity::find_by_id(goal_id)
                .lock_shared()
                .one(&txn)
                .await?
                .is_some();
            if !goal_exists {
                return Err(TaskServiceError::UnknownGoal(goal_id));
            }
        }

        let active_model = task::ActiveModel {
            title: ActiveValue::Set(title),
            description: ActiveValue::Set(description),
            completed_at: ActiveValue::Set(None),
            goal_id: ActiveValue::Set(goal_id),
            ..Default::default()
        };
        let created_model = active_model.insert(&txn).await?;
        txn.commit().await?;
        Ok(Task::from(created_model))
    }

    /// Retrieves all tasks.
    ///
    /// Without a sort order tasks come back in creation order. With one they are
    /// ordered by title, ties broken by creation order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(
        &self,
        sort: Option<SortOrder>,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let query = match sort {
            Some(SortOrder::Ascending) => task::Entity::find().order_by_asc(task::Column::Title),
            Some(SortOrder::Descending) => task::Entity::find().order_by_desc(task::Column::Title),
            None => task::Entity::find(),
        };
        let tasks = query
            .order_by_asc(task::Column::TaskId)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: &str) -> Result<Task, TaskServiceError> {
        let model = self.find_task(id).await?;
        Ok(Task::from(model))
    }

    /// Replaces the title and description of a task.
    ///
    /// Completion state and goal membership are left as they are.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_by_id(
        &self,
        id: &str,
        title: String,
        description: String,
    ) -> Result<Task, TaskServiceError> {
        let task_to_update = self.find_task(id).await?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.title = ActiveValue::Set(title);
        active_model.description = ActiveValue::Set(description);
        let updated_model = active_model.update(self.db).await?;

        Ok(Task::from(updated_model))
    }

    /// Deletes a task by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: &str) -> Result<Task, TaskServiceError> {
        let task_to_delete = self.find_task(id).await?;

        let task_copy = Task::from(task_to_delete.clone());
        task_to_delete.delete(self.db).await?;
        Ok(task_copy)
    }

    /// Marks a task as completed now. Completing an already completed task
    /// refreshes its completion time.
    #[tracing::instrument(skip(self))]
    pub async fn mark_complete(&self, id: &str) -> Result<Task, TaskServiceError> {
        self.set_completed_at(id, Some(Utc::now())).await
    }

    /// Marks a task as not completed.
    #[tracing::instrument(skip(self))]
    pub async fn mark_incomplete(&self, id: &str) -> Result<Task, TaskServiceError> {
        self.set_completed_at(id, None).await
    }

    async fn set_completed_at(
        &self,
        id: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Task, TaskServiceError> {
        let task_to_update = self.find_task(id).await?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.completed_at = ActiveValue::Set(completed_at);
        let updated_model = active_model.update(self.db).await?;

        Ok(Task::from(updated_model))
    }

    async fn find_task(&self, id: &str) -> Result<task::Model, TaskServiceError> {
        find_by_raw_id::<task::Entity, _>(self.db, id)
            .await?
            .ok_or_else(|| TaskServiceError::TaskNotFound(id.to_string()))
    }
}
