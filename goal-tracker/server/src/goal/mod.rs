use crate::entities::*;
use crate::record::find_by_raw_id;
use crate::task::Task;
use sea_orm::sea_query::Expr;
use sea_orm::*;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Goal {
    id: i32,
    title: String,
}

impl Goal {
    pub fn new(id: i32, title: String) -> Self {
        Self { id, title }
    }

    /// Returns the ID of the goal.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the title of the goal.
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl From<goal::Model> for Goal {
    fn from(model: goal::Model) -> Self {
        Goal::new(model.goal_id, model.title)
    }
}

/// A goal together with every task currently assigned to it.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct GoalTasks {
    pub goal: Goal,
    pub tasks: Vec<Task>,
}

impl GoalTasks {
    /// Returns the IDs of the assigned tasks, in ascending order.
    pub fn task_ids(&self) -> Vec<i32> {
        self.tasks.iter().map(Task::id).collect()
    }
}

/// Error type for GoalService operations.
#[derive(Debug, thiserror::Error)]
pub enum GoalServiceError {
    /// The goal does not exist or its identifier is malformed.
    #[error("Goal {0} not found")]
    GoalNotFound(String),
    /// A task named in an assignment does not exist or its identifier is malformed.
    #[error("Task {0} not found")]
    TaskNotFound(String),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct GoalService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl GoalService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> GoalService {
        GoalService { db }
    }

    /// Creates a new goal.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the goal.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Goal` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_goal(&self, title: String) -> Result<Goal, GoalServiceError> {
        let active_model = goal::ActiveModel {
            title: ActiveValue::Set(title),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Goal::from(created_model))
    }

    /// Retrieves all goals in creation order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_goals(&self) -> Result<Vec<Goal>, GoalServiceError> {
        let goals = goal::Entity::find()
            .order_by_asc(goal::Column::GoalId)
            .all(self.db)
            .await?
            .into_iter()
            .map(Goal::from)
            .collect();
        Ok(goals)
    }

    /// Retrieves a goal by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_goal_by_id(&self, id: &str) -> Result<Goal, GoalServiceError> {
        let model = find_goal(self.db, id).await?;
        Ok(Goal::from(model))
    }

    /// Replaces the title of a goal.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the goal to edit.
    /// * `title` - The new title for the goal.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Goal` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_goal_by_id(&self, id: &str, title: String) -> Result<Goal, GoalServiceError> {
        let goal_to_update = find_goal(self.db, id).await?;

        let mut active_model: goal::ActiveModel = goal_to_update.into();
        active_model.title = ActiveValue::Set(title);
        let updated_model = active_model.update(self.db).await?;

        Ok(Goal::from(updated_model))
    }

    /// Deletes a goal by its ID.
    ///
    /// Tasks assigned to the goal are kept and become unassigned.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Goal` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_goal_by_id(&self, id: &str) -> Result<Goal, GoalServiceError> {
        let txn = self.db.begin().await?;
        let goal_to_delete = find_goal(&txn, id).await?;

        let orphaned = task::Entity::update_many()
            .col_expr(task::Column::GoalId, Expr::value(Option::<i32>::None))
            .filter(task::Column::GoalId.eq(goal_to_delete.goal_id))
            .exec(&txn)
            .await?;
        if orphaned.rows_affected > 0 {
            tracing::info!(
                "Unassigned {} task(s) from goal {}",
                orphaned.rows_affected,
                goal_to_delete.goal_id
            );
        }

        let goal_copy = Goal::from(goal_to_delete.clone());
        goal_to_delete.delete(&txn).await?;
        txn.commit().await?;
        Ok(goal_copy)
    }

    /// Assigns tasks to a goal.
    ///
    /// Either every listed task is assigned or, when any of them cannot be
    /// found, none is.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the goal.
    /// * `task_ids` - The IDs of the tasks to assign, in the order to apply them.
    ///
    /// # Returns
    ///
    /// A `Result` containing the goal with all of its tasks, including ones
    /// assigned earlier, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn assign_tasks(
        &self,
        id: &str,
        task_ids: &[String],
    ) -> Result<GoalTasks, GoalServiceError> {
        let txn = self.db.begin().await?;
        let goal_model = find_goal(&txn, id).await?;

        for task_id in task_ids {
            let task_model = find_by_raw_id::<task::Entity, _>(&txn, task_id)
                .await?
                .ok_or_else(|| GoalServiceError::TaskNotFound(task_id.clone()))?;

            let mut active_model: task::ActiveModel = task_model.into();
            active_model.goal_id = ActiveValue::Set(Some(goal_model.goal_id));
            active_model.update(&txn).await?;
        }

        let tasks = tasks_of_goal(&txn, goal_model.goal_id).await?;
        txn.commit().await?;

        Ok(GoalTasks {
            goal: Goal::from(goal_model),
            tasks,
        })
    }

    /// Retrieves a goal together with the tasks assigned to it.
    #[tracing::instrument(skip(self))]
    pub async fn get_goal_tasks(&self, id: &str) -> Result<GoalTasks, GoalServiceError> {
        let goal_model = find_goal(self.db, id).await?;
        let tasks = tasks_of_goal(self.db, goal_model.goal_id).await?;
        Ok(GoalTasks {
            goal: Goal::from(goal_model),
            tasks,
        })
    }
}

async fn find_goal<C: ConnectionTrait>(conn: &C, id: &str) -> Result<goal::Model, GoalServiceError> {
    find_by_raw_id::<goal::Entity, _>(conn, id)
        .await?
        .ok_or_else(|| GoalServiceError::GoalNotFound(id.to_string()))
}

async fn tasks_of_goal<C: ConnectionTrait>(conn: &C, goal_id: i32) -> Result<Vec<Task>, DbErr> {
    let tasks = task::Entity::find()
        .filter(task::Column::GoalId.eq(goal_id))
        .order_by_asc(task::Column::TaskId)
        .all(conn)
        .await?
        .into_iter()
        .map(Task::from)
        .collect();
    Ok(tasks)
}
