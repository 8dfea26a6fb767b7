use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Task {
    Table,
    TaskId,
    Title,
    Description,
    CompletedAt,
    GoalId,
}

#[derive(DeriveIden)]
enum Goal {
    Table,
    GoalId,
}

const FK_TASK_TO_GOAL: &str = "fk-task-goal_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(pk_auto(Task::TaskId))
                    .col(string(Task::Title))
                    .col(text(Task::Description))
                    .col(timestamp_with_time_zone_null(Task::CompletedAt))
                    .col(integer_null(Task::GoalId))
                    // Deleting a goal orphans its tasks rather than removing them.
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASK_TO_GOAL)
                            .from(Task::Table, Task::GoalId)
                            .to(Goal::Table, Goal::GoalId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Task::Table).to_owned())
            .await
    }
}
