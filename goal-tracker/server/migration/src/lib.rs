pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_goal_table;
mod m20250901_000002_create_task_table;
mod m20250903_000003_add_task_title_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_goal_table::Migration),
            Box::new(m20250901_000002_create_task_table::Migration),
            Box::new(m20250903_000003_add_task_title_index::Migration),
        ]
    }
}
