//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_vehicles;
mod m20250301_000003_create_bookings;
mod m20250301_000004_create_sales_transactions;
mod m20250301_000005_create_reviews;
mod m20250301_000006_create_conversations;
mod m20250301_000007_create_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_vehicles::Migration),
            Box::new(m20250301_000003_create_bookings::Migration),
            Box::new(m20250301_000004_create_sales_transactions::Migration),
            Box::new(m20250301_000005_create_reviews::Migration),
            Box::new(m20250301_000006_create_conversations::Migration),
            Box::new(m20250301_000007_create_messages::Migration),
        ]
    }
}
