//! `SeaORM` entity definitions.

pub mod activity_logs;
pub mod documents;
pub mod orders;
pub mod payments;
pub mod revisions;
pub mod sea_orm_active_enums;
pub mod service_packages;
pub mod users;
