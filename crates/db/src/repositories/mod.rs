//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod activity_log;
pub mod document;
pub mod order;
pub mod payment;
pub mod revision;
pub mod service_package;
pub mod user;

pub use activity_log::ActivityLogRepository;
pub use document::{CreateDocumentInput, DocumentError, DocumentRepository};
pub use order::{
    AdminOrder, ClientOrder, DocumentWithUploader, OrderDetail, OrderError, OrderRepository,
};
pub use payment::{PaymentError, PaymentOverview, PaymentRepository, UpdatePaymentInput};
pub use revision::{RevisionError, RevisionRepository, UpdateRevisionInput};
pub use service_package::{
    CreateServicePackageInput, ServicePackageError, ServicePackageRepository,
    UpdateServicePackageInput,
};
pub use user::{UpdateUserInput, UserError, UserRepository};
