//! Application services - Orchestration of domain logic

pub mod authorisation_service;
pub mod credentials_service;
pub mod modification_service;
pub mod notification_service;
pub mod three_ds_service;

pub use authorisation_service::AuthorisationService;
pub use credentials_service::CredentialsService;
pub use modification_service::ModificationService;
pub use notification_service::{NotificationOrigin, NotificationService};
pub use three_ds_service::ThreeDsService;
