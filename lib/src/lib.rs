// lib/src/lib.rs

pub mod auth;
pub mod config;
pub mod directory;
pub mod dispensary;
pub mod hospital;
pub mod ledger;
pub mod queue;
pub mod reports;
pub mod snapshot;

pub use auth::{has_permission, is_admin, permissions_for, role_has_permission, route_allowed};
pub use auth::AuthService;
pub use config::{HospitalConfig, WorkingHours};
pub use directory::PatientDirectory;
pub use dispensary::Dispensary;
pub use hospital::Hospital;
pub use ledger::{Bill, BillLine, PaymentLedger};
pub use queue::{Announcer, QueueCoordinator, SilentAnnouncer};
pub use reports::ReportsService;
pub use snapshot::StateSnapshot;

pub use models::errors::{HospitalError, HospitalResult};
