//! Dashboard client models

pub mod dashboard;
pub mod entities;
pub mod report;
pub mod ui;
pub mod user;

// Re-export for convenience
pub use dashboard::{Alert, AlertKind, DashboardData, Kpis};
pub use entities::{
    Certificate, CertificateStatus, Equipment, EquipmentStatus, EquipmentType, FuelInvoice,
    Project, ProjectStatus, Qs, QsItem, QsStatus, QsType,
};
pub use report::{ExportFormat, ExportRequest, ReportData, ReportFilter};
pub use ui::{Language, Theme};
pub use user::{User, UserRole};
