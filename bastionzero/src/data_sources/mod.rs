//! Read-only data sources for every BastionZero object type

pub mod environments;
pub mod groups;
pub mod policies;
pub mod service_accounts;
pub mod targets;
pub mod users;

pub use environments::{EnvironmentSource, EnvironmentsSource};
pub use groups::GroupsSource;
pub use policies::{PoliciesSource, PolicySource};
pub use service_accounts::{ServiceAccountSource, ServiceAccountsSource};
pub use targets::{TargetSource, TargetsSource, VirtualTargetSource, VirtualTargetsSource};
pub use users::{UserSource, UsersSource};
