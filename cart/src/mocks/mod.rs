//! In-memory provider doubles for tests and local development.

mod fees;
mod orders;
mod session;

pub use fees::MockDeliveryFeeProvider;
pub use orders::MockOrderSubmissionService;
pub use session::MockSessionStore;
