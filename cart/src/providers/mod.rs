//! Provider traits for external collaborators.
//!
//! The cart core talks to the outside world exclusively through these traits
//! so business rules stay testable against in-memory doubles. Production
//! implementations live in the host application.

mod fees;
mod orders;
mod session;

pub use fees::{DeliveryFeeProvider, FeeError};
pub use orders::{
    LineStatus, OrderConfirmation, OrderId, OrderLine, OrderSubmissionRequest,
    OrderSubmissionService, SubmissionError,
};
pub use session::{SessionStore, SessionToken};
