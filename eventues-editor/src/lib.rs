pub mod session;
pub mod validation;

pub use session::{EditingSession, SessionError};
pub use validation::{validate_catalog, ValidationErrors, ValidationIssue};
