pub mod grade;
pub mod ids;
pub mod layout;
pub mod renderer;
pub mod repo;
pub mod service;
pub mod verify;

pub use grade::Grade;
pub use service::{IssuanceService, IssueError, IssueRequest};
pub use verify::VerificationOutcome;
