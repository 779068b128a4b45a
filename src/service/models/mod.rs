mod documents;
mod session;

pub use documents::{
    ErrorResponse, ProgressDocument, ResultDocument, ScheduleRow, StartResponse,
};
pub use session::{SessionSnapshot, SessionStatus};
