mod scheduler;
pub use scheduler::{CycleDecision, ReportSchedule, ReportScheduler};

mod compose;
pub use compose::{compose_body, render_peer_name, subject_line};
