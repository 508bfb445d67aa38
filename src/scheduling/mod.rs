mod digest;
mod lead;
mod scheduler;

pub use digest::send_daily_digest;
pub use scheduler::ReminderScheduler;
