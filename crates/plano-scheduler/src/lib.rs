pub mod clock;
pub mod notify;
pub mod scheduler;

pub use scheduler::Scheduler;
