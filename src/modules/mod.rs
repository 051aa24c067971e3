pub mod contests;
pub mod handlers;
pub mod migration;
pub mod scheduler;
pub mod solutions;
