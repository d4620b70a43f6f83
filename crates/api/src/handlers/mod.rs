pub mod cron;
pub mod logs;
