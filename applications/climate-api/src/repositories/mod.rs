pub mod logs;

pub use logs::LogRepository;
