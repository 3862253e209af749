pub mod advisor;
pub mod analysis;
pub mod completion;
pub mod keywords;
pub mod logs;

pub use advisor::AdvisorService;
pub use completion::CompletionClient;
pub use keywords::KeywordGate;
pub use logs::LogService;
