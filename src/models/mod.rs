pub mod company;
pub mod rate_limit;
pub mod report;

pub use company::Company;
pub use rate_limit::RateLimitRecord;
pub use report::{NewReport, Report, ReportStatus};
