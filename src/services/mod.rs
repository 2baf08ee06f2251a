pub mod assistant;
pub mod mailer;
pub mod notifier;
pub mod rate_limiter;
pub mod validation;
