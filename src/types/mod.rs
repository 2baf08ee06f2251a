mod chat;
mod notify;
mod report;

pub use chat::*;
pub use notify::*;
pub use report::*;
