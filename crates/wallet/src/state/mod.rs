pub mod cache;
pub mod log;
pub mod notify;
pub mod pending;
pub mod visibility;

pub use cache::{CacheKey, QueryCache, QueryKind};
pub use log::{LogVariant, OperationLog, OperationLogEntry};
pub use notify::Notifier;
pub use pending::{PendingBalancePoller, PendingBalanceTracker};
