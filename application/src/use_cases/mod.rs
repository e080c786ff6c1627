//! Use cases
//!
//! - [`model_router`]: capability-based model and provider selection
//! - [`conversation`]: thread lifecycle, serialized appends, expiry sweep
//! - [`dispatch`]: the request lifecycle tying everything together

pub mod conversation;
pub mod dispatch;
pub mod model_router;
