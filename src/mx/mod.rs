//! DNS MX resolution.
//!
//! [`resolve_mx`] queries any [`LookupMx`] implementation and returns a
//! [`MxStatus`]; [`check_mx`] does the same through the system resolver.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{LookupMx, SystemResolver, check_mx, resolve_mx};
pub use types::{MxRecord, MxStatus};
