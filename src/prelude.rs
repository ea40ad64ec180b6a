//! Convenient imports for pledge.
//!
//! ```ignore
//! use pledge::prelude::*;
//!
//! let p: Pledge<u32, String> = Pledge::fulfilled(1);
//! let q = p.then(|v| Ok(v + 1));
//! ```

// Entry points
pub use crate::builder::PledgeBuilder;
pub use pledge_cell::{all, race, Pledge, Resolver};

// Error handling
pub use pledge_core::{Error, Result};

// Settlement types
pub use pledge_core::{Outcome, Resolution, State, Thenable};
