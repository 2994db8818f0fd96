//! OS services the overlay engine queries.

mod foreground;

pub use foreground::{ForegroundProcessResolver, SystemResolver};
