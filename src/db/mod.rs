//! User storage.
//!
//! The authentication core consumes users only through the [`UserLookup`]
//! trait; [`InMemoryUserStore`] is the bundled adapter. Plug in a real
//! database by implementing [`UserLookup`] (and [`UserStore`] if the
//! registration endpoint is used).

pub mod memory;
pub mod traits;

pub use memory::InMemoryUserStore;
pub use traits::{UserLookup, UserStore};
