pub mod dit;
pub mod engine;
pub mod entry;
pub mod extract;
pub mod io;
pub mod matched;
pub mod matcher;
pub mod pot;
pub mod report;
pub mod stats;

pub mod prelude {
    pub use crate::engine::{Mode, Options};
    pub use crate::entry::{AccountEntry, AccountFilter, CrackedEntry};
}
