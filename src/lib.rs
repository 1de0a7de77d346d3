//! ModKit: dotted-path attribute access over live game objects.
//!
//! Objects opt in to attribute lookup through [`reflect::Reflect`] (usually via
//! [`reflect_struct!`]); [`access`] then reads and writes them by paths such as
//! `"party.leader.hp"`. Dynamic graphs are plain [`value::Value`] maps.

pub use crate::diagnostics::{print_error, ErrorContext, ErrorType, ModkitError};

pub mod access;
pub mod config;
pub mod diagnostics;
pub mod path;
pub mod reflect;
pub mod value;

pub mod prelude {
    pub use crate::access::{get, get_as, get_ref, set, set_as, PathAccessor, PathExt};
    pub use crate::config::AccessorConfig;
    pub use crate::path::Path;
    pub use crate::reflect::Reflect;
    pub use crate::value::{FromValue, Value};
    pub use crate::ModkitError;
}
