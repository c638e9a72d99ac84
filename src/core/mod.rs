// Core modules implementing folder-location resolution and error modeling.
pub mod error;
pub mod handle;
pub mod labels;
pub mod location;
pub mod lookup;
pub mod resolver;
pub mod session;
