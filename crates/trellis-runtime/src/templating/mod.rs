#![forbid(unsafe_code)]

//! Template controllers.
//!
//! Controllers consume the view-swap coordinator to translate bound value
//! changes into view swaps queued on the owning [`ChangeSet`]. The only
//! built-in controllers are the conditional pair [`If`] and [`Else`].
//!
//! [`ChangeSet`]: crate::changeset::ChangeSet

pub mod if_else;

pub use if_else::{Else, If};
