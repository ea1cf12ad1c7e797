//! # warden-types: Request context model
//!
//! The read-only snapshot that every Warden evaluation runs against. A
//! caller (session service, device inventory, network sensors, risk
//! assessment) assembles one [`Context`] per request and hands it to the
//! engine; nothing in this crate performs I/O or keeps state.
//!
//! Every section of the context, and every attribute inside a section, is
//! optional. Missing data is not an error: conditions that reference it
//! do not match, and the trust score skips the adjustment it would feed.
//!
//! ## Examples
//!
//! ```
//! use warden_types::{Context, DataClassification, DeviceContext, UserContext};
//!
//! let context = Context::new()
//!     .with_user(UserContext::new("u-1", "admin").with_mfa_enabled(true))
//!     .with_device(DeviceContext::new("laptop-7", "laptop", "macos").managed(true));
//!
//! assert_eq!(context.user.as_ref().and_then(|u| u.role.as_deref()), Some("admin"));
//! assert_eq!(DataClassification::Restricted.as_str(), "restricted");
//! ```

pub mod context;

pub use context::{
    ApplicationContext, Context, DataClassification, DeviceContext, NetworkContext,
    RequestContext, SessionContext, UserContext,
};
