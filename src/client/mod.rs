//! Programmatic counterpart of the single-page app.
//!
//! [`ApiClient`] speaks to the REST API with a cookie-backed session,
//! [`ClientSession`] holds the signed-in user the way the browser store does,
//! and [`ListingForm`] carries the create/update listing form state, its
//! client-side checks and the image upload step.

pub mod api;
pub mod form;
pub mod session;

pub use api::{ApiClient, ClientError};
pub use form::{FieldChange, FormError, InputKind, ListingForm};
pub use session::ClientSession;
