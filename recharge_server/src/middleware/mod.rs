mod acl;
mod identity;
mod stripe_sig;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use identity::{IdentityMiddlewareFactory, IdentityMiddlewareService, IdentitySource};
pub use stripe_sig::{StripeSignatureMiddlewareFactory, StripeSignatureMiddlewareService};
