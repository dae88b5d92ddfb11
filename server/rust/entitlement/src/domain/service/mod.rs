pub mod authorization;
pub mod dev_access_gate;
pub mod entitlement_gate;
pub mod session_signer;

pub use authorization::{AuthorizationOutcome, AuthorizationService};
pub use dev_access_gate::{DevAccessError, DevAccessGate, DevAccessSettings, UnlockOutcome};
pub use entitlement_gate::EntitlementGate;
pub use session_signer::SessionSigner;
