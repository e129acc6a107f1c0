//! Orchestration pieces shared by the stacking scenarios: signing
//! identities, contract call builders, and the submission harness that
//! threads nonces through a run.
pub mod calls;
pub mod harness;
pub mod signer;
pub mod tx;

pub use calls::*;
pub use harness::*;
pub use signer::*;
pub use tx::*;
