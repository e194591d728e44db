//! Glyphnet Governance
//!
//! The proposal lifecycle: weighted endorsement and rejection, vote
//! windows, amendment chains, and the single promotion path that installs
//! accepted proposals into the live vocabulary.

pub mod engine;
pub mod error;

pub use engine::{Governance, ProposalSummary, VoteStatus};
pub use error::{GovernanceError, Result};
