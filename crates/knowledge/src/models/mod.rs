//! Domain models persisted by the store

pub mod agent;
pub mod message;
pub mod proposal;

pub use agent::{Agent, AgentTier};
pub use message::Message;
pub use proposal::{
    Comment, GovernanceLogEntry, LogAction, Proposal, ProposalKind, ProposalPayload,
    ProposalStatus, Vote, VoteAction,
};
