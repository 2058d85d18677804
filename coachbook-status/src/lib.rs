pub mod resolver;
pub mod synchronizer;

pub use resolver::{describe, is_terminal, resolve};
pub use synchronizer::{
    propose, synchronize, Proposal, StatusChange, StatusPair, SyncOptions, SyncOutcome,
};
