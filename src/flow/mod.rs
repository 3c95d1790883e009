//! End-to-end conversational flow test
//!
//! Initializes the agent, runs a few chat turns and queries the tool server,
//! checking only the documented shape of each reply. Step failures are
//! diagnostic and never change the readiness verdict.

pub mod schema;
pub mod tester;

pub use tester::{
    ConversationTurn, FLOW_DEPENDENCIES, FlowOutcome, FlowStep, FlowSummary, FlowTester,
    SAMPLE_QUERIES,
};
