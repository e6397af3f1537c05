pub mod types;
pub use types::{build_flow_definition, build_flow_definition_auto, InMemoryFlowRepository};
pub use types::{FlowDefinition, FlowFailure, FlowInstance, FlowRepository, FlowTerminalState, StepSlot};
