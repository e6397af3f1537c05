use pipeline_core::repo::{build_flow_definition, InMemoryFlowRepository};
use pipeline_core::{EventStore, FlowEngine, FlowEventKind, FlowRepository, FlowTerminalState, InMemoryEventStore};
use uuid::Uuid;

#[test]
fn integration_smoke_inmemory_store_and_engine() {
    let mut store = InMemoryEventStore::default();
    let flow_id = Uuid::new_v4();

    let ev = store.append_kind(flow_id,
                               FlowEventKind::FlowInitialized { definition_hash: "h1".to_string(),
                                                                step_count: 1 });
    assert_eq!(ev.seq, 0);

    let engine: FlowEngine<_, _> = FlowEngine::new_with_stores(store, InMemoryFlowRepository::new());
    let events = engine.event_store().list(flow_id);
    assert!(events.iter().any(|e| matches!(e.kind, FlowEventKind::FlowInitialized { .. })),
            "FlowInitialized missing");
}

#[test]
fn replay_reports_failed_step() {
    let mut store = InMemoryEventStore::default();
    let flow_id = Uuid::new_v4();
    let def = build_flow_definition(&[], vec![]);
    store.append_kind(flow_id,
                      FlowEventKind::FlowInitialized { definition_hash: def.definition_hash.clone(),
                                                       step_count: 0 });
    store.append_kind(flow_id,
                      FlowEventKind::StepFailed { step_index: 0,
                                                  step_id: "prepare".into(),
                                                  error: pipeline_core::CoreEngineError::ShapeMismatch("3 != 2".into()),
                                                  fingerprint: "fp".into() });

    let instance = InMemoryFlowRepository::new().load(flow_id, &store.list(flow_id), &def);
    match instance.terminal_state() {
        FlowTerminalState::Failed { step_id, error } => {
            assert_eq!(step_id, "prepare");
            assert_eq!(error.code(), "ShapeMismatch");
        }
        other => panic!("unexpected state {other:?}"),
    }
}
