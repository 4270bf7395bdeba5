//! Advisory schema check integration tests.

use polystore_core::{
    Diagnostic, DiagnosticFeed, EntityMetadata, MetadataMap, PersistenceUnit, SchemaCheck,
    SchemaDelegate, SchemaError, SchemaManagerRegistry, TypeInfo,
};
use polystore_testkit::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn mismatch_warns_without_failing() {
    init_test_logging();
    let ty = photographer();
    let manager = Arc::new(StaticSchemaManager::answering(false));
    let sink = Arc::new(RecordingSink::new());
    let delegate = schema_delegate(&[&*ty], "piccandra", manager.clone()).with_sink(sink.clone());
    let validator = fresh_validator().with_schema_delegate(delegate);

    validator.validate(&*ty).unwrap();
    let check = validator.validate_entity(&*ty);

    assert_eq!(
        check,
        SchemaCheck::Mismatch {
            persistence_unit: PersistenceUnit::new("piccandra")
        }
    );
    assert_eq!(manager.calls(), 1);
    assert_eq!(sink.warnings().len(), 1);
    assert!(validator.is_validated(&*ty), "registry membership unaffected");
    validator.validate(&*ty).unwrap();
}

#[test]
fn mismatch_before_validation_does_not_register() {
    let ty = photographer();
    let manager = Arc::new(StaticSchemaManager::answering(false));
    let validator =
        fresh_validator().with_schema_delegate(schema_delegate(&[&*ty], "picmysql", manager));

    assert!(validator.validate_entity(&*ty).is_mismatch());
    assert!(!validator.is_validated(&*ty));
}

#[test]
fn matching_schema_is_quiet() {
    let ty = album();
    let sink = Arc::new(RecordingSink::new());
    let delegate = schema_delegate(&[&*ty], "picongo", Arc::new(StaticSchemaManager::answering(true)))
        .with_sink(sink.clone());

    assert!(delegate.check_schema(&*ty).is_ok());
    assert!(sink.events().is_empty());
}

#[test]
fn types_without_metadata_are_skipped() {
    let bound = photographer();
    let unbound = album();
    let manager = Arc::new(StaticSchemaManager::answering(false));
    let delegate = schema_delegate(&[&*bound], "piccandra", manager.clone());

    assert_eq!(delegate.check_schema(&*unbound), SchemaCheck::Skipped);
    assert_eq!(manager.calls(), 0);
}

#[test]
fn backend_failure_is_downgraded() {
    let ty = photographer();
    let sink = Arc::new(RecordingSink::new());
    let manager = Arc::new(StaticSchemaManager::new(Err(SchemaError::backend(
        "keyspace Pickr unreachable",
    ))));
    let delegate = schema_delegate(&[&*ty], "piccandra", manager).with_sink(sink.clone());

    match delegate.check_schema(&*ty) {
        SchemaCheck::Unavailable { reason, .. } => assert!(reason.contains("Pickr")),
        other => panic!("expected unavailable, got {other:?}"),
    }
    assert!(matches!(
        sink.warnings()[0],
        Diagnostic::SchemaUnavailable { .. }
    ));
}

#[test]
fn units_route_to_their_own_manager() {
    let photographer = photographer();
    let album = album();

    let metadata = MetadataMap::new();
    metadata.bind(photographer.key().clone(), EntityMetadata::new(PICKR_UNITS[0]));
    metadata.bind(album.key().clone(), EntityMetadata::new(PICKR_UNITS[2]));

    let cassandra = Arc::new(StaticSchemaManager::answering(true));
    let mongo = Arc::new(StaticSchemaManager::answering(false));
    let managers = SchemaManagerRegistry::new();
    managers.register(PICKR_UNITS[0], cassandra.clone());
    managers.register(PICKR_UNITS[2], mongo.clone());

    let feed = Arc::new(DiagnosticFeed::new());
    let rx = feed.subscribe();
    let delegate = SchemaDelegate::new(Arc::new(metadata), Arc::new(managers)).with_sink(feed);

    assert!(delegate.check_schema(&*photographer).is_ok());
    assert!(delegate.check_schema(&*album).is_mismatch());
    assert_eq!(cassandra.calls(), 1);
    assert_eq!(mongo.calls(), 1);

    let event = rx.recv_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(event.type_name(), "pickr::Album");
}
