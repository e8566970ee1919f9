//! Serde roundtrip and JsonSchema validation tests for entity types.

use chrono::Utc;
use lead_core::entities::*;
use lead_core::enums::*;
use lead_core::identity::AuthIdentity;
use schemars::schema_for;

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn source() -> Record {
    [("Name", "Ada Lovelace"), ("Company", "Analytical")]
        .into_iter()
        .collect()
}

fn cached_row() -> Row {
    Row {
        id: "0".into(),
        name: "Ada Lovelace".into(),
        company: "Analytical".into(),
        email: Some("ada@analytical.io".into()),
        linkedin_url: None,
        status: RowStatus::Completed,
        error: None,
        result: Some(ModeResult::Enrich(EnrichResult {
            email: Some("ada@analytical.io".into()),
        })),
        cache: Some(CacheProvenance {
            cached_at: Utc::now(),
            cached_via: Some(InputKind::Bulk),
            globally_synced: true,
        }),
        source: source(),
    }
}

roundtrip_and_validate!(row_roundtrip, Row, cached_row());

roundtrip_and_validate!(
    failed_row_roundtrip,
    Row,
    Row {
        status: RowStatus::Failed,
        error: Some("API Error: 500 upstream".into()),
        result: None,
        cache: None,
        ..cached_row()
    }
);

roundtrip_and_validate!(
    verify_result_roundtrip,
    ModeResult,
    ModeResult::Verify(VerifyResult {
        verdict: Some("valid".into()),
        raw: Some(serde_json::json!({"status": "valid", "score": 97})),
    })
);

roundtrip_and_validate!(
    linkedin_result_roundtrip,
    ModeResult,
    ModeResult::Linkedin(LinkedinResult {
        url: Some("https://www.linkedin.com/in/ada".into()),
    })
);

roundtrip_and_validate!(
    row_update_roundtrip,
    RowUpdate,
    RowUpdate::status(RowStatus::NotFound).with_error("No email found")
);

roundtrip_and_validate!(
    mapping_roundtrip,
    ColumnMapping,
    ColumnMapping::new(Some("Name"), Some("Company"), Some("Email"))
);

roundtrip_and_validate!(
    bulk_history_roundtrip,
    HistoryEntry,
    HistoryEntry {
        id: "bulk-1767225600000-k2j4h5g6f".into(),
        kind: InputKind::Bulk,
        mode: Mode::Enrich,
        input: "leads.csv".into(),
        result: "1 Records processed".into(),
        status: RowStatus::Completed,
        timestamp: Utc::now(),
        snapshot: Snapshot::Full(vec![cached_row()]),
        headers: vec!["Name".into(), "Company".into()],
        mapping: Some(ColumnMapping::new(Some("Name"), Some("Company"), None)),
        has_cached: true,
        cached_at: Some(Utc::now()),
        cached_via: Some(InputKind::Bulk),
        synced: false,
    }
);

roundtrip_and_validate!(
    minimal_history_roundtrip,
    HistoryEntry,
    HistoryEntry {
        id: "his-0a1b2c3d".into(),
        kind: InputKind::Single,
        mode: Mode::Verify,
        input: "a@b.com".into(),
        result: "deliverable".into(),
        status: RowStatus::Deliverable,
        timestamp: Utc::now(),
        snapshot: Snapshot::Minimal(MinimalStub {
            user_id: "user-1".into(),
            has_cached: false,
            cached_at: None,
            cached_type: None,
            synced: true,
        }),
        headers: vec![],
        mapping: None,
        has_cached: false,
        cached_at: None,
        cached_via: None,
        synced: true,
    }
);

roundtrip_and_validate!(
    identity_roundtrip,
    AuthIdentity,
    AuthIdentity {
        user_id: "2b7c6f1e-0000-4000-8000-000000000001".into(),
        email: Some("ops@example.com".into()),
    }
);

#[test]
fn mapping_replays_row_assignment() {
    let mapping = ColumnMapping::new(Some("Name"), Some("Company"), None);
    let json = serde_json::to_string(&mapping).unwrap();
    let restored: ColumnMapping = serde_json::from_str(&json).unwrap();
    let row = cached_row();
    assert_eq!(
        restored.apply(Mode::Enrich, &row.source),
        mapping.apply(Mode::Enrich, &row.source)
    );
    assert_eq!(restored.apply(Mode::Enrich, &row.source).name, row.name);
}
