use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = TenantId::new();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_ids_are_time_ordered() {
    let first = JournalId::new();
    let second = JournalId::new();
    assert!(first <= second);
    assert_eq!(first.into_inner().get_version_num(), 7);
}

#[test]
fn test_typed_id_uuid_conversions() {
    let uuid = Uuid::new_v4();
    let id = AccountId::from(uuid);
    assert_eq!(id, AccountId::from_uuid(uuid));
    assert_eq!(Uuid::from(id), uuid);
}

#[test]
fn test_typed_id_display_and_parse() {
    let uuid = Uuid::new_v4();
    let id = PeriodId::from_uuid(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
    assert_eq!(PeriodId::from_str(&uuid.to_string()).unwrap(), id);
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(TenantId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&JournalLineId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));

    let back: JournalLineId = serde_json::from_str(&json).unwrap();
    assert_eq!(back.into_inner(), uuid);
}
