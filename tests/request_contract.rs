//! Integration tests for the request envelope and its derived constructors

mod common;

use common::data;
use logical_backend::{
    renew_request, revoke_request, rollback_request, Field, InmemStorage, Operation, Request,
    Secret,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;

#[test]
fn test_renew_request_for_aws_role() {
    let secret = Secret::new(Duration::from_secs(3600)).renewable(true);
    let req = renew_request("aws/creds/role1", &secret, data(json!({"ttl": "1h"})));

    assert_eq!(req.operation, Operation::Renew);
    assert_eq!(req.path, "aws/creds/role1");
    assert!(std::ptr::eq(req.secret.unwrap(), &secret));
    assert_eq!(req.get_string("ttl"), "1h");
    assert!(req.storage.is_none());
}

#[test]
fn test_revoke_request_without_data() {
    let secret = Secret::new(Duration::from_secs(60)).with_lease_id("lease-1");
    let req = revoke_request("db/creds/app", &secret, None);

    assert_eq!(req.operation, Operation::Revoke);
    assert_eq!(req.path, "db/creds/app");
    assert!(req.data.is_none());
    assert!(req.has_no_data());
    assert_eq!(req.secret().unwrap().lease_id, "lease-1");
}

#[test]
fn test_rollback_request_shape() {
    let req = rollback_request("secret/");
    assert_eq!(req.operation, Operation::Rollback);
    assert_eq!(req.path, "secret/");
    assert!(req.data.is_none());
    assert!(req.secret.is_none());
    assert!(req.storage.is_none());
}

#[test]
fn test_default_request_lookups() {
    let req = Request::default();
    assert_eq!(req.get("anything"), None);
    assert_eq!(req.get_string("anything"), "");
    assert!(req.lookup_string("anything").is_absent());
    assert!(req.has_no_data());
}

#[test]
fn test_lookup_distinguishes_missing_from_mistyped() {
    let req = Request::new(Operation::Write, "foo")
        .with_data(data(json!({"name": "web", "count": 3, "gone": null})));

    assert_eq!(req.lookup_string("name"), Field::Present("web"));
    assert_eq!(req.lookup_string("count"), Field::Mismatch(&json!(3)));
    assert!(req.lookup_string("gone").is_absent());
    assert!(req.lookup_string("missing").is_absent());

    assert_eq!(req.get_string("count"), "");
    assert_eq!(req.decode::<u32>("count").unwrap(), Some(3));
    assert!(req.decode::<u32>("name").unwrap_err().is_invalid_request());
}

#[test]
fn test_storage_is_borrowed_not_owned() {
    let storage = InmemStorage::new();
    let req = Request::new(Operation::List, "").with_storage(&storage);
    assert!(req.storage().is_ok());
    assert!(Request::default().storage().unwrap_err().is_invalid_request());
}

proptest! {
    #[test]
    fn prop_no_data_means_every_lookup_is_absent(key in ".*") {
        let req = Request::new(Operation::Read, "foo");
        prop_assert!(req.get(&key).is_none());
        prop_assert_eq!(req.get_string(&key), "");
    }

    #[test]
    fn prop_text_values_come_back_unchanged(key in "[a-z_]{1,16}", value in ".*") {
        let mut fields = logical_backend::Data::new();
        fields.insert(key.clone(), Value::String(value.clone()));
        let req = Request::new(Operation::Write, "foo").with_data(fields);

        prop_assert_eq!(req.get_string(&key), value.as_str());
    }

    #[test]
    fn prop_non_text_values_read_as_empty(key in "[a-z_]{1,16}", n in any::<i64>(), flag in any::<bool>()) {
        for value in [json!(n), json!(flag), json!([n]), json!({"n": n})] {
            let mut fields = logical_backend::Data::new();
            fields.insert(key.clone(), value);
            let req = Request::new(Operation::Write, "foo").with_data(fields);

            prop_assert_eq!(req.get_string(&key), "");
            prop_assert!(req.lookup_string(&key).is_mismatch());
        }
    }

    #[test]
    fn prop_lifecycle_constructors_keep_their_inputs(path in "[a-z0-9/]{0,32}", lease in 0u64..100_000) {
        let secret = Secret::new(Duration::from_secs(lease));

        let renew = renew_request(path.clone(), &secret, None);
        prop_assert_eq!(renew.operation, Operation::Renew);
        prop_assert_eq!(&renew.path, &path);
        prop_assert!(std::ptr::eq(renew.secret.unwrap(), &secret));

        let revoke = revoke_request(path.clone(), &secret, None);
        prop_assert_eq!(revoke.operation, Operation::Revoke);
        prop_assert_eq!(&revoke.path, &path);
        prop_assert!(std::ptr::eq(revoke.secret.unwrap(), &secret));

        let rollback = rollback_request(path.clone());
        prop_assert_eq!(rollback.operation, Operation::Rollback);
        prop_assert!(rollback.secret.is_none());
    }

    #[test]
    fn prop_operation_text_round_trips(idx in 0usize..Operation::ALL.len()) {
        let op = Operation::ALL[idx];
        prop_assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
    }
}
