//! Value laws of `InspectionResult`: defaults, equality, pass-through.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bytes::Bytes;
use serde_json::json;

use gripline_core::{InspectionResult, LastEventIds};

#[test]
fn default_is_do_not_proxy() {
    let r: InspectionResult = InspectionResult::default();
    assert!(!r.should_proxy());
    assert!(r.sharing_key().is_empty());
    assert!(r.session_id().is_empty());
    assert!(r.last_event_ids().is_empty());
    assert!(r.user_data().is_none());
    assert!(!r.is_shareable());
}

#[test]
fn any_sharing_key_allowed_when_proxied() {
    for key in [&b""[..], &b"k1"[..], &[0u8, 255, 7][..]] {
        let r: InspectionResult = InspectionResult::builder()
            .should_proxy(true)
            .sharing_key(Bytes::copy_from_slice(key))
            .build()
            .expect("proxied result must accept any key");
        assert_eq!(&r.sharing_key()[..], key);
        assert_eq!(r.is_shareable(), !key.is_empty());
    }
}

#[test]
fn sharing_key_without_proxy_is_violation() {
    let err = InspectionResult::<()>::builder()
        .should_proxy(false)
        .sharing_key("k1")
        .build()
        .expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONTRACT_VIOLATION");
}

#[test]
fn equality_ignores_cursor_insertion_order() {
    let a: InspectionResult = InspectionResult::builder()
        .should_proxy(true)
        .sharing_key("k1")
        .session_id("s1")
        .last_event_id("chan-a", "1")
        .last_event_id("chan-b", "2")
        .last_event_id("chan-c", "3")
        .user_data(json!({"x": 1}))
        .build()
        .unwrap();

    let ids =
        LastEventIds::try_from_pairs([("chan-c", "3"), ("chan-a", "1"), ("chan-b", "2")]).unwrap();
    let b: InspectionResult = InspectionResult::builder()
        .user_data(json!({"x": 1}))
        .last_event_ids(ids)
        .session_id("s1")
        .sharing_key("k1")
        .should_proxy(true)
        .build()
        .unwrap();

    assert_eq!(a, b);
}

#[test]
fn equality_sees_every_field() {
    let base = || {
        InspectionResult::<u8>::builder()
            .should_proxy(true)
            .sharing_key("k")
            .session_id("s")
            .last_event_id("c", "1")
            .user_data(1)
    };
    let a = base().build().unwrap();
    assert_ne!(a, base().sharing_key("other").build().unwrap());
    assert_ne!(a, base().session_id("other").build().unwrap());
    assert_ne!(a, base().user_data(2).build().unwrap());
    assert_ne!(a, base().last_event_ids(LastEventIds::new()).build().unwrap());
}

#[test]
fn session_and_payload_pass_through() {
    let payloads = [
        None,
        Some(json!(null)),
        Some(json!("")),
        Some(json!({"nested": [1, {"a": true}]})),
    ];
    let sessions: [&[u8]; 3] = [b"", b"sess-1", &[0, 159, 146, 150]];

    for data in &payloads {
        for sid in sessions {
            let mut b = InspectionResult::builder().session_id(Bytes::copy_from_slice(sid));
            if let Some(d) = data {
                b = b.user_data(d.clone());
            }
            let r: InspectionResult = b.build().unwrap();
            assert_eq!(&r.session_id()[..], sid);
            assert_eq!(r.user_data(), data.as_ref());
            assert_eq!(r.clone().into_user_data(), data.clone());
        }
    }
}

#[test]
fn opaque_payload_type_is_generic() {
    #[derive(Debug, Clone, PartialEq)]
    struct Grant {
        scopes: Vec<&'static str>,
    }

    let r = InspectionResult::builder()
        .should_proxy(true)
        .user_data(Grant {
            scopes: vec!["read"],
        })
        .build()
        .unwrap();
    assert_eq!(r.user_data().unwrap().scopes, vec!["read"]);
}
