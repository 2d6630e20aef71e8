#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use gripline_gateway::{app_state::AppState, config, ops};

fn state(listen: &str) -> gripline_core::Result<AppState> {
    let cfg = config::load_from_str(&format!("version: 1\ngateway:\n  listen: \"{listen}\"\n"))?;
    AppState::new(cfg)
}

#[tokio::test]
async fn readiness_follows_draining() {
    let st = state("127.0.0.1:0").unwrap();
    assert_eq!(ops::healthz().await.into_response().status(), StatusCode::OK);
    assert_eq!(ops::readyz(State(st.clone())).await.into_response().status(), StatusCode::OK);

    st.set_draining();
    assert_eq!(
        ops::readyz(State(st.clone())).await.into_response().status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert!(st.metrics().render().contains("gripline_draining 1"));
}

#[tokio::test]
async fn metrics_endpoint_is_prometheus_text() {
    let st = state("127.0.0.1:0").unwrap();
    st.metrics().routes.inc(&[("decision", "proxied")]);
    let resp = ops::metrics(State(st)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/plain"));
}

#[test]
fn bad_listen_address_rejected() {
    let err = state("not-an-addr").err().expect("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}
