// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end polling against a mock API server.

use std::time::Duration;

use sensibo_lib::protocol::HttpConfig;
use sensibo_lib::{Client, EventSource, PollState};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTERVAL: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

fn success(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": "success", "result": result }))
}

fn state(on: bool, swing: &str) -> ResponseTemplate {
    success(json!([{
        "acState": {
            "on": on,
            "mode": "cool",
            "swing": swing,
            "targetTemperature": 22,
            "temperatureUnit": "C"
        }
    }]))
}

async fn server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me/pods"))
        .respond_with(success(json!([
            { "id": "abc123", "room": { "name": "Office" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pods/abc123"))
        .and(query_param("fields", "remoteCapabilities"))
        .respond_with(success(json!({
            "remoteCapabilities": {
                "modes": {
                    "cool": {
                        "swing": ["stopped", "rangeFull"],
                        "temperatures": { "C": { "isNative": true, "values": [20, 21, 22] } }
                    }
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pods/abc123/measurements"))
        .respond_with(success(json!([{ "temperature": 23.0, "humidity": 40.0 }])))
        .mount(&server)
        .await;

    // Baseline read, then the pod is switched on and starts swinging.
    Mock::given(method("GET"))
        .and(path("/pods/abc123/acStates"))
        .respond_with(state(false, "stopped"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pods/abc123/acStates"))
        .respond_with(state(true, "rangeFull"))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn changes_reach_bound_callbacks() {
    let server = server().await;
    let client =
        Client::with_config(HttpConfig::new("test-key").with_base_url(server.uri())).unwrap();
    let pod = client.device("Office").await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let power_tx = tx.clone();
    pod.bind("power", move |n| {
        let _ = power_tx.send((n.name().to_string(), n.value().as_bool().map(|b| b.to_string())));
    })
    .unwrap();
    pod.bind_mode("cool", "swing", move |n| {
        assert!(matches!(n.source(), EventSource::Mode { mode, .. } if mode == "cool"));
        let _ = tx.send((n.name().to_string(), n.value().as_str().map(String::from)));
    })
    .unwrap();

    pod.start_polling(INTERVAL).await.unwrap();
    assert!(pod.is_polling());

    let first = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let second = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    // Mode-scoped settings are published before power within a tick.
    assert_eq!(
        first,
        ("Office.cool.swing".to_string(), Some("rangeFull".to_string()))
    );
    assert_eq!(second, ("Office.power".to_string(), Some("true".to_string())));

    // Nothing changes after that.
    tokio::time::sleep(INTERVAL * 4).await;
    assert!(rx.try_recv().is_err());

    pod.stop_polling().await;
    assert!(!pod.is_polling());
    let poll = client.poll_controller().poll_loop(pod.info());
    assert_eq!(poll.state(), PollState::Idle);
}

#[tokio::test]
async fn stop_all_silences_every_pod() {
    let server = server().await;
    let client =
        Client::with_config(HttpConfig::new("test-key").with_base_url(server.uri())).unwrap();

    let pod = client.device("Office").await.unwrap();
    pod.start_polling(INTERVAL).await.unwrap();
    client.stop_all().await;

    assert!(!pod.is_polling());
    assert!(client.poll_controller().polling_pods().is_empty());
}
