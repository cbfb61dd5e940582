//! End-to-end tests against a running service.

#![cfg(unix)]

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_get_config_follows_document_order() {
    let service = common::start_service("exit 0\n", "exit 0\n").await;

    let res = client().get(service.url("/config")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let body = res.text().await.unwrap();
    assert_eq!(
        body,
        concat!(
            r#"{"base_path":"/opt/egs","precheck":true,"kubeslice_precheck":true,"#,
            r#""global_image_pull_secret":{"repository":"https://index.docker.io/v1/","username":""},"#,
            r#""controller":{"skip_installation":false,"namespace":"kubeslice-controller","release":"egs-controller"},"#,
            r#""workers":[{"name":"worker-1","skip_installation":false}],"retries":3}"#
        )
    );
}

#[tokio::test]
async fn test_post_config_updates_document() {
    let service = common::start_service("exit 0\n", "exit 0\n").await;

    let res = client()
        .post(service.url("/config"))
        .json(&json!({
            "precheck": false,
            "controller.namespace": "egs-controller-ns",
            "enable_custom_apps": true,
            "retries": 5.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"message": "Config updated successfully"}));

    let text = service.document_text();
    assert!(text.contains("precheck: false\n"), "{}", text);
    assert!(text.contains("  namespace: egs-controller-ns\n"), "{}", text);
    assert!(text.contains("retries: 5\n"), "{}", text);
    assert!(text.ends_with("enable_custom_apps: true\n"), "{}", text);

    let res = client().get(service.url("/config")).send().await.unwrap();
    let value: Value = res.json().await.unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec![
            "base_path",
            "precheck",
            "kubeslice_precheck",
            "global_image_pull_secret",
            "controller",
            "workers",
            "retries",
            "enable_custom_apps"
        ]
    );
}

#[tokio::test]
async fn test_non_object_update_is_rejected() {
    let service = common::start_service("exit 0\n", "exit 0\n").await;
    let before = service.document_text();

    let res = client()
        .post(service.url("/config"))
        .json(&json!(["precheck", false]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("JSON object"));

    let res = client()
        .post(service.url("/config"))
        .body("precheck=false")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(service.document_text(), before);
}

#[tokio::test]
async fn test_install_streams_every_line_then_exit_code() {
    let service = common::start_service("echo A\necho B\necho C\nexit 2\n", "exit 0\n").await;

    let res = client().post(service.url("/install")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/event-stream");
    assert_eq!(res.headers()["cache-control"], "no-cache");

    let body = res.text().await.unwrap();
    assert_eq!(
        body,
        "data: A\n\ndata: B\n\ndata: C\n\ndata: \nProcess finished with exit code 2\n"
    );
}

#[tokio::test]
async fn test_uninstall_receives_document_path() {
    let service = common::start_service("exit 0\n", "echo \"$1 $2\"\n").await;

    let res = client().post(service.url("/uninstall")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.text().await.unwrap();
    let expected = format!(
        "data: --input-yaml {}\n\ndata: \nProcess finished with exit code 0\n",
        service.document.display()
    );
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_missing_script_is_launch_error() {
    let service = common::start_service_with("exit 0\n", "exit 0\n", |config| {
        config.actions.launcher.clear();
        config.actions.install_script = "/nonexistent/egs-installer.sh".into();
    })
    .await;

    let res = client().post(service.url("/install")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("failed to launch /nonexistent/egs-installer.sh"));
}

#[tokio::test]
async fn test_config_readable_while_install_streams() {
    let dir = tempfile::tempdir().unwrap();
    let gate = dir.path().join("gate");
    let script = format!(
        "echo started\nwhile [ ! -f '{}' ]; do sleep 0.05; done\necho finished\n",
        gate.display()
    );
    let service = common::start_service(&script, "exit 0\n").await;
    let client = client();

    let res = client.post(service.url("/install")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let mut chunks = res.bytes_stream();
    let mut received = String::new();
    common::read_until(&mut chunks, &mut received, "data: started\n\n").await;
    assert!(!received.contains("Process finished"));

    let res = tokio::time::timeout(
        Duration::from_secs(5),
        client.get(service.url("/config")).send(),
    )
    .await
    .expect("GET /config blocked by running install")
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let value: Value = res.json().await.unwrap();
    assert_eq!(value["precheck"], json!(true));

    std::fs::write(&gate, "").unwrap();
    common::read_until(&mut chunks, &mut received, "exit code 0\n").await;
    assert_eq!(
        received,
        "data: started\n\ndata: finished\n\ndata: \nProcess finished with exit code 0\n"
    );
}

fn process_exists(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

async fn wait_until_gone(pid: u32) -> bool {
    for _ in 0..100 {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Start `/install`, read the pid from its first frame, then drop the response.
async fn install_then_disconnect(service: &common::TestService) -> u32 {
    let res = client().post(service.url("/install")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let mut chunks = res.bytes_stream();
    let mut received = String::new();
    common::read_until(&mut chunks, &mut received, "\n\n").await;

    let first = received.split("\n\n").next().unwrap();
    let pid: u32 = first.strip_prefix("data: ").unwrap().parse().unwrap();
    assert!(process_exists(pid));
    drop(chunks);
    pid
}

#[tokio::test]
async fn test_dropped_install_stream_kills_process() {
    let script = "echo $$\nwhile true; do echo tick; sleep 0.05; done\n";
    let service = common::start_service_with(script, "exit 0\n", |config| {
        config.actions.kill_on_disconnect = true;
    })
    .await;

    let pid = install_then_disconnect(&service).await;
    assert!(wait_until_gone(pid).await, "install {} still running", pid);

    let res = client().get(service.url("/config")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_dropped_install_stream_is_reaped() {
    let script = "echo $$\ni=0\nwhile [ $i -lt 10 ]; do echo tick; sleep 0.05; i=$((i+1)); done\n";
    let service = common::start_service(script, "exit 0\n").await;

    let pid = install_then_disconnect(&service).await;
    assert!(wait_until_gone(pid).await, "install {} was not reaped", pid);
}
