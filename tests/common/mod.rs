//! Shared utilities for integration testing.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use installer_bridge::config::ServiceConfig;
use installer_bridge::http::HttpServer;
use installer_bridge::lifecycle::Shutdown;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const DOCUMENT: &str = "\
base_path: /opt/egs
precheck: true
kubeslice_precheck: true
global_image_pull_secret:
  repository: https://index.docker.io/v1/
  username: ''
controller:
  skip_installation: false
  namespace: kubeslice-controller
  release: egs-controller
workers:
- name: worker-1
  skip_installation: false
retries: 3
";

/// A running service backed by a temp directory.
pub struct TestService {
    pub addr: SocketAddr,
    _dir: TempDir,
    pub document: PathBuf,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn document_text(&self) -> String {
        fs::read_to_string(&self.document).unwrap()
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with the given install/uninstall script bodies.
///
/// Scripts run through `/bin/sh`, so they receive the config flag as `$1`
/// and the document path as `$2`.
pub async fn start_service(install: &str, uninstall: &str) -> TestService {
    start_service_with(install, uninstall, |_| {}).await
}

pub async fn start_service_with<F>(install: &str, uninstall: &str, tweak: F) -> TestService
where
    F: FnOnce(&mut ServiceConfig),
{
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("egs-installer-config.yaml");
    fs::write(&document, DOCUMENT).unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.document.path = document.display().to_string();
    config.actions.launcher = vec!["/bin/sh".into()];
    config.actions.install_script = write_script(dir.path(), "egs-installer.sh", install);
    config.actions.uninstall_script = write_script(dir.path(), "egs-uninstall.sh", uninstall);
    tweak(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestService {
        addr,
        _dir: dir,
        document,
        shutdown,
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path.display().to_string()
}

/// Read from `chunks` into `buf` until it contains `needle`.
#[allow(dead_code)]
pub async fn read_until<S, B>(chunks: &mut S, buf: &mut String, needle: &str)
where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let read = async {
        while !buf.contains(needle) {
            match chunks.next().await {
                Some(chunk) => buf.push_str(&String::from_utf8_lossy(chunk.unwrap().as_ref())),
                None => break,
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), read)
        .await
        .expect("timed out waiting for stream output");
    assert!(buf.contains(needle), "stream ended without {:?}: {:?}", needle, buf);
}
