use search_dashboard::model::PageSize;
use search_dashboard::{Dashboard, DashboardHandle, DashboardSnapshot, HttpBackend};
use std::sync::Arc;
use std::time::Duration;
use stub_backend::{router, StubStore};
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// A stub backend served on an ephemeral local port
pub struct TestEnv {
    pub base_url: String,
    server: JoinHandle<()>,
}

impl TestEnv {
    /// Serve the sample dataset
    pub async fn start() -> Self {
        Self::with_store(stub_backend::sample_store()).await
    }

    pub async fn with_store(store: StubStore) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let app = router(Arc::new(store));

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let env = Self {
            base_url: format!("http://{}", addr),
            server,
        };
        env.wait_for_service(10).await.expect("stub backend not ready");
        env
    }

    /// Wait for the health endpoint to answer
    pub async fn wait_for_service(&self, timeout_secs: u64) -> Result<(), String> {
        let client = reqwest::Client::new();
        let url = format!("{}/health", self.base_url);
        let start = std::time::Instant::now();

        loop {
            if start.elapsed().as_secs() > timeout_secs {
                return Err(format!("Timeout waiting for service: {}", url));
            }

            match client.get(&url).send().await {
                Ok(_) => return Ok(()),
                Err(_) => sleep(Duration::from_millis(50)).await,
            }
        }
    }

    pub fn backend(&self) -> HttpBackend {
        HttpBackend::new(self.base_url.clone())
    }

    /// Dashboard wired to this backend
    pub fn dashboard(&self) -> (DashboardHandle, JoinHandle<()>) {
        let backend = Arc::new(self.backend());
        Dashboard::spawn(backend.clone(), backend, PageSize::Ten)
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Wait for a snapshot matching `predicate`, failing the test after 10s
pub async fn wait_until(
    handle: &DashboardHandle,
    predicate: impl FnMut(&DashboardSnapshot) -> bool,
) -> DashboardSnapshot {
    tokio::time::timeout(Duration::from_secs(10), handle.wait_for(predicate))
        .await
        .expect("timed out waiting for dashboard")
        .expect("dashboard closed")
}

/// Values of `field` across the result rows
pub fn column_values(snapshot: &DashboardSnapshot, field: &str) -> Vec<String> {
    snapshot
        .view
        .rows
        .iter()
        .map(|row| match row.get(field) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        })
        .collect()
}
