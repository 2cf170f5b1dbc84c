// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read/write adapter against the vendor's own SQL Server database
//! (spec §4.I, §6.3). Every call tolerates the vendor DB being
//! unreachable: connect errors degrade to `None`/`false` rather than
//! propagating, so a misconfigured or offline instrument never blocks the
//! scheduler loop.

use async_trait::async_trait;
use robosched_core::RunState;
use std::time::Duration;
use thiserror::Error;
use futures_util::TryStreamExt;
use tiberius::{Client, Config, QueryItem};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;

/// Vendor-DB connect timeout (spec §4.H Timeouts: "vendor-DB connect (5 s)").
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum VendorDbError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Narrow interface against the vendor's own database (spec §4.I).
#[async_trait]
pub trait VendorDbAdapter: Clone + Send + Sync + 'static {
    /// Latest run state for a method, searching an ordered list of name
    /// variants (spec §6.3 candidate-name search).
    async fn get_latest_run_state(&self, method_name: &str, experiment_path: Option<&str>) -> Option<RunState>;

    /// Zero all rows' `ScheduledToRun` then set the target row, in one
    /// transaction (spec §4.I).
    async fn set_exclusive_evoyeast_experiment(&self, experiment_id: &str) -> bool;

    /// Set (or clear) the `ScheduledToRun` flag for the experiment matched
    /// by name, distinct from the id-keyed EvoYeast op above (spec §4.D
    /// pipeline step "ScheduledToRun").
    async fn set_scheduled_to_run(&self, experiment_name: &str, value: bool) -> bool;

    /// Invoke the vendor-provided `ResetHamiltonTables` stored routine
    /// (spec §6.3).
    async fn reset_hamilton_tables(&self, experiment_name: &str, tables: Option<&[String]>) -> bool;
}

/// Candidate name variants searched in order, equality first (spec §4.I).
fn candidate_names(method_name: &str, experiment_path: Option<&str>) -> Vec<String> {
    let mut candidates = vec![method_name.to_string()];
    if let Some(path) = experiment_path {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        candidates.push(file_name.to_string());
        if let Some(stem) = file_name.strip_suffix(".med").or_else(|| file_name.strip_suffix(".hsl")) {
            candidates.push(format!("{stem}.med"));
            candidates.push(format!("{stem}.hsl"));
        }
    }
    candidates.dedup();
    candidates
}

/// Real adapter, connecting fresh per call (spec §4.I: no long-lived
/// session the scheduler loop can get stuck waiting on).
#[derive(Clone)]
pub struct TiberiusVendorDbAdapter {
    config: Config,
}

impl TiberiusVendorDbAdapter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<Client<tokio_util::compat::Compat<TcpStream>>, VendorDbError> {
        let connect = async {
            let tcp = TcpStream::connect(self.config.get_addr()).await.map_err(|e| VendorDbError::Connect(e.to_string()))?;
            tcp.set_nodelay(true).map_err(|e| VendorDbError::Connect(e.to_string()))?;
            Client::connect(self.config.clone(), tcp.compat_write())
                .await
                .map_err(|e| VendorDbError::Connect(e.to_string()))
        };
        tokio::time::timeout(CONNECT_TIMEOUT, connect)
            .await
            .map_err(|_| VendorDbError::Connect("timed out".into()))?
    }
}

#[async_trait]
impl VendorDbAdapter for TiberiusVendorDbAdapter {
    async fn get_latest_run_state(&self, method_name: &str, experiment_path: Option<&str>) -> Option<RunState> {
        let mut client = match self.connect().await {
            Ok(client) => client,
            Err(err) => {
                tracing::debug!(error = %err, "vendor db unreachable for get_latest_run_state");
                return None;
            }
        };

        for (idx, name) in candidate_names(method_name, experiment_path).iter().enumerate() {
            let use_like = idx > 0 && name.len() >= 3;
            let sql = if use_like {
                "SELECT TOP 1 RunState FROM HxRun WHERE MethodName LIKE @P1 ORDER BY StartTime DESC"
            } else {
                "SELECT TOP 1 RunState FROM HxRun WHERE MethodName = @P1 ORDER BY StartTime DESC"
            };
            let param = if use_like { format!("%{name}%") } else { name.clone() };
            let result = client.query(sql, &[&param]).await;
            let Ok(mut stream) = result else { continue };
            while let Ok(Some(item)) = stream.try_next().await {
                if let QueryItem::Row(row) = item {
                    if let Some(code) = row.get::<i32, _>("RunState") {
                        return Some(RunState::from_code(code as i64));
                    }
                }
            }
        }
        None
    }

    async fn set_exclusive_evoyeast_experiment(&self, experiment_id: &str) -> bool {
        let mut client = match self.connect().await {
            Ok(client) => client,
            Err(err) => {
                tracing::debug!(error = %err, "vendor db unreachable for set_exclusive_evoyeast_experiment");
                return false;
            }
        };
        if let Err(err) = client.execute("UPDATE Experiments SET ScheduledToRun = 0", &[]).await {
            tracing::debug!(error = %err, "vendor db write failed for set_exclusive_evoyeast_experiment");
            return false;
        }
        match client
            .execute("UPDATE Experiments SET ScheduledToRun = 1 WHERE ExperimentID = @P1", &[&experiment_id])
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "vendor db write failed for set_exclusive_evoyeast_experiment");
                false
            }
        }
    }

    async fn set_scheduled_to_run(&self, experiment_name: &str, value: bool) -> bool {
        let mut client = match self.connect().await {
            Ok(client) => client,
            Err(err) => {
                tracing::debug!(error = %err, "vendor db unreachable for set_scheduled_to_run");
                return false;
            }
        };
        // Setting the flag zeroes every row first, matching the
        // EvoYeast-exclusive op's "zero all, then set one" contract (spec
        // §4.D); clearing only needs to touch this experiment's own row.
        if value {
            if let Err(err) = client.execute("UPDATE Experiments SET ScheduledToRun = 0", &[]).await {
                tracing::debug!(error = %err, "vendor db write failed for set_scheduled_to_run");
                return false;
            }
        }
        let flag: i32 = if value { 1 } else { 0 };
        match client
            .execute("UPDATE Experiments SET ScheduledToRun = @P1 WHERE ExperimentName = @P2", &[&flag, &experiment_name])
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "vendor db write failed for set_scheduled_to_run");
                false
            }
        }
    }

    async fn reset_hamilton_tables(&self, experiment_name: &str, tables: Option<&[String]>) -> bool {
        let mut client = match self.connect().await {
            Ok(client) => client,
            Err(err) => {
                tracing::debug!(error = %err, "vendor db unreachable for reset_hamilton_tables");
                return false;
            }
        };
        let tables_json = tables.map(|t| serde_json::to_string(t).unwrap_or_default());
        let result = match &tables_json {
            Some(json) => {
                client.execute("EXEC ResetHamiltonTables @ExperimentName = @P1, @TablesJson = @P2", &[&experiment_name, json]).await
            }
            None => client.execute("EXEC ResetHamiltonTables @ExperimentName = @P1", &[&experiment_name]).await,
        };
        match result {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "vendor db call failed for reset_hamilton_tables");
                false
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{VendorDbAdapter, CONNECT_TIMEOUT};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use robosched_core::RunState;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct FakeVendorDbState {
        run_states: HashMap<String, RunState>,
        exclusive_sets: Vec<String>,
        scheduled_to_run_sets: Vec<(String, bool)>,
        reset_calls: Vec<(String, Option<Vec<String>>)>,
        unreachable: bool,
    }

    /// Fake vendor-DB adapter for testing. `CONNECT_TIMEOUT` is re-exported
    /// here only to keep the real and fake adapters' public surfaces easy
    /// to diff; the fake never actually waits on it.
    #[derive(Clone)]
    pub struct FakeVendorDbAdapter {
        inner: Arc<Mutex<FakeVendorDbState>>,
    }

    impl Default for FakeVendorDbAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeVendorDbState {
                    run_states: HashMap::new(),
                    exclusive_sets: Vec::new(),
                    scheduled_to_run_sets: Vec::new(),
                    reset_calls: Vec::new(),
                    unreachable: false,
                })),
            }
        }
    }

    impl FakeVendorDbAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_run_state(&self, method_name: impl Into<String>, state: RunState) {
            self.inner.lock().run_states.insert(method_name.into(), state);
        }

        pub fn set_unreachable(&self, unreachable: bool) {
            self.inner.lock().unreachable = unreachable;
        }

        pub fn exclusive_sets(&self) -> Vec<String> {
            self.inner.lock().exclusive_sets.clone()
        }

        pub fn scheduled_to_run_sets(&self) -> Vec<(String, bool)> {
            self.inner.lock().scheduled_to_run_sets.clone()
        }

        pub fn reset_calls(&self) -> Vec<(String, Option<Vec<String>>)> {
            self.inner.lock().reset_calls.clone()
        }

        pub fn connect_timeout() -> std::time::Duration {
            CONNECT_TIMEOUT
        }
    }

    #[async_trait]
    impl VendorDbAdapter for FakeVendorDbAdapter {
        async fn get_latest_run_state(&self, method_name: &str, _experiment_path: Option<&str>) -> Option<RunState> {
            let state = self.inner.lock();
            if state.unreachable {
                return None;
            }
            state.run_states.get(method_name).copied()
        }

        async fn set_exclusive_evoyeast_experiment(&self, experiment_id: &str) -> bool {
            let mut state = self.inner.lock();
            if state.unreachable {
                return false;
            }
            state.exclusive_sets.push(experiment_id.to_string());
            true
        }

        async fn set_scheduled_to_run(&self, experiment_name: &str, value: bool) -> bool {
            let mut state = self.inner.lock();
            if state.unreachable {
                return false;
            }
            state.scheduled_to_run_sets.push((experiment_name.to_string(), value));
            true
        }

        async fn reset_hamilton_tables(&self, experiment_name: &str, tables: Option<&[String]>) -> bool {
            let mut state = self.inner.lock();
            if state.unreachable {
                return false;
            }
            state.reset_calls.push((experiment_name.to_string(), tables.map(|t| t.to_vec())));
            true
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeVendorDbAdapter;

#[cfg(test)]
#[path = "vendor_db_tests.rs"]
mod tests;
