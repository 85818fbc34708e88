//! Recording provider stub shared by strategy tests

use crate::domain::handle::encode_handle;
use crate::domain::node::{NodeMetadata, NodeStatus};
use crate::domain::ports::{ComputeApi, NodeNormalizer};
use crate::error::{Error, RejectionKind, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubRecord {
    pub region: String,
    pub id: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Describe(String, String),
    Stop {
        region: String,
        id: String,
        preserve_state: bool,
    },
    Start(String, String),
    Resume(String, String),
    Reboot(String, String),
    Terminate(String, String),
}

pub struct StubApi {
    regions: Vec<String>,
    records: Mutex<Vec<StubRecord>>,
    calls: Mutex<Vec<Call>>,
    list_failure: Mutex<Option<Error>>,
    stop_state: String,
    vanish_after_mutation: bool,
}

impl StubApi {
    pub fn new(regions: &[&str]) -> Self {
        Self {
            regions: regions.iter().map(|r| r.to_string()).collect(),
            records: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            list_failure: Mutex::new(None),
            stop_state: "stopped".to_string(),
            vanish_after_mutation: false,
        }
    }

    pub fn with_node(self, region: &str, id: &str, state: &str) -> Self {
        self.records.lock().push(StubRecord {
            region: region.into(),
            id: id.into(),
            state: state.into(),
        });
        self
    }

    /// Next `list_instances` call fails with `err`
    pub fn failing_list(self, err: Error) -> Self {
        *self.list_failure.lock() = Some(err);
        self
    }

    /// State a stopped instance reports right after the call
    pub fn stop_state(mut self, state: &str) -> Self {
        self.stop_state = state.into();
        self
    }

    /// Delete the record as a side effect of any mutating call
    pub fn vanishing(mut self) -> Self {
        self.vanish_after_mutation = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn state_of(&self, region: &str, id: &str) -> Option<String> {
        self.records
            .lock()
            .iter()
            .find(|r| r.region == region && r.id == id)
            .map(|r| r.state.clone())
    }

    fn mutate(&self, operation: &str, region: &str, id: &str, state: Option<&str>) -> Result<()> {
        let mut records = self.records.lock();
        let pos = records
            .iter()
            .position(|r| r.region == region && r.id == id)
            .ok_or_else(|| {
                Error::rejected(
                    "stub",
                    operation,
                    RejectionKind::NotFound,
                    format!("instance {} not found in {}", id, region),
                )
            })?;

        match state {
            Some(state) if !self.vanish_after_mutation => records[pos].state = state.to_string(),
            _ => {
                records.remove(pos);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ComputeApi for StubApi {
    type Record = StubRecord;

    fn provider_id(&self) -> &str {
        "stub"
    }

    fn regions(&self) -> Vec<String> {
        self.regions.clone()
    }

    async fn list_instances(&self, region: &str) -> Result<Vec<StubRecord>> {
        self.calls.lock().push(Call::List(region.into()));
        if let Some(err) = self.list_failure.lock().take() {
            return Err(err);
        }
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.region == region)
            .cloned()
            .collect())
    }

    async fn describe_instance(&self, region: &str, id: &str) -> Result<Option<StubRecord>> {
        self.calls.lock().push(Call::Describe(region.into(), id.into()));
        Ok(self
            .records
            .lock()
            .iter()
            .find(|r| r.region == region && r.id == id)
            .cloned())
    }

    async fn stop_instance(&self, region: &str, id: &str, preserve_state: bool) -> Result<()> {
        self.calls.lock().push(Call::Stop {
            region: region.into(),
            id: id.into(),
            preserve_state,
        });
        let state = self.stop_state.clone();
        self.mutate("stop_instance", region, id, Some(&state))
    }

    async fn start_instance(&self, region: &str, id: &str) -> Result<()> {
        self.calls.lock().push(Call::Start(region.into(), id.into()));
        self.mutate("start_instance", region, id, Some("running"))
    }

    async fn resume_instance(&self, region: &str, id: &str) -> Result<()> {
        self.calls.lock().push(Call::Resume(region.into(), id.into()));
        self.mutate("resume_instance", region, id, Some("running"))
    }

    async fn reboot_instance(&self, region: &str, id: &str) -> Result<()> {
        self.calls.lock().push(Call::Reboot(region.into(), id.into()));
        self.mutate("reboot_instance", region, id, Some("pending"))
    }

    async fn terminate_instance(&self, region: &str, id: &str) -> Result<()> {
        self.calls.lock().push(Call::Terminate(region.into(), id.into()));
        self.mutate("terminate_instance", region, id, None)
    }
}

fn record_to_node(record: &StubRecord) -> NodeMetadata {
    let status = match record.state.as_str() {
        "pending" | "stopping" => NodeStatus::Pending,
        "running" => NodeStatus::Running,
        "stopped" => NodeStatus::Suspended,
        "terminated" => NodeStatus::Terminated,
        _ => NodeStatus::Unrecognized,
    };
    NodeMetadata::new(encode_handle(&record.region, &record.id), "stub", status)
        .with_location(record.region.as_str())
}

pub fn stub_normalizer() -> Arc<dyn NodeNormalizer<StubRecord>> {
    Arc::new(record_to_node)
}
