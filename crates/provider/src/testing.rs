//! In-memory Runscope API used by unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::client::{ApiError, Bucket, RunscopeApi, Team};

#[derive(Default)]
struct Inner {
    buckets: HashMap<String, Bucket>,
    next_keys: VecDeque<String>,
    created: usize,
    create_error: Option<ApiError>,
    read_error: Option<ApiError>,
    delete_error: Option<ApiError>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

pub fn status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        status,
        body: format!("{{\"error\": {{\"status\": {}}}}}", status.as_u16()),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, key: &str, name: &str, team_uuid: &str) -> Self {
        let bucket = Bucket {
            key: key.to_string(),
            name: name.to_string(),
            team: Some(Team {
                id: team_uuid.to_string(),
                name: None,
            }),
        };
        self.inner
            .lock()
            .unwrap()
            .buckets
            .insert(key.to_string(), bucket);
        self
    }

    /// Key handed out by the next create
    pub fn with_next_key(self, key: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .next_keys
            .push_back(key.to_string());
        self
    }

    pub fn fail_next_create(&self, error: ApiError) {
        self.inner.lock().unwrap().create_error = Some(error);
    }

    pub fn fail_next_read(&self, error: ApiError) {
        self.inner.lock().unwrap().read_error = Some(error);
    }

    pub fn fail_next_delete(&self, error: ApiError) {
        self.inner.lock().unwrap().delete_error = Some(error);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().buckets.contains_key(key)
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl RunscopeApi for FakeApi {
    async fn create_bucket(&self, bucket: &Bucket) -> Result<Bucket, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("create:{}:{}", bucket.name, bucket.team_id()));
        if let Some(err) = inner.create_error.take() {
            return Err(err);
        }

        inner.created += 1;
        let next = inner.next_keys.pop_front();
        let key = next.unwrap_or_else(|| format!("bkt-{}", inner.created));

        let created = Bucket {
            key: key.clone(),
            ..bucket.clone()
        };
        inner.buckets.insert(key, created.clone());
        Ok(created)
    }

    async fn read_bucket(&self, key: &str) -> Result<Bucket, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("read:{}", key));
        if let Some(err) = inner.read_error.take() {
            return Err(err);
        }

        inner
            .buckets
            .get(key)
            .cloned()
            .ok_or_else(|| status_error(StatusCode::NOT_FOUND))
    }

    async fn delete_bucket(&self, key: &str) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("delete:{}", key));
        if let Some(err) = inner.delete_error.take() {
            return Err(err);
        }

        inner
            .buckets
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| status_error(StatusCode::NOT_FOUND))
    }
}
