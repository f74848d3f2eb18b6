use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ApiError, CoreError};

use super::types::ApiRequest;
use super::Transport;

enum Reply {
    Body(Value),
    Status { status: u16, body: Value },
}

/// A mock transport for testing. Records every request and answers from a
/// queue of canned replies, falling back to `{}` when the queue is empty.
pub struct MockTransport {
    requests: Mutex<Vec<ApiRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: VecDeque::new(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests()
            .pop()
            .expect("mock transport received no requests")
    }
}

pub struct MockTransportBuilder {
    replies: VecDeque<Reply>,
}

impl MockTransportBuilder {
    pub fn respond_with(mut self, body: Value) -> Self {
        self.replies.push_back(Reply::Body(body));
        self
    }

    pub fn fail_with(mut self, status: u16, body: Value) -> Self {
        self.replies.push_back(Reply::Status { status, body });
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(self.replies),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, CoreError> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);
        let reply = self.replies.lock().expect("mock lock poisoned").pop_front();
        match reply {
            None => Ok(Value::Object(Default::default())),
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status { status, body }) => Err(ApiError::Status {
                status,
                message: body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("mock failure")
                    .to_owned(),
                body,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn replies_are_served_in_order_then_default() {
        let mock = MockTransport::builder()
            .respond_with(json!({"n": 1}))
            .fail_with(400, json!({"error": "nope"}))
            .build();

        let first = mock.send(ApiRequest::new(Method::GET, "/a")).await.unwrap();
        assert_eq!(first, json!({"n": 1}));

        let second = mock
            .send(ApiRequest::new(Method::GET, "/b"))
            .await
            .expect_err("second reply is a failure");
        assert_eq!(second.status(), Some(400));
        assert_eq!(second.response_body(), Some(&json!({"error": "nope"})));

        let third = mock.send(ApiRequest::new(Method::GET, "/c")).await.unwrap();
        assert_eq!(third, json!({}));

        let paths: Vec<_> = mock.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
    }
}
