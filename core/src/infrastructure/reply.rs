// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! HTTP Reply Backend Adapter
//!
//! Anti-Corruption Layer for the external reply-generation service. The
//! backend classifies uploaded notices, records the requested reply length
//! and returns the generated reply text. Its JSON is loosely typed (booleans
//! arrive as the strings `"true"`/`"false"`, replies are sometimes bare JSON
//! strings), so all translation to domain types happens here.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::domain::activity::UserId;
use crate::domain::reply::{Classification, ReplyError, ReplyGenerator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpReplyGenerator {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(rename = "isSummon", deserialize_with = "bool_or_string")]
    is_summon: bool,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    questions: Vec<String>,
}

#[derive(Serialize)]
struct PageCountRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "numOfPages")]
    num_of_pages: u32,
}

#[derive(Serialize)]
struct SummonReplyRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "selectedReason")]
    selected_reason: &'a str,
    #[serde(rename = "extraText")]
    extra_text: &'a str,
}

#[derive(Serialize)]
struct QnaReplyRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    questions: &'a str,
    answers: &'a str,
}

/// Accepts `true`, `false`, `"true"` and `"false"`.
fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"true\" or \"false\", got {:?}",
                other
            ))),
        },
    }
}

impl HttpReplyGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ReplyError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ReplyError::Backend(format!("HTTP {}: {}", status, error_text)));
        }
        Ok(response)
    }
}

#[async_trait]
impl ReplyGenerator for HttpReplyGenerator {
    async fn classify(
        &self,
        user: &UserId,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<Classification, ReplyError> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ReplyError::Serialization(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("userId", user.as_str().to_string());

        let response = self
            .client
            .post(self.endpoint("/api/uploadPdf"))
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ReplyError::Serialization(e.to_string()))?;

        Ok(Classification {
            is_summon: parsed.is_summon,
            reasons: parsed.reasons,
            questions: parsed.questions,
        })
    }

    async fn submit_page_count(&self, user: &UserId, pages: u32) -> Result<(), ReplyError> {
        let response = self
            .client
            .post(self.endpoint("/api/fetchNumPages"))
            .json(&PageCountRequest {
                user_id: user.as_str(),
                num_of_pages: pages,
            })
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn generate_summon_reply(
        &self,
        user: &UserId,
        reason: &str,
        extra: &str,
    ) -> Result<String, ReplyError> {
        let response = self
            .client
            .post(self.endpoint("/api/getSummonNoticeReply"))
            .json(&SummonReplyRequest {
                user_id: user.as_str(),
                selected_reason: reason,
                extra_text: extra,
            })
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        reply_text(response).await
    }

    async fn generate_qna_reply(
        &self,
        user: &UserId,
        questions: &str,
        answers: &str,
    ) -> Result<String, ReplyError> {
        let response = self
            .client
            .post(self.endpoint("/api/getQnaNoticeReply"))
            .json(&QnaReplyRequest {
                user_id: user.as_str(),
                questions,
                answers,
            })
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        reply_text(response).await
    }
}

// The backend returns either a bare JSON string or an object; either way
// the reply is the whole payload.
async fn reply_text(response: reqwest::Response) -> Result<String, ReplyError> {
    let value: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ReplyError::Serialization(e.to_string()))?;
    Ok(match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    })
}

pub use mock::MockReplyGenerator;

mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Scripted backend for unit tests. Records every call so tests can
    /// assert which endpoints were reached.
    pub struct MockReplyGenerator {
        pub is_summon: bool,
        pub reasons: Vec<String>,
        pub questions: Vec<String>,
        pub reply_text: String,
        pub fail_classify: bool,
        pub classify_calls: Mutex<Vec<String>>,
        pub page_counts: Mutex<Vec<u32>>,
        pub summon_calls: Mutex<Vec<(String, String)>>,
        pub qna_calls: Mutex<Vec<(String, String)>>,
    }

    impl MockReplyGenerator {
        pub fn summon(reasons: Vec<String>) -> Self {
            Self {
                is_summon: true,
                reasons,
                questions: vec![],
                reply_text: "Generated reply".to_string(),
                fail_classify: false,
                classify_calls: Mutex::new(vec![]),
                page_counts: Mutex::new(vec![]),
                summon_calls: Mutex::new(vec![]),
                qna_calls: Mutex::new(vec![]),
            }
        }

        pub fn qna(questions: Vec<String>) -> Self {
            Self {
                is_summon: false,
                questions,
                ..Self::summon(vec![])
            }
        }

        pub fn failing() -> Self {
            Self {
                fail_classify: true,
                ..Self::summon(vec![])
            }
        }
    }

    #[async_trait]
    impl ReplyGenerator for MockReplyGenerator {
        async fn classify(
            &self,
            _user: &UserId,
            file_name: &str,
            _bytes: Bytes,
        ) -> Result<Classification, ReplyError> {
            if self.fail_classify {
                return Err(ReplyError::Backend("classification unavailable".into()));
            }
            self.classify_calls.lock().unwrap().push(file_name.to_string());
            Ok(Classification {
                is_summon: self.is_summon,
                reasons: self.reasons.clone(),
                questions: self.questions.clone(),
            })
        }

        async fn submit_page_count(&self, _user: &UserId, pages: u32) -> Result<(), ReplyError> {
            self.page_counts.lock().unwrap().push(pages);
            Ok(())
        }

        async fn generate_summon_reply(
            &self,
            _user: &UserId,
            reason: &str,
            extra: &str,
        ) -> Result<String, ReplyError> {
            self.summon_calls
                .lock()
                .unwrap()
                .push((reason.to_string(), extra.to_string()));
            Ok(self.reply_text.clone())
        }

        async fn generate_qna_reply(
            &self,
            _user: &UserId,
            questions: &str,
            answers: &str,
        ) -> Result<String, ReplyError> {
            self.qna_calls
                .lock()
                .unwrap()
                .push((questions.to_string(), answers.to_string()));
            Ok(self.reply_text.clone())
        }
    }
}
