//! reqwest adapter speaking the survey service's REST shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::service::{AnswerOutcome, SurveyService};
use crate::step::model::{AnswerValue, IntakeStep};
use crate::summary::SurveyResult;

/// HTTP client for the survey service.
pub struct HttpSurveyService {
    client: reqwest::Client,
    base: String,
}

#[derive(Deserialize)]
struct CreatedSession {
    session_id: String,
}

#[derive(Serialize)]
struct AnswerBody<'a> {
    step_id: &'a str,
    answer: &'a AnswerValue,
}

impl HttpSurveyService {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// Surface a non-success status as a reason string before decoding.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(format!("HTTP {status}"))
    }
}

#[async_trait]
impl SurveyService for HttpSurveyService {
    async fn create_session(&self) -> Result<String, ServiceError> {
        let err = |reason: String| ServiceError::SessionCreate { reason };
        let response = self
            .client
            .post(self.url("/sessions"))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| err(e.to_string()))?;
        let response = check_status(response).map_err(err)?;
        let created: CreatedSession = response.json().await.map_err(|e| err(e.to_string()))?;
        Ok(created.session_id)
    }

    async fn get_current_step(&self, session_id: &str) -> Result<IntakeStep, ServiceError> {
        let err = |reason: String| ServiceError::StepLoad { reason };
        let response = self
            .client
            .get(self.url(&format!("/sessions/{session_id}/step")))
            .send()
            .await
            .map_err(|e| err(e.to_string()))?;
        let response = check_status(response).map_err(err)?;
        response.json().await.map_err(|e| err(e.to_string()))
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        step_id: &str,
        answer: &AnswerValue,
    ) -> Result<AnswerOutcome, ServiceError> {
        let err = |reason: String| ServiceError::AnswerSubmit { reason };
        let response = self
            .client
            .post(self.url(&format!("/sessions/{session_id}/answer")))
            .json(&AnswerBody { step_id, answer })
            .send()
            .await
            .map_err(|e| err(e.to_string()))?;
        let response = check_status(response).map_err(err)?;
        response.json().await.map_err(|e| err(e.to_string()))
    }

    async fn compute_result(&self, session_id: &str) -> Result<SurveyResult, ServiceError> {
        let err = |reason: String| ServiceError::Compute { reason };
        let response = self
            .client
            .post(self.url(&format!("/sessions/{session_id}/calculate-with-agents")))
            .send()
            .await
            .map_err(|e| err(e.to_string()))?;
        let response = check_status(response).map_err(err)?;
        response.json().await.map_err(|e| err(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service = HttpSurveyService::new("http://localhost:8000/api/");
        assert_eq!(
            service.url("/sessions/s1/step"),
            "http://localhost:8000/api/sessions/s1/step"
        );
    }

    #[test]
    fn answer_body_matches_wire_shape() {
        let answer = AnswerValue::Choice("owned".into());
        let body = AnswerBody { step_id: "step_03_housing", answer: &answer };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"step_id": "step_03_housing", "answer": "owned"})
        );
    }
}
