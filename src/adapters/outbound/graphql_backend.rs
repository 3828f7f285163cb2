// Queue backend over the remote GraphQL API.
//
// Purpose
// - Issue the three read queries the display needs and map their payloads to core types.
//
// Boundaries
// - Read only. Mutations (ticket creation, serving, admin CRUD) belong to other surfaces.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::core::display::ad_rotation::AdAsset;
use crate::core::display::department::{Department, DepartmentId};
use crate::core::display::queue_entry::{PriorityClass, QueueEntry, QueueStatus};
use crate::core::ports::{BackendError, QueueBackend};

const GET_DEPARTMENTS: &str = r#"
query GetDepartments {
  departments {
    departmentId
    departmentName
    prefix
  }
}"#;

const GET_QUEUES_BY_DEPARTMENT: &str = r#"
query GetQueuesByDepartment($departmentId: Int!) {
  QueueByDepartment(departmentId: $departmentId) {
    id
    number
    status
    priority
    createdAt
    department {
      prefix
    }
    counter {
      counterName
    }
  }
}"#;

const GET_ADS: &str = r#"
query GetAds {
  ads {
    id
    filename
    filepath
    mimetype
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorDto>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorDto {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DepartmentsData {
    #[serde(default)]
    departments: Option<Vec<DepartmentDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepartmentDto {
    department_id: Value,
    department_name: Option<String>,
    prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueuesData {
    #[serde(rename = "QueueByDepartment", default)]
    queue_by_department: Option<Vec<QueueDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueueDto {
    #[serde(default, alias = "queueId")]
    id: Option<Value>,
    #[serde(default)]
    number: Value,
    status: Option<String>,
    priority: Option<String>,
    #[serde(default)]
    created_at: Value,
    department: Option<DepartmentRefDto>,
    counter: Option<CounterRefDto>,
}

#[derive(Debug, Deserialize)]
struct DepartmentRefDto {
    prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CounterRefDto {
    counter_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdsData {
    #[serde(default)]
    ads: Option<Vec<AdDto>>,
}

#[derive(Debug, Deserialize)]
struct AdDto {
    id: Value,
    filename: Option<String>,
    filepath: Option<String>,
    mimetype: Option<String>,
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts RFC 3339 strings and epoch milliseconds, as a number or a numeric string.
pub fn parse_created_at(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| s.trim().parse::<i64>().ok().and_then(millis_to_utc)),
        Value::Number(n) => n.as_i64().and_then(millis_to_utc),
        _ => None,
    }
}

fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

impl DepartmentDto {
    fn into_department(self) -> Option<Department> {
        Some(Department {
            id: value_i64(&self.department_id)?,
            name: self.department_name.unwrap_or_default(),
            prefix: self.prefix.unwrap_or_default(),
        })
    }
}

impl QueueDto {
    fn into_entry(self) -> Result<QueueEntry, String> {
        let number = value_i64(&self.number)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid ticket number {}", self.number))?;
        let created_at = parse_created_at(&self.created_at)
            .ok_or_else(|| format!("invalid createdAt {}", self.created_at))?;
        Ok(QueueEntry {
            id: self
                .id
                .as_ref()
                .and_then(value_text)
                .unwrap_or_default(),
            number,
            department_prefix: self.department.and_then(|d| d.prefix),
            status: QueueStatus::parse(self.status.as_deref().unwrap_or_default()),
            priority: PriorityClass::parse(self.priority.as_deref().unwrap_or_default()),
            counter_name: self.counter.and_then(|c| c.counter_name),
            created_at,
        })
    }
}

impl AdDto {
    fn into_ad(self) -> Option<AdAsset> {
        Some(AdAsset {
            id: value_text(&self.id)?,
            filename: self.filename.unwrap_or_default(),
            filepath: self.filepath.unwrap_or_default(),
            mimetype: self.mimetype.unwrap_or_default(),
        })
    }
}

pub struct GraphQlBackend {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl GraphQlBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, BackendError> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "operationName": operation_name,
            "query": query,
            "variables": variables,
        }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(BackendError::GraphQl(messages.join("; ")));
        }
        debug!(operation_name, "graphql query succeeded");
        body.data
            .ok_or_else(|| BackendError::Decode(format!("{operation_name}: response has no data")))
    }
}

#[async_trait]
impl QueueBackend for GraphQlBackend {
    async fn departments(&self) -> Result<Vec<Department>, BackendError> {
        let data: DepartmentsData = self
            .execute("GetDepartments", GET_DEPARTMENTS, json!({}))
            .await?;
        Ok(data
            .departments
            .unwrap_or_default()
            .into_iter()
            .filter_map(|dto| {
                let department_id = dto.department_id.clone();
                let department = dto.into_department();
                if department.is_none() {
                    warn!(%department_id, "skipping department with an invalid id");
                }
                department
            })
            .collect())
    }

    async fn queues_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<QueueEntry>, BackendError> {
        let data: QueuesData = self
            .execute(
                "GetQueuesByDepartment",
                GET_QUEUES_BY_DEPARTMENT,
                json!({ "departmentId": department_id }),
            )
            .await?;
        Ok(data
            .queue_by_department
            .unwrap_or_default()
            .into_iter()
            .filter_map(|dto| match dto.into_entry() {
                Ok(entry) => Some(entry),
                Err(reason) => {
                    warn!(department_id, %reason, "skipping malformed queue entry");
                    None
                }
            })
            .collect())
    }

    async fn ads(&self) -> Result<Vec<AdAsset>, BackendError> {
        let data: AdsData = self.execute("GetAds", GET_ADS, json!({})).await?;
        Ok(data
            .ads
            .unwrap_or_default()
            .into_iter()
            .filter_map(AdDto::into_ad)
            .collect())
    }
}

#[cfg(test)]
mod graphql_backend_tests {
    use super::*;
    use rstest::rstest;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend_for(server: &MockServer, token: Option<&str>) -> GraphQlBackend {
        GraphQlBackend::new(
            format!("{}/graphql", server.uri()),
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    async fn respond(server: &MockServer, operation: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "operationName": operation })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_map_departments() {
        let server = MockServer::start().await;
        respond(
            &server,
            "GetDepartments",
            json!({ "data": { "departments": [
                { "departmentId": 1, "departmentName": "Business Permits and Licensing", "prefix": "BPL" },
                { "departmentId": "2", "departmentName": "Civil Registry Office", "prefix": null },
                { "departmentId": "x", "departmentName": "Broken", "prefix": "BRK" }
            ] } }),
        )
        .await;

        let departments = backend_for(&server, None).await.departments().await.unwrap();
        assert_eq!(
            departments,
            vec![
                Department {
                    id: 1,
                    name: "Business Permits and Licensing".into(),
                    prefix: "BPL".into()
                },
                Department {
                    id: 2,
                    name: "Civil Registry Office".into(),
                    prefix: String::new()
                },
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_map_a_queue_snapshot_and_skip_malformed_entries() {
        let server = MockServer::start().await;
        respond(
            &server,
            "GetQueuesByDepartment",
            json!({ "data": { "QueueByDepartment": [
                {
                    "id": 10, "number": 4, "status": "SERVING", "priority": "Regular",
                    "createdAt": "2026-03-01T08:00:00Z",
                    "department": { "prefix": "BPL" }, "counter": { "counterName": "Counter 1" }
                },
                {
                    "queueId": "11", "number": "5", "status": "waiting", "priority": "PWD",
                    "createdAt": 1772352000000i64, "department": null, "counter": null
                },
                { "queueId": 12, "number": 6, "status": "WAITING", "priority": "Regular", "createdAt": "yesterday" }
            ] } }),
        )
        .await;

        let entries = backend_for(&server, None)
            .await
            .queues_by_department(1)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "10");
        assert_eq!(entries[0].status, QueueStatus::Serving);
        assert_eq!(entries[0].counter_name.as_deref(), Some("Counter 1"));
        assert_eq!(entries[0].department_prefix.as_deref(), Some("BPL"));
        assert_eq!(entries[1].number, 5);
        assert_eq!(entries[1].priority, PriorityClass::Priority);
        assert_eq!(entries[1].created_at.timestamp_millis(), 1_772_352_000_000);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_skip_rows_missing_a_ticket_number_or_timestamp() {
        let server = MockServer::start().await;
        respond(
            &server,
            "GetQueuesByDepartment",
            json!({ "data": { "QueueByDepartment": [
                { "id": 20, "number": 8, "status": "WAITING", "priority": "Regular", "createdAt": "2026-03-01T08:00:00Z" },
                { "id": 21, "status": "WAITING", "priority": "Regular", "createdAt": "2026-03-01T08:01:00Z" },
                { "id": 22, "number": 9, "status": "WAITING", "priority": "Regular" }
            ] } }),
        )
        .await;

        let entries = backend_for(&server, None)
            .await
            .queues_by_department(1)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "20");
        assert_eq!(entries[0].number, 8);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_send_the_department_id_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({ "variables": { "departmentId": 7 } })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "QueueByDepartment": [] } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let entries = backend_for(&server, Some("secret"))
            .await
            .queues_by_department(7)
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_surface_graphql_errors() {
        let server = MockServer::start().await;
        respond(
            &server,
            "GetAds",
            json!({ "data": null, "errors": [{ "message": "Unauthorized" }] }),
        )
        .await;
        let error = backend_for(&server, None).await.ads().await.unwrap_err();
        assert!(matches!(error, BackendError::GraphQl(ref m) if m == "Unauthorized"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_surface_http_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let error = backend_for(&server, None).await.departments().await.unwrap_err();
        assert!(matches!(error, BackendError::Status(502)));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_map_ads_with_numeric_ids() {
        let server = MockServer::start().await;
        respond(
            &server,
            "GetAds",
            json!({ "data": { "ads": [
                { "id": 3, "filename": "fiesta.png", "filepath": "/uploads/fiesta.png", "mimetype": "image/png" }
            ] } }),
        )
        .await;
        let ads = backend_for(&server, None).await.ads().await.unwrap();
        assert_eq!(ads[0].id, "3");
        assert_eq!(ads[0].filepath, "/uploads/fiesta.png");
    }

    #[rstest]
    #[case(json!("2026-03-01T08:00:00+08:00"), Some(1_772_323_200_000))]
    #[case(json!(1_772_323_200_000i64), Some(1_772_323_200_000))]
    #[case(json!("1772323200000"), Some(1_772_323_200_000))]
    #[case(json!(null), None)]
    fn it_should_parse_created_at_formats(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(parse_created_at(&value).map(|t| t.timestamp_millis()), expected);
    }
}
