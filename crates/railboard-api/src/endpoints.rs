//! Typed wrappers over the API's v2 endpoint paths.
//!
//! Single-record endpoints decode straight into the core model types.
//! List endpoints go through [`fetch_all_pages`], which absorbs both the
//! bare-array and wrapped-object response shapes. The status/priority/user
//! lookup endpoints are not paginated but share the same shape tolerance.

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{decode_items, fetch_all_pages, PagePayload};
use crate::telemetry::FetchTelemetry;
use railboard_core::{AttachmentMeta, Plan, Project, Run, Test, TestResult};
use serde_json::Value;
use std::collections::HashMap;

fn decode_one<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("malformed {what} record: {e}")))
}

pub async fn get_project(client: &dyn ApiClient, project_id: u64) -> ApiResult<Project> {
    let value = client.get(&format!("get_project/{project_id}")).await?;
    decode_one(value, "project")
}

pub async fn get_run(client: &dyn ApiClient, run_id: u64) -> ApiResult<Run> {
    let value = client.get(&format!("get_run/{run_id}")).await?;
    decode_one(value, "run")
}

pub async fn get_plan(client: &dyn ApiClient, plan_id: u64) -> ApiResult<Plan> {
    let value = client.get(&format!("get_plan/{plan_id}")).await?;
    decode_one(value, "plan")
}

/// Full test list for a run, across all pages.
pub async fn get_tests(
    client: &dyn ApiClient,
    run_id: u64,
    page_size: usize,
    telemetry: &mut FetchTelemetry,
) -> ApiResult<Vec<Test>> {
    let items = fetch_all_pages(
        client,
        &format!("get_tests/{run_id}"),
        "tests",
        page_size,
        telemetry,
    )
    .await?;
    Ok(decode_items(items, "test"))
}

/// Full result list for a run, across all pages.
pub async fn get_results_for_run(
    client: &dyn ApiClient,
    run_id: u64,
    page_size: usize,
    telemetry: &mut FetchTelemetry,
) -> ApiResult<Vec<TestResult>> {
    let items = fetch_all_pages(
        client,
        &format!("get_results_for_run/{run_id}"),
        "results",
        page_size,
        telemetry,
    )
    .await?;
    Ok(decode_items(items, "result"))
}

/// Attachment metadata for one test, across all pages.
pub async fn get_attachments_for_test(
    client: &dyn ApiClient,
    test_id: u64,
    page_size: usize,
    telemetry: &mut FetchTelemetry,
) -> ApiResult<Vec<AttachmentMeta>> {
    let items = fetch_all_pages(
        client,
        &format!("get_attachments_for_test/{test_id}"),
        "attachments",
        page_size,
        telemetry,
    )
    .await?;
    Ok(decode_items(items, "attachment"))
}

/// Download endpoint for an attachment payload.
pub fn attachment_endpoint(attachment_id: u64) -> String {
    format!("get_attachment/{attachment_id}")
}

/// Status id to display label. The `label` field is the display name;
/// `name` is the system name kept as a fallback.
pub async fn get_statuses(client: &dyn ApiClient) -> ApiResult<HashMap<i64, String>> {
    let value = client.get("get_statuses").await?;
    let items = PagePayload::decode(value, "statuses")?.into_items();
    let mut labels = HashMap::with_capacity(items.len());
    for item in items {
        let Some(id) = item.get("id").and_then(Value::as_i64) else {
            continue;
        };
        let label = item
            .get("label")
            .or_else(|| item.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !label.is_empty() {
            labels.insert(id, label.to_string());
        }
    }
    Ok(labels)
}

/// Priority id to display name.
pub async fn get_priorities(client: &dyn ApiClient) -> ApiResult<HashMap<u64, String>> {
    let value = client.get("get_priorities").await?;
    let items = PagePayload::decode(value, "priorities")?.into_items();
    let mut labels = HashMap::with_capacity(items.len());
    for item in items {
        let Some(id) = item.get("id").and_then(Value::as_u64) else {
            continue;
        };
        let label = item
            .get("name")
            .or_else(|| item.get("short_name"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !label.is_empty() {
            labels.insert(id, label.to_string());
        }
    }
    Ok(labels)
}

/// Bulk user listing; raises on 403 so the caller can degrade.
pub async fn get_users(client: &dyn ApiClient) -> ApiResult<Vec<(u64, String)>> {
    let value = client.get("get_users").await?;
    let items = PagePayload::decode(value, "users")?.into_items();
    Ok(items.into_iter().filter_map(user_entry).collect())
}

/// Single-user lookup; raises on 403 so the caller can disable lookups.
pub async fn get_user(client: &dyn ApiClient, user_id: u64) -> ApiResult<(u64, String)> {
    let value = client.get(&format!("get_user/{user_id}")).await?;
    user_entry(value).ok_or_else(|| ApiError::Decode("malformed user record".to_string()))
}

fn user_entry(value: Value) -> Option<(u64, String)> {
    let id = value.get("id").and_then(Value::as_u64)?;
    let name = value
        .get("name")
        .or_else(|| value.get("email"))
        .and_then(Value::as_str)?;
    Some((id, name.to_string()))
}
