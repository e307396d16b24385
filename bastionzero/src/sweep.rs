//! Sweeper for objects left behind by acceptance tests
//!
//! Policies go first since they reference environments and targets, then
//! virtual targets, then environments.

use futures::future::join_all;

use crate::api::environments::Environment;
use crate::api::policies::{
    JitPolicy, KubernetesPolicy, Policy, ProxyPolicy, SessionRecordingPolicy, TargetConnectPolicy,
};
use crate::api::targets::{DbTarget, VirtualTarget, WebTarget};
use crate::api::{ApiError, Client, MutableResource};

/// Name prefix of every object created by acceptance tests
pub const TEST_PREFIX: &str = "tf-acc-test";

/// Delete every environment, policy and virtual target whose name starts
/// with `prefix`. Returns the number of objects deleted.
pub async fn run(client: &Client, prefix: &str) -> Result<usize, ApiError> {
    let mut deleted = 0;

    deleted += sweep_policies::<JitPolicy>(client, prefix).await?;
    deleted += sweep_policies::<TargetConnectPolicy>(client, prefix).await?;
    deleted += sweep_policies::<KubernetesPolicy>(client, prefix).await?;
    deleted += sweep_policies::<ProxyPolicy>(client, prefix).await?;
    deleted += sweep_policies::<SessionRecordingPolicy>(client, prefix).await?;

    deleted += sweep_targets::<DbTarget>(client, prefix).await?;
    deleted += sweep_targets::<WebTarget>(client, prefix).await?;

    let environments = client.environments().list().await?;
    let ids = environments
        .iter()
        .filter(|env| env.name.starts_with(prefix))
        .map(|env| env.id.clone())
        .collect();
    deleted += delete_all::<Environment>(client, ids).await?;

    tracing::info!(deleted, prefix, "sweep finished");
    Ok(deleted)
}

async fn sweep_policies<T: Policy>(client: &Client, prefix: &str) -> Result<usize, ApiError> {
    let policies = client.service::<T>().list().await?;
    let ids = policies
        .iter()
        .map(T::common)
        .filter(|common| common.name.starts_with(prefix))
        .map(|common| common.id.clone())
        .collect();
    delete_all::<T>(client, ids).await
}

async fn sweep_targets<T: VirtualTarget>(client: &Client, prefix: &str) -> Result<usize, ApiError> {
    let targets = client.service::<T>().list().await?;
    let ids = targets
        .iter()
        .map(|target| &target.common().target)
        .filter(|common| common.name.starts_with(prefix))
        .map(|common| common.id.clone())
        .collect();
    delete_all::<T>(client, ids).await
}

/// Delete concurrently. A 404 means someone else got there first.
async fn delete_all<T: MutableResource>(
    client: &Client,
    ids: Vec<String>,
) -> Result<usize, ApiError> {
    let service = client.service::<T>();
    let results = join_all(ids.iter().map(|id| service.delete(id))).await;

    let mut deleted = 0;
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(()) => {
                tracing::debug!(%id, path = T::api_path(), "swept");
                deleted += 1;
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, path = T::api_path(), "already deleted");
                deleted += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Mock, Server, ServerGuard};

    async fn empty_list(server: &mut ServerGuard, path: &str) -> Mock {
        server
            .mock("GET", path)
            .with_body("[]")
            .create_async()
            .await
    }

    fn environment(id: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "organizationId": "org-1",
            "isDefault": false,
            "name": name,
            "description": "",
            "timeCreated": "2023-04-01T12:30:45Z",
            "offlineCleanupTimeoutHours": 2160,
            "targets": []
        })
    }

    #[tokio::test]
    async fn sweep_deletes_only_prefixed_objects() {
        let mut server = Server::new_async().await;
        let _jit = empty_list(&mut server, "/api/v2/policies/just-in-time").await;
        let _kube = empty_list(&mut server, "/api/v2/policies/kubernetes").await;
        let _proxy = empty_list(&mut server, "/api/v2/policies/proxy").await;
        let _recording = empty_list(&mut server, "/api/v2/policies/session-recording").await;
        let _db = empty_list(&mut server, "/api/v2/targets/database").await;
        let _web = empty_list(&mut server, "/api/v2/targets/web").await;

        let _connect = server
            .mock("GET", "/api/v2/policies/target-connect")
            .with_body(
                serde_json::json!([
                    {"id": "p-1", "name": "tf-acc-test-shell", "type": "TargetConnect",
                     "environments": [], "targets": [], "targetUsers": [], "verbs": []},
                    {"id": "p-2", "name": "production", "type": "TargetConnect",
                     "environments": [], "targets": [], "targetUsers": [], "verbs": []}
                ])
                .to_string(),
            )
            .create_async()
            .await;
        let delete_policy = server
            .mock("DELETE", "/api/v2/policies/target-connect/p-1")
            .with_status(204)
            .create_async()
            .await;

        let _environments = server
            .mock("GET", "/api/v2/environments")
            .with_body(
                serde_json::json!([
                    environment("e-1", "tf-acc-test-env"),
                    environment("e-2", "Default")
                ])
                .to_string(),
            )
            .create_async()
            .await;
        let delete_env = server
            .mock("DELETE", "/api/v2/environments/e-1")
            .with_status(404)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "test-secret").unwrap();
        let deleted = run(&client, TEST_PREFIX).await.unwrap();

        assert_eq!(deleted, 2);
        delete_policy.assert_async().await;
        delete_env.assert_async().await;
    }

    #[tokio::test]
    async fn sweep_stops_on_delete_failure() {
        let mut server = Server::new_async().await;
        let _jit = server
            .mock("GET", "/api/v2/policies/just-in-time")
            .with_body(
                serde_json::json!([{
                    "id": "j-1", "name": "tf-acc-test-jit", "type": "JustInTime",
                    "childPolicies": [], "automaticallyApproved": false, "duration": 60
                }])
                .to_string(),
            )
            .create_async()
            .await;
        let _delete = server
            .mock("DELETE", "/api/v2/policies/just-in-time/j-1")
            .with_status(400)
            .with_body("policy is in use")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "test-secret").unwrap();
        let err = run(&client, TEST_PREFIX).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
    }
}
