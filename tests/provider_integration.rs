//! Provider lifecycle against a mocked Oasis API
//!
//! Each test configures a provider pointing at a wiremock server that
//! stands in for the REST gateway, then drives it the way the host does.

use oasis_provider::attrs;
use oasis_provider::helpers::hash_ids;
use oasis_provider::resource::Provider;
use oasis_provider::schema::AttributeValue;
use serde_json::{json, Value};
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ID: &str = "key-id";
const KEY_SECRET: &str = "key-secret";

async fn mount_authentication(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/api/iam/v1/apikeys/{KEY_ID}/authenticate")))
        .and(body_json(json!({ "id": KEY_ID, "secret": KEY_SECRET })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "test-token", "time_to_live": "3600s" })),
        )
        .mount(server)
        .await;
}

fn configure(provider: &Provider, server: &MockServer) {
    let outcome = provider.configure(attrs! {
        "api_key_id" => KEY_ID,
        "api_key_secret" => KEY_SECRET,
        "api_endpoint_address" => server.uri(),
        "api_endpoint_port_suffix" => "",
        "organization" => "org-1",
    });
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}

async fn configured_provider(server: &MockServer) -> Provider {
    mount_authentication(server).await;
    let provider = Provider::new();
    configure(&provider, server);
    provider
}

async fn request_bodies(server: &MockServer, verb: &str, route: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == route)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

mod lifecycle_tests {
    use super::*;

    /// A project created without an organization inherits the provider default
    #[tokio::test]
    async fn test_create_project_reads_back_state() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        let remote = json!({
            "id": "p-1",
            "url": "/Organization/org-1/Project/p-1",
            "name": "proj",
            "description": "my project",
            "organization_id": "org-1",
            "created_at": "2022-01-01T00:00:00Z"
        });
        Mock::given(method("POST"))
            .and(path("/api/resourcemanager/v1/organizations/org-1/projects"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&remote))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/resourcemanager/v1/projects/p-1"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&remote))
            .mount(&server)
            .await;

        let outcome = provider
            .create("oasis_project", attrs! { "name" => "proj", "description" => "my project" })
            .await;

        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.id.as_deref(), Some("p-1"));
        let state = outcome.state.unwrap();
        assert_eq!(state["organization"], AttributeValue::from("org-1"));
        assert_eq!(state["created_at"], AttributeValue::from("2022-01-01T00:00:00Z"));
        assert_eq!(state["id"], AttributeValue::from("p-1"));

        let posted = request_bodies(&server, "POST", "/api/resourcemanager/v1/organizations/org-1/projects").await;
        assert_eq!(posted[0]["name"], "proj");
        assert_eq!(posted[0]["organization_id"], "org-1");
    }

    /// Reading an object that vanished remotely drops it without an error
    #[tokio::test]
    async fn test_read_missing_object_clears_id() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/resourcemanager/v1/projects/p-gone"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "code": 5, "message": "project not found" })),
            )
            .mount(&server)
            .await;

        let outcome = provider
            .read("oasis_project", "p-gone", attrs! { "id" => "p-gone", "name" => "proj" })
            .await;

        assert!(outcome.diagnostics.is_empty());
        assert!(outcome.id.is_none());
        assert!(outcome.state.is_none());
    }

    /// Server messages reach the host unchanged
    #[tokio::test]
    async fn test_remote_error_message_is_kept() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/resourcemanager/v1/organizations/org-1/projects"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "code": 3, "message": "name must be unique" })),
            )
            .mount(&server)
            .await;

        let outcome = provider.create("oasis_project", attrs! { "name" => "dup" }).await;

        assert!(outcome.has_errors());
        assert!(outcome.id.is_none());
        assert_eq!(outcome.diagnostics[0].detail, "name must be unique");
    }

    #[tokio::test]
    async fn test_failed_authentication_is_a_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/api/iam/v1/apikeys/{KEY_ID}/authenticate")))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "code": 16, "message": "invalid key" })),
            )
            .mount(&server)
            .await;

        let provider = Provider::new();
        configure(&provider, &server);
        let outcome = provider.read("oasis_project", "p-1", attrs! {}).await;

        assert!(outcome.has_errors());
        assert_eq!(outcome.diagnostics[0].summary, "Provider configuration error");
        assert!(outcome.diagnostics[0].detail.contains("invalid key"));
    }

    #[tokio::test]
    async fn test_stopped_provider_cancels_operations() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        provider.stop();
        let outcome = provider.read("oasis_project", "p-1", attrs! {}).await;

        assert!(outcome.has_errors());
        assert_eq!(outcome.diagnostics[0].summary, "Operation cancelled");
    }

    #[tokio::test]
    async fn test_delete_clears_id() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        Mock::given(method("DELETE"))
            .and(path("/api/backup/v1/backups/b-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = provider
            .delete("oasis_backup", "b-1", attrs! { "id" => "b-1", "name" => "b" })
            .await;

        assert!(!outcome.has_errors());
        assert!(outcome.id.is_none());
    }
}

mod controller_tests {
    use super::*;

    /// Each configured binding is posted with a prefixed member id
    #[tokio::test]
    async fn test_iam_policy_create_adds_bindings() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        let policy = json!({
            "resource_url": "/Organization/X",
            "bindings": [{ "role_id": "test-role", "member_id": "group:321370957" }]
        });
        Mock::given(method("POST"))
            .and(path("/api/iam/v1/policies/bindings/add"))
            .and(body_json(&policy))
            .respond_with(ResponseTemplate::new(200).set_body_json(&policy))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/iam/v1/policies"))
            .and(query_param("url", "/Organization/X"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&policy))
            .mount(&server)
            .await;

        let outcome = provider
            .create(
                "oasis_iam_policy",
                attrs! {
                    "url" => "/Organization/X",
                    "binding" => vec![AttributeValue::Block(attrs! {
                        "role" => "test-role",
                        "group" => "321370957",
                    })],
                },
            )
            .await;

        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.id.as_deref(), Some("/Organization/X"));
        let state = outcome.state.unwrap();
        let binding = state["binding"].as_list().unwrap()[0].as_block().unwrap();
        assert_eq!(binding["group"], AttributeValue::from("321370957"));
    }

    /// Switching a policy from monthly to daily sends only the daily branch
    #[tokio::test]
    async fn test_backup_policy_update_sends_selected_branch() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        let remote = json!({
            "id": "bp-1",
            "name": "nightly",
            "deployment_id": "dep-1",
            "email_notification": "None",
            "schedule": {
                "schedule_type": "Monthly",
                "monthly_schedule": {
                    "day_of_month": 1,
                    "schedule_at": { "hours": 10, "minutes": 0, "time_zone": "UTC" }
                }
            }
        });
        Mock::given(method("GET"))
            .and(path("/api/backup/v1/backuppolicies/bp-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&remote))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/backup/v1/backuppolicies/bp-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&remote))
            .expect(1)
            .mount(&server)
            .await;

        let schedule_at = || {
            AttributeValue::single_block(attrs! { "hours" => 10, "minutes" => 0, "timezone" => "UTC" })
        };
        let common = attrs! {
            "id" => "bp-1",
            "name" => "nightly",
            "deployment_id" => "dep-1",
            "email_notification" => "None",
        };
        let mut prior = common.clone();
        prior.insert(
            "schedule".into(),
            AttributeValue::single_block(attrs! {
                "type" => "Monthly",
                "monthly" => AttributeValue::single_block(attrs! {
                    "day_of_month" => 1,
                    "schedule_at" => schedule_at(),
                }),
            }),
        );
        let mut planned = common;
        planned.insert(
            "schedule".into(),
            AttributeValue::single_block(attrs! {
                "type" => "Daily",
                "daily" => AttributeValue::single_block(attrs! {
                    "monday" => true,
                    "schedule_at" => schedule_at(),
                }),
            }),
        );

        let outcome = provider.update("oasis_backup_policy", "bp-1", prior, planned).await;
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);

        let bodies = request_bodies(&server, "PUT", "/api/backup/v1/backuppolicies/bp-1").await;
        let schedule = &bodies[0]["schedule"];
        assert_eq!(schedule["schedule_type"], "Daily");
        assert_eq!(schedule["daily_schedule"]["monday"], true);
        assert_eq!(schedule["daily_schedule"]["tuesday"], false);
        assert!(schedule.get("monthly_schedule").is_none());
        assert!(schedule.get("hourly_schedule").is_none());
    }

    #[tokio::test]
    async fn test_backup_policy_rejects_deployment_change() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        let schedule = AttributeValue::single_block(attrs! {
            "type" => "Hourly",
            "hourly" => AttributeValue::single_block(attrs! { "interval" => 6 }),
        });
        let prior = attrs! {
            "name" => "p",
            "deployment_id" => "dep-1",
            "email_notification" => "None",
            "schedule" => schedule,
        };
        let mut planned = prior.clone();
        planned.insert("deployment_id".into(), "dep-2".into());

        let outcome = provider.update("oasis_backup_policy", "bp-1", prior, planned).await;
        assert!(outcome.has_errors());
        assert!(outcome.diagnostics[0].detail.contains("deployment_id"));
        assert!(request_bodies(&server, "PUT", "/api/backup/v1/backuppolicies/bp-1").await.is_empty());
    }
}

mod data_source_tests {
    use super::*;

    #[tokio::test]
    async fn test_organizations_id_hashes_item_ids() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/resourcemanager/v1/self/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "org-1", "name": "First" },
                    { "id": "org-2", "name": "Second" }
                ]
            })))
            .mount(&server)
            .await;

        let outcome = provider.read_data_source("oasis_organizations", attrs! {}).await;

        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.id, Some(hash_ids(["org-1", "org-2"])));
        let state = outcome.state.unwrap();
        assert_eq!(state["organizations"].as_list().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_current_terms_use_default_organization() {
        let server = MockServer::start().await;
        let provider = configured_provider(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/resourcemanager/v1/termsandconditions/current"))
            .and(query_param("organization_id", "org-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "tc-7",
                "content": "Be nice",
                "created_at": "2021-06-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let outcome = provider.read_data_source("oasis_terms_and_conditions", attrs! {}).await;

        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.id.as_deref(), Some("tc-7"));
        assert_eq!(outcome.state.unwrap()["content"], AttributeValue::from("Be nice"));
    }
}
