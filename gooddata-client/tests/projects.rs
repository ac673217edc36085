//! ProjectService against a mock API.

#[macro_use]
mod common;

use common::*;
use gooddata_client::{Error, PageRequest, ResourceKind};
use gooddata_core::domain::account::Account;
use gooddata_core::domain::project::{Project, ProjectState};
use gooddata_core::domain::user::User;
use gooddata_core::dto::validation::ProjectValidationType;
use httptest::{Expectation, Server, all_of, cycle, matchers::*, responders::*};
use serde_json::json;
use std::time::Duration;

fn project() -> Project {
    serde_json::from_value::<gooddata_core::Envelope<Project>>(project_json("ENABLED"))
        .unwrap()
        .into_inner()
}

fn account() -> Account {
    serde_json::from_value::<gooddata_core::Envelope<Account>>(account_json())
        .unwrap()
        .into_inner()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_projects_follows_next_links() -> anyhow::Result<()> {
    let server = server();
    expect_current_account(&server);
    server.expect(
        Expectation::matching(all_of![
            authenticated!("GET", "/gdc/account/profile/17/projects"),
            request::query(url_decoded(not(contains(key("offset"))))),
        ])
        .respond_with(json_encoded(json!({
            "projects": {
                "items": [project_json("ENABLED")],
                "paging": {
                    "offset": 0,
                    "count": 1,
                    "next": "/gdc/account/profile/17/projects?offset=1&limit=100"
                }
            }
        }))),
    );
    server.expect(
        Expectation::matching(all_of![
            authenticated!("GET", "/gdc/account/profile/17/projects"),
            request::query(url_decoded(contains(("offset", "1")))),
        ])
        .respond_with(json_encoded(json!({
            "projects": {
                "items": [project_json("DELETED")],
                "paging": {"offset": 1, "count": 1}
            }
        }))),
    );

    let gd = gooddata(&server);
    let projects = gd.project_service().get_projects().await?;

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].state(), Some(&ProjectState::Enabled));
    assert_eq!(projects[1].state(), Some(&ProjectState::Deleted));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn next_link_on_other_host_gets_no_session_token() -> anyhow::Result<()> {
    let server = server();
    let other = Server::run();
    expect_current_account(&server);
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/account/profile/17/projects"))
            .respond_with(json_encoded(json!({
                "projects": {
                    "items": [project_json("ENABLED")],
                    "paging": {
                        "offset": 0,
                        "count": 1,
                        "next": format!("http://{}/gdc/account/profile/17/projects?offset=1", other.addr())
                    }
                }
            }))),
    );
    other.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/gdc/account/profile/17/projects"),
            request::headers(not(contains(key("x-gdc-authtt")))),
        ])
        .times(1)
        .respond_with(json_encoded(json!({"projects": {"items": []}}))),
    );

    let gd = gooddata(&server);
    let projects = gd.project_service().get_projects().await?;

    assert_eq!(projects.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn list_projects_reads_one_page() -> anyhow::Result<()> {
    let server = server();
    expect_current_account(&server);
    server.expect(
        Expectation::matching(all_of![
            authenticated!("GET", "/gdc/account/profile/17/projects"),
            request::query(url_decoded(contains(("offset", "10")))),
            request::query(url_decoded(contains(("limit", "5")))),
        ])
        .respond_with(json_encoded(json!({
            "projects": {
                "items": [project_json("ENABLED")],
                "paging": {"offset": "10", "count": 1, "next": "/next"}
            }
        }))),
    );

    let gd = gooddata(&server);
    let page = gd
        .project_service()
        .list_projects(&PageRequest::at("10", 5))
        .await?;

    assert_eq!(page.len(), 1);
    assert!(!page.is_last());
    assert_eq!(page.paging().offset.as_deref(), Some("10"));
    assert_eq!(page.next_page(), Some(PageRequest::Uri("/next".to_string())));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_project_polls_until_enabled() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(all_of![
            authenticated!("POST", "/gdc/projects"),
            request::body(json_decoded(eq(json!({
                "project": {
                    "meta": {"title": "Demo"},
                    "content": {
                        "environment": "PRODUCTION",
                        "driver": "Pg",
                        "guidedNavigation": "1",
                        "authorizationToken": "AUTH_TOKEN"
                    }
                }
            })))),
        ])
        .respond_with(status_code(201).body(json!({"uri": PROJECT_URI}).to_string())),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI))
            .times(3)
            .respond_with(cycle![
                json_encoded(project_json("PREPARING")),
                json_encoded(project_json("LOADING")),
                json_encoded(project_json("ENABLED")),
            ]),
    );

    let gd = gooddata(&server);
    let future = gd
        .project_service()
        .create_project(&Project::new("Demo", "AUTH_TOKEN"))
        .await?;
    assert_eq!(future.polling_uri(), PROJECT_URI);

    let project = future.get().await?;
    assert_eq!(project.id(), Some(PROJECT_ID));
    assert_eq!(project.state(), Some(&ProjectState::Enabled));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_project_fails_when_project_is_deleted() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("POST", "/gdc/projects"))
            .respond_with(status_code(201).body(json!({"uri": PROJECT_URI}).to_string())),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI))
            .times(2)
            .respond_with(cycle![
                json_encoded(project_json("PREPARING")),
                json_encoded(project_json("DELETED")),
            ]),
    );

    let gd = gooddata(&server);
    let result = gd
        .project_service()
        .create_project(&Project::new("Demo", "AUTH_TOKEN"))
        .await?
        .get()
        .await;

    match result {
        Err(Error::Client(message)) => assert!(message.contains("project creation failed")),
        other => panic!("expected a client error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_project_requires_authorization_token() {
    // No expectations: any request would fail the test.
    let server = Server::run();
    let gd = gooddata(&server);

    let mut project = Project::new("Demo", "");
    project.content.authorization_token = None;

    let result = gd.project_service().create_project(&project).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_project_by_id() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI))
            .respond_with(json_encoded(project_json("ENABLED"))),
    );

    let gd = gooddata(&server);
    let project = gd.project_service().get_project_by_id(PROJECT_ID).await?;

    assert_eq!(project.title(), "Demo");
    assert_eq!(project.uri(), Some(PROJECT_URI));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_project_by_uri_not_found() {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI)).respond_with(
            status_code(404).body(error_json("Project PROJECT_ID does not exist").to_string()),
        ),
    );

    let gd = gooddata(&server);
    let err = gd
        .project_service()
        .get_project_by_uri(PROJECT_URI)
        .await
        .unwrap_err();

    match &err {
        Error::NotFound {
            resource: ResourceKind::Project,
            uri,
            source: Some(source),
        } => {
            assert_eq!(uri, PROJECT_URI);
            assert_eq!(source.request_id.as_deref(), Some("req-1"));
        }
        other => panic!("expected project not found, got {other:?}"),
    }
    assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_project_by_uri_server_error() {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI))
            .respond_with(status_code(500).body(error_json("boom").to_string())),
    );

    let gd = gooddata(&server);
    let err = gd
        .project_service()
        .get_project_by_uri(PROJECT_URI)
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Rest(e) if e.status == 500));
    assert!(err.is_server_error());
    assert!(!err.is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_project_by_empty_uri_is_rejected() {
    let server = Server::run();
    let gd = gooddata(&server);

    let result = gd.project_service().get_project_by_uri("").await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remove_project() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("DELETE", PROJECT_URI))
            .respond_with(status_code(204)),
    );

    let gd = gooddata(&server);
    gd.project_service().remove_project(&project()).await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_project_templates() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/md/PROJECT_ID/templates"))
            .respond_with(json_encoded(json!({
                "projectTemplates": {
                    "templates": [{
                        "projectTemplate": {
                            "url": "/projectTemplates/Demo/1",
                            "urn": "urn:gooddata:Demo",
                            "version": "1",
                            "meta": {"title": "Demo template"}
                        }
                    }]
                }
            }))),
    );

    let gd = gooddata(&server);
    let templates = gd.project_service().get_project_templates(&project()).await?;

    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].url, "/projectTemplates/Demo/1");
    assert_eq!(templates[0].meta.title, "Demo template");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn validate_project_polls_task() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(all_of![
            authenticated!("POST", "/gdc/md/PROJECT_ID/validate"),
            request::body(json_decoded(eq(json!({"validateProject": ["ldm"]})))),
        ])
        .respond_with(status_code(201).body(
            json!({"asyncTask": {"link": {"poll": "/gdc/md/PROJECT_ID/validate/task/1"}}})
                .to_string(),
        )),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/md/PROJECT_ID/validate/task/1"))
            .times(3)
            .respond_with(cycle![
                status_code(202).body(
                    json!({"asyncTask": {"link": {"poll": "/gdc/md/PROJECT_ID/validate/task/1"}}})
                        .to_string()
                ),
                json_encoded(json!({"wTaskStatus": {"status": "RUNNING"}})),
                json_encoded(json!({
                    "projectValidateResult": {
                        "error_found": 0,
                        "fatal_error_found": 0,
                        "results": []
                    }
                })),
            ]),
    );

    let gd = gooddata(&server);
    let results = gd
        .project_service()
        .validate_project(&project(), &[ProjectValidationType::Ldm])
        .await?
        .get()
        .await?;

    assert!(!results.is_error());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn validate_project_defaults_to_available_types() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/md/PROJECT_ID/validate"))
            .respond_with(json_encoded(json!({
                "projectValidateAvailable": {
                    "availableValidations": ["pdm::transitivity", "metric_filter"]
                }
            }))),
    );
    server.expect(
        Expectation::matching(all_of![
            authenticated!("POST", "/gdc/md/PROJECT_ID/validate"),
            request::body(json_decoded(eq(json!({
                "validateProject": ["pdm::transitivity", "metric_filter"]
            })))),
        ])
        .respond_with(json_encoded(
            json!({"asyncTask": {"link": {"poll": "/gdc/md/PROJECT_ID/validate/task/2"}}}),
        )),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/md/PROJECT_ID/validate/task/2"))
            .respond_with(json_encoded(json!({"wTaskStatus": {"status": "ERROR"}}))),
    );

    let gd = gooddata(&server);
    let result = gd
        .project_service()
        .validate_project(&project(), &[])
        .await?
        .get()
        .await;

    assert!(matches!(result, Err(Error::Client(_))));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_roles_fetches_each_role() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/projects/PROJECT_ID/roles"))
            .respond_with(json_encoded(json!({
                "projectRoles": {
                    "roles": [
                        "/gdc/projects/PROJECT_ID/roles/1",
                        "/gdc/projects/PROJECT_ID/roles/2"
                    ]
                }
            }))),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/projects/PROJECT_ID/roles/1"))
            .respond_with(json_encoded(json!({
                "projectRole": {
                    "permissions": {"permission": {"canManageProject": "1"}},
                    "meta": {"title": "Admin", "identifier": "adminRole"},
                    "links": {"roleUsers": "/gdc/projects/PROJECT_ID/roles/1/users"}
                }
            }))),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/projects/PROJECT_ID/roles/2"))
            .respond_with(json_encoded(json!({
                "projectRole": {
                    "permissions": {"permission": {"canManageProject": 0}},
                    "meta": {"title": "Editor", "identifier": "editorRole"}
                }
            }))),
    );

    let gd = gooddata(&server);
    let roles = gd.project_service().get_roles(&project()).await?;

    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0].title(), "Admin");
    assert_eq!(roles[0].uri(), Some("/gdc/projects/PROJECT_ID/roles/1"));
    assert!(roles[0].has_permission("canManageProject"));
    assert_eq!(roles[1].identifier(), Some("editorRole"));
    assert!(!roles[1].has_permission("canManageProject"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_role_by_uri_not_found() {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/projects/PROJECT_ID/roles/9"))
            .respond_with(status_code(404)),
    );

    let gd = gooddata(&server);
    let err = gd
        .project_service()
        .get_role_by_uri("/gdc/projects/PROJECT_ID/roles/9")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::NotFound {
            resource: ResourceKind::Role,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_users_reads_bare_array() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/projects/PROJECT_ID/users"))
            .respond_with(json_encoded(json!({
                "users": [{
                    "user": {
                        "content": {
                            "status": "ENABLED",
                            "userRoles": ["/gdc/projects/PROJECT_ID/roles/2"],
                            "login": "jane@example.com"
                        },
                        "links": {"self": ACCOUNT_URI}
                    }
                }]
            }))),
    );

    let gd = gooddata(&server);
    let users = gd.project_service().get_users(&project()).await?;

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id(), Some(ACCOUNT_ID));
    assert!(users[0].is_enabled());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn add_user_to_project() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(all_of![
            authenticated!("POST", "/gdc/projects/PROJECT_ID/users"),
            request::body(json_decoded(eq(json!({
                "users": [{
                    "user": {
                        "content": {
                            "status": "ENABLED",
                            "userRoles": ["/gdc/projects/PROJECT_ID/roles/2"]
                        },
                        "links": {"self": ACCOUNT_URI}
                    }
                }]
            })))),
        ])
        .respond_with(json_encoded(json!({
            "projectUsersUpdateResult": {"successful": [ACCOUNT_URI], "failed": []}
        }))),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/projects/PROJECT_ID/users/17"))
            .respond_with(json_encoded(json!({
                "user": {
                    "content": {
                        "status": "ENABLED",
                        "userRoles": ["/gdc/projects/PROJECT_ID/roles/2"]
                    },
                    "links": {"self": ACCOUNT_URI}
                }
            }))),
    );

    let gd = gooddata(&server);
    let user = gd
        .project_service()
        .add_user_to_project(
            &project(),
            &account(),
            &["/gdc/projects/PROJECT_ID/roles/2".to_string()],
        )
        .await?;

    assert_eq!(user.roles(), ["/gdc/projects/PROJECT_ID/roles/2".to_string()]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn update_user_in_project_reports_failures() {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("POST", "/gdc/projects/PROJECT_ID/users"))
            .respond_with(json_encoded(json!({
                "projectUsersUpdateResult": {
                    "successful": [],
                    "failed": [{"user": ACCOUNT_URI, "message": "role does not exist"}]
                }
            }))),
    );

    let gd = gooddata(&server);
    let mut user = User::new(ACCOUNT_URI, vec![]);
    user.set_enabled(false);

    let err = gd
        .project_service()
        .update_user_in_project(&project(), &[user])
        .await
        .unwrap_err();

    match err {
        Error::Client(message) => assert!(message.contains("role does not exist")),
        other => panic!("expected a client error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn user_operations_validate_arguments() {
    let server = Server::run();
    let gd = gooddata(&server);
    let service = gd.project_service();

    let result = service
        .add_user_to_project(&project(), &Account::default(), &[])
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));

    let result = service.get_user(&Project::new("Demo", "TOKEN"), &account()).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));

    let result = service.update_user_in_project(&project(), &[]).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn get_user_not_found() {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/projects/PROJECT_ID/users/17"))
            .respond_with(status_code(404)),
    );

    let gd = gooddata(&server);
    let err = gd
        .project_service()
        .get_user(&project(), &account())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::NotFound {
            resource: ResourceKind::User,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_project_times_out() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("POST", "/gdc/projects"))
            .respond_with(json_encoded(json!({"uri": PROJECT_URI}))),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI))
            .times(1..)
            .respond_with(json_encoded(project_json("PREPARING"))),
    );

    let gd = gooddata(&server);
    let result = gd
        .project_service()
        .create_project(&Project::new("Demo", "AUTH_TOKEN"))
        .await?
        .get_with_timeout(Duration::from_millis(50))
        .await;

    match result {
        Err(Error::Timeout { uri, elapsed }) => {
            assert_eq!(uri, PROJECT_URI);
            assert!(elapsed >= Duration::from_millis(50));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn polling_sleeps_between_attempts_only() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("POST", "/gdc/projects"))
            .respond_with(json_encoded(json!({"uri": PROJECT_URI}))),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI))
            .times(3)
            .respond_with(cycle![
                status_code(202),
                status_code(202),
                json_encoded(project_json("ENABLED")),
            ]),
    );

    let gd = gooddata_with(
        &server,
        settings().with_poll_sleep(Duration::from_millis(200)),
    );
    let future = gd
        .project_service()
        .create_project(&Project::new("Demo", "AUTH_TOKEN"))
        .await?;
    let debug = format!("{future:?}");
    assert!(debug.contains(PROJECT_URI) && debug.contains("pending"), "{debug}");

    let start = std::time::Instant::now();
    let project = future.get().await?;
    let elapsed = start.elapsed();

    assert_eq!(project.state(), Some(&ProjectState::Enabled));
    assert!(elapsed >= Duration::from_millis(400), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn poll_timeout_does_not_oversleep() -> anyhow::Result<()> {
    let server = server();
    server.expect(
        Expectation::matching(authenticated!("POST", "/gdc/projects"))
            .respond_with(json_encoded(json!({"uri": PROJECT_URI}))),
    );
    server.expect(
        Expectation::matching(authenticated!("GET", PROJECT_URI))
            .times(1..)
            .respond_with(status_code(202)),
    );

    let gd = gooddata_with(
        &server,
        settings().with_poll_sleep(Duration::from_millis(200)),
    );
    let start = std::time::Instant::now();
    let result = gd
        .project_service()
        .create_project(&Project::new("Demo", "AUTH_TOKEN"))
        .await?
        .get_with_timeout(Duration::from_millis(300))
        .await;
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(Error::Timeout { .. })), "{result:?}");
    assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
    // a full second sleep would end past 400ms
    assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
    Ok(())
}
