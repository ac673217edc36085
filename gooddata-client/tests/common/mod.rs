//! Shared fixtures for tests running the client against an `httptest` server.

#![allow(dead_code)]

/// Matches a request with the given method and path carrying the session
/// token and a request id
macro_rules! authenticated {
    ($method:expr, $path:expr) => {
        httptest::all_of![
            httptest::matchers::request::method_path($method, $path),
            httptest::matchers::request::headers(httptest::matchers::contains((
                "x-gdc-authtt",
                "TT"
            ))),
            httptest::matchers::request::headers(httptest::matchers::contains(
                httptest::matchers::key("x-gdc-request")
            )),
        ]
    };
}

use gooddata_client::{Credentials, GoodData, GoodDataEndpoint, GoodDataSettings};
use httptest::{Expectation, Server, all_of, matchers::*, responders::*};
use serde_json::{Value, json};
use std::time::Duration;

pub const ACCOUNT_ID: &str = "17";
pub const ACCOUNT_URI: &str = "/gdc/account/profile/17";
pub const PROJECT_ID: &str = "PROJECT_ID";
pub const PROJECT_URI: &str = "/gdc/projects/PROJECT_ID";
pub const WAREHOUSE_ID: &str = "w1";
pub const WAREHOUSE_URI: &str = "/gdc/datawarehouse/instances/w1";

/// Settings that keep polling tests fast
pub fn settings() -> GoodDataSettings {
    GoodDataSettings::default().with_poll_sleep(Duration::from_millis(10))
}

/// A server expecting exactly one token exchange
pub fn server() -> Server {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/gdc/account/token"),
            request::headers(contains(("x-gdc-authsst", "SST"))),
        ])
        .times(1)
        .respond_with(json_encoded(json!({"userToken": {"token": "TT"}}))),
    );
    server
}

pub fn gooddata(server: &Server) -> GoodData {
    gooddata_with(server, settings())
}

pub fn gooddata_with(server: &Server, settings: GoodDataSettings) -> GoodData {
    let endpoint = GoodDataEndpoint::parse(&format!("http://{}", server.addr())).unwrap();
    GoodData::with_endpoint(&endpoint, Credentials::sst("SST"), settings).unwrap()
}

pub fn account_json() -> Value {
    json!({
        "accountSetting": {
            "login": "jane@example.com",
            "email": "jane@example.com",
            "firstName": "Jane",
            "lastName": "Doe",
            "country": "cz",
            "timezone": "Europe/Prague",
            "created": "2014-04-11 11:43:45",
            "updated": "2014-04-11 11:43:47",
            "links": {
                "self": ACCOUNT_URI,
                "projects": "/gdc/account/profile/17/projects"
            }
        }
    })
}

/// Answers `GET /gdc/account/profile/current` with the test account
pub fn expect_current_account(server: &Server) {
    server.expect(
        Expectation::matching(authenticated!("GET", "/gdc/account/profile/current"))
            .times(1..)
            .respond_with(json_encoded(account_json())),
    );
}

pub fn project_body(state: &str) -> Value {
    json!({
        "meta": {
            "title": "Demo",
            "author": ACCOUNT_URI,
            "created": "2014-04-11 11:43:45",
            "updated": "2014-04-11 11:43:47"
        },
        "content": {
            "environment": "PRODUCTION",
            "state": state,
            "driver": "Pg",
            "guidedNavigation": "1",
            "isPublic": "0"
        },
        "links": {
            "self": PROJECT_URI,
            "users": "/gdc/projects/PROJECT_ID/users",
            "roles": "/gdc/projects/PROJECT_ID/roles"
        }
    })
}

pub fn project_json(state: &str) -> Value {
    json!({"project": project_body(state)})
}

pub fn warehouse_body() -> Value {
    json!({
        "title": "Warehouse",
        "description": "Sales data",
        "environment": "PRODUCTION",
        "connectionUrl": "jdbc:gdc:datawarehouse://secure.gooddata.com/gdc/datawarehouse/instances/w1",
        "status": "ENABLED",
        "created": "2015-01-02T10:11:12Z",
        "updated": "2015-01-02T10:11:12Z",
        "createdBy": ACCOUNT_URI,
        "updatedBy": ACCOUNT_URI,
        "links": {
            "self": WAREHOUSE_URI,
            "parent": "/gdc/datawarehouse/instances",
            "users": "/gdc/datawarehouse/instances/w1/users",
            "schemas": "/gdc/datawarehouse/instances/w1/schemas"
        }
    })
}

pub fn warehouse_json() -> Value {
    json!({"instance": warehouse_body()})
}

/// A GoodData error body
pub fn error_json(message: &str) -> Value {
    json!({
        "error": {
            "errorClass": "com.gooddata.GdcError",
            "component": "Webapp",
            "message": message,
            "parameters": [],
            "requestId": "req-1"
        }
    })
}
