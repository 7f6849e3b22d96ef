use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use agora_api::config::Config;
use agora_auth::{Role, TokenClaims, TokenKind};

const SECRET: &str = "test-secret";
const PASSWORD: &str = "Passw0rdX";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = agora_api::app::build_app(Config::for_tests(SECRET))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        read(res).await
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    /// Register an agent and return `(agent_id, access_token)`.
    async fn register_agent(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({
                    "firstname": "Jane",
                    "lastname": "Doe",
                    "email": email,
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        session_of(&body)
    }

    /// Register a distributor and return `(distributor_id, access_token)`.
    async fn register_distributor(&self, business_name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/auth/distributor/register",
                None,
                json!({
                    "business_name": business_name,
                    "representative_name": "Rep Person",
                    "email": email,
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        session_of(&body)
    }

    /// Agent requests approval; returns the request id.
    async fn request_approval(&self, agent_token: &str, distributor_id: &str) -> String {
        let (status, body) = self
            .post(
                "/agents/request-approval",
                Some(agent_token),
                json!({ "distributor_id": distributor_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["request_id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(res: reqwest::Response) -> (StatusCode, Value) {
    let status = res.status();
    let body = res.json().await.unwrap_or(Value::Null);
    (status, body)
}

fn session_of(body: &Value) -> (String, String) {
    let id = body["data"]["user"]["id"].as_str().unwrap().to_string();
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();
    (id, token)
}

fn mint_jwt(email: &str, role: Role, kind: TokenKind, ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        email: email.to_string(),
        role,
        kind,
        issued_at: now - ChronoDuration::minutes(5),
        expires_at: now + ttl,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn access_token(email: &str, role: Role) -> String {
    mint_jwt(email, role, TokenKind::Access, ChronoDuration::minutes(10))
}

#[tokio::test]
async fn health_and_banner_are_public() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("agora-api"));
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/distributors/agent-requests", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");

    let expired = mint_jwt(
        "someone@example.com",
        Role::Distributor,
        TokenKind::Access,
        ChronoDuration::seconds(-30),
    );
    let (status, _) = srv.get("/distributors/agent-requests", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let refresh = mint_jwt(
        "someone@example.com",
        Role::Distributor,
        TokenKind::Refresh,
        ChronoDuration::minutes(10),
    );
    let (status, _) = srv.get("/distributors/agent-requests", Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_validates_and_rejects_taken_email() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post(
            "/auth/register",
            None,
            json!({ "firstname": "Al", "email": "nope", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["errors"]["firstname"], "Firstname is too short.");
    assert_eq!(body["errors"]["email"], "Invalid email address.");
    assert_eq!(
        body["errors"]["password"],
        "Password is too short. Must be 8 or more characters"
    );

    srv.register_agent("jane@example.com").await;
    let (status, body) = srv
        .post(
            "/auth/register",
            None,
            json!({
                "firstname": "Jane",
                "lastname": "Again",
                "email": "JANE@example.com",
                "password": PASSWORD,
                "confirm_password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["email"], "Email is already registered.");
}

#[tokio::test]
async fn login_and_refresh_issue_tokens() {
    let srv = TestServer::spawn().await;
    srv.register_distributor("Acme Supplies", "acme@example.com").await;

    let (status, body) = srv
        .post(
            "/auth/login",
            None,
            json!({ "email": "acme@example.com", "password": "WrongPass1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["password"], "Invalid email or password");

    let (status, body) = srv
        .post(
            "/auth/login",
            None,
            json!({ "email": "acme@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["role"], "distributor");
    assert!(body["data"]["user"].get("password_hash").is_none());
    let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (status, body) = srv.get("/auth/refresh", Some(&refresh)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["accessToken"].is_string());

    // An access token cannot be used to refresh.
    let (status, _) = srv.get("/auth/refresh", Some(&access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn approval_lifecycle_accept_affiliates_agent() {
    let srv = TestServer::spawn().await;
    let (agent_id, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;

    let (status, body) = srv
        .post(
            "/agents/request-approval",
            Some(&agent_token),
            json!({ "distributor_id": distributor_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["message"],
        "Approval request sent successfully! Awaiting distributor's response."
    );
    assert_eq!(body["data"]["agent_id"], agent_id.as_str());
    assert_eq!(body["data"]["distributor_id"], distributor_id.as_str());
    let request_id = body["data"]["request_id"].as_str().unwrap().to_string();

    // A second request to the same distributor while pending.
    let (status, body) = srv
        .post(
            "/agents/request-approval",
            Some(&agent_token),
            json!({ "distributor_id": distributor_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "There is already a pending request for approval with this distributor."
    );

    let (status, body) = srv.get("/distributors/agent-requests", Some(&distributor_token)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["status"], "pending");

    let path = format!("/distributors/agent-requests/{request_id}");
    let (status, body) = srv.put(&path, &distributor_token, json!({ "status": "ACCEPTED" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Agent request 'accepted' successfully!");
    assert_eq!(body["data"]["status"], "accepted");

    let (status, body) = srv.get(&format!("/agents/{agent_id}"), Some(&agent_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["distributor_id"], distributor_id.as_str());

    // Terminal requests stay terminal.
    let (status, _) = srv.put(&path, &distributor_token, json!({ "status": "REJECTED" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Affiliated agents cannot ask anyone else.
    let (other_id, _) = srv.register_distributor("Other Trade", "other@example.com").await;
    let (status, body) = srv
        .post(
            "/agents/request-approval",
            Some(&agent_token),
            json!({ "distributor_id": other_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Agent is not allowed to request approval from multiple Distributors."
    );
}

#[tokio::test]
async fn rejection_leaves_agent_unaffiliated() {
    let srv = TestServer::spawn().await;
    let (agent_id, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;
    let request_id = srv.request_approval(&agent_token, &distributor_id).await;

    let (status, body) = srv
        .put(
            &format!("/distributors/agent-requests/{request_id}"),
            &distributor_token,
            json!({ "status": "REJECTED" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Agent request 'rejected' successfully!");

    let (_, body) = srv.get(&format!("/agents/{agent_id}"), Some(&agent_token)).await;
    assert!(body["data"]["distributor_id"].is_null());

    // A fresh request to the same distributor is allowed after rejection.
    srv.request_approval(&agent_token, &distributor_id).await;
}

#[tokio::test]
async fn decision_status_must_be_accepted_or_rejected() {
    let srv = TestServer::spawn().await;
    let (_, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;
    let request_id = srv.request_approval(&agent_token, &distributor_id).await;
    let path = format!("/distributors/agent-requests/{request_id}");

    for status in ["MAYBE", "accepted", "PENDING"] {
        let (code, body) = srv.put(&path, &distributor_token, json!({ "status": status })).await;
        assert_eq!(code, StatusCode::BAD_REQUEST, "status {status}");
        assert_eq!(body["error"], "validation_error");
        assert!(!body["errors"]["status"].is_null());
    }

    let (_, body) = srv
        .get(&format!("/distributors/agent-requests/{request_id}"), Some(&distributor_token))
        .await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn malformed_bodies_get_the_error_envelope() {
    let srv = TestServer::spawn().await;
    let (_, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;
    let request_id = srv.request_approval(&agent_token, &distributor_id).await;
    let path = format!("/distributors/agent-requests/{request_id}");

    let (code, body) = srv.put(&path, &distributor_token, json!({ "status": 1 })).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");

    let res = srv
        .client
        .put(srv.url(&path))
        .bearer_auth(&distributor_token)
        .header("content-type", "application/json")
        .body("{\"status\":")
        .send()
        .await
        .unwrap();
    let (code, body) = read(res).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid_body");

    let (code, body) = srv.post("/auth/login", None, json!({ "email": ["a@x.io"] })).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, body) = srv.get(&path, Some(&distributor_token)).await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn other_distributors_cannot_see_or_decide_a_request() {
    let srv = TestServer::spawn().await;
    let (_, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, _) = srv.register_distributor("Acme Supplies", "acme@example.com").await;
    let (_, intruder_token) = srv.register_distributor("Other Trade", "other@example.com").await;
    let request_id = srv.request_approval(&agent_token, &distributor_id).await;
    let path = format!("/distributors/agent-requests/{request_id}");

    let (status, body) = srv.get(&path, Some(&intruder_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "No Data to Display");

    let (status, body) = srv.put(&path, &intruder_token, json!({ "status": "ACCEPTED" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not allowed to make this request");

    let (status, body) = srv.get("/distributors/agent-requests", Some(&intruder_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn roles_are_enforced_on_workflow_routes() {
    let srv = TestServer::spawn().await;
    let (agent_id, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;

    // Distributors cannot request approval.
    let (status, _) = srv
        .post(
            "/agents/request-approval",
            Some(&distributor_token),
            json!({ "distributor_id": distributor_id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Agents cannot list or decide requests.
    let (status, _) = srv.get("/distributors/agent-requests", Some(&agent_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An agent may only act for its own id.
    let (other_agent_id, _) = srv.register_agent("second@example.com").await;
    let (status, _) = srv
        .post(
            &format!("/agents/request-approval/{other_agent_id}"),
            Some(&agent_token),
            json!({ "distributor_id": distributor_id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = srv
        .post(
            &format!("/agents/request-approval/{agent_id}"),
            Some(&agent_token),
            json!({ "distributor_id": distributor_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Administrators act on behalf of any agent.
    let admin = access_token("root@example.com", Role::Admin);
    let (status, body) = srv
        .post(
            &format!("/agents/request-approval/{other_agent_id}"),
            Some(&admin),
            json!({ "distributor_id": distributor_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["agent_id"], other_agent_id.as_str());
}

#[tokio::test]
async fn unknown_ids_are_reported() {
    let srv = TestServer::spawn().await;
    let (_, agent_token) = srv.register_agent("agent@example.com").await;
    let (_, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;

    let (status, body) = srv
        .post(
            "/agents/request-approval",
            Some(&agent_token),
            json!({ "distributor_id": "not-a-uuid" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = srv
        .post(
            "/agents/request-approval",
            Some(&agent_token),
            json!({ "distributor_id": "0190f1a4-0000-7000-8000-000000000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Distributor not found.");

    let (status, body) = srv
        .put(
            "/distributors/agent-requests/0190f1a4-0000-7000-8000-000000000000",
            &distributor_token,
            json!({ "status": "ACCEPTED" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Agent request not found.");

    // A distributor token whose account does not exist.
    let ghost = access_token("ghost@example.com", Role::Distributor);
    let (status, _) = srv.get("/distributors/agent-requests", Some(&ghost)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_and_admin_views() {
    let srv = TestServer::spawn().await;
    let (_, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;
    let request_id = srv.request_approval(&agent_token, &distributor_id).await;
    srv.put(
        &format!("/distributors/agent-requests/{request_id}"),
        &distributor_token,
        json!({ "status": "ACCEPTED" }),
    )
    .await;

    let (status, body) = srv.get("/distributors", None).await;
    assert_eq!(status, StatusCode::OK);
    let summary = &body["data"][0];
    assert_eq!(summary["business_name"], "Acme Supplies");
    assert!(summary.get("email").is_none());

    let (status, _) = srv.get("/admin/distributors", Some(&agent_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = access_token("root@example.com", Role::Admin);
    let (status, body) = srv.get("/admin/distributors", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["agents"].as_array().unwrap().len(), 1);

    let (status, body) = srv.get("/agents", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = srv.get("/profile", Some(&distributor_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["account_type"], "distributor");
}

#[tokio::test]
async fn purchases_carry_the_agent_affiliation() {
    let srv = TestServer::spawn().await;
    let (agent_id, agent_token) = srv.register_agent("agent@example.com").await;
    let (distributor_id, distributor_token) = srv.register_distributor("Acme Supplies", "acme@example.com").await;
    let request_id = srv.request_approval(&agent_token, &distributor_id).await;
    srv.put(
        &format!("/distributors/agent-requests/{request_id}"),
        &distributor_token,
        json!({ "status": "ACCEPTED" }),
    )
    .await;

    let (status, body) = srv.post("/purchase", Some(&agent_token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["errors"]["product_category"].is_null());

    let (status, body) = srv
        .post(
            "/purchase",
            Some(&agent_token),
            json!({
                "firstname": "Buyer",
                "lastname": "Person",
                "email": "buyer@example.com",
                "product_category": "Health",
                "product": "Basic cover",
                "phone_number": "+15550100",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["agent_id"], agent_id.as_str());
    assert_eq!(body["data"]["distributor_id"], distributor_id.as_str());
    assert_eq!(body["data"]["purchase_secret"].as_str().unwrap().len(), 8);
    let purchase_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = srv.get(&format!("/purchase/{purchase_id}"), Some(&distributor_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["agent"]["firstname"], "Jane");

    let (status, body) = srv
        .get("/purchase/0190f1a4-0000-7000-8000-000000000000", Some(&agent_token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Purchase not found.");

    // Only agents record purchases.
    let (status, _) = srv.post("/purchase", Some(&distributor_token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
