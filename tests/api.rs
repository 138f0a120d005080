//! End-to-end tests for the guild API.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{start_server, test_config, token, TestServer};

async fn create_guild(server: &TestServer, owner: &str, name: &str) -> Value {
    let res = server
        .client
        .post(server.url("/guilds"))
        .bearer_auth(owner)
        .json(&json!({ "name": name, "description": "Scholarships for all" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn join(server: &TestServer, guild_id: &str, user: &str) -> reqwest::Response {
    server
        .client
        .post(server.url(&format!("/guilds/{}/join", guild_id)))
        .bearer_auth(user)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_and_empty_listing() {
    let server = start_server(test_config()).await;

    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let guilds: Vec<Value> = server
        .client
        .get(server.url("/guilds"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(guilds.is_empty());
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = start_server(test_config()).await;
    let res = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "trace-me-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me-123");
}

#[tokio::test]
async fn test_unknown_guild_is_404() {
    let server = start_server(test_config()).await;
    let res = server
        .client
        .get(server.url("/guilds/does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_auth_failures() {
    let server = start_server(test_config()).await;
    let body = json!({ "name": "Nope" });

    let missing = server
        .client
        .post(server.url("/guilds"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let malformed = server
        .client
        .post(server.url("/guilds"))
        .header("authorization", "Token abc")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);

    let invalid = server
        .client
        .post(server.url("/guilds"))
        .bearer_auth("not.a.jwt")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::FORBIDDEN);
    let err: Value = invalid.json().await.unwrap();
    assert_eq!(err["error"]["code"], "invalid_token");
}

#[tokio::test]
async fn test_guild_founding_and_membership() {
    let server = start_server(test_config()).await;
    let alice = token("alice", "Alice");
    let bob = token("bob", "Bob");

    let guild = create_guild(&server, &alice, "Lunacia Legends").await;
    let id = guild["id"].as_str().unwrap().to_string();
    assert_eq!(guild["members"][0]["role"], "Guild Master");
    assert_eq!(guild["members"][0]["guildScore"], 1000);
    assert_eq!(guild["tags"], json!(["New", "PvE"]));
    assert!(guild["summary"]
        .as_str()
        .unwrap()
        .starts_with("Welcome to Lunacia Legends!"));

    let res = join(&server, &id, &bob).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let member: Value = res.json().await.unwrap();
    assert_eq!(member["role"], "Member");
    assert_eq!(member["guildScore"], 0);

    assert_eq!(join(&server, &id, &bob).await.status(), StatusCode::CONFLICT);

    // Members cannot edit settings.
    let res = server
        .client
        .patch(server.url(&format!("/guilds/{}", id)))
        .bearer_auth(&bob)
        .json(&json!({ "description": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .patch(server.url(&format!("/guilds/{}", id)))
        .bearer_auth(&alice)
        .json(&json!({ "tags": ["PvP"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["tags"], json!(["PvP"]));

    // Promote, demote, and kick.
    let member_url = server.url(&format!("/guilds/{}/members/bob", id));
    let promoted: Value = server
        .client
        .patch(&member_url)
        .bearer_auth(&alice)
        .json(&json!({ "action": "promote" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(promoted["role"], "Officer");

    // An Officer still cannot kick the Guild Master.
    let res = server
        .client
        .delete(server.url(&format!("/guilds/{}/members/alice", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let demoted: Value = server
        .client
        .patch(&member_url)
        .bearer_auth(&alice)
        .json(&json!({ "action": "demote" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(demoted["role"], "Member");

    let res = server
        .client
        .delete(&member_url)
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let guild: Value = server
        .client
        .get(server.url(&format!("/guilds/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(guild["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_quests_and_treasury() {
    let server = start_server(test_config()).await;
    let alice = token("alice", "Alice");
    let bob = token("bob", "Bob");

    let id = create_guild(&server, &alice, "Treasure Hunters").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    join(&server, &id, &bob).await;

    let quest: Value = server
        .client
        .post(server.url(&format!("/guilds/{}/quests", id)))
        .bearer_auth(&alice)
        .json(&json!({ "title": "Win 10 arena matches", "reward": 50 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let claim_url = server.url(&format!(
        "/guilds/{}/quests/{}/claim",
        id,
        quest["id"].as_str().unwrap()
    ));

    let claimed: Value = server
        .client
        .post(&claim_url)
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(claimed["claimedBy"], json!(["bob"]));

    let again = server.client.post(&claim_url).bearer_auth(&bob).send().await.unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let treasury: Value = server
        .client
        .post(server.url(&format!("/guilds/{}/treasury/donate", id)))
        .bearer_auth(&bob)
        .json(&json!({ "kind": "token", "symbol": "axs", "amount": 10.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(treasury["tokens"][0]["symbol"], "AXS");
    assert_eq!(treasury["tokens"][0]["balance"], 10.0);

    let disburse_url = server.url(&format!("/guilds/{}/treasury/disburse", id));
    let res = server
        .client
        .post(&disburse_url)
        .bearer_auth(&bob)
        .json(&json!({ "symbol": "AXS", "amount": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .post(&disburse_url)
        .bearer_auth(&alice)
        .json(&json!({ "symbol": "AXS", "amount": 100.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let treasury: Value = server
        .client
        .post(&disburse_url)
        .bearer_auth(&alice)
        .json(&json!({ "symbol": "AXS", "amount": 4.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(treasury["tokens"][0]["balance"], 6.0);
}

#[tokio::test]
async fn test_team_scholarship_flow() {
    let server = start_server(test_config()).await;
    let alice = token("alice", "Alice");
    let bob = token("bob", "Bob");

    let id = create_guild(&server, &alice, "Axie Academy").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    join(&server, &id, &bob).await;

    let res = server
        .client
        .post(server.url(&format!("/guilds/{}/teams", id)))
        .bearer_auth(&alice)
        .json(&json!({
            "name": "Team Aqua",
            "walletAddress": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "password": "ciphertext",
            "axies": "101, 102,103"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let team: Value = res.json().await.unwrap();
    assert!(team.get("encryptedPassword").is_none());
    assert_eq!(team["axies"].as_array().unwrap().len(), 3);
    let team_id = team["id"].as_str().unwrap().to_string();

    // Assigning someone who has not applied is rejected.
    let assign_url = server.url(&format!("/teams/{}/assign", team_id));
    let res = server
        .client
        .patch(&assign_url)
        .bearer_auth(&alice)
        .json(&json!({ "scholarId": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let applied: Value = server
        .client
        .post(server.url(&format!("/teams/{}/apply", team_id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(applied["applicants"], json!(["bob"]));

    let assigned: Value = server
        .client
        .patch(&assign_url)
        .bearer_auth(&alice)
        .json(&json!({ "scholarId": "bob" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(assigned["scholarId"], "bob");
    assert_eq!(assigned["applicants"], json!([]));

    let unassigned: Value = server
        .client
        .patch(server.url(&format!("/teams/{}/unassign", team_id)))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(unassigned.get("scholarId").is_none());

    let res = server
        .client
        .post(server.url("/teams/team-missing/apply"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Password stays in the store but never in responses.
    let stored = server.store.get(&id).unwrap();
    assert_eq!(stored.teams[0].encrypted_password.as_deref(), Some("ciphertext"));
    let public: Value = server
        .client
        .get(server.url(&format!("/guilds/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(public["teams"][0].get("encryptedPassword").is_none());
}

#[tokio::test]
async fn test_proposals_and_marketplace() {
    let server = start_server(test_config()).await;
    let alice = token("alice", "Alice");
    let bob = token("bob", "Bob");

    let id = create_guild(&server, &alice, "Council").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    join(&server, &id, &bob).await;

    let proposal: Value = server
        .client
        .post(server.url(&format!("/guilds/{}/proposals", id)))
        .bearer_auth(&bob)
        .json(&json!({ "title": "Buy land plot" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(proposal["status"], "active");
    assert_eq!(proposal["quorum"], 0.5);

    let vote_url = server.url(&format!(
        "/guilds/{}/proposals/{}/vote",
        id,
        proposal["id"].as_str().unwrap()
    ));
    let voted: Value = server
        .client
        .post(&vote_url)
        .bearer_auth(&alice)
        .json(&json!({ "choice": "for" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(voted["votes"]["alice"], "for");

    let again = server
        .client
        .post(&vote_url)
        .bearer_auth(&alice)
        .json(&json!({ "choice": "against" }))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let res = server
        .client
        .post(server.url(&format!("/guilds/{}/proposals", id)))
        .bearer_auth(&alice)
        .json(&json!({ "title": "Too late", "windowHours": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Windows beyond the calendar range are rejected, not a dropped connection.
    for hours in [2_500_000_000_000u64, 10_000_000_000_000, u64::MAX] {
        let res = server
            .client
            .post(server.url(&format!("/guilds/{}/proposals", id)))
            .bearer_auth(&alice)
            .json(&json!({ "title": "Forever", "windowHours": hours }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let item: Value = server
        .client
        .post(server.url(&format!("/guilds/{}/marketplace", id)))
        .bearer_auth(&bob)
        .json(&json!({ "name": "Mystic Axie", "price": { "amount": 0.5, "symbol": "ETH" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["sellerName"], "Bob");
    let buy_url = server.url(&format!(
        "/guilds/{}/marketplace/{}/buy",
        id,
        item["id"].as_str().unwrap()
    ));

    let own = server.client.post(&buy_url).bearer_auth(&bob).send().await.unwrap();
    assert_eq!(own.status(), StatusCode::CONFLICT);

    let sold: Value = server
        .client
        .post(&buy_url)
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sold["status"], "sold");
    assert_eq!(sold["buyerId"], "alice");
}

#[tokio::test]
async fn test_non_member_is_forbidden() {
    let server = start_server(test_config()).await;
    let alice = token("alice", "Alice");
    let mallory = token("mallory", "Mallory");

    let id = create_guild(&server, &alice, "Closed Circle").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = server
        .client
        .post(server.url(&format!("/guilds/{}/chat", id)))
        .bearer_auth(&mallory)
        .json(&json!({ "text": "let me in" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_a_member");
}

#[tokio::test]
async fn test_invalid_body_is_json_error() {
    let server = start_server(test_config()).await;
    let alice = token("alice", "Alice");

    let res = server
        .client
        .post(server.url("/guilds"))
        .bearer_auth(&alice)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid_body");

    let res = server
        .client
        .post(server.url("/guilds"))
        .bearer_auth(&alice)
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
