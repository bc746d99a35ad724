use serde_json::{Value, json};

use crate::common::TestApp;

const CERTIFICATES: &str = "/api/v1/certificates";

fn issue_body(user_id: i32) -> Value {
    json!({
        "user_id": user_id,
        "course_id": 42,
        "user_name": "Ada Lovelace",
        "course_title": "Intro to Algorithms",
        "final_score": 95.0,
    })
}

mod issuance {
    use super::*;

    #[tokio::test]
    async fn issuing_returns_the_created_record() {
        let app = TestApp::spawn().await;
        let token = app.token(1, &["certificate:issue"]);

        let res = app.post(CERTIFICATES, Some(&token), &issue_body(1)).await;

        assert_eq!(res.status, 201, "issue failed: {}", res.text);
        assert!(
            res.body["certificate_id"]
                .as_str()
                .unwrap()
                .starts_with("CERT-")
        );
        assert_eq!(res.body["verification_code"].as_str().unwrap().len(), 12);
        assert_eq!(res.body["grade"], "Distinction");
        assert_eq!(res.body["final_score"], 95.0);
        assert_eq!(res.body["revoked"], false);
        assert!(
            res.body["document_url"]
                .as_str()
                .unwrap()
                .ends_with(".pdf")
        );
    }

    #[tokio::test]
    async fn issuing_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.post(CERTIFICATES, None, &issue_body(1)).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn issuing_requires_the_issue_permission() {
        let app = TestApp::spawn().await;
        let token = app.token(1, &["certificate:revoke"]);

        let res = app.post(CERTIFICATES, Some(&token), &issue_body(1)).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn issuing_rejects_an_out_of_range_score() {
        let app = TestApp::spawn().await;
        let token = app.token(1, &["certificate:issue"]);

        let mut body = issue_body(1);
        body["final_score"] = json!(104.0);
        let res = app.post(CERTIFICATES, Some(&token), &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod verification {
    use super::*;

    #[tokio::test]
    async fn issued_certificate_verifies_with_public_display_data() {
        let app = TestApp::spawn().await;
        let token = app.token(1, &["certificate:issue"]);
        let issued = app.post(CERTIFICATES, Some(&token), &issue_body(1)).await;
        let code = issued.body["verification_code"].as_str().unwrap();

        // No token: verification is public.
        let res = app
            .get(&format!("{CERTIFICATES}/verify/{code}"), None)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_valid"], true);
        let cert = &res.body["certificate"];
        assert_eq!(cert["user_name"], "Ada Lovelace");
        assert_eq!(cert["course_title"], "Intro to Algorithms");
        assert_eq!(cert["grade"], "Distinction");
        // The public payload must not leak internal fields.
        assert!(cert.get("user_id").is_none());
        assert!(cert.get("document_url").is_none());
    }

    #[tokio::test]
    async fn unknown_code_reports_not_found_as_a_normal_result() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&format!("{CERTIFICATES}/verify/NOSUCHCODE12"), None)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_valid"], false);
        assert!(res.body.get("certificate").is_none());
        assert!(
            res.body["message"]
                .as_str()
                .unwrap()
                .contains("No certificate found")
        );
    }

    #[tokio::test]
    async fn revoked_certificate_reports_revoked_not_missing() {
        let app = TestApp::spawn().await;
        let token = app.token(1, &["certificate:issue", "certificate:revoke"]);
        let issued = app.post(CERTIFICATES, Some(&token), &issue_body(1)).await;
        let id = issued.body["certificate_id"].as_str().unwrap();
        let code = issued.body["verification_code"].as_str().unwrap();

        let revoked = app
            .post(
                &format!("{CERTIFICATES}/{id}/revoke"),
                Some(&token),
                &json!({"reason": "academic misconduct"}),
            )
            .await;
        assert_eq!(revoked.status, 200, "revoke failed: {}", revoked.text);

        let res = app
            .get(&format!("{CERTIFICATES}/verify/{code}"), None)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_valid"], false);
        assert!(res.body["message"].as_str().unwrap().contains("revoked"));
    }
}

mod revocation {
    use super::*;

    #[tokio::test]
    async fn revoking_twice_conflicts_and_keeps_the_first_reason() {
        let app = TestApp::spawn().await;
        let token = app.token(1, &["certificate:issue", "certificate:revoke"]);
        let issued = app.post(CERTIFICATES, Some(&token), &issue_body(1)).await;
        let id = issued.body["certificate_id"].as_str().unwrap();

        let first = app
            .post(
                &format!("{CERTIFICATES}/{id}/revoke"),
                Some(&token),
                &json!({"reason": "first reason"}),
            )
            .await;
        assert_eq!(first.status, 200);
        assert_eq!(first.body["revoked"], true);
        assert_eq!(first.body["revocation_reason"], "first reason");

        let second = app
            .post(
                &format!("{CERTIFICATES}/{id}/revoke"),
                Some(&token),
                &json!({"reason": "second reason"}),
            )
            .await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "ALREADY_REVOKED");
    }

    #[tokio::test]
    async fn revoking_an_unknown_certificate_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.token(1, &["certificate:revoke"]);

        let res = app
            .post(
                &format!("{CERTIFICATES}/CERT-20260101000000-XXXXXX/revoke"),
                Some(&token),
                &json!({"reason": "nonexistent"}),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn learners_see_only_their_own_certificates() {
        let app = TestApp::spawn().await;
        let issuer = app.token(9, &["certificate:issue"]);
        app.post(CERTIFICATES, Some(&issuer), &issue_body(1)).await;
        app.post(CERTIFICATES, Some(&issuer), &issue_body(1)).await;
        app.post(CERTIFICATES, Some(&issuer), &issue_body(2)).await;

        let owner = app.token(1, &[]);
        let res = app.get(&format!("{CERTIFICATES}/mine"), Some(&owner)).await;

        assert_eq!(res.status, 200);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|c| c["user_id"] == 1));
    }

    #[tokio::test]
    async fn listing_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{CERTIFICATES}/mine"), None).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
