
// Exempt targets are never decorated and never trigger renewal, even
// when they answer 401.

#[cfg(test)]
mod test {

    use http::StatusCode;

    use crate::tests::common::{access_token, authed_client, GatedRenewal, ScriptedTransport};
    use crate::transport::descriptor::RequestDescriptor;

    #[tokio::test]
    async fn exempt_target_is_never_decorated_and_never_renews() {
        let transport = ScriptedTransport::accepting("irrelevant");
        let renewal = GatedRenewal::open(Ok(access_token(2)));
        let client = authed_client(transport.clone(), renewal.clone()).await;

        let response = client
            .execute(RequestDescriptor::post(
                "/auth/login",
                serde_json::json!({"user": "admin"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "401 passes through untouched");
        assert_eq!(renewal.calls(), 0, "exempt 401 is not an expiry signal");

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1, "no replay");
        assert!(sent[0].authorization.is_none(), "no credential attached");
        assert!(client.store().has_session().await, "session untouched");
    }

    #[tokio::test]
    async fn non_exempt_targets_are_decorated() {
        let token = access_token(1);
        let transport = ScriptedTransport::accepting(&token);
        let renewal = GatedRenewal::open(Ok(access_token(2)));
        let client = authed_client(transport.clone(), renewal.clone()).await;

        let response = client.execute(RequestDescriptor::get("/profile")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);

        let sent = transport.sent().await;
        assert_eq!(
            sent[0].authorization.as_deref(),
            Some(format!("Bearer {}", token).as_str())
        );
        assert_eq!(renewal.calls(), 0);
    }
}
