
// The retried-once flag: a request that is still unauthorized after one
// renewal-and-replay cycle is surfaced verbatim, never queued again.

#[cfg(test)]
mod test {

    use http::StatusCode;

    use crate::tests::common::{access_token, authed_client, GatedRenewal, ScriptedTransport};
    use crate::transport::descriptor::RequestDescriptor;

    #[tokio::test]
    async fn second_expiry_after_replay_is_surfaced_verbatim() {
        // renewal succeeds, yet the server keeps rejecting the request
        let transport = ScriptedTransport::accepting("nothing-we-ever-send");
        let renewal = GatedRenewal::open(Ok(access_token(2)));
        let client = authed_client(transport.clone(), renewal.clone()).await;

        let response = client
            .execute(RequestDescriptor::get("/reports/stubborn"))
            .await
            .expect("terminal failure is the response itself, not an error");
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(renewal.calls(), 1, "no second renewal for an already-replayed request");
        assert_eq!(transport.sent().await.len(), 2, "one attempt, one replay, nothing more");
    }

    #[tokio::test]
    async fn expiry_without_an_active_session_is_ignored() {
        use crate::client::ApiClient;
        use crate::tests::common::test_store;
        use crate::transport::decorator::ExemptionList;

        let transport = ScriptedTransport::accepting("whatever");
        let renewal = GatedRenewal::open(Ok(access_token(2)));
        let client = ApiClient::new(
            transport.clone(),
            renewal.clone(),
            test_store(),
            ExemptionList::new(vec![]),
        );

        let response = client
            .execute(RequestDescriptor::get("/reports/1"))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(renewal.calls(), 0, "renewal only runs for an active session");

        // lenient pre-auth policy: the request went out undecorated
        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].authorization.is_none());
    }
}
