#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        routes::create_routes,
        testing::{mock_function, test_route_state, FakeFunctionLister, FakeParameterStore},
    };

    fn router(lister: FakeFunctionLister, store: Arc<FakeParameterStore>) -> Router {
        create_routes(test_route_state(Arc::new(lister), store))
    }

    async fn call(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_description_endpoints() {
        let router = router(FakeFunctionLister::default(), Arc::default());

        let (status, index) = call(&router, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(index["actions"][0]["path"], "/lambda/actions/inject-failure");

        let (status, discovery) = call(&router, Method::GET, "/lambda/discovery", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(discovery["id"], "com.steadybit.extension_aws.lambda");
        assert_eq!(discovery["discover"]["callInterval"], "1m");

        let (status, target) =
            call(&router, Method::GET, "/lambda/discovery/target-description", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(target["label"]["one"], "AWS Lambda");

        let (status, attributes) = call(
            &router,
            Method::GET,
            "/lambda/discovery/attribute-descriptions",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(attributes["attributes"].as_array().unwrap().len() >= 14);

        let (status, action) =
            call(&router, Method::GET, "/lambda/actions/inject-failure", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(action["timeControl"], "external");
        assert_eq!(action["targetType"], "com.steadybit.extension_aws.lambda");
    }

    #[tokio::test]
    async fn test_discovered_targets() {
        let lister = FakeFunctionLister::with_pages(vec![
            vec![mock_function("checkout")],
            vec![mock_function("billing")],
        ]);
        let router = router(lister, Arc::default());

        let (status, body) =
            call(&router, Method::GET, "/lambda/discovery/discovered-targets", None).await;

        assert_eq!(status, StatusCode::OK);
        let targets = body["targets"].as_array().unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(
            targets[0]["id"],
            "arn:aws:lambda:eu-central-1:123456789012:function:checkout"
        );
        assert_eq!(targets[1]["attributes"]["aws.lambda.function-name"], json!(["billing"]));
    }

    #[tokio::test]
    async fn test_attack_lifecycle() {
        let store = Arc::new(FakeParameterStore::default());
        let router = router(FakeFunctionLister::default(), store.clone());

        let (status, prepared) = call(
            &router,
            Method::POST,
            "/lambda/actions/inject-failure/prepare",
            Some(json!({
                "config": { "duration": 30000, "statuscode": 500, "rate": 100 },
                "target": {
                    "name": "checkout",
                    "attributes": {
                        "aws.lambda.failure-injection-param": ["/failure-lambda/checkout"]
                    }
                }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &router,
            Method::POST,
            "/lambda/actions/inject-failure/start",
            Some(json!({ "state": prepared["state"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(store.value("/failure-lambda/checkout").is_some());
        assert_eq!(
            store.tags("/failure-lambda/checkout"),
            vec![("created-by".to_string(), "steadybit".to_string())]
        );

        let (status, _) = call(
            &router,
            Method::POST,
            "/lambda/actions/inject-failure/stop",
            Some(json!({ "state": prepared["state"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let router = router(FakeFunctionLister::default(), Arc::default());

        let (status, body) = call(
            &router,
            Method::POST,
            "/lambda/actions/inject-failure/start",
            Some(json!({ "state": "not an object" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["title"], "Failed to parse request body");
        assert!(body["detail"].is_string());
    }
}
