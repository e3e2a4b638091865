#[cfg(test)]
mod tests {
    use crate::ai::{CompletionGateway, CompletionRequest, GatewayError, ImageInput};
    use crate::config::ClientConfig;
    use crate::models::{AlertKind, NewAlert, NewSensorReading};
    use crate::routes;
    use crate::state::AppState;
    use crate::store::{MemoryStore, Store};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Replays canned gateway outcomes in order; records what was asked.
    #[derive(Default)]
    struct ScriptedGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedGateway {
        fn replying(replies: Vec<Result<String, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionGateway for ScriptedGateway {
        async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::NotConfigured))
        }
    }

    fn setup(gateway: Arc<ScriptedGateway>) -> (Router, MemoryStore) {
        let store = MemoryStore::with_default_zones().unwrap();
        let state = AppState::new(Arc::new(store.clone()), gateway, ClientConfig::from_env());
        (routes::app(state), store)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn sample(device: &str, temperature: f64, soil_moisture: f64) -> Value {
        json!({
            "device_id": device,
            "temperature": temperature,
            "humidity": 55.0,
            "soil_moisture": soil_moisture,
            "light_intensity": 900.0
        })
    }

    fn reading(soil_moisture: f64) -> NewSensorReading {
        NewSensorReading {
            device_id: "soil-1".to_string(),
            temperature: 24.0,
            humidity: 50.0,
            soil_moisture,
            light_intensity: 700.0,
            co2_level: Some(410.0),
        }
    }

    #[tokio::test]
    async fn ingest_low_moisture_adds_one_warning() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));

        let (status, body) = send(&app, post_json("/api/sensors-ingest", sample("garden-12", 22.0, 25.0))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["id"].is_string());

        let alerts = store.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "warning");
        assert!(alerts[0].message.contains("garden-12"));
    }

    #[tokio::test]
    async fn ingest_high_temperature_adds_one_warning_and_thresholds_are_exclusive() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));

        send(&app, post_json("/api/sensors-ingest", sample("d1", 35.0, 30.0))).await;
        assert!(store.alerts().is_empty());

        send(&app, post_json("/api/sensors-ingest", sample("d1", 36.5, 60.0))).await;
        let alerts = store.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "warning");
    }

    #[tokio::test]
    async fn sustained_breach_alerts_on_every_sample() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));
        for _ in 0..3 {
            send(&app, post_json("/api/sensors-ingest", sample("d2", 20.0, 10.0))).await;
        }
        assert_eq!(store.alerts().len(), 3);
    }

    #[tokio::test]
    async fn ingest_rejects_missing_fields() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));

        let (status, body) = send(&app, post_json("/api/sensors-ingest", json!({"device_id": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("temperature"));

        let (status, body) = send(
            &app,
            post_json("/api/sensors-ingest", json!({"device_id": "x", "temperature": "hot"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(store.alerts().is_empty());
    }

    #[tokio::test]
    async fn history_returns_window_oldest_first() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));
        let now = Utc::now();
        store.add_reading_at(reading(10.0), now - Duration::days(3)).unwrap();
        store.add_reading_at(reading(20.0), now - Duration::hours(5)).unwrap();
        store.add_reading_at(reading(30.0), now - Duration::hours(1)).unwrap();

        let (status, body) = send(&app, get("/api/sensors-history?range=24h")).await;
        assert_eq!(status, StatusCode::OK);
        let points = body.as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["moisture"], 20.0);
        assert_eq!(points[1]["moisture"], 30.0);
        assert!(points[0]["time"].is_string());
        assert_eq!(points[0]["light"], 700.0);

        let (_, body) = send(&app, get("/api/sensors-history?range=7d")).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn stats_aggregate_recent_activity() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));
        let now = Utc::now();
        store.add_reading_at(reading(40.0), now - Duration::hours(2)).unwrap();
        let mut other = reading(60.0);
        other.device_id = "soil-2".to_string();
        store.add_reading_at(other, now - Duration::hours(1)).unwrap();
        store.add_reading_at(reading(5.0), now - Duration::days(2)).unwrap();

        let (status, body) = send(&app, get("/api/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active_sensors"], 2);
        assert_eq!(body["plants_monitored"], 3);
        assert_eq!(body["avg_soil_moisture"], 50.0);
        assert_eq!(body["water_saved_liters"], 0.0);
    }

    #[tokio::test]
    async fn alerts_list_newest_first_and_mark_read() {
        let (app, _store) = setup(ScriptedGateway::replying(vec![]));
        send(&app, post_json("/api/sensors-ingest", sample("first", 20.0, 10.0))).await;
        send(&app, post_json("/api/sensors-ingest", sample("second", 20.0, 10.0))).await;

        let (status, body) = send(&app, get("/api/alerts")).await;
        assert_eq!(status, StatusCode::OK);
        let alerts = body.as_array().unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0]["message"].as_str().unwrap().contains("second"));
        assert_eq!(alerts[0]["type"], "warning");
        assert_eq!(alerts[0]["time"], "Just now");
        assert_eq!(alerts[0]["read"], false);

        let id = alerts[1]["id"].as_str().unwrap().to_string();
        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/alerts/{}/read", id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, get("/api/alerts")).await;
        assert_eq!(body[1]["read"], true);

        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/alerts/{}/read", uuid::Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn predict_water_uses_model_answer_and_persists() {
        let gateway = ScriptedGateway::replying(vec![Ok(
            "Based on the data: {\"next_watering_hours\": 3.5, \"confidence\": 92, \"recommended_amount_liters\": 1.8}".to_string(),
        )]);
        let (app, store) = setup(gateway.clone());
        store.add_reading_at(reading(42.0), Utc::now()).unwrap();

        let (status, body) = send(&app, get("/api/predict-water")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["next_watering_hours"], 3);
        assert_eq!(body["next_watering_minutes"], 30);
        assert_eq!(body["confidence"], 92.0);
        assert_eq!(body["recommended_amount_liters"], 1.8);
        assert_eq!(body["zone"], "Vegetable Garden");

        let predictions = store.predictions();
        assert_eq!(predictions.len(), 1);
        assert!(!predictions[0].triggered);
        assert!(predictions[0].zone_id.is_some());

        let asked = gateway.requests();
        assert_eq!(asked.len(), 1);
        assert!(asked[0].image.is_none());
        assert!(asked[0].prompt.contains("soil moisture 42%"));
    }

    #[tokio::test]
    async fn predict_water_transport_failure_uses_moisture_buckets() {
        for (moisture, hours) in [(25.0, 2), (40.0, 6), (80.0, 12)] {
            let gateway = ScriptedGateway::replying(vec![Err(GatewayError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })]);
            let (app, store) = setup(gateway);
            store.add_reading_at(reading(moisture), Utc::now()).unwrap();

            let (status, body) = send(&app, Request::post("/api/predict-water").body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["next_watering_hours"], hours);
            assert_eq!(body["next_watering_minutes"], 0);
            assert_eq!(body["confidence"], 70.0);
            assert_eq!(store.predictions().len(), 1, "rule fallback is persisted");
        }
    }

    #[tokio::test]
    async fn predict_water_network_error_also_falls_back_to_rules() {
        let gateway = ScriptedGateway::replying(vec![Err(GatewayError::Network("connection refused".to_string()))]);
        let (app, store) = setup(gateway);
        store.add_reading_at(reading(25.0), Utc::now()).unwrap();

        let (_, body) = send(&app, get("/api/predict-water")).await;
        assert_eq!(body["next_watering_hours"], 2);
        assert_eq!(body["confidence"], 70.0);
    }

    #[tokio::test]
    async fn predict_water_unconfigured_gateway_hits_top_level_fallback() {
        let gateway = ScriptedGateway::replying(vec![Err(GatewayError::NotConfigured)]);
        let (app, store) = setup(gateway);
        store.add_reading_at(reading(25.0), Utc::now()).unwrap();

        let (status, body) = send(&app, get("/api/predict-water")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["confidence"], 50.0);
        assert_eq!(body["next_watering_hours"], 6);
        assert_eq!(body["next_watering_minutes"], 0);
        assert_eq!(body["recommended_amount_liters"], 2.5);
        assert!(body["error"].is_string());
        assert!(store.predictions().is_empty());
    }

    #[tokio::test]
    async fn predict_water_unstructured_answer_uses_defaults() {
        let gateway = ScriptedGateway::replying(vec![Ok("Water it tomorrow morning.".to_string())]);
        let (app, _store) = setup(gateway);

        let (status, body) = send(&app, get("/api/predict-water")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["next_watering_hours"], 6);
        assert_eq!(body["confidence"], 85.0);
        assert_eq!(body["recommended_amount_liters"], 2.5);
    }

    #[tokio::test]
    async fn predict_water_post_selects_zone_from_body() {
        let gateway = ScriptedGateway::replying(vec![Ok("{\"next_watering_hours\": 8}".to_string())]);
        let (app, store) = setup(gateway);
        let zones = store.list_zones().await.unwrap();
        let herb = &zones[1];

        let (status, body) = send(&app, post_json("/api/predict-water", json!({"zone_id": herb.id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["zone"], "Herb Bed");
        assert_eq!(store.predictions()[0].zone_id, Some(herb.id));
    }

    #[tokio::test]
    async fn predict_disease_without_json_still_records_scan() {
        let gateway = ScriptedGateway::replying(vec![Ok("The leaves look a bit yellow, hard to say.".to_string())]);
        let (app, store) = setup(gateway.clone());

        let (status, body) = send(
            &app,
            post_json("/api/predict-disease", json!({"image_url": "https://cdn.example.com/leaf.jpg"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disease_name"], "Unknown");
        assert_eq!(body["confidence"], 75.0);
        assert_eq!(body["is_healthy"], false);

        let scans = store.disease_scans();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].image_ref.as_deref(), Some("https://cdn.example.com/leaf.jpg"));
        assert!(store.alerts().is_empty());

        assert_eq!(
            gateway.requests()[0].image,
            Some(ImageInput::Url("https://cdn.example.com/leaf.jpg".to_string()))
        );
    }

    #[tokio::test]
    async fn predict_disease_severe_result_raises_alert() {
        let gateway = ScriptedGateway::replying(vec![Ok(
            "{\"disease_name\": \"Late Blight\", \"confidence\": 91, \"severity\": \"high\", \"treatment\": \"Apply copper fungicide\", \"is_healthy\": false}".to_string(),
        )]);
        let (app, store) = setup(gateway);

        let (status, body) = send(&app, post_json("/api/predict-disease", json!({"image_base64": "aGVsbG8="}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disease_name"], "Late Blight");
        assert_eq!(body["severity"], "high");

        let alerts = store.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "critical");
        assert!(alerts[0].message.contains("Late Blight"));
        assert_eq!(store.disease_scans()[0].image_ref.as_deref(), Some("inline:image/jpeg:5b"));
    }

    #[tokio::test]
    async fn predict_disease_accepts_multipart_upload() {
        let gateway = ScriptedGateway::replying(vec![Ok(
            "{\"disease_name\": \"Healthy\", \"confidence\": 97, \"severity\": \"low\", \"is_healthy\": true}".to_string(),
        )]);
        let (app, store) = setup(gateway.clone());

        let boundary = "leafwatchboundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"leaf.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/predict-disease")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_healthy"], true);
        assert_eq!(store.disease_scans().len(), 1);
        assert!(store.alerts().is_empty());

        match &gateway.requests()[0].image {
            Some(ImageInput::Base64 { mime_type, .. }) => assert_eq!(mime_type, "image/png"),
            other => panic!("expected inline image, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn predict_disease_quota_errors_keep_their_status() {
        let gateway = ScriptedGateway::replying(vec![
            Err(GatewayError::RateLimited),
            Err(GatewayError::PaymentRequired),
        ]);
        let (app, store) = setup(gateway);
        let payload = json!({"image_url": "https://cdn.example.com/leaf.jpg"});

        let (status, body) = send(&app, post_json("/api/predict-disease", payload.clone())).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, post_json("/api/predict-disease", payload)).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert!(store.disease_scans().is_empty());
    }

    #[tokio::test]
    async fn predict_disease_other_failures_return_analysis_failed() {
        let gateway = ScriptedGateway::replying(vec![Err(GatewayError::Network("timeout".to_string()))]);
        let (app, store) = setup(gateway);

        let (status, body) = send(
            &app,
            post_json("/api/predict-disease", json!({"image_url": "https://cdn.example.com/leaf.jpg"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["disease_name"], "Analysis Failed");
        assert_eq!(body["confidence"], 0.0);
        assert_eq!(body["is_healthy"], false);
        assert!(store.disease_scans().is_empty());
    }

    #[tokio::test]
    async fn predict_disease_without_image_is_bad_request() {
        let (app, _store) = setup(ScriptedGateway::replying(vec![]));
        let (status, body) = send(&app, post_json("/api/predict-disease", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No image provided");
    }

    #[tokio::test]
    async fn water_trigger_unknown_zone_still_succeeds() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));
        let unknown = uuid::Uuid::new_v4();

        let (status, body) = send(&app, post_json("/api/water-trigger", json!({"zone_id": unknown}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("zone_name").is_none());
        assert_eq!(store.alerts().len(), 1);
    }

    #[tokio::test]
    async fn water_trigger_twice_writes_two_success_alerts() {
        let gateway = ScriptedGateway::replying(vec![Ok("{\"next_watering_hours\": 4, \"recommended_amount_liters\": 3}".to_string())]);
        let (app, store) = setup(gateway);
        let zone = store.list_zones().await.unwrap()[0].clone();

        send(&app, post_json("/api/predict-water", json!({"zone_id": zone.id}))).await;

        for _ in 0..2 {
            let (status, body) = send(&app, post_json("/api/water-trigger", json!({"zone_id": zone.id}))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["zone_name"], "Vegetable Garden");
        }

        let alerts = store.alerts();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.alert_type == "success"));
        assert!(store.predictions()[0].triggered);

        let (_, stats) = send(&app, get("/api/stats")).await;
        assert_eq!(stats["water_saved_liters"], 0.9);
    }

    #[tokio::test]
    async fn water_trigger_requires_zone_id() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));
        let (status, _) = send(&app, post_json("/api/water-trigger", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, post_json("/api/water-trigger", json!({"zone_id": "zone-1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(store.alerts().is_empty());
    }

    #[tokio::test]
    async fn zones_show_latest_moisture_and_schedule() {
        let gateway = ScriptedGateway::replying(vec![Ok("{\"next_watering_hours\": 1.5}".to_string())]);
        let (app, store) = setup(gateway);
        store.add_reading_at(reading(22.0), Utc::now()).unwrap();
        send(&app, get("/api/predict-water")).await;

        let (status, body) = send(&app, get("/api/zones")).await;
        assert_eq!(status, StatusCode::OK);
        let zones = body.as_array().unwrap();
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0]["name"], "Vegetable Garden");
        assert_eq!(zones[0]["next_water"], "1h 30m");
        assert_eq!(zones[0]["status"], "dry");
        assert_eq!(zones[0]["moisture"], 22.0);
        assert_eq!(zones[0]["soil_type"], "loam");
        assert_eq!(zones[1]["next_water"], "Not scheduled");
    }

    #[tokio::test]
    async fn profile_round_trip_through_api() {
        let (app, _store) = setup(ScriptedGateway::replying(vec![]));

        let (status, _) = send(&app, get("/api/profiles/user-9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let req = Request::builder()
            .method(Method::PUT)
            .uri("/api/profiles/user-9")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"display_name": "Kai", "alert_sms": true}).to_string()))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display_name"], "Kai");
        assert_eq!(body["alert_sms"], true);

        let (status, body) = send(&app, get("/api/profiles/user-9")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "user-9");
    }

    #[tokio::test]
    async fn client_config_and_ping_are_served() {
        let (app, _store) = setup(ScriptedGateway::replying(vec![]));

        let (status, body) = send(&app, get("/api/client-config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["onboarding_steps"], json!(["language", "role", "confirmation"]));

        let (status, body) = send(&app, get("/api/ping")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn cors_preflight_is_open() {
        let (app, _store) = setup(ScriptedGateway::replying(vec![]));
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/sensors-ingest")
            .header(header::ORIGIN, "https://dashboard.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn predict_water_empty_answer_uses_defaults_and_persists() {
        let gateway = ScriptedGateway::replying(vec![Ok(String::new())]);
        let (app, store) = setup(gateway);

        let (status, body) = send(&app, get("/api/predict-water")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["next_watering_hours"], 6);
        assert_eq!(body["confidence"], 85.0);
        assert_eq!(body["recommended_amount_liters"], 2.5);
        assert_eq!(store.predictions().len(), 1);
    }

    #[tokio::test]
    async fn predict_disease_empty_answer_still_records_scan() {
        let gateway = ScriptedGateway::replying(vec![Ok(String::new())]);
        let (app, store) = setup(gateway);

        let (status, body) = send(
            &app,
            post_json("/api/predict-disease", json!({"image_url": "https://cdn.example.com/leaf.jpg"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disease_name"], "Unknown");
        assert_eq!(body["confidence"], 75.0);
        assert_eq!(body["is_healthy"], false);
        assert_eq!(store.disease_scans().len(), 1);
        assert!(store.alerts().is_empty());
    }

    #[tokio::test]
    async fn predict_water_keeps_unknown_zone_id() {
        let gateway = ScriptedGateway::replying(vec![Ok("{\"next_watering_hours\": 5}".to_string())]);
        let (app, store) = setup(gateway);
        let unknown = uuid::Uuid::new_v4();

        let (status, body) = send(&app, post_json("/api/predict-water", json!({"zone_id": unknown}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["zone"], "Main Garden");
        assert_eq!(store.predictions()[0].zone_id, Some(unknown));

        let (status, _) = send(&app, post_json("/api/water-trigger", json!({"zone_id": unknown}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(store.predictions()[0].triggered);
    }

    #[tokio::test]
    async fn alerts_list_is_capped_at_twenty_newest() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));
        for i in 0..25 {
            store
                .insert_alert(NewAlert::new(AlertKind::Info, format!("alert {}", i)))
                .await
                .unwrap();
        }

        let (status, body) = send(&app, get("/api/alerts")).await;
        assert_eq!(status, StatusCode::OK);
        let alerts = body.as_array().unwrap();
        assert_eq!(alerts.len(), 20);
        assert_eq!(alerts[0]["message"], "alert 24");
        assert_eq!(alerts[19]["message"], "alert 5");
    }

    #[tokio::test]
    async fn history_is_capped_at_newest_five_hundred() {
        let (app, store) = setup(ScriptedGateway::replying(vec![]));
        let now = Utc::now();
        for i in 0..510 {
            store
                .add_reading_at(reading(i as f64), now - Duration::minutes(600 - i))
                .unwrap();
        }

        let (status, body) = send(&app, get("/api/sensors-history?range=24h")).await;
        assert_eq!(status, StatusCode::OK);
        let points = body.as_array().unwrap();
        assert_eq!(points.len(), 500);
        assert_eq!(points[0]["moisture"], 10.0);
        assert_eq!(points[499]["moisture"], 509.0);
    }

    /// Needs a reachable Postgres in DATABASE_URL.
    #[tokio::test]
    #[ignore]
    async fn postgres_store_round_trip() {
        use crate::db;
        use crate::store::PgStore;

        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::init_pool(&database_url).await.expect("Failed to create pool");
        db::init_database(&pool).await.expect("Failed to migrate");
        let store = PgStore::new(pool.clone());

        let id = store.insert_reading(reading(12.0)).await.unwrap();
        let latest = store.latest_readings(1).await.unwrap();
        assert_eq!(latest[0].id, id);

        let alert_id = store
            .insert_alert(NewAlert::new(AlertKind::Info, "integration test"))
            .await
            .unwrap();
        assert!(store.mark_alert_read(alert_id).await.unwrap());
        assert!(store.count_zones().await.unwrap() >= 3);

        let _ = sqlx::query("DELETE FROM sensor_readings WHERE id = $1").bind(id).execute(&pool).await;
        let _ = sqlx::query("DELETE FROM alerts WHERE id = $1").bind(alert_id).execute(&pool).await;
    }
}
