#![allow(dead_code)]

use studio_booking::{
    api::{extractors::auth::TOKEN_AUDIENCE, router::create_router},
    state::{AppState, Ports},
    config::Config,
    domain::models::auth::{Claims, Role},
    domain::models::booking::{ActivityType, Booking},
    domain::models::interval::Interval,
    domain::models::pending_booking::{NewPendingBookingParams, PendingBooking},
    domain::models::resource::{NewResourceParams, PriceTier, Resource},
    domain::ports::{EmailService, PaymentGateway, PaymentInit},
    infra::factory::{load_templates, sqlite_ports},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::Value;

pub const PAYMENT_PAGE: &str = "https://pay.test/hosted";
pub const FRONTEND: &str = "http://frontend.test";

#[derive(Debug, Clone)]
pub struct VerifyCall {
    pub confirmation_key: String,
    pub correlation_key: String,
    pub amount_minor: i64,
}

pub struct MockPaymentGateway {
    pub verify_result: AtomicBool,
    pub fail_init: AtomicBool,
    pub init_calls: Mutex<Vec<PaymentInit>>,
    pub verify_calls: Mutex<Vec<VerifyCall>>,
}

impl MockPaymentGateway {
    fn new() -> Self {
        Self {
            verify_result: AtomicBool::new(true),
            fail_init: AtomicBool::new(false),
            init_calls: Mutex::new(Vec::new()),
            verify_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn init(&self, request: &PaymentInit) -> Result<String, AppError> {
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("gateway down".into()));
        }
        self.init_calls.lock().unwrap().push(request.clone());
        Ok(format!("{}?key={}", PAYMENT_PAGE, request.correlation_key))
    }

    async fn verify(&self, confirmation_key: &str, correlation_key: &str, amount_minor: i64) -> Result<bool, AppError> {
        self.verify_calls.lock().unwrap().push(VerifyCall {
            confirmation_key: confirmation_key.to_string(),
            correlation_key: correlation_key.to_string(),
            amount_minor,
        });
        Ok(self.verify_result.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: Option<String>,
}

pub struct MockEmailService {
    pub fail: AtomicBool,
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("mail relay down".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachment_name: attachment_name.map(str::to_string),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub gateway: Arc<MockPaymentGateway>,
    pub mailer: Arc<MockEmailService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            public_base_url: "http://api.test".to_string(),
            frontend_url: FRONTEND.to_string(),
            business_timezone: chrono_tz::Asia::Jerusalem,
            pending_booking_ttl_secs: 900,
            pending_sweep_interval_secs: 60,
            payment_gateway_url: "http://gateway.test".to_string(),
            payment_terminal: "0000000".to_string(),
            payment_user: "tester".to_string(),
            payment_password: "secret".to_string(),
            payment_shop_no: "001".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            jwt_public_key: include_str!("keys/test_public.pem").to_string(),
        };

        let gateway = Arc::new(MockPaymentGateway::new());
        let mailer = Arc::new(MockEmailService { fail: AtomicBool::new(false), sent: Mutex::new(Vec::new()) });

        let ports = Ports {
            payment_gateway: gateway.clone(),
            email_service: mailer.clone(),
            ..sqlite_ports(&pool, &config)
        };
        let state = Arc::new(AppState::new(config, ports, load_templates()));
        let router = create_router(state.clone());

        Self { router, pool, db_filename, state, gateway, mailer }
    }

    pub fn token(&self, user_id: &str, role: Role) -> String {
        self.token_with_csrf(user_id, role, None)
    }

    pub fn token_with_csrf(&self, user_id: &str, role: Role, csrf: Option<&str>) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            iss: "identity.test".to_string(),
            sub: user_id.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp: now + 3600,
            iat: now,
            role,
            email: Some(format!("{}@example.com", user_id)),
            name: Some(format!("User {}", user_id)),
            csrf: csrf.map(str::to_string),
        };
        let key = EncodingKey::from_ed_pem(include_bytes!("keys/test_private.pem")).unwrap();
        encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    pub fn customer(&self, user_id: &str) -> String {
        self.token(user_id, Role::Customer)
    }

    pub fn admin(&self) -> String {
        self.token("admin-1", Role::Admin)
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    /// Hits the gateway redirect endpoint and returns the `Location` it sends the browser to.
    pub async fn callback(&self, query: &str) -> String {
        let response = self.router.clone().oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/payment/callback?{}", query))
                .body(Body::empty())
                .unwrap()
        ).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string()
    }

    pub async fn seed_resource(&self, name: &str) -> Resource {
        let resource = Resource::new(NewResourceParams {
            name: name.to_string(),
            description: None,
            address: Some("1 Test Street".to_string()),
            capacity: 20,
            open_time: "09:00".to_string(),
            close_time: "22:00".to_string(),
            pricing: vec![
                PriceTier { min_participants: 1, max_participants: Some(5), activity_type: ActivityType::Rehearsal, commercial: false, price_per_hour: 10_000 },
                PriceTier { min_participants: 6, max_participants: None, activity_type: ActivityType::Rehearsal, commercial: false, price_per_hour: 15_000 },
                PriceTier { min_participants: 1, max_participants: None, activity_type: ActivityType::Lesson, commercial: false, price_per_hour: 9_950 },
            ],
        });
        self.state.resource_repo.create(&resource).await.unwrap()
    }

    /// Posts a 3-person rehearsal reservation on behalf of `token`.
    pub async fn reserve(&self, token: &str, resource_id: &str, date: &str, start: &str, hours: f64) -> (StatusCode, Value) {
        self.request("POST", "/api/v1/bookings", Some(token), Some(serde_json::json!({
            "resource_id": resource_id,
            "date": date,
            "start_time": start,
            "hours": hours,
            "participants": 3,
            "activity_type": "rehearsal",
        }))).await
    }

    pub async fn pay(&self, pending_id: &str) -> String {
        self.callback(&format!(
            "PelecardStatusCode=000&ConfirmationKey=conf-{0}&UserKey={0}&PelecardTransactionId=tx-{0}",
            pending_id
        )).await
    }

    /// An unsaved 3-person rehearsal draft at the seeded hourly rate.
    pub fn draft(&self, resource_id: &str, user_id: &str, start: DateTime<Utc>, minutes: i64) -> PendingBooking {
        PendingBooking::new(NewPendingBookingParams {
            resource_id: resource_id.to_string(),
            user_id: user_id.to_string(),
            customer_name: Some("Seeded Customer".to_string()),
            customer_email: Some(format!("{}@example.com", user_id)),
            interval: Interval::starting_at(start, minutes).unwrap(),
            participants: 3,
            activity_type: ActivityType::Rehearsal,
            is_commercial: false,
            price_per_hour: 10_000,
            total_price: 10_000 * minutes / 60,
            notes: None,
        }, Utc::now())
    }

    /// Writes a paid, confirmed booking straight to the store, bypassing the payment round-trip.
    pub async fn insert_booking(&self, resource_id: &str, user_id: &str, start: DateTime<Utc>, minutes: i64) -> Booking {
        let pending = self.draft(resource_id, user_id, start, minutes);
        let booking = Booking::confirmed_from(&pending, Some("seed-tx".to_string()), Utc::now());
        self.state.booking_repo.insert_if_free(&booking, None).await.unwrap().expect("slot should be free")
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await.unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// A `weekday` at least a week ahead, as `YYYY-MM-DD`.
pub fn upcoming(weekday: Weekday) -> String {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date.format("%Y-%m-%d").to_string()
}

pub fn booking_id_from(location: &str) -> String {
    location.split("bookingId=").nth(1).expect("success redirect").to_string()
}
