use std::env;
use chrono_tz::Tz;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub public_base_url: String,   // Base for gateway callback URLs
    pub frontend_url: String,      // Base for success / failure pages
    pub business_timezone: Tz,
    pub pending_booking_ttl_secs: i64,
    pub pending_sweep_interval_secs: u64,
    pub payment_gateway_url: String,
    pub payment_terminal: String,
    pub payment_user: String,
    pub payment_password: String,
    pub payment_shop_no: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub jwt_public_key: String, // Ed25519 public key (PEM) of the identity provider
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            business_timezone: env::var("BUSINESS_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Jerusalem".to_string())
                .parse()
                .expect("BUSINESS_TIMEZONE must be an IANA zone name"),
            pending_booking_ttl_secs: env::var("PENDING_BOOKING_TTL_SECS").unwrap_or_else(|_| "900".to_string()).parse().expect("PENDING_BOOKING_TTL_SECS must be a number"),
            pending_sweep_interval_secs: env::var("PENDING_SWEEP_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string()).parse().expect("PENDING_SWEEP_INTERVAL_SECS must be a number"),
            payment_gateway_url: env::var("PAYMENT_GATEWAY_URL").unwrap_or_else(|_| "https://gateway21.pelecard.biz/PaymentGW".to_string()),
            payment_terminal: env::var("PAYMENT_TERMINAL").expect("PAYMENT_TERMINAL must be set"),
            payment_user: env::var("PAYMENT_USER").expect("PAYMENT_USER must be set"),
            payment_password: env::var("PAYMENT_PASSWORD").expect("PAYMENT_PASSWORD must be set"),
            payment_shop_no: env::var("PAYMENT_SHOP_NO").unwrap_or_else(|_| "001".to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
        }
    }

    pub fn pending_booking_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.pending_booking_ttl_secs)
    }

    pub fn payment_callback_url(&self) -> String {
        format!("{}/api/v1/payment/callback", self.public_base_url.trim_end_matches('/'))
    }
}
