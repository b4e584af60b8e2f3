use crate::domain::ports::{PaymentGateway, PaymentInit};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

/// Hosted payment page client. `init` creates the page, `verify` confirms a finished
/// transaction server-to-server.
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    terminal: String,
    user: String,
    password: String,
    shop_no: String,
}

pub struct GatewayCredentials {
    pub terminal: String,
    pub user: String,
    pub password: String,
    pub shop_no: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: String, credentials: GatewayCredentials) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            terminal: credentials.terminal,
            user: credentials.user,
            password: credentials.password,
            shop_no: credentials.shop_no,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitPayload<'a> {
    #[serde(rename = "terminal")]
    terminal: &'a str,
    #[serde(rename = "user")]
    user: &'a str,
    #[serde(rename = "password")]
    password: &'a str,
    #[serde(rename = "GoodURL")]
    good_url: &'a str,
    #[serde(rename = "ErrorURL")]
    error_url: &'a str,
    action_type: &'static str,
    currency: &'static str,
    total: String,
    shop_no: &'a str,
    user_key: &'a str,
    param_x: &'a str,
    max_payments: &'static str,
    min_payments: &'static str,
    #[serde(rename = "Cvv2Field")]
    cvv2_field: &'static str,
    feedback_data_transfer_method: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct VerifyPayload<'a> {
    confirmation_key: &'a str,
    unique_key: &'a str,
    #[serde(rename = "TotalX100")]
    total_x100: String,
}

#[derive(Deserialize)]
struct InitResponse {
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "Error")]
    error: Option<InitError>,
}

#[derive(Deserialize)]
struct InitError {
    #[serde(rename = "ErrCode")]
    code: i64,
    #[serde(rename = "ErrMsg")]
    message: Option<String>,
}

/// Last 19 characters, the longest reference the gateway echoes on receipts.
fn param_x(correlation_key: &str) -> &str {
    let start = correlation_key.char_indices().rev().nth(18).map_or(0, |(i, _)| i);
    &correlation_key[start..]
}

pub(crate) fn parse_init_response(raw: &str) -> Result<String, AppError> {
    let data: InitResponse = serde_json::from_str(raw)
        .map_err(|_| AppError::Upstream(format!("Gateway returned non-JSON init response: {}", raw)))?;
    if let Some(err) = data.error
        && err.code != 0
    {
        return Err(AppError::Upstream(format!(
            "Gateway init error {}: {}",
            err.code,
            err.message.unwrap_or_default()
        )));
    }
    data.url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Upstream("Gateway did not return a payment URL".into()))
}

/// The validation endpoint answers with a bare `1`/`0`, sometimes quoted, or a JSON status object.
pub(crate) fn parse_verify_response(raw: &str) -> bool {
    let trimmed = raw.trim();
    match trimmed {
        "1" | "\"1\"" => return true,
        "0" | "\"0\"" => return false,
        _ => {}
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) else {
        error!("Could not parse gateway validation response: {}", raw);
        return false;
    };
    let code = ["StatusCode", "statusCode", "Result", "result"]
        .iter()
        .find_map(|k| map.get(*k));
    match code {
        Some(Value::String(s)) => s == "1" || s == "000",
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn init(&self, request: &PaymentInit) -> Result<String, AppError> {
        let payload = InitPayload {
            terminal: &self.terminal,
            user: &self.user,
            password: &self.password,
            good_url: &request.good_url,
            error_url: &request.error_url,
            action_type: "J4",
            currency: "1",
            total: request.amount_minor.to_string(),
            shop_no: &self.shop_no,
            user_key: &request.correlation_key,
            param_x: param_x(&request.correlation_key),
            max_payments: "1",
            min_payments: "1",
            cvv2_field: "must",
            feedback_data_transfer_method: "GET",
        };

        let res = self.client.post(format!("{}/init", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment gateway connection error: {}", e);
                error!("{}", msg);
                AppError::Upstream(msg)
            })?;

        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        debug!(http_status = %status, "Gateway init response: {}", text);
        if !status.is_success() {
            return Err(AppError::Upstream(format!("Gateway init failed. Status: {}, Body: {}", status, text)));
        }
        parse_init_response(&text)
    }

    async fn verify(&self, confirmation_key: &str, correlation_key: &str, amount_minor: i64) -> Result<bool, AppError> {
        let payload = VerifyPayload {
            confirmation_key,
            unique_key: correlation_key,
            total_x100: amount_minor.to_string(),
        };

        let res = self.client.post(format!("{}/ValidateByUniqueKey", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment gateway connection error: {}", e);
                error!("{}", msg);
                AppError::Upstream(msg)
            })?;

        if !res.status().is_success() {
            return Err(AppError::Upstream(format!("Gateway validation failed. Status: {}", res.status())));
        }
        let text = res.text().await.unwrap_or_default();
        debug!("Gateway validation response: {}", text);
        Ok(parse_verify_response(&text))
    }
}
