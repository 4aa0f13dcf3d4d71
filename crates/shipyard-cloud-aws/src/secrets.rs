//! シークレットの取得
//!
//! 生成されたAPIサービスが起動時に一度だけ認証情報（モデルハブのトークン等）を
//! 読み込み、明示的に受け渡すためのもの。`shipyard` 本体のデプロイでは使わない。

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use serde_json::{Map, Value};

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// `name` の `SecretString` をそのまま返す
    async fn get_secret_string(&self, name: &str) -> Result<String>;
}

/// AWS Secrets Manager
#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }

    pub fn region(&self) -> Option<&str> {
        self.client.config().region().map(|r| r.as_ref())
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret_string(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_resource_not_found_exception() {
                    CloudError::SecretNotFound(name.to_string())
                } else {
                    CloudError::Api(DisplayErrorContext(&err).to_string())
                }
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| CloudError::SecretMalformed {
                name: name.to_string(),
                message: "secret has no string value".to_string(),
            })
    }
}

fn parse_secret(name: &str, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CloudError::SecretMalformed {
            name: name.to_string(),
            message: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(CloudError::SecretMalformed {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

/// JSONオブジェクト形式のシークレットを読み込む
pub async fn load_secret(store: &dyn SecretStore, name: &str) -> Result<Map<String, Value>> {
    let result = store
        .get_secret_string(name)
        .await
        .and_then(|raw| parse_secret(name, &raw));

    if let Err(e) = &result {
        tracing::error!(">>> Error while reading in secret '{}'. e: {}", name, e);
    }
    result
}

/// JSONオブジェクト形式のシークレットから文字列フィールドを1つ読み込む
pub async fn load_secret_value(store: &dyn SecretStore, name: &str, key: &str) -> Result<String> {
    let secret = load_secret(store, name).await?;
    match secret.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(CloudError::SecretMalformed {
            name: name.to_string(),
            message: format!("missing string field `{}`", key),
        }),
    }
}
