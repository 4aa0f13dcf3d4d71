//! パラメータストアに保存されたコンテナレジストリのメタデータ

use crate::error::{CloudError, Result};
use crate::parameter_store::ParameterStore;
use serde::Deserialize;
use serde_json::Value;

/// インフラ設定に必須のフィールド
pub const REQUIRED_FIELDS: [&str; 3] = ["ecr_repo", "ecr_registry_id", "ecr_repository_name"];

/// イメージのプッシュ先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryMetadata {
    /// リポジトリの完全なURI（`ecr_repo`）。イメージ名として使う
    pub repository_uri: String,
    /// レジストリのアカウントID（`ecr_registry_id`）
    pub registry_id: String,
    /// リポジトリ名（`ecr_repository_name`）
    pub repository_name: String,
}

/// アプリケーションのインフラ設定を保持するパラメータキー
pub fn parameter_key(application_name: &str, environment: &str) -> String {
    format!("/{}/{}/config", application_name, environment)
}

/// パラメータストアのレコード（その他のインフラ項目は無視）
#[derive(Debug, Deserialize)]
struct StoredConfig {
    ecr_repo: Option<Scalar>,
    ecr_registry_id: Option<Scalar>,
    ecr_repository_name: Option<Scalar>,
}

/// IDは数値で保存されていることがある
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

impl RegistryMetadata {
    /// `key` に保存されたJSONレコードをパース
    pub fn parse(key: &str, raw: &str) -> Result<Self> {
        let malformed = |message: String| CloudError::MetadataMalformed {
            key: key.to_string(),
            message,
        };

        let value: Value =
            serde_json::from_str(raw).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(malformed("expected a JSON object".to_string()));
        }
        let stored: StoredConfig = serde_json::from_value(value)
            .map_err(|e| malformed(format!("unexpected field type: {}", e)))?;

        let field = |name: &str, value: Option<Scalar>| {
            value
                .map(Scalar::into_string)
                .ok_or_else(|| malformed(format!("missing field `{}`", name)))
        };

        Ok(Self {
            repository_uri: field(REQUIRED_FIELDS[0], stored.ecr_repo)?,
            registry_id: field(REQUIRED_FIELDS[1], stored.ecr_registry_id)?,
            repository_name: field(REQUIRED_FIELDS[2], stored.ecr_repository_name)?,
        })
    }
}

/// `environment` における `application_name` のレジストリメタデータを取得
///
/// 復号ありで1回だけ問い合わせる。失敗してもリトライしない。
pub async fn fetch_registry_metadata(
    store: &dyn ParameterStore,
    application_name: &str,
    environment: &str,
) -> Result<RegistryMetadata> {
    let key = parameter_key(application_name, environment);

    tracing::info!(">>> Environment: `{}`", environment);
    tracing::info!(">>> Reading `{}` SSM Parameter", key);

    let raw = store
        .get_parameter(&key, true)
        .await
        .map_err(|e| match e {
            CloudError::ParameterNotFound(_) | CloudError::DecryptionFailed { .. } => {
                CloudError::MetadataNotFound {
                    key: key.clone(),
                    message: e.to_string(),
                }
            }
            other => other,
        })?;

    let metadata = RegistryMetadata::parse(&key, &raw)?;

    tracing::info!(">>       `ecr_repo` : `{}`", metadata.repository_uri);
    tracing::info!(">>       `ecr_registry_id` : `{}`", metadata.registry_id);
    tracing::info!(">>       `ecr_repository_name` : `{}`", metadata.repository_name);

    Ok(metadata)
}
