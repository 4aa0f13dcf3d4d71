//! shipyard のAWSアクセス
//!
//! - **Parameter Store**: `/{application}/{environment}/config` のデプロイ用メタデータ
//! - **ECR**: 短期のレジストリ認証情報
//! - **Secrets Manager**: 生成されたサービスが起動時に読むJSONシークレット。
//!   デプロイの実行経路では使わないため、クライアントは必要になった時点で作る

pub mod ecr;
pub mod error;
pub mod metadata;
pub mod parameter_store;
pub mod secrets;

pub use ecr::EcrRegistry;
pub use error::{CloudError, Result};
pub use metadata::{RegistryMetadata, fetch_registry_metadata, parameter_key};
pub use parameter_store::{ParameterStore, SsmParameterStore};
pub use secrets::{SecretStore, SecretsManagerStore, load_secret, load_secret_value};

use aws_config::SdkConfig;

/// 同じリージョン・認証チェーンを共有するSDKクライアント
#[derive(Debug, Clone)]
pub struct AwsClients {
    config: SdkConfig,
    pub ssm: aws_sdk_ssm::Client,
    pub ecr: aws_sdk_ecr::Client,
}

impl AwsClients {
    /// `region` でデフォルトの認証チェーンを読み込む
    pub async fn connect(region: &str) -> Self {
        tracing::debug!("Loading AWS config for region {}", region);
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_ssm::config::Region::new(region.to_string()))
            .load()
            .await;

        Self::from_config(config)
    }

    /// 読み込み済みの設定からデプロイに使うクライアントだけを作る
    pub fn from_config(config: SdkConfig) -> Self {
        Self {
            ssm: aws_sdk_ssm::Client::new(&config),
            ecr: aws_sdk_ecr::Client::new(&config),
            config,
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }

    pub fn parameter_store(&self) -> SsmParameterStore {
        SsmParameterStore::new(self.ssm.clone())
    }

    pub fn registry(&self) -> EcrRegistry {
        EcrRegistry::new(self.ecr.clone())
    }

    /// Secrets Manager のクライアントはここで初めて作る
    pub fn secret_store(&self) -> SecretsManagerStore {
        SecretsManagerStore::new(aws_sdk_secretsmanager::Client::new(&self.config))
    }
}
