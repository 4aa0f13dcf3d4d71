//! パラメータストア（リモートのキー・バリュー設定）

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};

/// パラメータストアの読み取り
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// `name` に保存された値を取得
    ///
    /// キーが無ければ [`CloudError::ParameterNotFound`]、SecureString を
    /// 復号できなければ [`CloudError::DecryptionFailed`] を返す。
    async fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<String>;
}

/// AWS Systems Manager パラメータストア
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<String> {
        tracing::debug!("GetParameter name={} with_decryption={}", name, with_decryption);

        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(with_decryption)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_parameter_not_found() {
                    CloudError::ParameterNotFound(name.to_string())
                } else if err.is_invalid_key_id() || err.code().is_some_and(|c| c.contains("KMS")) {
                    CloudError::DecryptionFailed {
                        name: name.to_string(),
                        message: DisplayErrorContext(&err).to_string(),
                    }
                } else {
                    CloudError::Api(DisplayErrorContext(&err).to_string())
                }
            })?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| CloudError::ParameterNotFound(name.to_string()))
    }
}
