//! ECR の認可トークン取得

use async_trait::async_trait;
use aws_sdk_ecr::error::DisplayErrorContext;
use shipyard_build::{BuildError, BuildResult, CredentialSource, RegistryCredentials};

const REGISTRY_NAME: &str = "ecr";

/// `GetAuthorizationToken` で短期のレジストリ認証情報を発行する
#[derive(Debug, Clone)]
pub struct EcrRegistry {
    client: aws_sdk_ecr::Client,
}

impl EcrRegistry {
    pub fn new(client: aws_sdk_ecr::Client) -> Self {
        Self { client }
    }
}

fn auth_failed(message: impl Into<String>) -> BuildError {
    BuildError::AuthFailed {
        registry: REGISTRY_NAME.to_string(),
        message: message.into(),
    }
}

#[async_trait]
impl CredentialSource for EcrRegistry {
    async fn registry_credentials(&self) -> BuildResult<RegistryCredentials> {
        let output = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| auth_failed(DisplayErrorContext(&e).to_string()))?;

        let data = output
            .authorization_data()
            .first()
            .ok_or_else(|| auth_failed("GetAuthorizationToken returned no authorization data"))?;

        let token = data
            .authorization_token()
            .ok_or_else(|| auth_failed("authorization token is missing"))?;
        let endpoint = data
            .proxy_endpoint()
            .ok_or_else(|| auth_failed("proxy endpoint is missing"))?;

        tracing::debug!("Received registry token for {}", endpoint);
        RegistryCredentials::from_token(token, endpoint)
    }
}
