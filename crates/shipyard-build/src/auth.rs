//! レジストリ認証処理
//!
//! レジストリが発行する短期トークンをデコードし、Bollard の DockerCredentials に変換します。

use crate::error::{BuildError, BuildResult};
use async_trait::async_trait;
use base64::Engine;
use bollard::auth::DockerCredentials;

/// レジストリのログイン情報
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
    /// ログイン先のエンドポイント（例: https://123.dkr.ecr.us-west-2.amazonaws.com）
    pub server_address: String,
}

// パスワードはログに出さない
impl std::fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("server_address", &self.server_address)
            .finish()
    }
}

impl RegistryCredentials {
    /// Base64エンコードされた "username:password" トークンをデコード
    ///
    /// # Arguments
    /// * `token_b64` - レジストリが返した認可トークン
    /// * `endpoint` - ログイン先のエンドポイント
    pub fn from_token(token_b64: &str, endpoint: &str) -> BuildResult<Self> {
        let auth_failed = |message: String| BuildError::AuthFailed {
            registry: endpoint.to_string(),
            message,
        };

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token_b64.trim())
            .map_err(|e| auth_failed(format!("Failed to decode token: {}", e)))?;

        let auth_str = String::from_utf8(decoded)
            .map_err(|e| auth_failed(format!("Invalid UTF-8 in token: {}", e)))?;

        let (username, password) = auth_str
            .split_once(':')
            .ok_or_else(|| auth_failed("Token is not in 'username:password' form".to_string()))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            server_address: endpoint.to_string(),
        })
    }

    /// Bollard 用の認証情報に変換
    pub fn to_docker_credentials(&self) -> DockerCredentials {
        DockerCredentials {
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
            serveraddress: Some(self.server_address.clone()),
            ..Default::default()
        }
    }
}

/// 短期のレジストリ認証情報を払い出すサービス
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// 認可トークンを取得してログイン情報に変換
    async fn registry_credentials(&self) -> BuildResult<RegistryCredentials>;
}
