//! 実行パラメータの解決
//!
//! コマンドライン層で確定した値に必須項目のチェックをかけ、1回の実行で
//! 使うパラメータを確定させます。

use crate::error::{ConfigError, Result};
use crate::flag::Environment;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_PLATFORM: &str = "linux/amd64";
pub const DEFAULT_ENVIRONMENT: Environment = Environment::Prod;

/// デプロイ先環境を指定する環境変数（値は使わず、存在だけを確認する）
pub const ENVIRONMENT_VAR: &str = "ENV";

/// コマンドライン層で確定した値
///
/// 環境変数へのフォールバックとデフォルト値はコマンドライン層（clap の
/// `env` / `default_value`）で適用済み。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameters {
    pub application_name: Option<String>,
    pub region_name: String,
    pub environment: Environment,
    pub platform: String,
    pub push_to_repo: bool,
    pub remove_image: bool,
}

impl Default for RawParameters {
    fn default() -> Self {
        Self {
            application_name: None,
            region_name: DEFAULT_REGION.to_string(),
            environment: DEFAULT_ENVIRONMENT,
            platform: DEFAULT_PLATFORM.to_string(),
            push_to_repo: true,
            remove_image: true,
        }
    }
}

/// 解決済みの実行パラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParameters {
    pub application_name: String,
    pub region_name: String,
    pub environment: Environment,
    pub platform: String,
    pub push_to_repo: bool,
    pub remove_image: bool,
}

impl RunParameters {
    /// プロセスの環境変数を使って解決
    pub fn resolve(raw: RawParameters) -> Result<Self> {
        Self::resolve_with(raw, |key| std::env::var(key).ok())
    }

    /// 任意の環境変数ルックアップを使って解決
    ///
    /// `ENV` は `--environment-name` の有無に関わらず必須。値はデプロイ先の
    /// 決定には使わない。
    pub fn resolve_with<F>(raw: RawParameters, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup(ENVIRONMENT_VAR).is_none() {
            return Err(ConfigError::MissingEnvironment);
        }

        let application_name = raw
            .application_name
            .ok_or(ConfigError::MissingParameter("application_name"))?;

        Ok(Self {
            application_name,
            region_name: raw.region_name,
            environment: raw.environment,
            platform: raw.platform,
            push_to_repo: raw.push_to_repo,
            remove_image: raw.remove_image,
        })
    }

    /// キー名でソートした (キー, 値) の一覧
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("application_name", self.application_name.clone()),
            ("region_name", self.region_name.clone()),
            ("environment", self.environment.to_string()),
            ("platform", self.platform.clone()),
            ("push_to_repo", self.push_to_repo.to_string()),
            ("remove_image", self.remove_image.to_string()),
        ];
        entries.sort_by_key(|(key, _)| *key);
        entries
    }

    /// パラメータ一覧のバナー文字列
    pub fn banner(&self) -> String {
        let rule = "-".repeat(50);
        let mut msg = format!("{}\n\t---- INPUT PARAMETERS ----\n\n", rule);
        for (key, value) in self.entries() {
            msg.push_str(&format!("\t>>> {} : {}\n", key, value));
        }
        msg.push_str(&format!("\n{}\n", rule));
        msg
    }

    /// パラメータ一覧をログに出力
    pub fn show(&self) {
        tracing::info!("\n{}", self.banner());
    }
}
