use crate::error::{ConfigError, Result};
use std::collections::HashSet;

/// 実行前に必須の環境変数が定義されているか確認
///
/// 環境変数名は小文字に揃えて比較する。未定義のものは個別に警告を出した上で
/// [`ConfigError::MissingVariables`] を返す。
pub fn check_environment_variables(required: &[&str]) -> Result<()> {
    let defined: HashSet<String> = std::env::vars_os()
        .filter_map(|(key, _)| key.into_string().ok())
        .map(|key| key.to_lowercase())
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|name| !defined.contains(&name.to_lowercase()))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    for name in &missing {
        tracing::warn!(">>> `{}` is not defined!!", name);
    }
    Err(ConfigError::MissingVariables(missing))
}
