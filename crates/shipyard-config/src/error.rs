use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "環境変数 ENV が設定されていません。\n\
        デプロイ先の環境名を指定してください（例: ENV=dev）"
    )]
    MissingEnvironment,

    #[error("Boolean value expected, got '{0}' (yes/no, true/false, t/f, y/n, 1/0)")]
    InvalidBooleanArgument(String),

    #[error("Invalid environment '{0}' (expected one of: dev, prod)")]
    InvalidEnvironment(String),

    #[error(
        "パラメータ '{0}' が指定されていません。\n\
        コマンドライン引数、または大文字の環境変数で指定してください"
    )]
    MissingParameter(&'static str),

    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
