mod pipeline;

use clap::{ArgAction, Parser};
use colored::Colorize;
use shipyard_build::BuildError;
use shipyard_config::{
    DEFAULT_ENVIRONMENT, DEFAULT_PLATFORM, DEFAULT_REGION, Environment, RawParameters,
    RunParameters, parse_bool_flag,
};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shipyard", version)]
#[command(about = "APIイメージをビルドしてECRリポジトリへプッシュする", long_about = None)]
#[command(next_display_order = None)]
struct Cli {
    /// イメージをリポジトリへプッシュする (yes/no, true/false, t/f, y/n, 1/0)
    #[arg(
        short = 'p',
        long = "push",
        env = "PUSH_TO_REPO",
        value_name = "BOOL",
        action = ArgAction::Set,
        value_parser = parse_bool_flag,
        default_value_t = true
    )]
    push: bool,

    /// 実行後にローカルイメージを削除する (-rmi)
    #[arg(
        long = "remove-image",
        env = "REMOVE_IMAGE",
        value_name = "BOOL",
        action = ArgAction::Set,
        value_parser = parse_bool_flag,
        default_value_t = true
    )]
    remove_image: bool,

    /// アプリケーション名 (-app)
    #[arg(long = "application-name", env = "APPLICATION_NAME", value_name = "NAME")]
    application_name: Option<String>,

    /// デプロイ先の環境 dev | prod (-env)。環境変数 ENV も必須
    #[arg(
        long = "environment-name",
        value_name = "ENV",
        value_parser = str::parse::<Environment>,
        default_value_t = DEFAULT_ENVIRONMENT
    )]
    environment_name: Environment,

    /// AWSリージョン
    #[arg(
        short = 'r',
        long = "region-name",
        env = "REGION_NAME",
        value_name = "REGION",
        default_value = DEFAULT_REGION
    )]
    region_name: String,

    /// ビルド対象のプラットフォーム
    #[arg(long, env = "PLATFORM", value_name = "PLATFORM", default_value = DEFAULT_PLATFORM)]
    platform: String,

    /// ビルドコンテキストのディレクトリ（Dockerfileは assets/Dockerfile）
    #[arg(long, value_name = "DIR", default_value = ".")]
    context: PathBuf,
}

impl Cli {
    fn raw_parameters(&self) -> RawParameters {
        RawParameters {
            application_name: self.application_name.clone(),
            region_name: self.region_name.clone(),
            environment: self.environment_name,
            platform: self.platform.clone(),
            push_to_repo: self.push,
            remove_image: self.remove_image,
        }
    }
}

const LEGACY_FLAGS: [(&str, &str); 3] = [
    ("-rmi", "--remove-image"),
    ("-app", "--application-name"),
    ("-env", "--environment-name"),
];

/// 旧形式の単一ダッシュのフラグを長い形式に置き換える
fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(s) = arg.to_str() else {
                return arg;
            };
            for (legacy, long) in LEGACY_FLAGS {
                if s == legacy {
                    return OsString::from(long);
                }
                if let Some(value) = s.strip_prefix(legacy).and_then(|rest| rest.strip_prefix('='))
                {
                    return OsString::from(format!("{}={}", long, value));
                }
            }
            arg
        })
        .collect()
}

fn print_error(error: &anyhow::Error) {
    let message = match error.downcast_ref::<BuildError>() {
        Some(build) => build.user_message(),
        None => format!("{:#}", error),
    };
    eprintln!("{} {}", "Error:".red().bold(), message);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let params = match RunParameters::resolve(cli.raw_parameters()) {
        Ok(params) => params,
        Err(e) => {
            print_error(&anyhow::Error::from(e));
            std::process::exit(1);
        }
    };

    if let Err(e) = pipeline::run(&params, &cli.context).await {
        print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
