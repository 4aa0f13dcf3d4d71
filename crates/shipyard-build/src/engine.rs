//! コンテナエンジンの抽象化
//!
//! 実装は Bollard 経由の [`crate::DockerEngine`]。パイプラインのテストでは
//! インメモリの実装に差し替える。

use crate::auth::RegistryCredentials;
use crate::error::BuildResult;
use crate::resolver::BuildSpec;
use async_trait::async_trait;

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// tar.gz 化したコンテキストからイメージをビルドし、`spec.image_ref()` でタグ付けする
    async fn build(&self, spec: &BuildSpec, context: Vec<u8>) -> BuildResult<()>;

    /// レジストリにログインする
    ///
    /// 成功した認証情報は以降の push で使われる。Bollard には認証だけを
    /// 確かめる API が無いため、レジストリ側での実際の検証は push 時に行われる。
    async fn login(&mut self, credentials: RegistryCredentials) -> BuildResult<()>;

    /// イメージをプッシュし、プッシュした完全なイメージ名を返す
    async fn push(&self, image: &str, tag: &str) -> BuildResult<String>;

    /// ローカルのイメージを削除する
    async fn remove_image(&self, image: &str, force: bool) -> BuildResult<()>;
}
