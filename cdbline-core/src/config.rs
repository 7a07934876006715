//! ドライバ設定

use cdbline_wire::Framing;
use std::path::PathBuf;

/// ドライバ設定
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    /// 開始時に `g` を送らない
    pub do_not_run: bool,
    /// シンボル・ソースの検索ディレクトリ
    pub directories: Vec<String>,
    /// デバッガ起動前に移る作業ディレクトリ
    pub working_dir: Option<PathBuf>,
    /// 出力断片の区切り方
    pub framing: Framing,
}

impl DriverConfig {
    /// 既定の設定を作成する
    pub fn new() -> Self {
        Self::default()
    }
}
