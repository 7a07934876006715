//! エラー定義

use crate::operation::Operation;
use std::path::PathBuf;
use thiserror::Error;

/// 未知のブレークポイント番号が通知された場合のメッセージ
pub const ERR_UNKNOWN_BREAKPOINT: &str = "Breakpoints inconsistency detected";

/// アクセス違反の通知タイトル
pub const MSG_ACCESS_VIOLATION: &str = "Access violation";

/// ドライバのエラー
#[derive(Debug, Error)]
pub enum DriverError {
    /// このバックエンドでは実装されていない操作
    #[error("{0} is not supported by the CDB backend")]
    Unsupported(Operation),

    /// コマンドの送信に失敗した
    #[error("failed to send '{command}' to the debugger: {source}")]
    Transport {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// 作業ディレクトリの変更に失敗した
    #[error("failed to change working directory to {}: {source}", path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
