//! CDB起動コマンドラインの組み立て

/// 検索パスの区切り文字（CDBはWindowsのみ）
pub const PATH_SEPARATOR: &str = ";";

/// デバッグ対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugTarget<'a> {
    /// 実行ファイルを起動する
    Launch(&'a str),
    /// 実行中のプロセスにアタッチする
    Attach(u32),
}

/// 起動コマンドラインを組み立てる
///
/// `-G` で終了時ブレークポイントを無視し、`-lines` で行情報を有効にします。
/// ディレクトリが指定されていれば、同じ一覧を `-y`（シンボル）と
/// `-srcpath`（ソース）の両方に渡します。
///
/// # Examples
/// ```
/// use cdbline_core::{build_command_line, DebugTarget};
///
/// let dirs = vec![r"C:\src".to_string()];
/// let cmd = build_command_line("cdb.exe", DebugTarget::Launch("a.exe"), &dirs);
/// assert_eq!(cmd, r"cdb.exe -G -lines -y C:\src -srcpath C:\src a.exe");
/// ```
pub fn build_command_line(debugger: &str, target: DebugTarget<'_>, directories: &[String]) -> String {
    let mut cmd = String::from(debugger);
    cmd.push_str(" -G");
    cmd.push_str(" -lines");

    if !directories.is_empty() {
        let search_path = directories.join(PATH_SEPARATOR);
        cmd.push_str(" -y ");
        cmd.push_str(&search_path);
        cmd.push_str(" -srcpath ");
        cmd.push_str(&search_path);
    }

    match target {
        DebugTarget::Launch(debuggee) => {
            cmd.push(' ');
            cmd.push_str(debuggee);
        }
        DebugTarget::Attach(pid) => {
            cmd.push_str(&format!(" -p {}", pid));
        }
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_without_dirs() {
        assert_eq!(
            build_command_line("cdb.exe", DebugTarget::Launch("a.exe"), &[]),
            "cdb.exe -G -lines a.exe"
        );
    }

    #[test]
    fn test_symbol_path_precedes_source_path() {
        let dirs = vec![r"C:\src".to_string(), r"C:\lib".to_string()];
        let cmd = build_command_line("cdb.exe", DebugTarget::Launch("a.exe"), &dirs);
        let symbols = cmd.find(r"-y C:\src;C:\lib").unwrap();
        let sources = cmd.find(r"-srcpath C:\src;C:\lib").unwrap();
        assert!(symbols < sources);
        assert!(cmd.ends_with(" a.exe"));
    }

    #[test]
    fn test_attach_by_pid() {
        let dirs = vec![r"C:\src".to_string()];
        assert_eq!(
            build_command_line("cdb.exe", DebugTarget::Attach(4242), &dirs),
            r"cdb.exe -G -lines -y C:\src -srcpath C:\src -p 4242"
        );
    }
}
