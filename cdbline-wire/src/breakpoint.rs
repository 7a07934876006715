//! `bu` コマンド応答の解析

/// ブレークポイント設定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointStatus {
    /// 設定された
    Set,
    /// 位置が解決できず、遅延ブレークポイントとして登録された
    Deferred,
    /// 同じ番号のブレークポイントを置き換えた
    Redefined,
}

/// `bu` 応答の解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointReply<'a> {
    pub status: BreakpointStatus,
    /// "*** " で始まる診断行（シンボル読み込みの警告など）
    pub diagnostics: Vec<&'a str>,
}

/// `bu` 応答を解析する
///
/// 想定される出力:
/// ```text
/// *** WARNING: Unable to verify checksum for Win32GUI.exe
/// Bp expression '`main.cpp:56`' could not be resolved, adding deferred bp
/// breakpoint 1 redefined
/// ```
pub fn parse_breakpoint_reply(output: &str) -> BreakpointReply<'_> {
    let mut status = BreakpointStatus::Set;
    let mut diagnostics = Vec::new();

    for line in output.lines() {
        if line.starts_with("*** ") {
            diagnostics.push(line);
        } else if line.contains("could not be resolved") {
            status = BreakpointStatus::Deferred;
        } else if line.contains("redefined") && status == BreakpointStatus::Set {
            status = BreakpointStatus::Redefined;
        }
    }

    BreakpointReply {
        status,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply_is_set() {
        let reply = parse_breakpoint_reply("");
        assert_eq!(reply.status, BreakpointStatus::Set);
        assert!(reply.diagnostics.is_empty());
    }

    #[test]
    fn test_deferred_reply() {
        let output = "*** ERROR: Symbol file could not be found.  Defaulted to export symbols for USER32.dll -\n\
                      Bp expression '`main.cpp:56`' could not be resolved, adding deferred bp";
        let reply = parse_breakpoint_reply(output);
        assert_eq!(reply.status, BreakpointStatus::Deferred);
        assert_eq!(reply.diagnostics.len(), 1);
    }

    #[test]
    fn test_redefined_reply() {
        let reply = parse_breakpoint_reply("breakpoint 3 redefined");
        assert_eq!(reply.status, BreakpointStatus::Redefined);
    }
}
