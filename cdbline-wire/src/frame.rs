//! スタックフレーム行の解析
//!
//! `k n` / `.frame` の出力は次の形式です。
//!
//! ```text
//!  # ChildEBP RetAddr
//! 00 0012fe98 00401426 Win32GUI!WinMain+0x89 [c:\devel\tmp\win32 test\main.cpp @ 55]
//! ```
//!
//! 64bitのCDBではアドレスが `00000000`0012fe98` のようにバッククォートで区切られます。

use crate::Result;
use regex::Regex;

/// スタックフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// フレーム番号
    pub number: usize,
    /// フレームアドレス（ChildEBP / Child-SP）
    pub address: String,
    /// 戻りアドレス
    pub return_address: String,
    /// 関数（module!symbol+offset）
    pub function: String,
    /// ソースファイル
    pub file: Option<String>,
    /// ソース行（1始まり）
    pub line: Option<u32>,
}

impl StackFrame {
    /// ソース位置を持つかどうか
    pub fn has_source(&self) -> bool {
        self.file.is_some() && self.line.is_some()
    }

    /// オフセットを除いたシンボル名
    ///
    /// 例: "Win32GUI!WinMain+0x89" -> "Win32GUI!WinMain"
    pub fn symbol(&self) -> &str {
        match self.function.find('+') {
            Some(idx) => &self.function[..idx],
            None => &self.function,
        }
    }
}

/// スタックフレーム行の解析器
pub struct FrameParser {
    frame_line: Regex,
}

impl FrameParser {
    /// 解析器を作成する
    pub fn new() -> Result<Self> {
        let frame_line = Regex::new(
            r"^\s*([0-9a-fA-F]+)\s+([0-9a-fA-F`]+)\s+([0-9a-fA-F`]+)\s+(\S+)(?:\s+\[(.+)\s@\s(\d+)\])?\s*$",
        )?;
        Ok(Self { frame_line })
    }

    /// 一行を解析する
    pub fn parse_line(&self, line: &str) -> Option<StackFrame> {
        let caps = self.frame_line.captures(line)?;
        let number = usize::from_str_radix(&caps[1], 16).ok()?;

        Some(StackFrame {
            number,
            address: caps[2].to_string(),
            return_address: caps[3].to_string(),
            function: caps[4].to_string(),
            file: caps.get(5).map(|m| m.as_str().trim().to_string()),
            line: caps.get(6).and_then(|m| m.as_str().parse().ok()),
        })
    }

    /// 出力全体からフレームを集める（ヘッダ行などは読み飛ばす）
    pub fn parse_all(&self, output: &str) -> Vec<StackFrame> {
        output.lines().filter_map(|line| self.parse_line(line)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_with_source() {
        let parser = FrameParser::new().unwrap();
        let frame = parser
            .parse_line(r"00 0012fe98 00401426 Win32GUI!WinMain+0x89 [c:\devel\tmp\win32 test\main.cpp @ 55]")
            .unwrap();
        assert_eq!(frame.number, 0);
        assert_eq!(frame.address, "0012fe98");
        assert_eq!(frame.return_address, "00401426");
        assert_eq!(frame.function, "Win32GUI!WinMain+0x89");
        assert_eq!(frame.symbol(), "Win32GUI!WinMain");
        assert_eq!(frame.file.as_deref(), Some(r"c:\devel\tmp\win32 test\main.cpp"));
        assert_eq!(frame.line, Some(55));
        assert!(frame.has_source());
    }

    #[test]
    fn test_parse_frame_without_source() {
        let parser = FrameParser::new().unwrap();
        let frame = parser
            .parse_line("0a 0012ffc0 7c816fd7 kernel32!BaseProcessStart+0x23")
            .unwrap();
        assert_eq!(frame.number, 10);
        assert_eq!(frame.file, None);
        assert!(!frame.has_source());
    }

    #[test]
    fn test_parse_64bit_addresses() {
        let parser = FrameParser::new().unwrap();
        let frame = parser
            .parse_line(r"01 00000000`0012ff20 00000001`40001234 app!main+0x15 [c:\src\main.cpp @ 12]")
            .unwrap();
        assert_eq!(frame.address, "00000000`0012ff20");
        assert_eq!(frame.line, Some(12));
    }

    #[test]
    fn test_parse_all_skips_header() {
        let parser = FrameParser::new().unwrap();
        let output = " # ChildEBP RetAddr  \n\
                      00 0012fe98 00401426 app!f+0x1 [c:\\a.cpp @ 3]\n\
                      01 0012ff80 00401a6c app!main+0x28 [c:\\a.cpp @ 9]";
        let frames = parser.parse_all(output);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].number, 1);
        assert_eq!(frames[1].line, Some(9));
    }
}
