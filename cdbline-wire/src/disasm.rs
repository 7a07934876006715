//! `uf` コマンド出力（逆アセンブル）の解析

use crate::Result;
use regex::Regex;

/// 逆アセンブルされた一命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// ソース行（`l+s` 有効時のみ）
    pub line: Option<u32>,
    pub address: String,
    pub bytes: String,
    pub text: String,
}

/// 逆アセンブル出力の解析器
pub struct DisassemblyParser {
    instruction: Regex,
}

impl DisassemblyParser {
    /// 解析器を作成する
    pub fn new() -> Result<Self> {
        // 例:    10 00401000 55              push    ebp
        let instruction = Regex::new(
            r"^\s*(?:(\d+)\s+)?([0-9a-fA-F`]{8,})\s+([0-9a-fA-F]+)\s+(.+?)\s*$",
        )?;
        Ok(Self { instruction })
    }

    /// 出力から命令を集める
    pub fn parse(&self, output: &str) -> Vec<Instruction> {
        output
            .lines()
            .filter_map(|line| {
                let caps = self.instruction.captures(line)?;
                Some(Instruction {
                    line: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                    address: caps[2].to_string(),
                    bytes: caps[3].to_string(),
                    text: caps[4].to_string(),
                })
            })
            .collect()
    }
}
