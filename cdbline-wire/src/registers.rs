//! `r` コマンド出力の解析

use crate::Result;
use regex::Regex;

/// レジスタ値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub value: String,
}

/// レジスタダンプの解析器
pub struct RegisterParser {
    pair: Regex,
}

impl RegisterParser {
    /// 解析器を作成する
    pub fn new() -> Result<Self> {
        // 例: eax=00000000 ebx=7ffdf000 ... efl=00000246
        let pair = Regex::new(r"\b([a-z][a-z0-9]*)=([0-9a-fA-F`]+)\b")?;
        Ok(Self { pair })
    }

    /// 出力からレジスタを集める
    ///
    /// 逆アセンブル行やフラグ表記（nv up ei ...）は無視されます。
    pub fn parse(&self, output: &str) -> Vec<Register> {
        self.pair
            .captures_iter(output)
            .map(|caps| Register {
                name: caps[1].to_string(),
                value: caps[2].to_string(),
            })
            .collect()
    }
}
