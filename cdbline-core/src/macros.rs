//! マクロ置換
//!
//! デバッガのパスやディレクトリに含まれる `$(PROJECT_DIR)` のような参照を展開します。

use crate::Result;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// マクロ展開器
pub struct MacroExpander {
    keys: BTreeMap<String, String>,
    env_vars_too: bool,
    reference: Regex,
}

impl MacroExpander {
    /// 新しいマクロ展開器を作成する
    pub fn new() -> Result<Self> {
        let reference = Regex::new(
            r"\$\$|\$\(([A-Za-z_][A-Za-z0-9_.#]*)\)|\$\{([A-Za-z_][A-Za-z0-9_.#]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)|%([A-Za-z_][A-Za-z0-9_]*)%",
        )?;
        Ok(Self {
            keys: BTreeMap::new(),
            env_vars_too: false,
            reference,
        })
    }

    /// マクロを定義する（キーは大文字小文字を区別しない）
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.keys.insert(key.to_ascii_uppercase(), value.into());
    }

    /// マクロの値を取得する
    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys.get(&key.to_ascii_uppercase()).map(String::as_str)
    }

    /// 定義済みのマクロをすべて消す
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// 未定義のキーを環境変数から解決するかどうか
    pub fn set_env_vars_too(&mut self, enabled: bool) {
        self.env_vars_too = enabled;
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(value) = self.get(key) {
            return Some(value.to_string());
        }
        if self.env_vars_too {
            return std::env::var(key).ok();
        }
        None
    }

    /// テキスト中の参照を展開する
    ///
    /// 未定義の参照はそのまま残ります。`%KEY%` 形式は環境変数解決が有効な場合のみ展開されます。
    pub fn expand(&self, text: &str) -> String {
        self.reference
            .replace_all(text, |caps: &Captures<'_>| {
                let whole = &caps[0];
                if whole == "$$" {
                    return "$".to_string();
                }
                if let Some(key) = caps.get(4) {
                    if !self.env_vars_too {
                        return whole.to_string();
                    }
                    return self.lookup(key.as_str()).unwrap_or_else(|| whole.to_string());
                }
                let key = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map_or("", |m| m.as_str());
                self.lookup(key).unwrap_or_else(|| whole.to_string())
            })
            .into_owned()
    }
}
