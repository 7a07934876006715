//! CDBプロンプトの定義と検出

/// スレッド0で停止しているときのプロンプト
pub const PROMPT_THREAD0: &str = "0:000>";

/// スレッド1で停止しているときのプロンプト
pub const PROMPT_THREAD1: &str = "0:001>";

/// 既知のプロンプト一覧
pub const PROMPTS: [&str; 2] = [PROMPT_THREAD0, PROMPT_THREAD1];

/// テキスト中で最も手前にあるプロンプトを探す
///
/// # Returns
/// プロンプトの開始位置とその長さ。見つからなければ `None`
pub fn find_prompt(text: &str) -> Option<(usize, usize)> {
    PROMPTS
        .iter()
        .filter_map(|prompt| text.find(prompt).map(|idx| (idx, prompt.len())))
        .min_by_key(|(idx, _)| *idx)
}
