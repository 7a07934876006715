//! `dv` コマンド出力の解析

/// ローカル変数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    pub name: String,
    pub value: String,
}

/// `dv` の出力からローカル変数を集める
///
/// 例:
/// ```
/// use cdbline_wire::parse_locals;
///
/// let locals = parse_locals("          x = 0n5\n       name = 0x00403000 \"hello\"");
/// assert_eq!(locals.len(), 2);
/// assert_eq!(locals[0].name, "x");
/// assert_eq!(locals[1].value, "0x00403000 \"hello\"");
/// ```
pub fn parse_locals(output: &str) -> Vec<Local> {
    output
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(" = ")?;
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return None;
            }
            Some(Local {
                name: name.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}
