/// 转义 LIKE 模式中的通配符
///
/// SeaORM 的 `contains` 不处理 `%` 与 `_`，用户输入需先转义。
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
