/// 把字符串中的连续空白折叠为单个空格。
///
/// 用于压缩拼接出来的 SVG 文本（缩进/换行只增大 payload，不影响渲染）。
/// 规则与语义：
/// - 任意连续空白（空格/换行/制表符）折叠为一个空格；
/// - 开头的空白折叠为单个前导空格，结尾的空白直接丢弃；
/// - 非空白字符原样保留，压缩纯粹是字节层面的，不改变渲染结果。
pub fn compact(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pending_space = false;

    for c in source.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space {
            out.push(' ');
            pending_space = false;
        }

        out.push(c);
    }

    out
}
