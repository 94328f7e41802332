//! 代码规范化
//!
//! 将用户输入的松散代码统一为 `代码.市场` 的规范形式，
//! 供行情、新闻、基本面等所有抓取组件使用。

use crate::models::Market;

/// 补全缺失的市场后缀
///
/// 规则按顺序匹配，先中先得：
/// - 已含 `.` 的输入原样信任
/// - 5 位纯数字视为港股（00700 -> 00700.HK）
/// - 6 位数字且以 6/9/5/1 开头视为沪市
/// - 6 位数字且以 0/3/1 开头视为深市
///   （1 开头与沪市规则重叠，沪市规则在前，维持现状）
/// - 长度不超过 4 的视为美股代码（AAPL -> AAPL.US）
///
/// 无法识别的形状不报错，原样返回，由下游匹配失败自然降级
pub fn normalize_code(raw: &str) -> String {
    let code = raw.trim();
    if code.contains('.') {
        return code.to_string();
    }

    let is_digits = !code.is_empty() && code.chars().all(|c| c.is_ascii_digit());

    if is_digits && code.len() == 5 {
        return format!("{}.HK", code);
    }
    if is_digits && code.len() == 6 {
        if code.starts_with('6') || code.starts_with('9') || code.starts_with('5') || code.starts_with('1') {
            return format!("{}.SH", code);
        }
        // 1 开头在此同样列出，但已被上一条规则截走，维持原判定表
        if code.starts_with('0') || code.starts_with('3') || code.starts_with('1') {
            return format!("{}.SZ", code);
        }
    }
    if !code.is_empty() && code.len() <= 4 {
        return format!("{}.US", code);
    }

    code.to_string()
}

/// 拆分规范代码为（代码, 市场）
///
/// 以最后一个 `.` 之后的段作为市场后缀，后缀不是已知市场时返回 None
pub fn split_code(full_code: &str) -> Option<(String, Market)> {
    let (symbol, suffix) = full_code.rsplit_once('.')?;
    if symbol.is_empty() {
        return None;
    }
    let market = Market::from_suffix(suffix)?;
    Some((symbol.to_string(), market))
}

/// 构造行情接口的查询键，如 `hk00700`、`sh600519`
///
/// 美股代码去掉交易所子后缀（BABA.N -> BABA）并转大写
pub fn quote_query_key(symbol: &str, market: Market) -> String {
    let mut clean = symbol.to_uppercase();
    if market == Market::US {
        if let Some(head) = clean.split('.').next() {
            clean = head.to_string();
        }
    }
    format!("{}{}", market.lower_prefix(), clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hk_five_digits() {
        assert_eq!(normalize_code("00700"), "00700.HK");
        assert_eq!(normalize_code("01810"), "01810.HK");
        assert_eq!(normalize_code("09988"), "09988.HK");
    }

    #[test]
    fn test_normalize_sh() {
        assert_eq!(normalize_code("600519"), "600519.SH");
        assert_eq!(normalize_code("900957"), "900957.SH");
        assert_eq!(normalize_code("510050"), "510050.SH");
    }

    #[test]
    fn test_normalize_sz() {
        assert_eq!(normalize_code("000001"), "000001.SZ");
        assert_eq!(normalize_code("300750"), "300750.SZ");
        assert_eq!(normalize_code("002594"), "002594.SZ");
    }

    /// 1 开头同时命中沪深两条规则，沪市规则在前，固定现有行为
    #[test]
    fn test_normalize_ambiguous_one_prefix_goes_sh() {
        assert_eq!(normalize_code("100001"), "100001.SH");
        assert_eq!(normalize_code("159915"), "159915.SH");
    }

    #[test]
    fn test_normalize_us_ticker() {
        assert_eq!(normalize_code("AAPL"), "AAPL.US");
        assert_eq!(normalize_code("T"), "T.US");
        assert_eq!(normalize_code("BABA"), "BABA.US");
    }

    #[test]
    fn test_explicit_suffix_trusted() {
        assert_eq!(normalize_code("00700.HK"), "00700.HK");
        assert_eq!(normalize_code("920146.BJ"), "920146.BJ");
        assert_eq!(normalize_code("600519.SH"), "600519.SH");
    }

    /// 无法识别的形状原样返回，不报错
    #[test]
    fn test_unrecognized_passthrough() {
        assert_eq!(normalize_code("12345678"), "12345678");
        assert_eq!(normalize_code("800001"), "800001");
        assert_eq!(normalize_code("GOOGL"), "GOOGL");
        assert_eq!(normalize_code(""), "");
    }

    /// 规范化输出的代码按 `.` 拆分恒为两个非空段，后缀为已知市场
    #[test]
    fn test_normalized_round_trip() {
        let inputs = ["00700", "600519", "000001", "920146.BJ", "AAPL", "100001"];
        for input in &inputs {
            let full = normalize_code(input);
            let parts: Vec<&str> = full.split('.').collect();
            assert_eq!(parts.len(), 2, "输入 {} 规范化为 {}", input, full);
            assert!(!parts[0].is_empty());
            assert!(Market::from_suffix(parts[1]).is_some());
        }
    }

    #[test]
    fn test_split_code() {
        assert_eq!(
            split_code("00700.HK"),
            Some(("00700".to_string(), Market::HK))
        );
        assert_eq!(split_code("600519"), None);
        assert_eq!(split_code("600519.SS"), None);
        assert_eq!(split_code(".HK"), None);
    }

    #[test]
    fn test_quote_query_key() {
        assert_eq!(quote_query_key("00700", Market::HK), "hk00700");
        assert_eq!(quote_query_key("600519", Market::SH), "sh600519");
        assert_eq!(quote_query_key("aapl", Market::US), "usAAPL");
        // 美股交易所子后缀在构造查询键时剥离
        assert_eq!(quote_query_key("BABA.N", Market::US), "usBABA");
    }
}
