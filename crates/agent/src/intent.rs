//! Rule-based intent extraction.
//!
//! Each label family is an ordered `(keywords, label)` table. Detection walks
//! the table top to bottom and keeps the first family with any keyword present
//! in the lower-cased request, so a request maps to exactly one action, one
//! target, and one module hint.

use genie_core::{Action, Intent, Target};

type Rules<T> = &'static [(&'static [&'static str], T)];

const ACTION_RULES: Rules<Action> = &[
    (&["点击", "click"], Action::Click),
    (&["输入", "input", "输入文本"], Action::Input),
    (&["验证", "检查", "assert"], Action::Assert),
    (&["等待", "wait"], Action::Wait),
    (&["启动", "launch", "打开"], Action::Launch),
    (&["滑动", "swipe"], Action::Swipe),
];

const TARGET_RULES: Rules<Target> = &[
    (&["按钮", "button"], Target::Button),
    (&["输入框", "input", "文本框"], Target::Input),
    (&["图片", "image", "图像"], Target::Image),
    (&["文字", "text", "文本"], Target::Text),
];

const MODULE_RULES: Rules<&str> = &[
    (&["ui", "控件"], "uiacc"),
    (&["图像", "图片", "模板"], "opencv"),
    (&["ocr", "识别", "文字"], "ppocr"),
    (&["坐标", "点击"], "motion"),
];

/// Duration suffixes, longest-prefix first, with their millisecond factor.
///
/// A unit only counts when no ASCII letter follows it, so `3 steps` is not
/// three seconds.
const DURATION_UNITS: &[(&str, u64)] = &[
    ("毫秒", 1),
    ("ms", 1),
    ("秒", 1000),
    ("分钟", 60_000),
    ("minutes", 60_000),
    ("minute", 60_000),
    ("mins", 60_000),
    ("min", 60_000),
    ("seconds", 1000),
    ("second", 1000),
    ("secs", 1000),
    ("sec", 1000),
    ("s", 1000),
];

/// Parameter key carrying a wait duration in milliseconds.
pub const TIMEOUT_PARAM: &str = "timeout";

/// Stateless parser from request text to [`Intent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentParser;

impl IntentParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> Intent {
        parse(text)
    }
}

/// Parse a free-text request.
pub fn parse(text: &str) -> Intent {
    let lower = text.to_lowercase();

    let mut intent = Intent {
        action: first_match(ACTION_RULES, &lower).unwrap_or_default(),
        target: first_match(TARGET_RULES, &lower).unwrap_or_default(),
        value: quoted_literal(text),
        module: first_match(MODULE_RULES, &lower).map(str::to_string),
        ..Intent::default()
    };

    if let Some(token) = coordinate_token(text) {
        intent.value = Some(token.to_string());
        intent.target = Target::Coordinate;
    }

    if intent.action == Action::Wait
        && let Some(ms) = duration_ms(&lower)
    {
        intent.parameters.insert(TIMEOUT_PARAM.into(), ms.to_string());
    }

    intent
}

fn first_match<T: Copy>(rules: Rules<T>, haystack: &str) -> Option<T> {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(_, label)| *label)
}

/// Text between the first pair of double quotes.
fn quoted_literal(text: &str) -> Option<String> {
    let (_, rest) = text.split_once('"')?;
    let (value, _) = rest.split_once('"')?;
    Some(value.to_string())
}

/// First whitespace-delimited token that looks like a coordinate pair.
fn coordinate_token(text: &str) -> Option<&str> {
    if !(text.contains('(') && text.contains(',')) {
        return None;
    }
    text.split_whitespace()
        .find(|token| token.contains('(') && token.contains(','))
}

/// First `<number><unit>` phrase in the text, converted to milliseconds.
fn duration_ms(lower: &str) -> Option<u64> {
    let mut rest = lower;
    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        let digits_len = rest[start..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len() - start);
        let digits = &rest[start..start + digits_len];
        let after = rest[start + digits_len..].trim_start();

        if let Some((_, factor)) = DURATION_UNITS.iter().find(|(unit, _)| {
            after.strip_prefix(unit).is_some_and(|tail| {
                !tail.starts_with(|c: char| c.is_ascii_alphabetic())
            })
        }) && let Ok(n) = digits.parse::<u64>()
        {
            return n.checked_mul(*factor);
        }
        rest = &rest[start + digits_len..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_keywords_in_both_languages() {
        assert_eq!(parse("点击登录按钮").action, Action::Click);
        assert_eq!(parse("Click the OK button").action, Action::Click);
    }

    #[test]
    fn button_request() {
        let intent = parse("点击登录按钮");
        assert_eq!(intent.target, Target::Button);
        assert_eq!(intent.module.as_deref(), Some("motion"));
        assert!(intent.value.is_none());
    }

    #[test]
    fn action_families_checked_in_order() {
        // "点击" wins over "输入" because click is checked first
        assert_eq!(parse("点击输入框").action, Action::Click);
        assert_eq!(parse("在输入框输入\"hello\"").action, Action::Input);
        assert_eq!(parse("验证页面是否存在\"主页\"文字").action, Action::Assert);
        assert_eq!(parse("启动应用\"com.example.app\"").action, Action::Launch);
        assert_eq!(parse("swipe up").action, Action::Swipe);
        assert_eq!(parse("do something").action, Action::Unknown);
    }

    #[test]
    fn target_families() {
        assert_eq!(parse("输入框").target, Target::Input);
        assert_eq!(parse("验证图片\"logo.png\"").target, Target::Image);
        assert_eq!(parse("验证\"主页\"文字").target, Target::Text);
        assert_eq!(parse("等待3秒").target, Target::Unspecified);
    }

    #[test]
    fn quoted_value_is_verbatim() {
        let intent = parse("input \"Hello World\" into field");
        assert_eq!(intent.value.as_deref(), Some("Hello World"));
    }

    #[test]
    fn unterminated_quote_yields_no_value() {
        assert!(parse("input \"Hello").value.is_none());
    }

    #[test]
    fn coordinate_overrides_quoted_value() {
        let intent = parse("click \"OK\" at (100,200)");
        assert_eq!(intent.target, Target::Coordinate);
        assert_eq!(intent.value.as_deref(), Some("(100,200)"));
    }

    #[test]
    fn paren_without_comma_is_not_a_coordinate() {
        let intent = parse("click (ok)");
        assert_eq!(intent.target, Target::Unspecified);
        assert!(intent.value.is_none());
    }

    #[test]
    fn module_hints() {
        assert_eq!(parse("点击UI控件").module.as_deref(), Some("uiacc"));
        assert_eq!(parse("匹配模板").module.as_deref(), Some("opencv"));
        assert_eq!(parse("OCR识别").module.as_deref(), Some("ppocr"));
        assert_eq!(parse("wait").module, None);
    }

    #[test]
    fn wait_duration_becomes_timeout() {
        let intent = parse("等待3秒");
        assert_eq!(intent.action, Action::Wait);
        assert_eq!(intent.parameters.get(TIMEOUT_PARAM).map(String::as_str), Some("3000"));

        let intent = parse("wait 250 ms");
        assert_eq!(intent.parameters.get(TIMEOUT_PARAM).map(String::as_str), Some("250"));
    }

    #[test]
    fn duration_ignored_for_other_actions() {
        assert!(parse("click 3s").parameters.is_empty());
        assert!(parse("等待").parameters.is_empty());
    }

    #[test]
    fn duration_skips_bare_numbers() {
        assert_eq!(duration_ms("wait for 2 of 5s"), Some(5000));
        assert_eq!(duration_ms("(100,200)"), None);
        assert_eq!(duration_ms("2分钟"), Some(120_000));
    }

    #[test]
    fn unit_must_end_at_a_word_boundary() {
        assert!(parse("wait 3 steps").parameters.is_empty());
        assert_eq!(duration_ms("wait 3 steps"), None);
        assert_eq!(duration_ms("wait 3 seconds"), Some(3000));
        assert_eq!(duration_ms("wait 2 minutes please"), Some(120_000));
        assert_eq!(duration_ms("wait 4s."), Some(4000));
        assert_eq!(duration_ms("等待3秒钟"), Some(3000));
    }
}
