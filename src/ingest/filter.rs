//! チャット本文を名前候補として採用するかの判定

/// 名前として受け付ける最大文字数
pub const MAX_NAME_CHARS: usize = 8;

/// 前後の空白を除いて単語が1つだけ、かつ `max_chars` 文字以下なら採用
pub fn name_candidate_with_limit(message: &str, max_chars: usize) -> Option<&str> {
    let trimmed = message.trim();
    let mut tokens = trimmed.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(_), None) if trimmed.chars().count() <= max_chars => Some(trimmed),
        _ => None,
    }
}

pub fn name_candidate(message: &str) -> Option<&str> {
    name_candidate_with_limit(message, MAX_NAME_CHARS)
}

pub fn is_name_candidate(message: &str) -> bool {
    name_candidate(message).is_some()
}
