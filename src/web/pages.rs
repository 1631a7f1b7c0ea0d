//! 埋め込みHTMLページ

/// 動画ID入力画面
pub const INPUT_PAGE: &str = include_str!("pages/input.html");

/// ゲーム画面（名前リストは `/names` からクライアント側で取得する）
pub const GAME_PAGE: &str = include_str!("pages/game.html");
