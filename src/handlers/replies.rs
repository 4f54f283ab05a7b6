//! Reply composition
//!
//! Turns a dialogue [`Prompt`] into the text shown to the user, paired with
//! the static flex menu when one is configured.

use std::path::Path;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::MenuConfig;
use crate::state::{Field, Prompt};

const MENU_ALT_TEXT: &str = "メニュー";
const MENU_FAILURE_NOTE: &str = "\n(メニューの読み込みに失敗しました)";

/// Text for a prompt
pub fn prompt_text(prompt: Prompt) -> &'static str {
    match prompt {
        Prompt::Welcome => "登録しました！「開始」「終了」ボタン（またはメッセージ）でどうぞ💪",
        Prompt::RegistrationFailed => "登録時にエラーが発生しました。時間をおいてもう一度お試しください",
        Prompt::Guide => "『追加』ボタン → 入力を進めてね",
        Prompt::WorkoutStarted => "ワークアウトを開始しました！",
        Prompt::WorkoutEnded => "ワークアウトを終了しました！",
        Prompt::NothingToEnd => "進行中のワークアウトが見つかりません。まずは『開始』してください",
        Prompt::StartFirst => "まず『開始』してください",
        Prompt::AddFirst => "『追加』から入力を始めてください",
        Prompt::Ask(Field::Exercise) => "種目IDを送ってください（例: 11111111-....）",
        Prompt::Ask(Field::Weight) => "OK! 次は重量(kg)を送ってください（例: 60）",
        Prompt::Ask(Field::Reps) => "OK! 次は回数を送ってください（例: 8）",
        Prompt::InvalidExercise => "種目IDの形式が正しくありません。正しいIDを送ってください",
        Prompt::UnknownExercise => "その種目IDは見つかりません。正しいIDを送ってください",
        Prompt::InvalidWeight => "重量は0以上の数値で送ってください",
        Prompt::InvalidReps => "回数は正の整数で送ってください",
        Prompt::SetRecorded => "セットを登録しました！ 続けて『追加』でどうぞ",
        Prompt::CommitFailed => "セット登録に失敗しました。『追加』からやり直してください",
        Prompt::Cancelled => "キャンセルしました。『追加』からやり直してください",
        Prompt::NothingToCancel => "キャンセルする入力はありません",
        Prompt::TryAgain => "処理に失敗しました。もう一度お試しください",
    }
}

/// Flex menu availability
#[derive(Debug, Clone, PartialEq)]
pub enum MenuState {
    Loaded(Value),
    /// No menu configured; replies are text-only without a note
    Disabled,
    /// A menu was configured but could not be loaded
    Failed(String),
}

/// A reply ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundReply {
    pub text: String,
    pub menu: Option<Value>,
}

impl OutboundReply {
    /// LINE message objects for the reply endpoint
    pub fn to_line_messages(&self) -> Vec<Value> {
        let mut messages = vec![json!({ "type": "text", "text": self.text })];
        if let Some(menu) = &self.menu {
            messages.push(json!({
                "type": "flex",
                "altText": MENU_ALT_TEXT,
                "contents": menu,
            }));
        }
        messages
    }
}

#[derive(Debug, Clone)]
pub struct ReplyComposer {
    menu: MenuState,
}

impl ReplyComposer {
    pub fn new(menu: MenuState) -> Self {
        Self { menu }
    }

    pub fn text_only() -> Self {
        Self::new(MenuState::Disabled)
    }

    /// Build a composer, loading the flex menu named in `config`
    pub async fn from_config(config: &MenuConfig) -> Self {
        let menu = match &config.flex_menu_path {
            Some(path) => load_menu(Path::new(path)).await,
            None => MenuState::Disabled,
        };
        Self::new(menu)
    }

    pub fn menu_state(&self) -> &MenuState {
        &self.menu
    }

    pub fn compose(&self, prompt: Prompt) -> OutboundReply {
        let text = prompt_text(prompt);
        match &self.menu {
            MenuState::Loaded(menu) => OutboundReply { text: text.to_string(), menu: Some(menu.clone()) },
            MenuState::Disabled => OutboundReply { text: text.to_string(), menu: None },
            MenuState::Failed(_) => OutboundReply { text: format!("{}{}", text, MENU_FAILURE_NOTE), menu: None },
        }
    }
}

/// Read and check a flex container from disk
pub async fn load_menu(path: &Path) -> MenuState {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read flex menu");
            return MenuState::Failed(e.to_string());
        }
    };

    let menu: Value = match serde_json::from_str(&raw) {
        Ok(menu) => menu,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Flex menu is not valid JSON");
            return MenuState::Failed(e.to_string());
        }
    };

    match menu.get("type").and_then(Value::as_str) {
        Some("bubble") | Some("carousel") => {
            info!(path = %path.display(), "Flex menu loaded");
            MenuState::Loaded(menu)
        }
        _ => {
            warn!(path = %path.display(), "Flex menu is not a bubble or carousel container");
            MenuState::Failed("flex container must be a bubble or carousel".to_string())
        }
    }
}
