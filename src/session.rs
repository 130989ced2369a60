//! Session Module
//!
//! 会話コントローラーの状態（設定・テストケースストア・会話履歴）を
//! 明示的に所有するモジュール。
//!
//! HTTP通信は外部の協調者が担当します。`Session`はリクエストの準備と
//! 応答の取り込みのみを行い、その間の待機中に状態を変更しません。

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::api::AppMode;
use crate::builder::{ReportCompiler, ReportMeta};
use crate::error::CaseSheetError;
use crate::interpreter::interpret;
use crate::prompt::{build_prompt, ChatCompletionRequest};
use crate::store::TestCaseStore;
use crate::turn::ConversationTurn;

/// 通信失敗時にユーザーへ表示する汎用メッセージ
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Connection error. Please verify your API Key in Settings.";

/// セッション設定
///
/// 永続化は外部の責務です。レポートに届くのは`target_scope`のみです。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// APIキー（不透明な資格情報）
    pub api_key: String,

    /// 対象スコープ（URLなど）
    pub target_scope: String,

    /// プロンプトに対象スコープを含めるか
    pub include_scope: bool,

    /// 動作モード
    pub mode: AppMode,
}

/// 会話セッション
///
/// `TestCaseStore`を排他的に所有し、応答の取り込み時にのみ追記します。
/// ターンkで抽出されたレコードは、その後に要求されたエクスポートに必ず含まれます。
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
    store: TestCaseStore,
    turns: Vec<ConversationTurn>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            store: TestCaseStore::new(),
            turns: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &TestCaseStore {
        &self.store
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// ユーザー入力からチャット補完リクエストを準備する
    ///
    /// # 戻り値
    ///
    /// * `Ok(None)` - 入力が空白のみの場合（何もしない）
    /// * `Ok(Some(request))` - ユーザーのターンを記録し、リクエストを返す
    /// * `Err(CaseSheetError::MissingCredential)` - APIキーが未設定の場合
    pub fn prepare_request(
        &mut self,
        user_text: &str,
    ) -> Result<Option<ChatCompletionRequest>, CaseSheetError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self.config.api_key.trim().is_empty() {
            warn!("request blocked: no API key configured");
            return Err(CaseSheetError::MissingCredential);
        }

        self.turns.push(ConversationTurn::user(text));

        let scope = if self.config.include_scope {
            Some(self.config.target_scope.as_str())
        } else {
            None
        };
        let prompt = build_prompt(self.config.mode, text, scope);

        Ok(Some(ChatCompletionRequest::from_prompt(prompt)))
    }

    /// モデルの応答を取り込み、アシスタントのターンを返す
    ///
    /// 抽出されたバッチは同期的にストアへ追記されます。
    pub fn receive_response(&mut self, raw_text: &str) -> &ConversationTurn {
        let turn = ConversationTurn::from_interpretation(interpret(raw_text));
        if let Some(batch) = &turn.batch {
            let appended = self.store.append(batch.iter().cloned());
            debug!(appended, total = self.store.len(), "stored test case batch");
        }
        self.push_turn(turn)
    }

    /// 通信失敗を記録し、汎用エラーメッセージのターンを返す
    pub fn receive_failure(&mut self) -> &ConversationTurn {
        self.push_turn(ConversationTurn::assistant(CONNECTION_ERROR_MESSAGE))
    }

    /// 直近のターンがバッチを持つか（エクスポートを促す表示の判定に使う）
    pub fn has_pending_export(&self) -> bool {
        self.turns.last().is_some_and(ConversationTurn::has_batch)
    }

    /// 現在のストアの内容からレポートを生成する
    pub fn export(
        &self,
        compiler: &ReportCompiler,
        generated_at: DateTime<FixedOffset>,
    ) -> Result<Vec<u8>, CaseSheetError> {
        compiler.compile(self.store.records(), &self.report_meta(generated_at))
    }

    /// レポート用のメタデータ
    ///
    /// スコープはプロンプトへの埋め込み設定に関係なく渡されます。
    pub fn report_meta(&self, generated_at: DateTime<FixedOffset>) -> ReportMeta {
        let meta = ReportMeta::new(generated_at);
        if self.config.target_scope.is_empty() {
            meta
        } else {
            meta.with_scope(self.config.target_scope.clone())
        }
    }

    fn push_turn(&mut self, turn: ConversationTurn) -> &ConversationTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}
