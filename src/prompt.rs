//! Prompt Module
//!
//! LLMへの指示プロンプトの構築と、チャット補完APIのリクエスト/レスポンスの
//! ワイヤー型を提供するモジュール。HTTP通信そのものは扱いません。

use serde::{Deserialize, Serialize};

use crate::api::AppMode;
use crate::error::CaseSheetError;

/// チャット補完APIのエンドポイント
pub const COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// 指示プロンプトを構築する
///
/// テストケース生成モードでは、ユーザー入力と（指定されていれば）対象サイトの
/// コンテキストを埋め込み、テストケースをJSON配列で出力するよう指示します。
/// 一般モードでは構造化JSONの出力を禁止します。
pub fn build_prompt(mode: AppMode, user_text: &str, scope: Option<&str>) -> String {
    match mode {
        AppMode::TestGen => {
            let mut body = String::new();
            body.push_str(
                "You are TestGen Pro (Test Gen Mode), a professional and friendly AI QA Assistant.\n",
            );
            body.push_str(&format!("User Input: \"{}\"\n", user_text));
            if let Some(scope) = scope.filter(|s| !s.is_empty()) {
                body.push_str(&format!("Target Site Context: {}\n", scope));
            }
            body.push_str("\nInstructions:\n");
            body.push_str("- If the user is just greeting you (Hi, Hey, Hello), respond in a warm, human-like way without generating test cases.\n");
            body.push_str("- If the user asks for test cases or describes a feature, generate them in a valid JSON array block: [ { \"id\": \"TC001\", \"description\": \"...\", \"steps\": \"...\", \"expected_result\": \"...\" } ].\n");
            body.push_str("- Include a brief, helpful text response alongside any JSON you generate.\n");
            body.push_str("- If the user asks a general question about QA or testing, answer it naturally.\n");
            body
        }
        AppMode::General => {
            let mut body = String::new();
            body.push_str(
                "You are TestGen Pro (General Mode), an intelligent and versatile AI Assistant.\n",
            );
            body.push_str(&format!("User Input: \"{}\"\n", user_text));
            body.push_str("\nInstructions:\n");
            body.push_str("- Answer any general questions the user has.\n");
            body.push_str("- Provide updates on **Global News** and **AI Innovations** if asked.\n");
            body.push_str("- Respond in a friendly, conversational, and helpful manner.\n");
            body.push_str("- **DO NOT** generate test cases or structured JSON in this mode.\n");
            body.push_str("- Use your internal knowledge base to provide recent AI and tech news.\n");
            body
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// チャット補完APIのリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatCompletionRequest {
    /// 単一のユーザーメッセージを持つリクエストを生成
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn to_json(&self) -> Result<String, CaseSheetError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// 最初の選択肢のメッセージ本文
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

/// レスポンスボディからメッセージ本文を取り出す
///
/// # 戻り値
///
/// * `Ok(String)` - `choices[0].message.content`
/// * `Err(CaseSheetError::Json)` - ボディがJSONとして不正な場合
/// * `Err(CaseSheetError::EmptyResponse)` - 本文が含まれていない場合
pub fn extract_message_content(body: &str) -> Result<String, CaseSheetError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;
    response
        .first_content()
        .map(str::to_string)
        .ok_or(CaseSheetError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_test_gen_prompt_with_scope() {
        let prompt = build_prompt(
            AppMode::TestGen,
            "Login with OTP",
            Some("https://app.qa-server.com"),
        );
        assert!(prompt.contains("User Input: \"Login with OTP\""));
        assert!(prompt.contains("Target Site Context: https://app.qa-server.com"));
        assert!(prompt.contains("\"expected_result\""));
    }

    #[test]
    fn test_build_test_gen_prompt_without_scope() {
        let prompt = build_prompt(AppMode::TestGen, "Checkout", None);
        assert!(!prompt.contains("Target Site Context"));

        let prompt = build_prompt(AppMode::TestGen, "Checkout", Some(""));
        assert!(!prompt.contains("Target Site Context"));
    }

    #[test]
    fn test_build_general_prompt_ignores_scope() {
        let prompt = build_prompt(AppMode::General, "Latest AI News", Some("https://x"));
        assert!(prompt.contains("General Mode"));
        assert!(prompt.contains("**DO NOT** generate test cases"));
        assert!(!prompt.contains("Target Site Context"));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest::from_prompt("hi");
        let json: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();

        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!((json["temperature"].as_f64().unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_extract_message_content() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hello!"}}]}"#;
        assert_eq!(extract_message_content(body).unwrap(), "Hello!");
    }

    #[test]
    fn test_extract_message_content_empty() {
        assert!(matches!(
            extract_message_content(r#"{"choices":[]}"#),
            Err(CaseSheetError::EmptyResponse)
        ));
        assert!(matches!(
            extract_message_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(CaseSheetError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_message_content_malformed() {
        assert!(matches!(
            extract_message_content("<html>502</html>"),
            Err(CaseSheetError::Json(_))
        ));
    }
}
