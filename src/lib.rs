//! casesheet - Test case extraction from LLM replies and XLSX test strategy reports
//!
//! This crate turns free-form assistant replies into structured test case records,
//! accumulates them over a conversation, and compiles them into a styled
//! spreadsheet ("Test Strategy" sheet) ready for manual execution tracking.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use casesheet::{interpret, ReportCompilerBuilder, ReportMeta, TestCaseStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reply = r#"Here you go:
//! [{"id":"TC001","description":"Login","steps":"Open page","expected_result":"Dashboard"}]"#;
//!
//!     // Extract the structured batch from the reply
//!     let interpretation = interpret(reply);
//!     println!("{}", interpretation.display_text());
//!
//!     let mut store = TestCaseStore::new();
//!     if let Some(records) = interpretation.records() {
//!         store.append(records.iter().cloned());
//!     }
//!
//!     // Compile the report and save it as TestGen_Report_<millis>.xlsx
//!     let compiler = ReportCompilerBuilder::new().build()?;
//!     let meta = ReportMeta::now().with_scope("https://app.qa-server.com");
//!     let path = compiler.save(store.records(), &meta, ".")?;
//!     println!("saved {}", path.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Conversation Session
//!
//! `Session` owns the configuration, the store and the turn history.
//! The HTTP exchange itself is left to the caller.
//!
//! ```rust,no_run
//! use casesheet::{extract_message_content, ReportCompilerBuilder, Session, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(SessionConfig {
//!     api_key: "gsk_...".to_string(),
//!     ..SessionConfig::default()
//! });
//!
//! if let Some(request) = session.prepare_request("Login with OTP")? {
//!     let _body = request.to_json()?; // POST to casesheet::COMPLETIONS_URL
//!     let response_body = r#"{"choices":[{"message":{"content":"Hello!"}}]}"#;
//!     match extract_message_content(response_body) {
//!         Ok(content) => println!("{}", session.receive_response(&content).text),
//!         Err(_) => println!("{}", session.receive_failure().text),
//!     }
//! }
//!
//! let compiler = ReportCompilerBuilder::new().build()?;
//! let bytes = session.export(&compiler, chrono::Local::now().fixed_offset())?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```
//!
//! # Inspecting a Report
//!
//! ```rust,no_run
//! use casesheet::{ReportCompilerBuilder, ReportInspector, ReportMeta};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let compiler = ReportCompilerBuilder::new().build()?;
//! let bytes = compiler.compile(&[], &ReportMeta::now())?;
//!
//! let snapshot = ReportInspector::inspect(&bytes)?;
//! assert_eq!(snapshot.cell_text(3, 0), "Case ID");
//! assert_eq!(snapshot.frozen_rows(), Some(4));
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod inspector;
mod interpreter;
pub mod layout;
mod prompt;
mod security;
mod session;
mod store;
mod turn;
mod types;

// 公開API
pub use api::{AppMode, Status};
pub use builder::{
    report_file_name, ReportCompiler, ReportCompilerBuilder, ReportMeta, DEFAULT_AGENT_LABEL,
    DEFAULT_SCOPE_FALLBACK, DEFAULT_SHEET_NAME, DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TITLE,
    MAX_CELL_CHARS, REPORT_FILE_EXTENSION, REPORT_FILE_PREFIX,
};
pub use error::CaseSheetError;
pub use inspector::{CellStyle, FontStyle, ReportInspector, ReportSnapshot, ValidationRule};
pub use interpreter::{confirmation_message, interpret, Interpretation};
pub use prompt::{
    build_prompt, extract_message_content, ChatChoice, ChatCompletionRequest,
    ChatCompletionResponse, ChatMessage, ChatResponseMessage, COMPLETIONS_URL, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
pub use session::{Session, SessionConfig, CONNECTION_ERROR_MESSAGE};
pub use store::TestCaseStore;
pub use turn::{ConversationTurn, Role};
pub use types::{CellCoord, CellRange, TestCaseRecord};
