//! StoreFlow core
//!
//! オブジェクトストレージ（S3互換バケット）とブロックストレージ
//! （ボリューム・スナップショット）のテンプレートを展開し、
//! リソース間の参照を解決して作成計画を生成します。
//!
//! ```text
//! storage.kdl ─▶ parser ─▶ TemplateSet
//!                              │
//!                              ▼
//!                         validation ─▶ ValidatedTemplates
//!                              │
//!                              ▼
//!                    expand (+ export_path)
//!                              │
//!                              ▼
//!                           resolve ─▶ StoragePlan
//! ```
//!
//! 展開キーは常に `"{templateKey}-{index}"` で、参照はこの展開キーとの
//! 完全一致でのみ解決されます。

pub mod error;
pub mod expand;
pub mod export_path;
pub mod loader;
pub mod model;
pub mod parser;
pub mod planner;
pub mod resolve;
pub mod validation;

pub use error::{PlanError, Result, StoreError};
pub use expand::{Expansion, expand};
pub use loader::{load_plan, load_templates};
pub use model::*;
pub use parser::{parse_kdl_file, parse_kdl_string};
pub use planner::plan;
pub use resolve::{ResolveError, resolve, resolve_all};
pub use validation::{ValidatedTemplates, ValidationIssue, validate};
