use crate::resolve::ResolveError;
use crate::validation::ValidationIssue;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("{class} テンプレート '{key}' が重複して定義されています")]
    DuplicateTemplate { class: &'static str, key: String },

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// 計画パスの失敗
///
/// どちらのバリアントもバッチ全体の拒否を意味し、部分的な計画は返されない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("バリデーションエラー: {}件", .0.len())]
    Validation(Vec<ValidationIssue>),

    #[error("参照解決エラー: {}件", .0.len())]
    Resolution(Vec<ResolveError>),
}

impl PlanError {
    /// 収集された全エラーを1行ずつのメッセージとして返す
    pub fn messages(&self) -> Vec<String> {
        match self {
            PlanError::Validation(issues) => issues.iter().map(|i| i.to_string()).collect(),
            PlanError::Resolution(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PlanError::Validation(issues) => issues.len(),
            PlanError::Resolution(errors) => errors.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
