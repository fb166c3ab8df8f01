//! モデル定義
//!
//! テンプレート（入力）と展開済みインスタンス（出力）のデータモデルを定義します。
//! 各モデルはリソースクラスごとにモジュールに分離されています。

mod block;
mod bucket;
mod instance;
pub mod kind;
mod object;
mod reference;
mod settings;
mod templates;

// Re-exports
pub use block::*;
pub use bucket::*;
pub use instance::*;
pub use kind::{ResourceClass, ResourceKind};
pub use object::*;
pub use reference::*;
pub use settings::*;
pub use templates::*;
