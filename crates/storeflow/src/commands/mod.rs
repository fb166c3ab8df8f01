pub mod plan;
pub mod validate;

use colored::Colorize;
use std::path::{Path, PathBuf};
use storeflow_core::{PlanError, TemplateSet};

/// ストレージ定義ファイルを決定する（-f 指定がなければ自動検出）
fn storage_file(file: Option<PathBuf>) -> PathBuf {
    if let Some(path) = file {
        return path;
    }
    match storeflow_config::find_storage_file() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}", "✗ ストレージ定義ファイルが見つかりません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

/// テンプレートを読み込み、ユーザーデフォルトとCLI引数を反映する
///
/// 優先順位: CLI引数/環境変数 > ファイルの settings > defaults.json
fn load_template_set(
    path: &Path,
    region: Option<String>,
    zone: Option<String>,
) -> anyhow::Result<TemplateSet> {
    let mut set = match storeflow_core::load_templates(path) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("{}", "✗ 読み込みエラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let defaults = storeflow_config::load_defaults()?;
    set.settings.apply_defaults(
        defaults.region.as_deref(),
        defaults.zone.as_deref(),
        &defaults.tags,
    );
    set.settings.override_location(region, zone);

    Ok(set)
}

/// 収集されたエラーをすべて表示して終了する
fn exit_with_plan_error(error: &PlanError) -> ! {
    eprintln!();
    eprintln!("{}", format!("✗ {error}").red().bold());
    for message in error.messages() {
        eprintln!("  - {}", message);
    }
    std::process::exit(1);
}
