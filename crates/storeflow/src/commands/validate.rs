use colored::Colorize;
use std::path::PathBuf;
use storeflow_core::PlanError;

pub async fn handle(file: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "テンプレートを検証中...".blue());

    let path = super::storage_file(file);
    println!("定義ファイル: {}", path.display().to_string().cyan());

    let set = super::load_template_set(&path, None, None)?;

    let validated = match storeflow_core::validate(&set) {
        Ok(validated) => validated,
        Err(issues) => super::exit_with_plan_error(&PlanError::Validation(issues)),
    };
    let expansion = storeflow_core::expand(&validated);

    println!("{}", "✓ テンプレートは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!(
        "  バケット: {}個のテンプレート → {}個",
        set.buckets.len(),
        expansion.buckets.len()
    );
    println!(
        "  ボリューム: {}個のテンプレート → {}個",
        set.volumes.len(),
        expansion.volumes.len()
    );
    println!(
        "  スナップショット: {}個のテンプレート → {}個",
        set.snapshots.len(),
        expansion.snapshots.len()
    );
    println!("  オブジェクト: {}個", set.objects.len());
    println!("  ポリシー: {}個", set.policies.len());
    println!("  オブジェクトロック: {}個", set.locks.len());
    println!("  展開後のインスタンス: {}個", expansion.instance_count());
    println!(
        "  (参照の解決は {} で確認できます)",
        "store plan".cyan()
    );

    Ok(())
}
