use colored::Colorize;
use std::path::PathBuf;
use storeflow_cloud::{ApplyResult, InMemoryProvider, Plan};
use storeflow_core::{ProjectRef, StoragePlan};

const SIMULATED_PROJECT_ID: &str = "simulated-project";

pub struct PlanOptions {
    pub region: Option<String>,
    pub zone: Option<String>,
    pub json: bool,
    pub simulate: bool,
}

pub async fn handle(file: Option<PathBuf>, options: PlanOptions) -> anyhow::Result<()> {
    let path = super::storage_file(file);
    let set = super::load_template_set(&path, options.region, options.zone)?;

    let storage_plan = match storeflow_core::plan(&set) {
        Ok(plan) => plan,
        Err(e) => super::exit_with_plan_error(&e),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&storage_plan)?);
        return Ok(());
    }

    println!("{}", "作成計画".blue().bold());
    println!("定義ファイル: {}", path.display().to_string().cyan());
    println!(
        "リージョン: {} / ゾーン: {}",
        storage_plan.settings.region().cyan(),
        storage_plan.settings.zone().cyan()
    );
    println!();
    print_instances(&storage_plan);

    let plan = Plan::from_storage_plan(&storage_plan)?;
    println!();
    println!("{}", "実行順序:".bold());
    for (i, action) in plan.actions.iter().enumerate() {
        println!("  {:>3}. {} {}", i + 1, action.id.cyan(), action.description);
    }
    println!();
    println!("{}", plan.summary().to_string().green().bold());

    if options.simulate {
        simulate(&plan).await?;
    }

    Ok(())
}

fn print_instances(plan: &StoragePlan) {
    if !plan.buckets.is_empty() {
        println!("バケット:");
        for (key, bucket) in plan.buckets.iter() {
            println!("  + {} → {} ({})", key.as_str().cyan(), bucket.name, bucket.location);
        }
    }
    if !plan.volumes.is_empty() {
        println!("ボリューム:");
        for (key, volume) in plan.volumes.iter() {
            println!(
                "  + {} → {} ({}GB, {} IOPS, {})",
                key.as_str().cyan(),
                volume.name,
                volume.spec.size_gb,
                volume.spec.iops,
                volume.location
            );
        }
    }
    if !plan.snapshots.is_empty() {
        println!("スナップショット:");
        for (key, snapshot) in plan.snapshots.iter() {
            let export = snapshot
                .export
                .as_ref()
                .map(|e| format!(" → {}/{}", e.bucket, e.key))
                .unwrap_or_default();
            println!(
                "  + {} → {}{}",
                key.as_str().cyan(),
                snapshot.instance.name,
                export
            );
        }
    }
    if !plan.objects.is_empty() {
        println!("オブジェクト:");
        for (key, object) in &plan.objects {
            println!(
                "  + {} → {}/{}",
                key.cyan(),
                object.bucket.name,
                object.key
            );
        }
    }
    if !plan.policies.is_empty() {
        println!("ポリシー:");
        for (key, policy) in &plan.policies {
            println!("  + {} → {}", key.cyan(), policy.bucket.name);
        }
    }
    if !plan.locks.is_empty() {
        println!("オブジェクトロック:");
        for (key, lock) in &plan.locks {
            println!(
                "  + {} → {} ({}, {})",
                key.cyan(),
                lock.bucket.name,
                lock.mode,
                lock.retention
            );
        }
    }
}

async fn simulate(plan: &Plan) -> anyhow::Result<()> {
    let provider = simulation_provider(plan);

    println!();
    println!("{}", "シミュレーションを実行中...".blue());

    let result = storeflow_cloud::apply(&provider, plan).await?;
    print_apply_result(&result);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// シミュレーション用プロバイダー（名前指定のプロジェクトは検索できるよう登録する）
fn simulation_provider(plan: &Plan) -> InMemoryProvider {
    let provider = InMemoryProvider::new();
    match &plan.project {
        Some(ProjectRef::Lookup {
            name,
            organization_id,
        }) => provider.with_project(name, organization_id, SIMULATED_PROJECT_ID),
        _ => provider,
    }
}

fn print_apply_result(result: &ApplyResult) {
    for success in &result.succeeded {
        println!("  {} {}", "✓".green(), success.message);
    }
    for failure in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failure.action_id,
            failure.error.as_deref().unwrap_or("")
        );
    }
    println!();
    if result.is_success() {
        println!(
            "{}",
            format!(
                "✓ {}件のリソースを作成しました ({}ms)",
                result.succeeded.len(),
                result.duration_ms
            )
            .green()
            .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "✗ {}件成功, {}件失敗",
                result.succeeded.len(),
                result.failed.len()
            )
            .red()
            .bold()
        );
    }
}
