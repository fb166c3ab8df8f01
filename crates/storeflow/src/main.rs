mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "store")]
#[command(about = "宣言する。展開する。ストレージ構成は、テンプレートになった。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// テンプレートを検証
    Validate {
        /// ストレージ定義ファイル（省略時は自動検出）
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
    },
    /// テンプレートを展開し、作成計画を表示
    Plan {
        /// ストレージ定義ファイル（省略時は自動検出）
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
        /// リージョンを上書き
        #[arg(long, env = "STOREFLOW_REGION")]
        region: Option<String>,
        /// ゾーンを上書き
        #[arg(long, env = "STOREFLOW_ZONE")]
        zone: Option<String>,
        /// 計画をJSONで出力
        #[arg(long, conflicts_with = "simulate")]
        json: bool,
        /// インメモリプロバイダーで作成をシミュレート
        #[arg(long)]
        simulate: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrに出力（--json の出力を汚さない）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Version => {
            println!("storeflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate { file } => {
            commands::validate::handle(file).await?;
        }
        Commands::Plan {
            file,
            region,
            zone,
            json,
            simulate,
        } => {
            let options = commands::plan::PlanOptions {
                region,
                zone,
                json,
                simulate,
            };
            commands::plan::handle(file, options).await?;
        }
    }

    Ok(())
}
