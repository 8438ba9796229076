use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::models::BusinessId;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List all tenants")]
    List,

    #[command(about = "Show the business number the next tenant would receive")]
    NextId,
}

pub async fn handle(cmd: TenantCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.backend == StoreBackend::Memory {
        tracing::warn!("DATABASE_BACKEND is memory; the store starts empty");
    }
    let store = DatabaseManager::open(&config.database).await?;

    match cmd {
        TenantCommands::List => {
            let tenants = store.list().await?;
            if tenants.is_empty() {
                return output_empty_collection(output_format, "tenants", "No tenants registered");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "tenants": tenants }))?);
                }
                OutputFormat::Text => {
                    println!("{:<10} {:<30} {:<32} {:<9} {}", "NUMBER", "NAME", "EMAIL", "STATUS", "CREATED");
                    println!("{}", "-".repeat(100));
                    for tenant in &tenants {
                        println!(
                            "{:<10} {:<30} {:<32} {:<9} {}",
                            tenant.business_number.as_str(),
                            tenant.name,
                            tenant.email,
                            tenant.status.as_str(),
                            tenant.created_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }
            Ok(())
        }
        TenantCommands::NextId => {
            let last = store.last_business_id().await?;
            let next = BusinessId::next_after(last.as_ref().map(BusinessId::as_str))?;
            output_success(
                output_format,
                &format!("Next business number: {}", next),
                Some(json!({ "next": next, "last": last })),
            )
        }
    }
}
