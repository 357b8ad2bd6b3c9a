use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sponsorscout_common::{Config, Lead};
use sponsorscout_enrichment::EnrichmentPipeline;
use sponsorscout_forensics::{
    apply_verification, begin_verification, discovery_schema, get_identity_keys,
    parse_discovered_leads, parse_verification, IdentityIndex,
};

/// Sponsor lead forensics: parse discovery output, enrich and verify leads.
///
/// Every FILE argument accepts `-` for stdin. Results go to stdout as JSON.
#[derive(Parser)]
#[command(name = "sponsorscout", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Turn raw discovery text into leads.
    Parse {
        file: PathBuf,
        /// Leads already in the pipeline; matching discoveries are dropped.
        #[arg(long)]
        known: Option<PathBuf>,
    },
    /// Print the identity keys of each lead.
    Keys { file: PathBuf },
    /// Run the enrichment layers over a leads file.
    Enrich { file: PathBuf },
    /// Apply a verification response to one lead and print the updated batch.
    Verify {
        leads_file: PathBuf,
        lead_id: Uuid,
        verification_file: PathBuf,
    },
    /// Print the JSON Schema the discovery prompt asks for.
    Schema,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadKeys<'a> {
    id: Uuid,
    company_name: &'a str,
    keys: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sponsorscout=info".parse()?)
                .add_directive("apollo_client=info".parse()?)
                .add_directive("site_scraper=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Parse { file, known } => {
            let text = read_input(&file)?;
            let mut leads = parse_discovered_leads(&text, &[]);
            if let Some(known) = known {
                let existing = read_leads(&known)?;
                let mut index = IdentityIndex::from_entities(existing.iter());
                leads = index.retain_new(leads);
            }
            info!(leads = leads.len(), "Parsed discovery output");
            print_json(&leads)?;
        }
        Command::Keys { file } => {
            let leads = read_leads(&file)?;
            let keys: Vec<LeadKeys> = leads
                .iter()
                .map(|lead| LeadKeys {
                    id: lead.id,
                    company_name: &lead.company_name,
                    keys: get_identity_keys(lead),
                })
                .collect();
            print_json(&keys)?;
        }
        Command::Enrich { file } => {
            let config = Config::from_env()?;
            config.log_redacted();

            let leads = read_leads(&file)?;
            let pipeline = EnrichmentPipeline::from_config(&config)?;
            let (enriched, stats) = pipeline.enrich_with_stats(leads).await;
            eprintln!("{stats}");
            print_json(&enriched)?;
        }
        Command::Verify {
            leads_file,
            lead_id,
            verification_file,
        } => {
            let mut leads = read_leads(&leads_file)?;
            let response = parse_verification(&read_input(&verification_file)?)
                .ok_or_else(|| anyhow!("No usable verification result in {}", verification_file.display()))?;

            let Some(slot) = leads.iter_mut().find(|l| l.id == lead_id) else {
                bail!("Lead {lead_id} not found in {}", leads_file.display());
            };
            let verifying = begin_verification(slot)?;
            let verified = apply_verification(&verifying, &response, Utc::now())?;
            info!(
                lead_id = %lead_id,
                status = %verified.verification_status,
                "Applied verification"
            );
            *slot = verified;
            print_json(&leads)?;
        }
        Command::Schema => {
            print_json(&discovery_schema())?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_leads(path: &Path) -> Result<Vec<Lead>> {
    let text = read_input(path)?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a JSON array of leads", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
