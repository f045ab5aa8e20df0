// Alibaba Cloud DNS validation demo
//
// Checks that an access key pair can resolve a hosted zone and, in live
// mode, publish and then remove a TXT challenge record.
//
// Usage:
//
//   export ALIDNS_ACCESS_KEY_ID="LTAI..."
//   export ALIDNS_ACCESS_KEY_SECRET="..."
//   export DNS01_ZONE="example.com"
//   export DNS01_FQDN="_acme-challenge.example.com"   # optional
//   export ALIDNS_REGION="cn-hangzhou"                # optional
//   export DNS01_MODE="live"                          # optional, default dry-run
//
//   cargo run -p demos --bin alidns_validation

use std::env;
use std::sync::Arc;

use dns01_core::resolver::{extract_rr, get_hosted_zone};
use dns01_core::secrets::MemorySecretStoreFactory;
use dns01_core::traits::{DnsClient, DnsClientFactory};
use dns01_core::{
    ChallengeRequest, HostConfig, MemorySecretStore, ProviderCredential, ProviderRegistry,
    SecretStoreConfig, Solver,
};
use dns01_provider_alidns::AlidnsFactory;

const NAMESPACE: &str = "demo";
const SECRET_NAME: &str = "alidns-credentials";

fn required(name: &str) -> String {
    match env::var(name) {
        Ok(v) if !v.is_empty() => v,
        _ => {
            eprintln!("Error: {} environment variable not set", name);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let access_key_id = required("ALIDNS_ACCESS_KEY_ID");
    let access_key_secret = required("ALIDNS_ACCESS_KEY_SECRET");
    let zone = required("DNS01_ZONE");
    let zone = format!("{}.", zone.trim_end_matches('.'));
    let fqdn = env::var("DNS01_FQDN").unwrap_or_else(|_| format!("_acme-challenge.{}", zone));
    let fqdn = format!("{}.", fqdn.trim_end_matches('.'));
    let region = env::var("ALIDNS_REGION").unwrap_or_default();
    let live = env::var("DNS01_MODE")
        .map(|m| m.eq_ignore_ascii_case("live"))
        .unwrap_or(false);

    tracing::info!("=== alidns validation ===");
    tracing::info!("Zone: {}", zone);
    tracing::info!("FQDN: {}", fqdn);
    tracing::info!("Mode: {}", if live { "LIVE" } else { "DRY-RUN" });

    // Step 1: resolve the hosted zone with a directly built client
    tracing::info!("Step 1: Resolving hosted zone...");
    let credential = ProviderCredential::new(&access_key_id, &access_key_secret);
    let client = AlidnsFactory::default().create(&region, &credential)?;
    let domain = get_hosted_zone(client.as_ref(), &zone).await?;
    let rr = extract_rr(&fqdn, &domain);
    tracing::info!("✓ Hosted zone: {} (record name: {})", domain, rr);

    let existing = client.describe_txt_records(&domain, &rr).await?;
    tracing::info!("  {} TXT record(s) currently match {}", existing.len(), rr);

    if !live {
        tracing::info!("Dry run complete. Set DNS01_MODE=live to publish a record.");
        return Ok(());
    }

    // Step 2: wire a solver to an in-memory secret store holding the key pair
    tracing::info!("Step 2: Initializing solver...");
    let secrets = MemorySecretStore::new();
    secrets
        .insert(NAMESPACE, SECRET_NAME, "access-key", access_key_id.as_str())
        .await;
    secrets
        .insert(NAMESPACE, SECRET_NAME, "secret-key", access_key_secret.as_str())
        .await;

    let registry = Arc::new(ProviderRegistry::new());
    dns01_provider_alidns::register(&registry);
    registry.register_secret_store("memory", Box::new(MemorySecretStoreFactory::shared(secrets)));

    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut solver = dns01_provider_alidns::solver(registry);
    solver
        .initialize(HostConfig::new(SecretStoreConfig::Memory), shutdown_rx)
        .await?;
    tracing::info!("✓ Solver {} ready", solver.name());

    let key = format!("dns01-validation-{}", std::process::id());
    let request = ChallengeRequest::new(&fqdn, &zone, &key)
        .with_namespace(NAMESPACE)
        .with_config(serde_json::json!({
            "region": region,
            "accessKeySecretRef": { "name": SECRET_NAME, "key": "access-key" },
            "secretKeySecretRef": { "name": SECRET_NAME, "key": "secret-key" }
        }));

    // Step 3: publish
    tracing::info!("Step 3: Presenting TXT record...");
    solver.present(&request).await?;
    let published = client.describe_txt_records(&domain, &rr).await?;
    if published.iter().any(|r| r.rr == rr && r.value == key) {
        tracing::info!("✓ TXT record visible through the API");
    } else {
        tracing::warn!("⚠ TXT record not yet visible through the API");
    }

    // Step 4: remove
    tracing::info!("Step 4: Cleaning up TXT record...");
    solver.clean_up(&request).await?;
    tracing::info!("✓ TXT record removed");

    tracing::info!("=== Validation complete ===");
    Ok(())
}
