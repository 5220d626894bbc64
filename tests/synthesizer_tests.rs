// Copyright (c) 2025 - Cowboy AI, Inc.
//! Field synthesizer integration tests
//!
//! Remote failures of every shape must end in a contract-satisfying map from
//! the fallback, and a whole run must survive a provider that never answers.

mod fixtures;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use test_case::test_case;

use fixtures::*;
use inventory_synth::domain::{validate_inventory, EntityKind};
use inventory_synth::pipeline::run_generation;
use inventory_synth::synth::contract::satisfies_contract;
use inventory_synth::synth::{FieldSynthesizer, MockProvider, ProviderStrategy, SynthContext};
use inventory_synth::ReportCategory;

fn with_mock(provider: MockProvider) -> (FieldSynthesizer, Arc<MockProvider>) {
    let provider = Arc::new(provider);
    let strategy = ProviderStrategy::Active(provider.clone());
    (FieldSynthesizer::new(strategy), provider)
}

#[test_case(EntityKind::Vm, "not json at all" ; "vm prose")]
#[test_case(EntityKind::Vm, r#"{"name": "x"}"# ; "vm missing fields")]
#[test_case(EntityKind::Host, r#"{"sockets": "many"}"# ; "host wrong type")]
#[test_case(EntityKind::Cluster, "[1, 2, 3]" ; "cluster array")]
#[test_case(EntityKind::Datastore, "" ; "datastore empty")]
#[test_case(EntityKind::Disk, r#"{"label": 5}"# ; "disk wrong type")]
#[test_case(EntityKind::Nic, r#"{"mac_address": "zz:zz""# ; "nic truncated")]
#[tokio::test]
async fn test_malformed_response_falls_back(kind: EntityKind, raw: &str) {
    let (synth, provider) = with_mock(MockProvider::always(raw));
    let mut rng = StdRng::seed_from_u64(1);

    let map = synth
        .synthesize(kind, &SynthContext::new().with("name", "x"), &mut rng)
        .await;

    assert!(satisfies_contract(kind, &map), "{:?}", map);
    assert_eq!(provider.calls(), 1);
    let stats = synth.stats();
    assert_eq!(stats.remote, 0);
    assert_eq!(stats.remote_failures, 1);
    assert_eq!(stats.fallback, 1);
}

#[tokio::test]
async fn test_plausible_provider_answers_are_used() {
    let (synth, provider) = with_mock(MockProvider::plausible());
    let mut rng = StdRng::seed_from_u64(1);

    let map = synth
        .synthesize(EntityKind::Cluster, &SynthContext::new().with("name", "c"), &mut rng)
        .await;

    assert!(satisfies_contract(EntityKind::Cluster, &map));
    assert_eq!(provider.calls(), 1);
    assert_eq!(synth.stats().remote, 1);
    assert_eq!(synth.stats().fallback, 0);
}

#[test_case(EntityKind::Snapshot)]
#[test_case(EntityKind::Hba)]
#[tokio::test]
async fn test_fallback_only_kinds_skip_the_provider(kind: EntityKind) {
    let (synth, provider) = with_mock(MockProvider::plausible());
    let mut rng = StdRng::seed_from_u64(1);

    let map = synth.synthesize(kind, &SynthContext::new(), &mut rng).await;

    assert!(satisfies_contract(kind, &map));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_failing_provider_completes_run() {
    let (synth, provider) = with_mock(MockProvider::failing("connection refused"));

    let output = run_generation(options(SEED, 0), Some(two_vm_scenario()), synth).await;

    assert!(provider.calls() > 0);
    assert_eq!(output.reports.len(), ReportCategory::ALL.len());
    assert_eq!(output.report(ReportCategory::VInfo).unwrap().len(), 2);
    assert!(validate_inventory(&output.inventory).is_empty());
}

#[tokio::test]
async fn test_plausible_provider_run_keeps_invariants() {
    let (synth, _) = with_mock(MockProvider::plausible());

    let output = run_generation(options(SEED, 12), None, synth).await;

    assert_eq!(output.inventory.vms().len(), 12);
    let violations = validate_inventory(&output.inventory);
    assert!(violations.is_empty(), "violations: {:?}", violations);
    // structural fields never come from the provider
    let names: Vec<&str> = output.inventory.vms().iter().map(|vm| vm.name.as_str()).collect();
    assert!(names.iter().all(|n| *n != "mock-vm"));
}

/// Guest addresses of running VMs, asserting none repeats
fn assert_distinct_guest_ips(output: &inventory_synth::GenerationOutput) -> HashSet<String> {
    let running: Vec<_> = output.inventory.vms().iter().filter(|vm| vm.power_state.is_on()).collect();
    assert!(!running.is_empty());
    let ips: HashSet<String> = running.iter().map(|vm| vm.ip_address.clone()).collect();
    assert!(!ips.contains(""));
    assert_eq!(ips.len(), running.len(), "duplicate guest addresses: {:?}", ips);
    ips
}

#[tokio::test]
async fn test_plausible_provider_guests_get_distinct_addresses() {
    let (synth, _) = with_mock(MockProvider::plausible());
    let output = run_generation(options(SEED, 30), None, synth).await;
    assert_distinct_guest_ips(&output);
}

#[tokio::test]
async fn test_repeated_provider_address_is_redrawn() {
    let vm = r#"{"name": "mock-vm", "power_state": "poweredOn", "os": "Rocky Linux 9 (64-bit)",
                 "provisioned_mib": 61440, "in_use_mib": 20480, "ip_address": "10.99.0.10"}"#;
    let (synth, _) = with_mock(MockProvider::plausible().with_response(EntityKind::Vm, vm));

    let output = run_generation(options(SEED, 10), None, synth).await;

    let ips = assert_distinct_guest_ips(&output);
    assert_eq!(ips.len(), 10);
    assert!(ips.contains("10.99.0.10"));
}

#[tokio::test]
async fn test_deterministic_synthesizer_is_disabled() {
    let synth = FieldSynthesizer::deterministic();
    assert!(synth.strategy().is_disabled());

    let mut a = StdRng::seed_from_u64(5);
    let mut b = StdRng::seed_from_u64(5);
    let ctx = SynthContext::new().with("name", "vm-0001");
    assert_eq!(
        synth.synthesize(EntityKind::Vm, &ctx, &mut a).await,
        synth.synthesize(EntityKind::Vm, &ctx, &mut b).await
    );
}
