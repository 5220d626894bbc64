// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity & Naming Utilities
//!
//! Pure functions that turn a seeded RNG (and sometimes an index) into
//! names, UUIDs, addresses and dates. Nothing here keeps state; callers own
//! the RNG and any counters.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::net::Ipv4Addr;
use uuid::{Builder, Uuid};

/// DNS suffix used for every synthesized name
pub const DOMAIN_SUFFIX: &str = "synth.local";

/// Draw a v4 UUID from the caller's RNG
///
/// Using the run RNG instead of the OS source keeps identities reproducible
/// for a fixed seed.
pub fn uuid_from_rng<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Lowercase, DNS-safe form of an arbitrary label
///
/// Runs of anything that is not ASCII alphanumeric collapse to one hyphen;
/// leading and trailing hyphens are dropped. An empty result becomes `x`.
pub fn slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if out.is_empty() {
        out.push('x');
    }
    out
}

/// Fully qualified host name: `esx01.dc-east.synth.local`
pub fn host_name(datacenter: &str, index: usize) -> String {
    format!("esx{:02}.{}.{}", index, slug(datacenter), DOMAIN_SUFFIX)
}

/// First label of a dotted name
pub fn short_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// VM name from a prefix and a 1-based counter: `web001`
pub fn vm_name(prefix: &str, index: usize) -> String {
    format!("{}{:03}", prefix, index)
}

/// Guest DNS name for a VM
pub fn vm_dns_name(vm_name: &str) -> String {
    format!("{}.{}", slug(vm_name), DOMAIN_SUFFIX)
}

/// Run-unique label of a host: its name without the DNS suffix, slugged
///
/// Hosts are numbered per datacenter, so the short name alone repeats
/// across datacenters; the datacenter label keeps `esx01.dc-east` apart
/// from `esx01.dc-west`.
pub fn host_label(host_name: &str) -> String {
    let bare = host_name
        .strip_suffix(DOMAIN_SUFFIX)
        .map(|h| h.trim_end_matches('.'))
        .unwrap_or(host_name);
    slug(bare)
}

/// Local datastore name for a host: `esx01-dc-east-local`
pub fn local_datastore_name(host_name: &str) -> String {
    format!("{}-local", host_label(host_name))
}

/// Standard switch owned by a host: `vSwitch0-esx01-dc-east`
pub fn standard_switch_name(host_name: &str) -> String {
    format!("vSwitch0-{}", host_label(host_name))
}

/// Placeholder datastore minted when no real datastore can back a disk
pub fn fallback_datastore_name(datacenter: &str) -> String {
    format!("fallback-ds-{}", slug(datacenter))
}

/// Address in `10.<second>.0.0/16` for a guest, avoiding network and broadcast
pub fn private_ipv4<R: Rng + ?Sized>(rng: &mut R, second_octet: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, second_octet, rng.gen_range(0..=255), rng.gen_range(1..=254))
}

/// Stable second octet for a datacenter, so guests of one datacenter share a /16
pub fn datacenter_octet(datacenter: &str) -> u8 {
    let sum: u32 = datacenter.bytes().map(u32::from).sum();
    (sum % 200) as u8 + 20
}

/// Instant between `days_back` days before `anchor` and `anchor`
pub fn date_before<R: Rng + ?Sized>(rng: &mut R, anchor: DateTime<Utc>, days_back: i64) -> DateTime<Utc> {
    let span_secs = days_back.max(1) * 24 * 60 * 60;
    anchor - Duration::seconds(rng.gen_range(0..span_secs))
}

/// Hardware serial in the style vendors print on service tags
pub fn serial_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ0123456789";
    (0..7)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Fibre Channel world wide name, `20:00:` followed by six random octets
pub fn wwn<R: Rng + ?Sized>(rng: &mut R) -> String {
    let octets: [u8; 6] = rng.gen();
    let tail: Vec<String> = octets.iter().map(|b| format!("{:02x}", b)).collect();
    format!("20:00:{}", tail.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    #[test_case("DC-East", "dc-east")]
    #[test_case("  Prod  Cluster 01 ", "prod-cluster-01")]
    #[test_case("***", "x")]
    #[test_case("dvPG_App.100", "dvpg-app-100")]
    fn test_slug(input: &str, expected: &str) {
        assert_eq!(slug(input), expected);
    }

    #[test]
    fn test_host_and_datastore_names() {
        let host = host_name("DC East", 3);
        assert_eq!(host, "esx03.dc-east.synth.local");
        assert_eq!(short_name(&host), "esx03");
        assert_eq!(host_label(&host), "esx03-dc-east");
        assert_eq!(local_datastore_name(&host), "esx03-dc-east-local");
        assert_eq!(standard_switch_name(&host), "vSwitch0-esx03-dc-east");
    }

    #[test]
    fn test_host_labels_unique_across_datacenters() {
        let east = host_name("DC-East", 1);
        let west = host_name("DC-West", 1);
        assert_eq!(short_name(&east), short_name(&west));
        assert_ne!(local_datastore_name(&east), local_datastore_name(&west));
        assert_ne!(standard_switch_name(&east), standard_switch_name(&west));
        assert_eq!(host_label("(no host)"), "no-host");
    }

    #[test]
    fn test_uuid_is_seed_stable() {
        let a = uuid_from_rng(&mut StdRng::seed_from_u64(99));
        let b = uuid_from_rng(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn test_private_ipv4_avoids_edges() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let ip = private_ipv4(&mut rng, 42);
            let o = ip.octets();
            assert_eq!((o[0], o[1]), (10, 42));
            assert!(o[3] != 0 && o[3] != 255);
        }
    }

    #[test]
    fn test_date_before_stays_in_window() {
        let anchor = DateTime::parse_from_rfc3339("2026-01-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let d = date_before(&mut rng, anchor, 30);
            assert!(d <= anchor);
            assert!(d > anchor - Duration::days(30));
        }
    }

    #[test]
    fn test_wwn_format() {
        let w = wwn(&mut StdRng::seed_from_u64(3));
        assert!(w.starts_with("20:00:"));
        assert_eq!(w.split(':').count(), 8);
    }
}
