// Copyright (c) 2025 - Cowboy AI, Inc.
//! Field Contracts
//!
//! One table describes, per entity kind, which fields a synthesized map must
//! carry, their types and the defaults used when a numeric field is missing.
//! The remote path runs raw provider JSON through [`validate_and_coerce`] and
//! [`check_business_rules`]; the fallback generators are tested against
//! [`satisfies_contract`], so both paths answer to the same table.
//!
//! # Coercion Rules
//!
//! | Target | Accepted input |
//! |--------|----------------|
//! | text   | string, number, bool |
//! | int    | integer, float (rounded), numeric string |
//! | bool   | bool, `"true"`/`"false"`/`"yes"`/`"no"`, 0/1 |

use serde_json::{json, Map, Value};

use super::fields::{FieldMap, FieldValue};
use crate::domain::{EntityKind, HostHardware, MacAddress, PowerState};
use crate::errors::{SynthError, SynthResult};

/// Type of a contract field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Int,
    Bool,
}

impl FieldType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Int => "integer",
            Self::Bool => "boolean",
        }
    }
}

/// Whether a field must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent value rejects the response
    Required,
    /// Absent value is replaced by the given integer
    Defaulted(i64),
    /// May be absent
    Optional,
}

/// One row of the contract table
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub presence: Presence,
}

const fn req(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        presence: Presence::Required,
    }
}

const fn int_default(name: &'static str, default: i64) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Int,
        presence: Presence::Defaulted(default),
    }
}

const fn opt(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        presence: Presence::Optional,
    }
}

use FieldType::{Bool, Int, Text};

const VM_FIELDS: &[FieldSpec] = &[
    req("name", Text),
    req("power_state", Text),
    req("os", Text),
    int_default("provisioned_mib", 40_960),
    int_default("in_use_mib", 0),
    opt("ip_address", Text),
    opt("dns_name", Text),
    opt("annotation", Text),
    opt("vcpu", Int),
    opt("memory_mib", Int),
];

/// `cpu_mhz_total` of 0 means "derive from the other three"
const HOST_FIELDS: &[FieldSpec] = &[
    req("name", Text),
    req("cluster", Text),
    req("datacenter", Text),
    int_default("cpu_mhz_total", 0),
    int_default("cpu_mhz", 2_400),
    int_default("sockets", 2),
    int_default("cores_per_socket", 16),
    int_default("memory_mib", 262_144),
    req("esxi_version", Text),
    opt("vendor", Text),
    opt("model", Text),
    opt("cpu_model", Text),
];

const CLUSTER_FIELDS: &[FieldSpec] = &[
    req("name", Text),
    req("ha_enabled", Bool),
    req("drs_enabled", Bool),
    opt("drs_behavior", Text),
];

const DATASTORE_FIELDS: &[FieldSpec] = &[
    req("name", Text),
    req("type", Text),
    int_default("capacity_mib", 1_048_576),
    req("accessible", Bool),
];

const DISK_FIELDS: &[FieldSpec] = &[
    req("label", Text),
    int_default("capacity_mib", 40_960),
    req("thin", Bool),
    opt("disk_mode", Text),
];

const NIC_FIELDS: &[FieldSpec] = &[
    req("label", Text),
    req("adapter_type", Text),
    req("mac_address", Text),
    req("connected", Bool),
];

const SNAPSHOT_FIELDS: &[FieldSpec] = &[
    req("name", Text),
    opt("description", Text),
    int_default("size_mib", 0),
    req("created", Text),
];

const HBA_FIELDS: &[FieldSpec] = &[
    req("device", Text),
    req("model", Text),
    req("hba_type", Text),
    opt("driver", Text),
];

/// Contract table row for a kind
pub fn contract(kind: EntityKind) -> &'static [FieldSpec] {
    match kind {
        EntityKind::Vm => VM_FIELDS,
        EntityKind::Host => HOST_FIELDS,
        EntityKind::Cluster => CLUSTER_FIELDS,
        EntityKind::Datastore => DATASTORE_FIELDS,
        EntityKind::Disk => DISK_FIELDS,
        EntityKind::Nic => NIC_FIELDS,
        EntityKind::Snapshot => SNAPSHOT_FIELDS,
        EntityKind::Hba => HBA_FIELDS,
    }
}

/// Kinds the remote path may fill; the rest always use the fallback
pub fn supports_remote(kind: EntityKind) -> bool {
    !matches!(kind, EntityKind::Snapshot | EntityKind::Hba)
}

/// JSON description of a kind's fields, embedded in provider prompts
pub fn schema_description(kind: EntityKind) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for spec in contract(kind) {
        properties.insert(spec.name.to_string(), json!({ "type": spec.ty.as_str() }));
        if spec.presence == Presence::Required {
            required.push(Value::from(spec.name));
        }
    }
    json!({
        "entity": kind.as_str(),
        "description": kind.description(),
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Whether a field map carries every required field with the right type
pub fn satisfies_contract(kind: EntityKind, map: &FieldMap) -> bool {
    contract(kind).iter().all(|spec| match (spec.presence, map.get(spec.name)) {
        (Presence::Optional, None) => true,
        (_, None) => false,
        (_, Some(value)) => matches!(
            (spec.ty, value),
            (FieldType::Text, FieldValue::Text(_))
                | (FieldType::Int, FieldValue::Int(_))
                | (FieldType::Bool, FieldValue::Bool(_))
        ),
    })
}

/// Longest raw-response excerpt carried into logs
pub const RAW_EXCERPT_LEN: usize = 200;

/// First [`RAW_EXCERPT_LEN`] characters of a response, for diagnostics
pub fn excerpt(raw: &str) -> String {
    let mut out: String = raw.chars().take(RAW_EXCERPT_LEN).collect();
    if raw.chars().count() > RAW_EXCERPT_LEN {
        out.push('…');
    }
    out
}

/// Parse a provider's text answer into a JSON object
///
/// Markdown code fences around the object are tolerated.
pub fn parse_response(kind: EntityKind, raw: &str) -> SynthResult<Value> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    let value: Value = serde_json::from_str(body).map_err(|e| {
        SynthError::invalid(kind, format!("not JSON ({}): {}", e, excerpt(raw)))
    })?;

    if !value.is_object() {
        return Err(SynthError::invalid(
            kind,
            format!("expected a JSON object: {}", excerpt(raw)),
        ));
    }
    Ok(value)
}

fn coerce(kind: EntityKind, spec: &FieldSpec, value: &Value) -> SynthResult<Option<FieldValue>> {
    let bad = |what: &str| {
        SynthError::invalid(kind, format!("field '{}' {}: {}", spec.name, what, value))
    };

    let coerced = match (spec.ty, value) {
        (_, Value::Null) => return Ok(None),

        (FieldType::Text, Value::String(s)) => FieldValue::Text(s.trim().to_string()),
        (FieldType::Text, Value::Number(n)) => FieldValue::Text(n.to_string()),
        (FieldType::Text, Value::Bool(b)) => FieldValue::Text(b.to_string()),

        (FieldType::Int, Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => FieldValue::Int(i),
            (None, Some(f)) if f.is_finite() => FieldValue::Int(f.round() as i64),
            _ => return Err(bad("is not a representable integer")),
        },
        (FieldType::Int, Value::String(s)) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                FieldValue::Int(i)
            } else if let Ok(f) = s.parse::<f64>() {
                if !f.is_finite() {
                    return Err(bad("is not finite"));
                }
                FieldValue::Int(f.round() as i64)
            } else {
                return Err(bad("is not numeric"));
            }
        }

        (FieldType::Bool, Value::Bool(b)) => FieldValue::Bool(*b),
        (FieldType::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => FieldValue::Bool(true),
            "false" | "no" => FieldValue::Bool(false),
            _ => return Err(bad("is not a boolean")),
        },
        (FieldType::Bool, Value::Number(n)) => match n.as_i64() {
            Some(0) => FieldValue::Bool(false),
            Some(1) => FieldValue::Bool(true),
            _ => return Err(bad("is not a boolean")),
        },

        _ => return Err(bad("has the wrong type")),
    };

    Ok(Some(coerced))
}

/// Validate a provider object against a kind's contract and coerce its types
///
/// Contract fields are coerced; missing numeric fields take their defaults;
/// other scalar keys are carried through as text. Empty text counts as
/// missing for required fields.
pub fn validate_and_coerce(kind: EntityKind, raw: &Value) -> SynthResult<FieldMap> {
    let object = raw
        .as_object()
        .ok_or_else(|| SynthError::invalid(kind, "expected a JSON object"))?;

    let mut map = FieldMap::new();
    for spec in contract(kind) {
        let value = object.get(spec.name).unwrap_or(&Value::Null);
        let coerced = coerce(kind, spec, value)?;
        let coerced = match coerced {
            Some(FieldValue::Text(s)) if s.is_empty() && spec.presence == Presence::Required => None,
            other => other,
        };

        match (coerced, spec.presence) {
            (Some(v), _) => map.insert(spec.name, v),
            (None, Presence::Defaulted(d)) => map.insert(spec.name, d),
            (None, Presence::Optional) => {}
            (None, Presence::Required) => {
                return Err(SynthError::invalid(
                    kind,
                    format!("missing required field '{}'", spec.name),
                ))
            }
        }
    }

    for (key, value) in object {
        if map.contains(key) {
            continue;
        }
        match value {
            Value::String(s) => map.insert(key, s.as_str()),
            Value::Bool(b) => map.insert(key, *b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => map.insert(key, i),
                None => map.insert(key, n.to_string()),
            },
            _ => {}
        }
    }

    Ok(map)
}

fn non_negative(kind: EntityKind, map: &FieldMap, key: &str) -> SynthResult<u64> {
    match map.int(key) {
        Some(v) if v >= 0 => Ok(v as u64),
        Some(v) => Err(SynthError::invalid(kind, format!("'{}' is negative: {}", key, v))),
        None => Err(SynthError::invalid(kind, format!("'{}' is missing", key))),
    }
}

/// Host totals from a provider may be off by this fraction before rejection
pub const CPU_TOTAL_TOLERANCE: f64 = 0.01;

/// Enforce the numeric and business rules on a coerced map
///
/// Normalizes where the rule determines the value (canonical power state,
/// zeroed guest fields while not running, exact CPU total, canonical MAC) and
/// rejects where it does not.
pub fn check_business_rules(kind: EntityKind, map: &mut FieldMap) -> SynthResult<()> {
    match kind {
        EntityKind::Vm => {
            let raw_state = map.text_or("power_state", "");
            let state: PowerState = raw_state
                .parse()
                .map_err(|e: String| SynthError::invalid(kind, e))?;
            map.insert("power_state", state.as_str());

            let provisioned = non_negative(kind, map, "provisioned_mib")?;
            let in_use = non_negative(kind, map, "in_use_mib")?;

            if state.reports_guest_info() {
                if provisioned <= in_use {
                    return Err(SynthError::invalid(
                        kind,
                        format!("provisioned {} MiB does not exceed in-use {} MiB", provisioned, in_use),
                    ));
                }
            } else {
                map.insert("in_use_mib", 0i64);
                map.insert("ip_address", "");
                map.insert("dns_name", "");
            }
            if provisioned == 0 {
                return Err(SynthError::invalid(kind, "provisioned size is zero"));
            }
        }
        EntityKind::Host => {
            let sockets = non_negative(kind, map, "sockets")?;
            let cores = non_negative(kind, map, "cores_per_socket")?;
            let mhz = non_negative(kind, map, "cpu_mhz")?;
            if sockets == 0 || cores == 0 || mhz == 0 {
                return Err(SynthError::invalid(kind, "CPU topology has a zero component"));
            }
            if sockets > u64::from(HostHardware::MAX_SOCKETS)
                || cores > u64::from(HostHardware::MAX_CORES_PER_SOCKET)
                || mhz > u64::from(HostHardware::MAX_CPU_MHZ)
            {
                return Err(SynthError::invalid(
                    kind,
                    format!("CPU topology {} x {} x {} MHz is out of range", sockets, cores, mhz),
                ));
            }
            let expected = sockets
                .checked_mul(cores)
                .and_then(|v| v.checked_mul(mhz))
                .ok_or_else(|| SynthError::invalid(kind, "CPU total overflows"))?;
            let total = non_negative(kind, map, "cpu_mhz_total")?;
            if total != 0 {
                let drift = (total as f64 - expected as f64).abs() / expected as f64;
                if drift > CPU_TOTAL_TOLERANCE {
                    return Err(SynthError::invalid(
                        kind,
                        format!(
                            "cpu_mhz_total {} is not {} x {} x {} = {}",
                            total, sockets, cores, mhz, expected
                        ),
                    ));
                }
            }
            map.insert("cpu_mhz_total", expected);
            match non_negative(kind, map, "memory_mib")? {
                0 => return Err(SynthError::invalid(kind, "memory size is zero")),
                m if m > HostHardware::MAX_MEMORY_MIB => {
                    return Err(SynthError::invalid(kind, format!("memory {} MiB is out of range", m)))
                }
                _ => {}
            }
        }
        EntityKind::Disk | EntityKind::Datastore => {
            if non_negative(kind, map, "capacity_mib")? == 0 {
                return Err(SynthError::invalid(kind, "capacity is zero"));
            }
        }
        EntityKind::Nic => {
            let mac: MacAddress = map
                .text_or("mac_address", "")
                .parse()
                .map_err(|e| SynthError::invalid(kind, format!("{}", e)))?;
            map.insert("mac_address", mac.as_str());
        }
        EntityKind::Snapshot => {
            non_negative(kind, map, "size_mib")?;
        }
        EntityKind::Cluster | EntityKind::Hba => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_coerces_string_scalars() {
        let raw = json!({
            "label": "Hard disk 1",
            "capacity_mib": "20480",
            "thin": "true",
        });
        let map = validate_and_coerce(EntityKind::Disk, &raw).unwrap();
        assert_eq!(map.int("capacity_mib"), Some(20_480));
        assert_eq!(map.bool("thin"), Some(true));
        assert!(satisfies_contract(EntityKind::Disk, &map));
    }

    #[test]
    fn test_missing_numeric_takes_default() {
        let raw = json!({ "label": "Hard disk 1", "thin": false });
        let map = validate_and_coerce(EntityKind::Disk, &raw).unwrap();
        assert_eq!(map.int("capacity_mib"), Some(40_960));
    }

    #[test]
    fn test_missing_required_rejected() {
        let raw = json!({ "label": "Hard disk 1", "capacity_mib": 1024 });
        let err = validate_and_coerce(EntityKind::Disk, &raw).unwrap_err();
        assert!(err.to_string().contains("thin"));
    }

    #[test]
    fn test_empty_required_text_rejected() {
        let raw = json!({ "name": "", "ha_enabled": true, "drs_enabled": true });
        assert!(validate_and_coerce(EntityKind::Cluster, &raw).is_err());
    }

    #[test_case(json!("maybe") ; "word")]
    #[test_case(json!(7) ; "number")]
    #[test_case(json!([true]) ; "array")]
    fn test_bad_boolean_rejected(value: Value) {
        let raw = json!({ "name": "c1", "ha_enabled": value, "drs_enabled": true });
        assert!(validate_and_coerce(EntityKind::Cluster, &raw).is_err());
    }

    #[test]
    fn test_extra_scalars_carried() {
        let raw = json!({
            "name": "c1", "ha_enabled": 1, "drs_enabled": "no",
            "evc_mode": "intel-icelake", "nested": { "x": 1 }
        });
        let map = validate_and_coerce(EntityKind::Cluster, &raw).unwrap();
        assert_eq!(map.bool("ha_enabled"), Some(true));
        assert_eq!(map.bool("drs_enabled"), Some(false));
        assert_eq!(map.text("evc_mode").as_deref(), Some("intel-icelake"));
        assert!(!map.contains("nested"));
    }

    #[test]
    fn test_parse_response_strips_fences() {
        let raw = "```json\n{\"name\": \"c1\"}\n```";
        let value = parse_response(EntityKind::Cluster, raw).unwrap();
        assert_eq!(value["name"], "c1");
    }

    #[test]
    fn test_parse_response_rejects_non_object() {
        assert!(parse_response(EntityKind::Cluster, "[1, 2]").is_err());
        assert!(parse_response(EntityKind::Cluster, "Sure! Here is a cluster").is_err());
    }

    #[test]
    fn test_vm_off_is_normalized() {
        let raw = json!({
            "name": "db01", "power_state": "off", "os": "Windows Server 2022",
            "provisioned_mib": 100_000, "in_use_mib": 5_000,
            "ip_address": "10.1.2.3", "dns_name": "db01.corp"
        });
        let mut map = validate_and_coerce(EntityKind::Vm, &raw).unwrap();
        check_business_rules(EntityKind::Vm, &mut map).unwrap();
        assert_eq!(map.text("power_state").as_deref(), Some("poweredOff"));
        assert_eq!(map.int("in_use_mib"), Some(0));
        assert_eq!(map.text("ip_address").as_deref(), Some(""));
        assert_eq!(map.text("dns_name").as_deref(), Some(""));
    }

    #[test]
    fn test_vm_on_requires_headroom() {
        let raw = json!({
            "name": "db01", "power_state": "poweredOn", "os": "Windows Server 2022",
            "provisioned_mib": 1000, "in_use_mib": 1000
        });
        let mut map = validate_and_coerce(EntityKind::Vm, &raw).unwrap();
        assert!(check_business_rules(EntityKind::Vm, &mut map).is_err());
    }

    #[test]
    fn test_host_total_normalized_within_tolerance() {
        let raw = json!({
            "name": "esx01", "cluster": "c1", "datacenter": "dc1",
            "sockets": 2, "cores_per_socket": 16, "cpu_mhz": 2400,
            "cpu_mhz_total": 76_500, "memory_mib": 262_144, "esxi_version": "8.0.2"
        });
        let mut map = validate_and_coerce(EntityKind::Host, &raw).unwrap();
        check_business_rules(EntityKind::Host, &mut map).unwrap();
        assert_eq!(map.int("cpu_mhz_total"), Some(76_800));
    }

    #[test]
    fn test_host_total_rejected_outside_tolerance() {
        let raw = json!({
            "name": "esx01", "cluster": "c1", "datacenter": "dc1",
            "sockets": 2, "cores_per_socket": 16, "cpu_mhz": 2400,
            "cpu_mhz_total": 50_000, "memory_mib": 262_144, "esxi_version": "8.0.2"
        });
        let mut map = validate_and_coerce(EntityKind::Host, &raw).unwrap();
        assert!(check_business_rules(EntityKind::Host, &mut map).is_err());
    }

    #[test]
    fn test_host_huge_topology_rejected_without_overflow() {
        let raw = json!({
            "name": "esx01", "cluster": "c1", "datacenter": "dc1",
            "sockets": 1e7, "cores_per_socket": 1e7, "cpu_mhz": 1e7,
            "cpu_mhz_total": 0, "memory_mib": 262_144, "esxi_version": "8.0.2"
        });
        let mut map = validate_and_coerce(EntityKind::Host, &raw).unwrap();
        assert!(check_business_rules(EntityKind::Host, &mut map).is_err());

        let raw = json!({
            "name": "esx01", "cluster": "c1", "datacenter": "dc1",
            "sockets": i64::MAX, "cores_per_socket": 2, "cpu_mhz": 2,
            "memory_mib": 262_144, "esxi_version": "8.0.2"
        });
        let mut map = validate_and_coerce(EntityKind::Host, &raw).unwrap();
        assert!(check_business_rules(EntityKind::Host, &mut map).is_err());
    }

    #[test]
    fn test_host_topology_at_limits_accepted() {
        let raw = json!({
            "name": "esx01", "cluster": "c1", "datacenter": "dc1",
            "sockets": HostHardware::MAX_SOCKETS,
            "cores_per_socket": HostHardware::MAX_CORES_PER_SOCKET,
            "cpu_mhz": HostHardware::MAX_CPU_MHZ,
            "memory_mib": 262_144, "esxi_version": "8.0.2"
        });
        let mut map = validate_and_coerce(EntityKind::Host, &raw).unwrap();
        check_business_rules(EntityKind::Host, &mut map).unwrap();
        assert_eq!(map.int("cpu_mhz_total"), Some(16 * 256 * 10_000));
    }

    #[test]
    fn test_nic_mac_canonicalized() {
        let raw = json!({
            "label": "Network adapter 1", "adapter_type": "vmxnet3",
            "mac_address": "00-50-56-AA-BB-CC", "connected": "yes"
        });
        let mut map = validate_and_coerce(EntityKind::Nic, &raw).unwrap();
        check_business_rules(EntityKind::Nic, &mut map).unwrap();
        assert_eq!(map.text("mac_address").as_deref(), Some("00:50:56:aa:bb:cc"));
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = schema_description(EntityKind::Nic);
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["label", "adapter_type", "mac_address", "connected"]);
    }

    #[test]
    fn test_remote_support() {
        assert!(supports_remote(EntityKind::Vm));
        assert!(!supports_remote(EntityKind::Snapshot));
        assert!(!supports_remote(EntityKind::Hba));
    }
}
