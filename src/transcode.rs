use anyhow::Result;
use std::collections::BTreeMap;

use crate::entry::{ConfigEntry, EntryKind};
use crate::fields::{field_spec, registry, FieldSpec, FieldValue, Matcher, Shape};
use crate::DhcpError;

/// Typed view decoded from an entry's raw lists, keyed by field name.
pub type VirtualAttrs = BTreeMap<&'static str, FieldValue>;

/// The fields a caller wants to change, in application order. Only named
/// fields are touched; append order follows this list.
pub type FieldUpdates = Vec<(String, FieldValue)>;

/// Decode the virtual fields of an entry from its raw statement, option and
/// permit lists. Pure and idempotent; the entry itself is left untouched.
///
/// When a keyword's line appears more than once in a list, the first
/// interpretable match wins and later duplicates are ignored. Encoding
/// replaces the first match too, so both directions agree on which line is
/// authoritative.
pub fn decode(kind: EntryKind, entry: &ConfigEntry) -> Result<VirtualAttrs> {
    let mut view = VirtualAttrs::new();

    for spec in registry(kind) {
        let lines = entry.attr(spec.target.attr_name());
        for line in lines.iter().filter(|l| spec.matcher.matches(l)) {
            match parse_line(spec, line)? {
                Some(value) => {
                    view.insert(spec.name, value);
                    break;
                }
                // Permit line that is neither allow nor deny; keep looking.
                None => continue,
            }
        }
    }

    Ok(view)
}

/// Splice updated virtual-field values into an entry's raw lists.
///
/// For each update the rendered `<keyword> <value>` line replaces the first
/// line matching the field's matcher in place (same index), or is appended
/// when no line matches. Lines belonging to other keywords are never
/// reordered, dropped or rewritten. An empty update list is a no-op.
pub fn encode(kind: EntryKind, entry: &mut ConfigEntry, updates: &FieldUpdates) -> Result<()> {
    for (name, value) in updates {
        let spec = field_spec(kind, name)
            .ok_or_else(|| DhcpError::UnknownField(name.clone()))?;
        let rendered = render_line(spec, value)?;

        let attr = spec.target.attr_name();
        let mut lines: Vec<String> = entry.attr(attr).to_vec();
        match lines.iter().position(|l| spec.matcher.matches(l)) {
            Some(i) => lines[i] = rendered,
            None => lines.push(rendered),
        }
        entry.set_attr(attr, lines);
    }

    Ok(())
}

/// Parse one matched line's payload per the field's value shape.
///
/// Returns `Ok(None)` only for permit lines whose prefix is neither `allow`
/// nor `deny`; those are treated as non-matching. Integer fields always
/// carry a value, so a non-numeric payload is a hard error rather than a
/// silent skip.
fn parse_line(spec: &FieldSpec, line: &str) -> Result<Option<FieldValue>> {
    if spec.shape == Shape::PermitFlag {
        if line.starts_with("allow ") {
            return Ok(Some(FieldValue::Flag(true)));
        }
        if line.starts_with("deny ") {
            return Ok(Some(FieldValue::Flag(false)));
        }
        return Ok(None);
    }

    let Matcher::Prefix(prefix) = spec.matcher else {
        // Only permit flags use suffix matching, handled above.
        return Ok(None);
    };
    let payload = &line[prefix.len()..];

    let value = match spec.shape {
        Shape::Integer => {
            let n = payload.trim().parse::<u32>().map_err(|_| {
                DhcpError::MalformedConfigLine {
                    keyword: prefix.trim_end().to_string(),
                    line: line.to_string(),
                }
            })?;
            FieldValue::Int(n)
        }
        Shape::QuotedText => FieldValue::Text(payload.replace('"', "")),
        Shape::Token => FieldValue::Text(payload.to_string()),
        Shape::PlainList => {
            FieldValue::List(payload.split(", ").map(str::to_string).collect())
        }
        Shape::QuotedList => FieldValue::List(
            payload
                .replace('"', "")
                .split(", ")
                .map(str::to_string)
                .collect(),
        ),
        Shape::PermitFlag => unreachable!(),
    };

    Ok(Some(value))
}

/// Render the raw line for a field's new value, the reverse of `parse_line`.
fn render_line(spec: &FieldSpec, value: &FieldValue) -> Result<String> {
    let mismatch = |expected: &'static str| DhcpError::FieldType {
        field: spec.name.to_string(),
        expected,
    };

    if spec.shape == Shape::PermitFlag {
        let allow = value.as_flag().ok_or_else(|| mismatch("boolean"))?;
        let Matcher::Suffix(suffix) = spec.matcher else {
            return Err(mismatch("boolean").into());
        };
        // The suffix carries its leading space.
        return Ok(format!(
            "{}{}",
            if allow { "allow" } else { "deny" },
            suffix
        ));
    }

    let Matcher::Prefix(prefix) = spec.matcher else {
        return Err(mismatch("value").into());
    };

    let payload = match spec.shape {
        Shape::Integer => value.as_int().ok_or_else(|| mismatch("integer"))?.to_string(),
        Shape::QuotedText => {
            format!("\"{}\"", value.as_text().ok_or_else(|| mismatch("string"))?)
        }
        Shape::Token => value
            .as_text()
            .ok_or_else(|| mismatch("string"))?
            .to_string(),
        Shape::PlainList => value
            .as_list()
            .ok_or_else(|| mismatch("list"))?
            .join(", "),
        Shape::QuotedList => value
            .as_list()
            .ok_or_else(|| mismatch("list"))?
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", "),
        Shape::PermitFlag => unreachable!(),
    };

    Ok(format!("{prefix}{payload}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ATTR_OPTIONS, ATTR_PERMIT_LIST, ATTR_STATEMENTS};

    fn update(name: &str, value: FieldValue) -> FieldUpdates {
        vec![(name.to_string(), value)]
    }

    #[test]
    fn test_decode_service_fields() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_STATEMENTS,
            ["authoritative", "default-lease-time 3600", "max-lease-time 7200"],
        );
        entry.set_attr(
            ATTR_OPTIONS,
            [
                "domain-name \"example.com\"",
                "domain-name-servers 10.0.0.2, 10.0.0.3",
                "domain-search \"example.com\", \"corp.example.com\"",
            ],
        );

        let view = decode(EntryKind::Service, &entry).unwrap();
        assert_eq!(view["defaultleasetime"], FieldValue::Int(3600));
        assert_eq!(view["maxleasetime"], FieldValue::Int(7200));
        assert_eq!(
            view["domainname"],
            FieldValue::Text("example.com".to_string())
        );
        assert_eq!(
            view["domainnameservers"],
            FieldValue::List(vec!["10.0.0.2".to_string(), "10.0.0.3".to_string()])
        );
        assert_eq!(
            view["domainsearch"],
            FieldValue::List(vec![
                "example.com".to_string(),
                "corp.example.com".to_string()
            ])
        );
    }

    #[test]
    fn test_decode_absent_lists() {
        let entry = ConfigEntry::new();
        let view = decode(EntryKind::Pool, &entry).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_decode_skips_unmatched_lines() {
        let mut entry = ConfigEntry::new();
        // Keyword-only line lacks the trailing space and never matches.
        entry.set_attr(ATTR_STATEMENTS, ["default-lease-time"]);
        let view = decode(EntryKind::Service, &entry).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_decode_malformed_integer_errors() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(ATTR_STATEMENTS, ["default-lease-time soon"]);
        let err = decode(EntryKind::Service, &entry).unwrap_err();
        let err = err.downcast_ref::<DhcpError>().unwrap();
        assert!(matches!(err, DhcpError::MalformedConfigLine { .. }));
    }

    #[test]
    fn test_decode_first_match_wins() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_STATEMENTS,
            ["default-lease-time 600", "default-lease-time 1200"],
        );
        let view = decode(EntryKind::Service, &entry).unwrap();
        assert_eq!(view["defaultleasetime"], FieldValue::Int(600));
    }

    #[test]
    fn test_decode_permit_flags() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_PERMIT_LIST,
            ["allow unknown-clients", "deny known-clients"],
        );
        let view = decode(EntryKind::Pool, &entry).unwrap();
        assert_eq!(view["permitunknownclients"], FieldValue::Flag(true));
        assert_eq!(view["permitknownclients"], FieldValue::Flag(false));
    }

    #[test]
    fn test_decode_permit_skips_unrecognized_verb() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_PERMIT_LIST,
            ["maybe known-clients", "deny known-clients"],
        );
        let view = decode(EntryKind::Pool, &entry).unwrap();
        assert_eq!(view["permitknownclients"], FieldValue::Flag(false));
    }

    #[test]
    fn test_encode_appends_when_absent() {
        let mut entry = ConfigEntry::new();
        encode(
            EntryKind::Service,
            &mut entry,
            &update("defaultleasetime", FieldValue::Int(3600)),
        )
        .unwrap();
        assert_eq!(entry.attr(ATTR_STATEMENTS), ["default-lease-time 3600"]);
    }

    #[test]
    fn test_encode_replaces_in_place() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_STATEMENTS,
            ["authoritative", "default-lease-time 600", "max-lease-time 7200"],
        );
        encode(
            EntryKind::Service,
            &mut entry,
            &update("defaultleasetime", FieldValue::Int(3600)),
        )
        .unwrap();
        assert_eq!(
            entry.attr(ATTR_STATEMENTS),
            ["authoritative", "default-lease-time 3600", "max-lease-time 7200"]
        );
    }

    #[test]
    fn test_encode_replaces_first_duplicate_only() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_STATEMENTS,
            ["default-lease-time 600", "default-lease-time 1200"],
        );
        encode(
            EntryKind::Service,
            &mut entry,
            &update("defaultleasetime", FieldValue::Int(3600)),
        )
        .unwrap();
        assert_eq!(
            entry.attr(ATTR_STATEMENTS),
            ["default-lease-time 3600", "default-lease-time 1200"]
        );
    }

    #[test]
    fn test_encode_empty_updates_is_noop() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(ATTR_STATEMENTS, ["authoritative", "max-lease-time 7200"]);
        let before = entry.clone();
        encode(EntryKind::Service, &mut entry, &FieldUpdates::new()).unwrap();
        assert_eq!(entry, before);
    }

    #[test]
    fn test_encode_does_not_touch_other_fields() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_OPTIONS,
            [
                "domain-name \"example.com\"",
                "routers 192.168.1.1",
                "domain-name-servers 10.0.0.2",
            ],
        );
        encode(
            EntryKind::Service,
            &mut entry,
            &update(
                "domainnameservers",
                FieldValue::List(vec!["10.0.0.9".to_string()]),
            ),
        )
        .unwrap();
        assert_eq!(
            entry.attr(ATTR_OPTIONS),
            [
                "domain-name \"example.com\"",
                "routers 192.168.1.1",
                "domain-name-servers 10.0.0.9",
            ]
        );
    }

    #[test]
    fn test_encode_permit_flag_in_place() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(
            ATTR_PERMIT_LIST,
            ["allow unknown-clients", "allow known-clients"],
        );
        encode(
            EntryKind::Pool,
            &mut entry,
            &update("permitknownclients", FieldValue::Flag(false)),
        )
        .unwrap();
        assert_eq!(
            entry.attr(ATTR_PERMIT_LIST),
            ["allow unknown-clients", "deny known-clients"]
        );
    }

    #[test]
    fn test_encode_unknown_field() {
        let mut entry = ConfigEntry::new();
        let err = encode(
            EntryKind::Subnet,
            &mut entry,
            &update("permitknownclients", FieldValue::Flag(true)),
        )
        .unwrap_err();
        let err = err.downcast_ref::<DhcpError>().unwrap();
        assert!(matches!(err, DhcpError::UnknownField(_)));
    }

    #[test]
    fn test_encode_field_type_mismatch() {
        let mut entry = ConfigEntry::new();
        let err = encode(
            EntryKind::Service,
            &mut entry,
            &update("defaultleasetime", FieldValue::Text("soon".to_string())),
        )
        .unwrap_err();
        let err = err.downcast_ref::<DhcpError>().unwrap();
        assert!(matches!(err, DhcpError::FieldType { .. }));
    }

    #[test]
    fn test_round_trip_every_shape() {
        let cases: Vec<(&str, FieldValue)> = vec![
            ("defaultleasetime", FieldValue::Int(86400)),
            ("domainname", FieldValue::Text("lab.example.net".to_string())),
            (
                "domainnameservers",
                FieldValue::List(vec!["10.1.0.1".to_string(), "10.1.0.2".to_string()]),
            ),
            (
                "domainsearch",
                FieldValue::List(vec!["a.example".to_string(), "b.example".to_string()]),
            ),
            ("permitunknownclients", FieldValue::Flag(false)),
        ];

        for (name, value) in cases {
            let mut entry = ConfigEntry::new();
            encode(
                EntryKind::Pool,
                &mut entry,
                &update(name, value.clone()),
            )
            .unwrap();
            let view = decode(EntryKind::Pool, &entry).unwrap();
            assert_eq!(view[name], value, "round trip for {name}");
        }
    }

    #[test]
    fn test_subnet_router_round_trip() {
        let mut entry = ConfigEntry::new();
        entry.set_attr(ATTR_OPTIONS, ["subnet-mask 255.255.255.0"]);
        encode(
            EntryKind::Subnet,
            &mut entry,
            &update("router", FieldValue::Text("10.0.0.1".to_string())),
        )
        .unwrap();
        assert_eq!(
            entry.attr(ATTR_OPTIONS),
            ["subnet-mask 255.255.255.0", "routers 10.0.0.1"]
        );
        let view = decode(EntryKind::Subnet, &entry).unwrap();
        assert_eq!(view["router"], FieldValue::Text("10.0.0.1".to_string()));
    }
}
