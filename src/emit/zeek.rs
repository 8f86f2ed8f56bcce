/// Zeek signature-format emitter
///
/// One block per qualifying rule:
/// ```text
/// signature snort_sid_1 {
///     ip-proto == tcp
///     src-ip == 10.0.0.0/8
///     dst-port == 80
///     payload /\x47\x45\x54/
///     event "Alert"
/// }
/// ```
use super::{Conversion, Emitter};
use crate::error::Result;
use crate::rules::{
    decode_content, escape_bytes, normalize, Canonical, Protocol, RuleAction, RuleRecord,
    VariableTable,
};
use std::fmt::Write;

/// Emitter for Zeek signature blocks. Only `alert tcp` rules qualify; the
/// payload matcher is byte-oriented, so content is re-encoded escape by
/// escape rather than passed through.
#[derive(Debug, Clone)]
pub struct ZeekEmitter {
    variables: VariableTable,
}

impl ZeekEmitter {
    pub fn new(variables: VariableTable) -> Self {
        Self { variables }
    }

    fn signature_name(record: &RuleRecord) -> String {
        match record.sid {
            Some(sid) => format!("snort_sid_{}", sid),
            // Degraded but usable, unlike the alert target where a missing
            // sid fails the line
            None => "snort_sid_UNKNOWN".to_string(),
        }
    }
}

impl Default for ZeekEmitter {
    fn default() -> Self {
        Self::new(VariableTable::zeek_defaults())
    }
}

impl Emitter for ZeekEmitter {
    fn emit(&self, record: &RuleRecord) -> Result<Option<Conversion>> {
        if record.action != RuleAction::Alert || record.protocol != Protocol::Tcp {
            return Ok(None);
        }

        let mut warnings = Vec::new();

        // Zeek signatures take one value per side: addresses keep the first
        // listed value, ports the last
        let src_ip = normalize(&record.src.addr, &self.variables, &mut warnings)
            .value
            .first();
        let dst_ip = normalize(&record.dst.addr, &self.variables, &mut warnings)
            .value
            .first();
        let src_port = normalize(&record.src.port, &self.variables, &mut warnings)
            .value
            .last();
        let dst_port = normalize(&record.dst.port, &self.variables, &mut warnings)
            .value
            .last();

        let mut text = format!("signature {} {{\n", Self::signature_name(record));
        text.push_str("    ip-proto == tcp\n");
        push_field(&mut text, "src-ip", &src_ip);
        push_field(&mut text, "dst-ip", &dst_ip);
        push_field(&mut text, "src-port", &src_port);
        push_field(&mut text, "dst-port", &dst_port);

        for content in record.contents() {
            let segments = decode_content(content, &mut warnings);
            if segments.is_empty() {
                continue;
            }
            let _ = writeln!(text, "    payload /{}/", escape_bytes(&segments));
        }

        text.push_str("    event \"Alert\"\n}");

        Ok(Some(Conversion { text, warnings }))
    }
}

fn push_field(text: &mut String, field: &str, value: &Canonical) {
    match value {
        Canonical::Any => {}
        Canonical::One(v) => {
            let _ = writeln!(text, "    {} == {}", field, v);
        }
        // first()/last() leave only One or Any behind
        Canonical::Set(values) => {
            let _ = writeln!(text, "    {} == {}", field, values.join(","));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertWarning;
    use crate::rules::parse_rule;

    fn emit(line: &str) -> Option<Conversion> {
        ZeekEmitter::default()
            .emit(&parse_rule(line).unwrap())
            .unwrap()
    }

    #[test]
    fn test_basic_signature_block() {
        let line = r#"alert tcp $HOME_NET any -> $EXTERNAL_NET 80 (msg:"t"; content:"GET"; sid:1; rev:1;)"#;
        let conversion = emit(line).unwrap();

        assert_eq!(
            conversion.text,
            "signature snort_sid_1 {\n\
             \x20   ip-proto == tcp\n\
             \x20   src-ip == 10.0.0.0/8\n\
             \x20   dst-port == 80\n\
             \x20   payload /\\x47\\x45\\x54/\n\
             \x20   event \"Alert\"\n}"
        );
        assert!(conversion.warnings.is_empty());
    }

    #[test]
    fn test_any_fields_omitted() {
        let line = "alert tcp any any -> any any (sid:2; rev:1;)";
        let conversion = emit(line).unwrap();

        assert!(!conversion.text.contains("src-ip"));
        assert!(!conversion.text.contains("dst-ip"));
        assert!(!conversion.text.contains("src-port"));
        assert!(!conversion.text.contains("dst-port"));
        assert!(conversion.text.contains("ip-proto == tcp"));
        assert!(conversion.text.contains("event \"Alert\""));
    }

    #[test]
    fn test_missing_sid_degrades_to_unknown() {
        let line = "alert tcp any any -> any 80 (msg:\"x\";)";
        let conversion = emit(line).unwrap();
        assert!(conversion.text.starts_with("signature snort_sid_UNKNOWN {"));
    }

    #[test]
    fn test_non_alert_tcp_rules_skipped() {
        assert_eq!(emit("drop tcp any any -> any 80 (sid:1; rev:1;)"), None);
        assert_eq!(emit("alert udp any any -> any 53 (sid:1; rev:1;)"), None);
        assert_eq!(emit("alert ip any any -> any any (sid:1; rev:1;)"), None);
    }

    #[test]
    fn test_qualification_is_case_insensitive() {
        // Qualification runs on the parsed record, not on the raw line, so
        // keyword case and extra whitespace do not exclude a rule
        let line = "ALERT  TCP any any -> any 80 (sid:7; rev:1;)";
        let conversion = emit(line).unwrap();
        assert!(conversion.text.starts_with("signature snort_sid_7 {"));
    }

    #[test]
    fn test_port_list_keeps_last_value() {
        let line = "alert tcp any any -> any [80,8080,8888] (sid:3; rev:1;)";
        let conversion = emit(line).unwrap();
        assert!(conversion.text.contains("dst-port == 8888"));
        assert!(!conversion.text.contains("8080"));
    }

    #[test]
    fn test_address_list_keeps_first_value() {
        let line = "alert tcp [1.2.3.4,5.6.7.8] any -> any 80 (sid:4; rev:1;)";
        let conversion = emit(line).unwrap();
        assert!(conversion.text.contains("src-ip == 1.2.3.4"));
        assert!(!conversion.text.contains("5.6.7.8"));
    }

    #[test]
    fn test_repeated_content_payload_order() {
        let line = r#"alert tcp any any -> any 80 (content:"AB"; content:"|43 44|"; sid:5; rev:1;)"#;
        let conversion = emit(line).unwrap();

        let first = conversion.text.find("payload /\\x41\\x42/").unwrap();
        let second = conversion.text.find("payload /\\x43\\x44/").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_malformed_hex_warns_but_emits() {
        let line = r#"alert tcp any any -> any 80 (content:"|41 zz|"; sid:6; rev:1;)"#;
        let conversion = emit(line).unwrap();

        assert!(conversion.text.contains("payload /\\x41/"));
        assert_eq!(
            conversion.warnings,
            vec![ConvertWarning::MalformedContentToken {
                token: "zz".to_string()
            }]
        );
    }
}
