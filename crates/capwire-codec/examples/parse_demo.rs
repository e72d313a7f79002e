use capwire_codec::{parse_alert, to_json};
use capwire_core::validate;

fn main() {
    // Example alert message
    let cap_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<alert xmlns="urn:oasis:names:tc:emergency:cap:1.2">
    <identifier>KSTO1055887203</identifier>
    <sender>KSTO@CLETS.DOJ.CA.GOV</sender>
    <sent>2003-06-17T14:57:00-07:00</sent>
    <status>Actual</status>
    <msgType>Alert</msgType>
    <scope>Public</scope>
    <info>
        <category>Security</category>
        <event>CHILD ABDUCTION</event>
        <urgency>Immediate</urgency>
        <severity>Severe</severity>
        <certainty>Likely</certainty>
        <headline>Amber Alert in Sacramento County</headline>
        <area>
            <areaDesc>Sacramento County</areaDesc>
            <geocode><valueName>SAME</valueName><value>006067</value></geocode>
        </area>
    </info>
</alert>"#;

    println!("Parsing alert message...\n");

    match parse_alert(cap_xml) {
        Ok((version, alert)) => {
            println!("Successfully parsed alert!");
            println!("  Version: {}", version);
            println!("  Identifier: {}", alert.identifier.as_deref().unwrap_or("-"));
            println!("  Sender: {}", alert.sender.as_deref().unwrap_or("-"));
            for info in &alert.infos {
                println!("  Info: {}", info);
            }

            // Validate the alert
            println!("\nValidating alert...");
            let result = validate(&alert, version);
            if result.is_valid() {
                println!("  ✓ Alert is valid!");
            } else {
                for violation in &result.violations {
                    println!("  ✗ {}: {}", violation.path, violation.message);
                }
            }

            // Re-encode as JSON
            println!("\nRendering as JSON...");
            match to_json(&alert, version) {
                Ok(json) => println!("  {}", json),
                Err(e) => println!("  ✗ Encode error: {}", e),
            }
        }
        Err(e) => {
            println!("Error parsing alert: {}", e);
        }
    }
}
