use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

/// Decimal places shown for amounts and ratios in tables.
const DISPLAY_DP: u32 = 2;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_sections(map, None);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_sections(res_map, None),
        other => println!("{}", format_value(other)),
    }

    // Secondary sections such as the liquidity schedule
    for (key, val) in envelope {
        if matches!(key.as_str(), "result" | "warnings") {
            continue;
        }
        if let Value::Array(arr) = val {
            println!("\n{}:", title(key));
            print_array_table(arr);
        }
    }

    print_warnings(envelope);
}

/// Scalars first as a Field/Value table, then one titled section per
/// nested object or array.
fn print_sections(map: &Map<String, Value>, heading: Option<&str>) {
    if let Some(h) = heading {
        println!("\n{}:", h);
    }

    let scalars: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .collect();
    if !scalars.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in scalars {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                let name = match heading {
                    Some(h) => format!("{} / {}", h, title(key)),
                    None => title(key),
                };
                print_sections(inner, Some(&name));
            }
            Value::Array(arr) if key != "warnings" => {
                match heading {
                    Some(h) => println!("\n{} / {}:", h, title(key)),
                    None => println!("\n{}:", title(key)),
                }
                print_array_table(arr);
            }
            _ => {}
        }
    }

    if heading.is_none() {
        print_warnings(map);
    }
}

fn print_warnings(map: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = map.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

/// `liquidity_schedule` -> `Liquidity schedule`
fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Decimals are serialised as strings; shorten them for display.
fn format_decimal_text(s: &str) -> String {
    match Decimal::from_str(s) {
        Ok(d) if d.scale() > DISPLAY_DP => d.round_dp(DISPLAY_DP).normalize().to_string(),
        _ => s.to_string(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format_decimal_text(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
