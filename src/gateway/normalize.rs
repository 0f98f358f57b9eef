//! Field normalizations applied before talking to ControlPay.

// crates.io
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Number;
// self
use crate::_prelude::*;

/// Renders a JSON amount as a two-decimal string with a comma separator.
///
/// Numbers are rounded half away from zero on their exact binary value (`10.5` → `"10,50"`,
/// `1` → `"1,00"`). Strings and every other JSON type pass through unchanged.
pub fn normalize_amount(value: &Value) -> Value {
	match value {
		Value::Number(number) => Value::String(comma_decimal(number)),
		other => other.clone(),
	}
}

/// Renders a numeric terminal id as its decimal string; other values pass through.
pub fn normalize_terminal_id(value: &Value) -> Value {
	match value {
		Value::Number(number) => Value::String(number.to_string()),
		other => other.clone(),
	}
}

fn comma_decimal(number: &Number) -> String {
	let rendered = match to_decimal(number) {
		Some(decimal) => {
			let rounded = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

			format!("{rounded:.2}")
		},
		None => format!("{:.2}", number.as_f64().unwrap_or_default()),
	};

	rendered.replace('.', ",")
}

fn to_decimal(number: &Number) -> Option<Decimal> {
	if let Some(value) = number.as_i64() {
		return Some(Decimal::from(value));
	}
	if let Some(value) = number.as_u64() {
		return Some(Decimal::from(value));
	}

	number.as_f64().and_then(Decimal::from_f64_retain)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn numeric_amounts_become_comma_decimals() {
		assert_eq!(normalize_amount(&json!(10.5)), json!("10,50"));
		assert_eq!(normalize_amount(&json!(1)), json!("1,00"));
		assert_eq!(normalize_amount(&json!(0.1 + 0.2)), json!("0,30"));
		assert_eq!(normalize_amount(&json!(1234.567)), json!("1234,57"));
		assert_eq!(normalize_amount(&json!(0.125)), json!("0,13"));
		assert_eq!(normalize_amount(&json!(-3.5)), json!("-3,50"));
	}

	#[test]
	fn string_amounts_pass_through() {
		assert_eq!(normalize_amount(&json!("10,50")), json!("10,50"));
		assert_eq!(normalize_amount(&json!("10.5")), json!("10.5"));
		assert_eq!(normalize_amount(&Value::Null), Value::Null);
	}

	#[test]
	fn terminal_ids_become_strings() {
		assert_eq!(normalize_terminal_id(&json!(4517)), json!("4517"));
		assert_eq!(normalize_terminal_id(&json!("4517")), json!("4517"));
		assert_eq!(normalize_terminal_id(&Value::Null), Value::Null);
	}
}
