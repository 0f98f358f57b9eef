//! ControlPay client: sale creation, intent lookup, filtered listing, and cancellation.
//!
//! ControlPay authenticates with a static API key carried in the `key` query parameter,
//! so none of these calls depend on the token manager.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	gateway::{self, normalize},
	http::ReqwestHttpClient,
};

/// Production sandbox base used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://sandbox.controlpay.com.br/webapi/";

const SELL_PATH: &str = "Venda/Vender/";
const INTENT_BY_ID_PATH: &str = "IntencaoVenda/GetById/";
const INTENTS_BY_FILTER_PATH: &str = "IntencaoVenda/GetByFiltros";
const CANCEL_SALE_PATH: &str = "Venda/CancelarVenda/";
const AMOUNT_FIELD: &str = "valorTotalVendido";
const TERMINAL_FIELD: &str = "terminalId";
const INTENT_LIST_FIELD: &str = "intencoesVendas";

/// Incoming filter for the sale-intent listing.
///
/// Both the English and the ControlPay spelling of each bound are accepted; the English one
/// wins when both are sent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListRequest {
	/// Terminal to list; defaults to the configured terminal when absent.
	#[serde(default, rename = "terminalId")]
	pub terminal_id: Option<Value>,
	/// Lower bound (`yyyy-MM-ddTHH:mm:ss`).
	#[serde(default, rename = "dateStart")]
	pub date_start: Option<Value>,
	/// Lower bound under its ControlPay name.
	#[serde(default, rename = "dataInicio")]
	pub data_inicio: Option<Value>,
	/// Upper bound (`yyyy-MM-ddTHH:mm:ss`).
	#[serde(default, rename = "dateEnd")]
	pub date_end: Option<Value>,
	/// Upper bound under its ControlPay name.
	#[serde(default, rename = "dataFim")]
	pub data_fim: Option<Value>,
}
impl ListRequest {
	/// Builds the upstream filter, defaulting the terminal and computing the same-day flag.
	pub fn into_filter(self, default_terminal_id: &str) -> ListFilter {
		let date_start = gateway::present(self.date_start).or(gateway::present(self.data_inicio));
		let date_end = gateway::present(self.date_end).or(gateway::present(self.data_fim));
		let terminal_id = gateway::present(self.terminal_id)
			.unwrap_or_else(|| Value::String(default_terminal_id.to_owned()));
		let same_day = date_start.is_none() && date_end.is_none();

		ListFilter { terminal_id, date_start, date_end, same_day }
	}
}

/// Filter body forwarded to `IntencaoVenda/GetByFiltros`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListFilter {
	/// Terminal identifier.
	#[serde(rename = "terminalId")]
	pub terminal_id: Value,
	/// Lower bound, `null` when absent.
	#[serde(rename = "dataInicio")]
	pub date_start: Option<Value>,
	/// Upper bound, `null` when absent.
	#[serde(rename = "dataFim")]
	pub date_end: Option<Value>,
	/// Restricts the listing to today's sales when no explicit range is given.
	#[serde(rename = "vendasDia")]
	pub same_day: bool,
}

/// Incoming cancellation request.
///
/// Values are forwarded as sent; only absent fields are defaulted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CancelRequest {
	/// Sale intent to cancel.
	#[serde(default, rename = "transactionId")]
	pub transaction_id: Option<Value>,
	/// Sale intent under its ControlPay name.
	#[serde(default, rename = "intencaoVendaId")]
	pub intent_id: Option<Value>,
	/// Terminal that processed the sale.
	#[serde(default, rename = "terminalId")]
	pub terminal_id: Option<Value>,
	/// Whether ControlPay waits for the TEF terminal to start the transaction.
	#[serde(default, rename = "aguardarTefIniciarTransacao")]
	pub wait_for_terminal: Option<Value>,
	/// Technical password authorizing the cancellation.
	#[serde(default, rename = "senhaTecnica")]
	pub technical_password: Option<Value>,
}
impl CancelRequest {
	/// Validates required fields and applies defaults.
	pub fn into_command(self, default_technical_password: &str) -> Result<CancelCommand> {
		let transaction_id = gateway::require(
			gateway::present(self.transaction_id).or(self.intent_id),
			"transactionId",
		)?;
		let terminal_id = gateway::require(self.terminal_id, "terminalId")?;
		let wait_for_terminal =
			self.wait_for_terminal.filter(|v| !v.is_null()).unwrap_or(Value::Bool(true));
		let technical_password = gateway::present(self.technical_password)
			.unwrap_or_else(|| Value::String(default_technical_password.to_owned()));

		Ok(CancelCommand { transaction_id, terminal_id, wait_for_terminal, technical_password })
	}
}

/// Cancellation body forwarded to `Venda/CancelarVenda`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CancelCommand {
	/// Sale intent to cancel.
	#[serde(rename = "intencaoVendaId")]
	pub transaction_id: Value,
	/// Terminal that processed the sale.
	#[serde(rename = "terminalId")]
	pub terminal_id: Value,
	/// Whether ControlPay waits for the TEF terminal.
	#[serde(rename = "aguardarTefIniciarTransacao")]
	pub wait_for_terminal: Value,
	/// Technical password.
	#[serde(rename = "senhaTecnica")]
	pub technical_password: Value,
}

/// Validates a sale body and applies the amount and terminal-id normalizations.
///
/// Every other field is forwarded untouched.
pub fn prepare_sale(mut body: Map<String, Value>) -> Result<Map<String, Value>> {
	let amount = gateway::require(body.remove(AMOUNT_FIELD), AMOUNT_FIELD)?;

	body.insert(AMOUNT_FIELD.into(), normalize::normalize_amount(&amount));

	if let Some(terminal) = body.get_mut(TERMINAL_FIELD) {
		*terminal = normalize::normalize_terminal_id(terminal);
	}

	Ok(body)
}

/// Extracts the nested intent list, falling back to an empty list.
pub fn intent_list(body: Value) -> Value {
	match body {
		Value::Object(mut map) => match map.remove(INTENT_LIST_FIELD) {
			Some(list @ Value::Array(_)) => list,
			_ => Value::Array(Vec::new()),
		},
		_ => Value::Array(Vec::new()),
	}
}

/// API-key authenticated ControlPay client.
#[derive(Clone)]
pub struct ControlPayClient {
	http_client: ReqwestHttpClient,
	base_url: Url,
	api_key: Secret,
}
impl ControlPayClient {
	/// Creates a client rooted at `base_url` (must end with `/`).
	pub fn new(http_client: ReqwestHttpClient, base_url: Url, api_key: impl Into<String>) -> Self {
		Self { http_client, base_url, api_key: Secret::new(api_key) }
	}

	/// Creates a sale (`Venda/Vender`) from an already prepared body.
	pub async fn sell(&self, sale: &Map<String, Value>) -> Result<Value> {
		let url = self.endpoint(SELL_PATH)?;

		tracing::info!(terminal_id = ?sale.get(TERMINAL_FIELD), "Forwarding sale to ControlPay.");

		self.http_client.send(self.http_client.post(url).json(sale)).await?.into_result()
	}

	/// Fetches a sale intent by id (`IntencaoVenda/GetById`).
	pub async fn intent_by_id(&self, intent_id: &str) -> Result<Value> {
		let mut url = self.endpoint(INTENT_BY_ID_PATH)?;

		url.query_pairs_mut().append_pair("intencaoVendaId", intent_id);

		self.http_client.send(self.http_client.get(url)).await?.into_result()
	}

	/// Lists sale intents matching `filter` (`IntencaoVenda/GetByFiltros`).
	///
	/// Returns the full upstream body; see [`intent_list`] for the nested list.
	pub async fn intents_by_filter(&self, filter: &ListFilter) -> Result<Value> {
		let url = self.endpoint(INTENTS_BY_FILTER_PATH)?;

		self.http_client.send(self.http_client.post(url).json(filter)).await?.into_result()
	}

	/// Cancels a sale (`Venda/CancelarVenda`).
	pub async fn cancel_sale(&self, command: &CancelCommand) -> Result<Value> {
		let url = self.endpoint(CANCEL_SALE_PATH)?;

		self.http_client.send(self.http_client.post(url).json(command)).await?.into_result()
	}

	fn endpoint(&self, path: &'static str) -> Result<Url> {
		let mut url = gateway::endpoint(&self.base_url, path)?;

		url.query_pairs_mut().append_pair("key", self.api_key.expose());

		Ok(url)
	}
}
impl Debug for ControlPayClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ControlPayClient")
			.field("base_url", &self.base_url.as_str())
			.field("api_key_set", &!self.api_key.is_empty())
			.finish()
	}
}
