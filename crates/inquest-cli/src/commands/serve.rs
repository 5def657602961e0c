use async_trait::async_trait;
use inquest_rules::{SunderedKind, ThresholdSpec};
use inquest_session::{CreateValidator, Session, SessionError};
use rust_mcp_sdk::{
    McpServer, StdioTransport, ToMcpServerHandler, TransportOptions,
    macros::{JsonSchema, mcp_tool},
    mcp_server::{McpServerOptions, ServerHandler, ServerRuntime, server_runtime},
    schema::{
        CallToolRequestParams, CallToolResult, Implementation, InitializeResult, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, RpcError, ServerCapabilities,
        ServerCapabilitiesTools, TextContent, schema_utils::CallToolError,
    },
    tool_box,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::process;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct Args {
    pub server_name: String,
    pub server_version: String,
}

#[derive(Debug, Clone)]
struct InquestMcpHandler {
    session: Arc<Mutex<Session>>,
}

impl InquestMcpHandler {
    fn new() -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
        }
    }
}

pub fn run(args: Args) {
    eprintln!("inquest serve");
    eprintln!("  transport: stdio");
    eprintln!("  server: {} {}", args.server_name, args.server_version);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });

    runtime.block_on(async move {
        if let Err(e) = run_async(args).await {
            eprintln!("error: mcp server failed: {e}");
            process::exit(1);
        }
    });
}

async fn run_async(args: Args) -> Result<(), String> {
    let server_details = InitializeResult {
        server_info: Implementation {
            name: args.server_name,
            version: args.server_version,
            title: Some("Inquest MCP Server".into()),
            description: Some(
                "MCP tool surface for building and running table-validation pipelines".into(),
            ),
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        protocol_version: ProtocolVersion::V2025_11_25.into(),
        instructions: Some(
            "Workflow: load_table reads a CSV, Excel (.xls/.xlsx) or Parquet file and returns a \
             tableId; keep it for later calls. create_validator binds a validation pipeline to a \
             table_id and returns a validatorId; optional fields are validator_id, table_name, \
             label, thresholds {warning, error, critical} (values below 1 are failing-row \
             fractions, values of 1 or more are absolute counts), brief, lang, locale. \
             add_validation_step appends one step per call; validation_type is one of \
             col_vals_lt, col_vals_gt, col_vals_lte, col_vals_gte, col_vals_equal, \
             col_vals_not_equal, col_vals_between, col_vals_not_between, col_vals_in_set, \
             col_vals_not_in_set, col_vals_null, col_vals_not_null, col_vals_regex, \
             col_vals_expr, col_count_match, col_exists, rows_distinct, rows_complete, \
             row_count_match, conjointly, col_schema_match. params carries the step parameters: \
             columns (list of names), value/left/right (scalars passed as strings; numeric text \
             compares numerically), inclusive ([left, right] booleans), set (list of scalars as \
             strings), pattern (regex), expr/exprs (SQL boolean expressions over columns), \
             count, columns_subset, na_pass, and for col_schema_match the columns entries take \
             the form name:dtype. Example: validation_type 'col_vals_lt' with params {'columns': \
             ['age'], 'value': '100'}. interrogate_validator runs every accumulated step and \
             returns the per-step summary; report_file_path (.csv) optionally saves the \
             flattened report. get_validation_output writes row evidence to a .csv output_path: \
             pass step_index for one step's failing rows, or sundered_type 'pass'/'fail' \
             (default 'fail') for the whole-run union; step_index wins when both are given."
                .into(),
        ),
        meta: None,
    };

    let transport = StdioTransport::new(TransportOptions::default()).map_err(|e| e.to_string())?;
    let handler = InquestMcpHandler::new();

    let server: Arc<ServerRuntime> = server_runtime::create_server(McpServerOptions {
        server_details,
        transport,
        handler: handler.to_mcp_server_handler(),
        task_store: None,
        client_task_store: None,
    });

    server.start().await.map_err(|e| {
        e.rpc_error_message()
            .cloned()
            .unwrap_or_else(|| e.to_string())
    })
}

#[async_trait]
impl ServerHandler for InquestMcpHandler {
    async fn handle_list_tools_request(
        &self,
        _params: Option<PaginatedRequestParams>,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<ListToolsResult, RpcError> {
        Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: InquestTools::tools(),
        })
    }

    async fn handle_call_tool_request(
        &self,
        params: CallToolRequestParams,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let tool_params: InquestTools =
            InquestTools::try_from(params).map_err(CallToolError::new)?;

        match tool_params {
            InquestTools::LoadTableTool(tool) => call_load_table(&self.session, tool),
            InquestTools::CreateValidatorTool(tool) => call_create_validator(&self.session, tool),
            InquestTools::AddValidationStepTool(tool) => {
                call_add_validation_step(&self.session, tool)
            }
            InquestTools::InterrogateValidatorTool(tool) => {
                call_interrogate_validator(&self.session, tool)
            }
            InquestTools::GetValidationOutputTool(tool) => {
                call_get_validation_output(&self.session, tool)
            }
        }
    }
}

#[mcp_tool(
    name = "load_table",
    description = "Load a table from a CSV, Excel or Parquet file into the session",
    read_only_hint = false,
    idempotent_hint = false
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
struct LoadTableTool {
    input_path: String,
    #[serde(default)]
    table_id: Option<String>,
}

#[mcp_tool(
    name = "create_validator",
    description = "Create a validation pipeline bound to a previously loaded table",
    read_only_hint = false,
    idempotent_hint = false
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
struct CreateValidatorTool {
    table_id: String,
    #[serde(default)]
    validator_id: Option<String>,
    #[serde(default)]
    table_name: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    thresholds: Option<ThresholdsArg>,
    #[serde(default)]
    brief: Option<bool>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    locale: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, Default)]
struct ThresholdsArg {
    #[serde(default)]
    warning: Option<f64>,
    #[serde(default)]
    error: Option<f64>,
    #[serde(default)]
    critical: Option<f64>,
}

impl From<ThresholdsArg> for ThresholdSpec {
    fn from(value: ThresholdsArg) -> Self {
        ThresholdSpec {
            warning: value.warning,
            error: value.error,
            critical: value.critical,
        }
    }
}

#[mcp_tool(
    name = "add_validation_step",
    description = "Add a validation step to an existing pipeline",
    read_only_hint = false,
    idempotent_hint = false
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
struct AddValidationStepTool {
    validator_id: String,
    validation_type: String,
    #[serde(default)]
    params: StepParamsArg,
}

/// The union of step parameters across the validation vocabulary. Only the
/// fields actually provided are forwarded, so each validation type still
/// rejects parameters it does not understand.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Default)]
struct StepParamsArg {
    #[serde(default)]
    columns: Option<Vec<String>>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    left: Option<String>,
    #[serde(default)]
    right: Option<String>,
    #[serde(default)]
    inclusive: Option<Vec<bool>>,
    #[serde(default)]
    set: Option<Vec<String>>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    expr: Option<String>,
    #[serde(default)]
    exprs: Option<Vec<String>>,
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    columns_subset: Option<Vec<String>>,
    #[serde(default)]
    na_pass: Option<bool>,
}

impl StepParamsArg {
    fn into_params(self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(columns) = self.columns {
            params.insert("columns".into(), json!(columns));
        }
        if let Some(raw) = self.value {
            params.insert("value".into(), scalar_json(&raw));
        }
        if let Some(raw) = self.left {
            params.insert("left".into(), scalar_json(&raw));
        }
        if let Some(raw) = self.right {
            params.insert("right".into(), scalar_json(&raw));
        }
        if let Some(inclusive) = self.inclusive {
            params.insert("inclusive".into(), json!(inclusive));
        }
        if let Some(set) = self.set {
            let entries: Vec<Value> = set.iter().map(|raw| scalar_json(raw)).collect();
            params.insert("set".into(), Value::Array(entries));
        }
        if let Some(pattern) = self.pattern {
            params.insert("pattern".into(), json!(pattern));
        }
        if let Some(expr) = self.expr {
            params.insert("expr".into(), json!(expr));
        }
        if let Some(exprs) = self.exprs {
            params.insert("exprs".into(), json!(exprs));
        }
        if let Some(count) = self.count {
            params.insert("count".into(), json!(count));
        }
        if let Some(columns_subset) = self.columns_subset {
            params.insert("columns_subset".into(), json!(columns_subset));
        }
        if let Some(na_pass) = self.na_pass {
            params.insert("na_pass".into(), json!(na_pass));
        }
        params
    }
}

#[mcp_tool(
    name = "interrogate_validator",
    description = "Run all accumulated validation steps and return a JSON summary, optionally saving the report as CSV",
    read_only_hint = false,
    idempotent_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
struct InterrogateValidatorTool {
    validator_id: String,
    #[serde(default)]
    report_file_path: Option<String>,
}

#[mcp_tool(
    name = "get_validation_output",
    description = "Save row-level output for one step, or the whole-run pass/fail union, to a CSV file",
    read_only_hint = false,
    idempotent_hint = true
)]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
struct GetValidationOutputTool {
    validator_id: String,
    output_path: String,
    #[serde(default)]
    step_index: Option<i64>,
    #[serde(default)]
    sundered_type: Option<String>,
}

tool_box!(
    InquestTools,
    [
        LoadTableTool,
        CreateValidatorTool,
        AddValidationStepTool,
        InterrogateValidatorTool,
        GetValidationOutputTool
    ]
);

fn call_load_table(
    session: &Mutex<Session>,
    tool: LoadTableTool,
) -> std::result::Result<CallToolResult, CallToolError> {
    let mut session = lock_session(session)?;
    let info = session
        .load_table(&tool.input_path, non_empty(tool.table_id))
        .map_err(tool_error)?;

    json_result(json!({
        "tableId": info.table_id,
        "rows": info.rows,
        "columns": info.columns,
        "columnNames": info.column_names,
    }))
}

fn call_create_validator(
    session: &Mutex<Session>,
    tool: CreateValidatorTool,
) -> std::result::Result<CallToolResult, CallToolError> {
    let mut session = lock_session(session)?;
    let info = session
        .create_validator(CreateValidator {
            table_id: tool.table_id,
            validator_id: non_empty(tool.validator_id),
            table_name: non_empty(tool.table_name),
            label: non_empty(tool.label),
            thresholds: tool.thresholds.map(ThresholdSpec::from),
            brief: tool.brief.unwrap_or(false),
            lang: non_empty(tool.lang),
            locale: non_empty(tool.locale),
        })
        .map_err(tool_error)?;

    json_result(json!({
        "validatorId": info.validator_id,
        "tableId": info.table_id,
        "label": info.label,
    }))
}

fn call_add_validation_step(
    session: &Mutex<Session>,
    tool: AddValidationStepTool,
) -> std::result::Result<CallToolResult, CallToolError> {
    let mut session = lock_session(session)?;
    let info = session
        .add_step(
            &tool.validator_id,
            &tool.validation_type,
            tool.params.into_params(),
        )
        .map_err(tool_error)?;

    json_result(json!({
        "validatorId": info.validator_id,
        "stepIndex": info.step_index,
        "stepCount": info.step_count,
        "status": info.status,
    }))
}

fn call_interrogate_validator(
    session: &Mutex<Session>,
    tool: InterrogateValidatorTool,
) -> std::result::Result<CallToolResult, CallToolError> {
    let mut session = lock_session(session)?;
    let outcome = session
        .interrogate(
            &tool.validator_id,
            non_empty(tool.report_file_path).as_deref(),
        )
        .map_err(tool_error)?;

    let mut payload = json!({
        "validatorId": outcome.validator_id,
        "validationSummary": outcome.summary,
        "allPassed": outcome.all_passed,
    });
    if let Some(path) = outcome.report_saved_to {
        payload["csvReportSavedTo"] = json!(path.display().to_string());
    }
    if let Some(error) = outcome.report_save_error {
        payload["reportSaveError"] = json!(error);
    }
    json_result(payload)
}

fn call_get_validation_output(
    session: &Mutex<Session>,
    tool: GetValidationOutputTool,
) -> std::result::Result<CallToolResult, CallToolError> {
    let sundered = match non_empty(tool.sundered_type) {
        None => None,
        Some(raw) => Some(raw.parse::<SunderedKind>().map_err(call_tool_error)?),
    };

    let mut session = lock_session(session)?;
    let outcome = session
        .extract(
            &tool.validator_id,
            &tool.output_path,
            tool.step_index,
            sundered,
        )
        .map_err(tool_error)?;

    json_result(json!({
        "status": "success",
        "message": outcome.message,
        "outputPath": outcome.output_path.map(|path| path.display().to_string()),
    }))
}

/// Scalar step parameters arrive as strings so one schema covers every
/// column type; numeric and boolean text is compared as numbers and
/// booleans, anything else as a string literal.
fn scalar_json(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return json!(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return json!(float);
        }
    }
    match trimmed {
        "true" => json!(true),
        "false" => json!(false),
        _ => Value::String(raw.to_string()),
    }
}

fn lock_session(
    session: &Mutex<Session>,
) -> std::result::Result<MutexGuard<'_, Session>, CallToolError> {
    session
        .lock()
        .map_err(|_| call_tool_error("session state lock poisoned"))
}

fn tool_error(error: SessionError) -> CallToolError {
    call_tool_error(error.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| if v.trim().is_empty() { None } else { Some(v) })
}

fn json_result(value: Value) -> std::result::Result<CallToolResult, CallToolError> {
    let text = serde_json::to_string_pretty(&value).map_err(CallToolError::new)?;
    Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
}

fn call_tool_error(message: impl Into<String>) -> CallToolError {
    CallToolError::from_message(message.into())
}
