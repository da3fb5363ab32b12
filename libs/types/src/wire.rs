//! Wire message shapes for the ACT protocol.
//!
//! The `.proto` schema for this protocol is an externally-versioned IDL
//! (spec §1) and is not re-specified here; these are hand-authored
//! `prost::Message`/`prost::Oneof` types that mirror the shape implied by
//! the reference client's call sites (`actp/session.py`, `actp/dex.py`)
//! rather than a vendored `.proto` file.

/// Top-level sub-protocol tag. Every `Request`/`Response` carries exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum SubProtocolType {
    Unknown = 0,
    Act = 1,
    AutoControl = 2,
    Algo = 3,
    Dex = 4,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct OperationStatus {
    #[prost(string, tag = "1")]
    pub error_message: ::prost::alloc::string::String,
}

impl OperationStatus {
    pub fn ok() -> Self {
        Self { error_message: String::new() }
    }

    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }

    pub fn error(&self) -> Option<&str> {
        self.has_error().then_some(self.error_message.as_str())
    }
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct Property {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct SessionOption {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum FailureAction {
    Unknown = 0,
    Disconnect = 1,
    Reconnect = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum ConnectionStatus {
    Unknown = 0,
    Up = 1,
    Down = 2,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct ServerConnection {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "ConnectionStatus", tag = "2")]
    pub status: i32,
}

// --- ACT sub-protocol -------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum ActRequestType {
    Unknown = 0,
    Login = 1,
    Logout = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum ActResponseType {
    Unknown = 0,
    Login = 1,
    Logout = 2,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct ActLoginRequest {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub password: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub appname: ::prost::alloc::string::String,
    #[prost(enumeration = "FailureAction", repeated, tag = "4")]
    pub failure_actions: ::prost::alloc::vec::Vec<i32>,
    #[prost(message, repeated, tag = "5")]
    pub session_options: ::prost::alloc::vec::Vec<SessionOption>,
    #[prost(message, repeated, tag = "6")]
    pub client_properties: ::prost::alloc::vec::Vec<Property>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct ActLoginResponse {
    #[prost(string, tag = "1")]
    pub user: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub version: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub link_time: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub node: ::prost::alloc::string::String,
    #[prost(bool, optional, tag = "5")]
    pub has_allocations: ::core::option::Option<bool>,
    #[prost(string, optional, tag = "6")]
    pub act_protocol_version: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "7")]
    pub properties: ::prost::alloc::vec::Vec<Property>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct ActRequest {
    #[prost(enumeration = "ActRequestType", tag = "1")]
    pub request_type: i32,
    #[prost(int64, tag = "2")]
    pub client_id: i64,
    #[prost(message, optional, tag = "3")]
    pub login_request: ::core::option::Option<ActLoginRequest>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct ActResponse {
    #[prost(enumeration = "ActResponseType", tag = "1")]
    pub response_type: i32,
    #[prost(message, optional, tag = "2")]
    pub operation_status: ::core::option::Option<OperationStatus>,
    #[prost(int64, tag = "3")]
    pub session_id: i64,
    #[prost(message, optional, tag = "4")]
    pub login_response: ::core::option::Option<ActLoginResponse>,
    #[prost(message, repeated, tag = "5")]
    pub connections: ::prost::alloc::vec::Vec<ServerConnection>,
}

// --- AutoControl sub-protocol ------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum AutoControlRequestType {
    Unknown = 0,
    Update = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum AutoControlResponseType {
    Unknown = 0,
    Update = 1,
    ProductAutomation = 2,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct AutomationStatusChange {
    #[prost(string, tag = "1")]
    pub auto_control_type: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub automation_status: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct ProductAutomationUpdate {
    #[prost(string, tag = "1")]
    pub product: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub old_iid: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub new_iid: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub status_changes: ::prost::alloc::vec::Vec<AutomationStatusChange>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct AutoControlRequest {
    #[prost(enumeration = "AutoControlRequestType", tag = "1")]
    pub request_type: i32,
    #[prost(int64, tag = "2")]
    pub client_id: i64,
    #[prost(message, repeated, tag = "3")]
    pub automation_updates: ::prost::alloc::vec::Vec<ProductAutomationUpdate>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct AutoControlResponse {
    #[prost(enumeration = "AutoControlResponseType", tag = "1")]
    pub response_type: i32,
    #[prost(int64, tag = "2")]
    pub client_id: i64,
    #[prost(message, optional, tag = "3")]
    pub operation_status: ::core::option::Option<OperationStatus>,
}

// --- Algo sub-protocol ---------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlgoRequestType {
    Unknown = 0,
    CreateDirectAction = 1,
    SetAlgoStatus = 2,
    TerminateAlgo = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlgoResponseType {
    Unknown = 0,
    CreateDirectAction = 1,
    SetAlgoStatus = 2,
    TerminateAlgo = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlgoControlStatus {
    Unknown = 0,
    Off = 1,
    Manual = 2,
    Auto = 3,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct NamedInstrument {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub instrument: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct CreateDirectActionRequest {
    #[prost(string, tag = "1")]
    pub direct_action_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub base_instrument: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub additional_instruments: ::prost::alloc::vec::Vec<NamedInstrument>,
    #[prost(message, repeated, tag = "4")]
    pub input_parameters: ::prost::alloc::vec::Vec<Property>,
    #[prost(string, optional, tag = "5")]
    pub action_status: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct CreateDirectActionResponse {
    #[prost(string, tag = "1")]
    pub action_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub automation_status: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct AlgoRequest {
    #[prost(enumeration = "AlgoRequestType", tag = "1")]
    pub request_type: i32,
    #[prost(int64, tag = "2")]
    pub client_id: i64,
    #[prost(message, optional, tag = "3")]
    pub create_direct_action_request: ::core::option::Option<CreateDirectActionRequest>,
    #[prost(string, optional, tag = "4")]
    pub algo_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(enumeration = "AlgoControlStatus", optional, tag = "5")]
    pub control_status: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct AlgoResponse {
    #[prost(enumeration = "AlgoResponseType", tag = "1")]
    pub response_type: i32,
    #[prost(int64, tag = "2")]
    pub client_id: i64,
    #[prost(message, optional, tag = "3")]
    pub operation_status: ::core::option::Option<OperationStatus>,
    #[prost(message, optional, tag = "4")]
    pub create_direct_action_response: ::core::option::Option<CreateDirectActionResponse>,
    #[prost(string, optional, tag = "5")]
    pub algo_name: ::core::option::Option<::prost::alloc::string::String>,
}

// --- DEX sub-protocol -----------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum VariantType {
    Unknown = 0,
    Double = 1,
    Int32 = 2,
    Price = 3,
    String = 4,
    Quantity = 5,
}

/// Wire shape of a scalar cell value. See [`crate::variant::VariantValue`]
/// for the typed union this decodes into.
#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct WireVariantValue {
    #[prost(double, optional, tag = "1")]
    pub var_double: ::core::option::Option<f64>,
    #[prost(int32, optional, tag = "2")]
    pub var_int: ::core::option::Option<i32>,
    #[prost(int64, optional, tag = "3")]
    pub var_price: ::core::option::Option<i64>,
    #[prost(string, optional, tag = "4")]
    pub var_string: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int64, optional, tag = "5")]
    pub var_quantity: ::core::option::Option<i64>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct ColumnDescriptor {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "VariantType", tag = "2")]
    pub r#type: i32,
    #[prost(bool, tag = "3")]
    pub is_vector: bool,
    #[prost(bool, tag = "4")]
    pub can_write: bool,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct Cell {
    #[prost(uint32, tag = "1")]
    pub column_number: u32,
    #[prost(message, optional, tag = "2")]
    pub value: ::core::option::Option<WireVariantValue>,
    #[prost(message, repeated, tag = "3")]
    pub value_vector: ::prost::alloc::vec::Vec<WireVariantValue>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct Row {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub contexts: ::prost::alloc::string::String,
    #[prost(uint64, optional, tag = "3")]
    pub row_number: ::core::option::Option<u64>,
    #[prost(message, repeated, tag = "4")]
    pub cell: ::prost::alloc::vec::Vec<Cell>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct TableUpdate {
    #[prost(message, repeated, tag = "1")]
    pub column_descriptor: ::prost::alloc::vec::Vec<ColumnDescriptor>,
    #[prost(message, repeated, tag = "2")]
    pub row: ::prost::alloc::vec::Vec<Row>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct StartQuery {
    #[prost(string, repeated, tag = "1")]
    pub scope_key: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "2")]
    pub field: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(int64, tag = "3")]
    pub frequency: i64,
    #[prost(bool, tag = "4")]
    pub one_time: bool,
    #[prost(string, repeated, tag = "5")]
    pub no_trigger: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "6")]
    pub context: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum DexRequestType {
    Unknown = 0,
    StartQuery = 1,
    StopQuery = 2,
    TableUpdate = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum DexResponseType {
    Unknown = 0,
    StartQuery = 1,
    StopQuery = 2,
    /// Ack of a caller-initiated REQ_TABLE_UPDATE.
    TableUpdateAck = 3,
    /// Server-pushed table delta for a live query.
    UpdateTable = 4,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct DexRequest {
    #[prost(enumeration = "DexRequestType", tag = "1")]
    pub request_type: i32,
    #[prost(int64, tag = "2")]
    pub client_id: i64,
    #[prost(message, optional, tag = "3")]
    pub start_query: ::core::option::Option<StartQuery>,
    #[prost(message, optional, tag = "4")]
    pub table_update: ::core::option::Option<TableUpdate>,
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct DexResponse {
    #[prost(enumeration = "DexResponseType", tag = "1")]
    pub response_type: i32,
    #[prost(int64, tag = "2")]
    pub client_id: i64,
    #[prost(message, optional, tag = "3")]
    pub operation_status: ::core::option::Option<OperationStatus>,
    #[prost(message, optional, tag = "4")]
    pub table_update: ::core::option::Option<TableUpdate>,
}

// --- Envelope ---------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum RequestPayload {
    #[prost(message, tag = "2")]
    Act(ActRequest),
    #[prost(message, tag = "3")]
    AutoControl(AutoControlRequest),
    #[prost(message, tag = "4")]
    Algo(AlgoRequest),
    #[prost(message, tag = "5")]
    Dex(DexRequest),
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct Request {
    #[prost(enumeration = "SubProtocolType", tag = "1")]
    pub sub_protocol_type: i32,
    #[prost(oneof = "RequestPayload", tags = "2, 3, 4, 5")]
    pub payload: ::core::option::Option<RequestPayload>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum ResponsePayload {
    #[prost(message, tag = "3")]
    Act(ActResponse),
    #[prost(message, tag = "4")]
    AutoControl(AutoControlResponse),
    #[prost(message, tag = "5")]
    Algo(AlgoResponse),
    #[prost(message, tag = "6")]
    Dex(DexResponse),
}

#[derive(Clone, PartialEq, Default, ::prost::Message)]
pub struct Response {
    #[prost(enumeration = "SubProtocolType", tag = "1")]
    pub sub_protocol_type: i32,
    #[prost(int64, tag = "2")]
    pub session_id: i64,
    #[prost(oneof = "ResponsePayload", tags = "3, 4, 5, 6")]
    pub payload: ::core::option::Option<ResponsePayload>,
}
