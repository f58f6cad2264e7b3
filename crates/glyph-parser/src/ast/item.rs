//! Top-level declarations and their supporting structs.
//!
//! Covers: Module, ImportStatement, ModuleDecl, ConstDecl, TypeDef,
//! TraitDef, ContractDef, ProviderDef, Route, WebSocketRoute, Command,
//! Function, CronTask, EventHandler, QueueWorker, GrpcService,
//! GrpcHandler, GraphQLResolver, MacroDef, MacroInvocation, TestBlock,
//! plus Field/Annotation and the route-body support types.

use std::fmt;

use serde::Serialize;

use crate::ast::expr::Expr;
use crate::ast::stmt::Statement;
use crate::ast::ty::Type;
use crate::ast::Node;

/// A parsed source module: an ordered sequence of items.
///
/// Item order is preserved; later stages rely on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub items: Vec<Item>,
}

/// Any top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    Import(ImportStatement),
    ModuleDecl(ModuleDecl),
    Const(ConstDecl),
    TypeDef(TypeDef),
    TraitDef(TraitDef),
    ContractDef(ContractDef),
    ProviderDef(ProviderDef),
    Route(Route),
    WebSocketRoute(WebSocketRoute),
    Command(Command),
    Function(Function),
    CronTask(CronTask),
    EventHandler(EventHandler),
    QueueWorker(QueueWorker),
    GrpcService(GrpcService),
    GrpcHandler(GrpcHandler),
    GraphQLResolver(GraphQLResolver),
    MacroDef(MacroDef),
    MacroInvocation(MacroInvocation),
    TestBlock(TestBlock),
}

// ── Imports, module, const ───────────────────────────────────────────────

/// `import "path" [as alias]` or `from "path" import a [as b], c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportStatement {
    pub path: String,
    pub alias: Option<String>,
    /// True for the `from ... import ...` form.
    pub selective: bool,
    pub items: Vec<ImportItem>,
}

/// One name of a selective import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
}

/// `module dotted.name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDecl {
    pub name: String,
}

/// `const NAME [: type] = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstDecl {
    pub name: String,
    pub ty: Option<Type>,
    pub value: Expr,
}

// ── Fields and annotations ───────────────────────────────────────────────

/// A name + type + required flag + optional default + annotations.
///
/// Serves struct fields, function/command parameters, and gRPC/GraphQL
/// parameters alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    /// Set by a trailing `!` on the type.
    pub required: bool,
    pub default: Option<Expr>,
    pub annotations: Vec<Annotation>,
}

/// `@name` or `@name(args)` attached to a field.
///
/// Annotations are opaque to the front-end; arguments are restricted to
/// simple literals and string arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub name: String,
    pub args: Vec<AnnotationArg>,
}

/// One argument of a field annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnnotationArg {
    Int(i64),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
}

// ── Type, trait, contract, provider definitions ──────────────────────────

/// `: Name[<T, ...>] [: Trait, ...] { fields and methods }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub traits: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Function>,
}

/// One declared type parameter with an optional constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<Type>,
}

/// `trait Name[<T, ...>] { method signatures }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitDef {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub methods: Vec<MethodSig>,
}

/// A method signature without a body: `name(params) [-> Type]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Field>,
    pub return_type: Option<Type>,
}

/// `contract Name { METHOD /path -> Type ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractDef {
    pub name: String,
    pub endpoints: Vec<Endpoint>,
}

/// One endpoint of a contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    pub return_type: Type,
}

/// `provider Name[<T, ...>] { method signatures }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderDef {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub methods: Vec<MethodSig>,
}

// ── Routes ───────────────────────────────────────────────────────────────

/// HTTP methods accepted on routes and contract endpoints. `Sse` marks
/// server-sent-event routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Sse,
}

impl HttpMethod {
    /// Parse the uppercase method spelling used in route directives.
    pub fn from_name(name: &str) -> Option<HttpMethod> {
        match name {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "SSE" => Some(HttpMethod::Sse),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Sse => "SSE",
        };
        f.write_str(s)
    }
}

/// An HTTP (or SSE) route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Always begins with `/`; `:name` segments are preserved verbatim.
    pub path: String,
    pub method: HttpMethod,
    /// `< input : Type` binding.
    pub input_type: Option<Type>,
    pub return_type: Option<Type>,
    /// `+ auth(...)` -- single slot, last one wins.
    pub auth: Option<Auth>,
    /// `+ ratelimit(...)` -- single slot, last one wins.
    pub rate_limit: Option<RateLimit>,
    pub injections: Vec<Injection>,
    pub query_params: Vec<QueryParam>,
    pub body: Vec<Statement>,
}

/// `+ auth(kind, ...)` middleware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Auth {
    pub kind: String,
    pub args: Vec<String>,
}

/// `+ ratelimit(N/window)` middleware, also accepted as `"N/window"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLimit {
    pub requests: i64,
    pub window: String,
}

/// `% name : Type` -- a declared dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Injection {
    pub name: String,
    pub ty: Type,
}

/// `? name : type [= default]` inside a route body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParam {
    pub name: String,
    pub ty: Type,
    pub required: bool,
    pub default: Option<Expr>,
    /// Set when the declared type is an array (repeated parameter).
    pub is_array: bool,
}

// ── WebSocket routes ─────────────────────────────────────────────────────

/// `@ ws /path { on connect { ... } on message { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebSocketRoute {
    pub path: String,
    /// Handlers in declaration order.
    pub events: Vec<WsHandler>,
}

/// One `on <event>` block of a WebSocket route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WsHandler {
    pub event: WsEvent,
    pub body: Vec<Statement>,
}

/// The WebSocket lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WsEvent {
    Connect,
    Message,
    Disconnect,
    Error,
}

impl WsEvent {
    /// Parse the event name used after `on`.
    pub fn from_name(name: &str) -> Option<WsEvent> {
        match name {
            "connect" => Some(WsEvent::Connect),
            "message" => Some(WsEvent::Message),
            "disconnect" => Some(WsEvent::Disconnect),
            "error" => Some(WsEvent::Error),
            _ => None,
        }
    }
}

// ── Commands and functions ───────────────────────────────────────────────

/// A CLI command: `! name positional... --flag: type [= default] ...`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub name: String,
    pub positionals: Vec<Field>,
    pub flags: Vec<Field>,
    pub description: Option<String>,
    pub return_type: Option<Type>,
    pub body: Vec<Statement>,
}

/// `! name[<T, ...>](params) [-> Type] { body }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Field>,
    pub return_type: Option<Type>,
    pub body: Vec<Statement>,
}

// ── Background work: cron, events, queues ────────────────────────────────

/// `* "schedule" [name] { body }` -- a scheduled task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CronTask {
    pub schedule: String,
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub retries: Option<i64>,
    pub injections: Vec<Injection>,
    pub body: Vec<Statement>,
}

/// `~ [async] dotted.event { body }` -- an event handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventHandler {
    pub event: String,
    pub is_async: bool,
    pub injections: Vec<Injection>,
    pub body: Vec<Statement>,
}

/// `& name { body }` -- a queue worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueWorker {
    pub queue: String,
    pub concurrency: Option<i64>,
    pub retries: Option<i64>,
    pub timeout: Option<i64>,
    pub injections: Vec<Injection>,
    pub body: Vec<Statement>,
}

// ── gRPC ─────────────────────────────────────────────────────────────────

/// The four gRPC method shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamKind {
    Unary,
    ClientStream,
    ServerStream,
    Bidirectional,
}

impl StreamKind {
    /// Combine the client-side and server-side stream markers.
    pub fn from_markers(client: bool, server: bool) -> StreamKind {
        match (client, server) {
            (false, false) => StreamKind::Unary,
            (true, false) => StreamKind::ClientStream,
            (false, true) => StreamKind::ServerStream,
            (true, true) => StreamKind::Bidirectional,
        }
    }
}

/// `@ grpc Name { method signatures }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrpcService {
    pub name: String,
    pub methods: Vec<GrpcMethod>,
}

/// One method signature of a gRPC service definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrpcMethod {
    pub name: String,
    pub params: Vec<Field>,
    pub return_type: Option<Type>,
    pub streaming: StreamKind,
}

/// `@ grpc name(params) [-> [stream] Type] { body }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrpcHandler {
    pub method: String,
    pub params: Vec<Field>,
    pub return_type: Option<Type>,
    pub streaming: StreamKind,
    pub auth: Option<Auth>,
    pub injections: Vec<Injection>,
    pub body: Vec<Statement>,
}

// ── GraphQL ──────────────────────────────────────────────────────────────

/// The GraphQL operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GraphQLOperation {
    Query,
    Mutation,
    Subscription,
}

/// `@ query field(params) [-> Type] { body }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLResolver {
    pub operation: GraphQLOperation,
    pub field: String,
    pub params: Vec<Field>,
    pub return_type: Option<Type>,
    pub auth: Option<Auth>,
    pub injections: Vec<Injection>,
    pub body: Vec<Statement>,
}

// ── Macros and tests ─────────────────────────────────────────────────────

/// `macro! name(params) { heterogeneous body }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
}

/// Top-level `name!(args)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroInvocation {
    pub name: String,
    pub args: Vec<Expr>,
}

/// `test "name" { statements }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestBlock {
    pub name: String,
    pub body: Vec<Statement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_round_trip() {
        for (name, method) in [
            ("GET", HttpMethod::Get),
            ("POST", HttpMethod::Post),
            ("PUT", HttpMethod::Put),
            ("PATCH", HttpMethod::Patch),
            ("DELETE", HttpMethod::Delete),
            ("SSE", HttpMethod::Sse),
        ] {
            assert_eq!(HttpMethod::from_name(name), Some(method));
            assert_eq!(method.to_string(), name);
        }
        assert_eq!(HttpMethod::from_name("get"), None); // case-sensitive
        assert_eq!(HttpMethod::from_name("HEAD"), None);
    }

    #[test]
    fn ws_event_names() {
        assert_eq!(WsEvent::from_name("connect"), Some(WsEvent::Connect));
        assert_eq!(WsEvent::from_name("message"), Some(WsEvent::Message));
        assert_eq!(WsEvent::from_name("disconnect"), Some(WsEvent::Disconnect));
        assert_eq!(WsEvent::from_name("error"), Some(WsEvent::Error));
        assert_eq!(WsEvent::from_name("open"), None);
    }

    #[test]
    fn stream_kind_from_markers() {
        assert_eq!(StreamKind::from_markers(false, false), StreamKind::Unary);
        assert_eq!(StreamKind::from_markers(true, false), StreamKind::ClientStream);
        assert_eq!(StreamKind::from_markers(false, true), StreamKind::ServerStream);
        assert_eq!(StreamKind::from_markers(true, true), StreamKind::Bidirectional);
    }
}
