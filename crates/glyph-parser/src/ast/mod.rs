//! Owned AST for the Glyph front-end.
//!
//! Every node is a tagged variant with owned strings and child nodes, so
//! the token stream and source buffer can be dropped once parsing is
//! done. Items, statements, expressions, types, and patterns each live
//! in their own module; `Node` is the heterogeneous item-or-statement
//! sum used by macro bodies and `quote` expressions.

pub mod expr;
pub mod item;
pub mod pat;
pub mod stmt;
pub mod ty;

pub use expr::{BinaryOp, Expr, Literal, MatchCase, ObjectField, UnaryOp};
pub use item::{
    Annotation, AnnotationArg, Auth, Command, ConstDecl, ContractDef, CronTask, Endpoint,
    EventHandler, Field, Function, GraphQLOperation, GraphQLResolver, GrpcHandler, GrpcMethod,
    GrpcService, HttpMethod, ImportItem, ImportStatement, Injection, Item, MacroDef,
    MacroInvocation, MethodSig, Module, ModuleDecl, ProviderDef, QueryParam, QueueWorker,
    RateLimit, Route,
    StreamKind, TestBlock, TraitDef, TypeDef, TypeParam, WebSocketRoute, WsEvent, WsHandler,
};
pub use pat::{ObjectFieldPattern, Pattern};
pub use stmt::{Statement, SwitchCase};
pub use ty::Type;

use serde::Serialize;

/// A heterogeneous AST node: either an item or a statement.
///
/// Macro bodies and `quote { ... }` blocks mix top-level declarations
/// with statements, so they are stored as a single node sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Item(Item),
    Statement(Statement),
}
