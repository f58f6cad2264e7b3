//! Directive parsers: everything introduced by `@`, plus the `*`/`~`/`&`
//! shorthands for cron tasks, event handlers, and queue workers.
//!
//! Route bodies are a small data-driven loop: at each position the
//! leading token picks a section (`+` middleware, `%` injection, `<`
//! input binding, `? name :` query parameter) or falls through to the
//! statement parser. Sections may interleave freely; the only terminal
//! is `}`.

use glyph_common::error::Error;
use glyph_common::token::TokenKind;

use crate::ast::{
    Auth, CronTask, EventHandler, Expr, Field, GraphQLOperation, GraphQLResolver, GrpcHandler,
    GrpcMethod, GrpcService, HttpMethod, Injection, Item, Literal, QueryParam, QueueWorker,
    RateLimit, Route, Statement, StreamKind, Type, WebSocketRoute, WsEvent, WsHandler,
};

use super::{expressions, items, statements, types, Parser};

/// Dispatch a directive after `@`.
pub(crate) fn parse_directive(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // @

    match p.kind() {
        // `@ /path { ... }` -- a bare path is a GET route.
        TokenKind::Ident if p.current().literal.starts_with('/') => parse_route_item(p, None),
        TokenKind::Slash => parse_route_item(p, None),

        TokenKind::Ident => {
            let word = p.current().literal.clone();
            match word.as_str() {
                "route" => {
                    p.bump();
                    parse_route_item(p, None)
                }
                "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "SSE" => {
                    p.bump();
                    parse_route_item(p, HttpMethod::from_name(&word))
                }
                "ws" | "websocket" => {
                    p.bump();
                    parse_websocket(p)
                }
                "command" | "cmd" => {
                    p.bump();
                    let name = p.expect_ident("as the command name")?;
                    Ok(Item::Command(items::parse_command(p, name)?))
                }
                "cron" | "schedule" => {
                    p.bump();
                    parse_cron(p)
                }
                "event" | "on" => {
                    p.bump();
                    parse_event(p)
                }
                "queue" | "worker" => {
                    p.bump();
                    parse_queue(p)
                }
                "rpc" | "grpc" => {
                    p.bump();
                    parse_grpc(p)
                }
                "query" => {
                    p.bump();
                    parse_graphql(p, GraphQLOperation::Query)
                }
                "mutation" => {
                    p.bump();
                    parse_graphql(p, GraphQLOperation::Mutation)
                }
                "subscription" => {
                    p.bump();
                    parse_graphql(p, GraphQLOperation::Subscription)
                }
                _ => Err(p.error_with_hint(
                    format!("unknown directive `@{word}`"),
                    "directives are `@ /path`, `@ route`, an HTTP method, `@ ws`, \
                     `@ command`, `@ cron`, `@ event`, `@ queue`, `@ grpc`, `@ query`, \
                     `@ mutation`, or `@ subscription`",
                )),
            }
        }

        _ => Err(p.route_error(format!(
            "expected a directive name or route path after `@`, found {}",
            crate::error::describe_token(p.current())
        ))),
    }
}

// ── Paths ────────────────────────────────────────────────────────────────

/// Assemble a route path.
///
/// In operator context the lexer already delivered the whole path as one
/// token; after an identifier (`@ route /x`, `@ GET /x`) the path
/// arrives as `/`-led token runs instead, and segments are joined here.
/// Keyword tokens may act as segments, and `-` joins hyphenated ones.
pub(crate) fn parse_route_path(p: &mut Parser) -> Result<String, Error> {
    if p.at(TokenKind::Ident) && p.current().literal.starts_with('/') {
        return Ok(p.bump().literal);
    }

    if !p.at(TokenKind::Slash) {
        return Err(p.route_error(format!(
            "expected a route path starting with `/`, found {}",
            crate::error::describe_token(p.current())
        )));
    }

    let mut path = String::new();
    while p.eat(TokenKind::Slash) {
        path.push('/');
        if p.eat(TokenKind::Colon) {
            path.push(':');
            path.push_str(&expect_segment(p)?);
        } else if at_segment(p) {
            path.push_str(&expect_segment(p)?);
        } else {
            // Bare `/`: root path or trailing slash.
            continue;
        }

        while p.at(TokenKind::Minus) && segment_kind(p.peek_kind(1)) {
            p.bump(); // -
            path.push('-');
            path.push_str(&expect_segment(p)?);
        }
    }

    Ok(path)
}

fn segment_kind(kind: TokenKind) -> bool {
    kind == TokenKind::Ident || kind.is_keyword()
}

fn at_segment(p: &Parser) -> bool {
    segment_kind(p.kind())
}

fn expect_segment(p: &mut Parser) -> Result<String, Error> {
    if at_segment(p) {
        Ok(p.bump().literal)
    } else {
        Err(p.route_error(format!(
            "expected a path segment, found {}",
            crate::error::describe_token(p.current())
        )))
    }
}

// ── HTTP routes ──────────────────────────────────────────────────────────

/// `[/path] [\[METHOD\]] [-> Type] { body }` after the directive prefix.
///
/// The bracketed method overrides the keyword form; without either the
/// method is GET.
fn parse_route_item(p: &mut Parser, keyword_method: Option<HttpMethod>) -> Result<Item, Error> {
    let path = parse_route_path(p)?;
    let mut method = keyword_method.unwrap_or(HttpMethod::Get);

    if p.eat(TokenKind::LBracket) {
        let name = p.expect_ident("as the bracketed HTTP method")?;
        method = HttpMethod::from_name(&name).ok_or_else(|| {
            p.error_with_hint(
                format!("unknown HTTP method `{name}`"),
                "methods are GET, POST, PUT, PATCH, DELETE, and SSE",
            )
        })?;
        p.expect(TokenKind::RBracket, "to close the method override")?;
    }

    let return_type = if p.eat(TokenKind::Arrow) {
        Some(types::parse_type(p)?.0)
    } else {
        None
    };

    let mut route = Route {
        path,
        method,
        input_type: None,
        return_type,
        auth: None,
        rate_limit: None,
        injections: Vec::new(),
        query_params: Vec::new(),
        body: Vec::new(),
    };
    parse_route_body(p, &mut route)?;
    Ok(Item::Route(route))
}

/// The route body loop (see the module docs). Middleware slots are
/// single-valued; a repeated `+ auth` or `+ ratelimit` overwrites the
/// previous one.
fn parse_route_body(p: &mut Parser, route: &mut Route) -> Result<(), Error> {
    p.expect(TokenKind::LBrace, "to open the route body")?;
    p.skip_newlines();

    loop {
        match p.kind() {
            TokenKind::RBrace => {
                p.bump();
                return Ok(());
            }
            TokenKind::Eof => {
                return Err(p.expect_error(TokenKind::RBrace, "to close the route body"));
            }
            TokenKind::Plus => parse_route_middleware(p, route)?,
            TokenKind::Percent => route.injections.push(parse_injection(p)?),
            TokenKind::Less => {
                p.bump(); // <
                let name = p.expect_ident("after `<`")?;
                if name != "input" {
                    return Err(p.route_error(format!(
                        "input binding must be named `input`, found `{name}`"
                    )));
                }
                p.expect(TokenKind::Colon, "after `input`")?;
                route.input_type = Some(types::parse_type(p)?.0);
            }
            TokenKind::Question
                if p.peek_kind(1) == TokenKind::Ident && p.peek_kind(2) == TokenKind::Colon =>
            {
                route.query_params.push(parse_query_param(p)?);
            }
            _ => route.body.push(statements::parse_statement(p)?),
        }
        p.skip_newlines();
    }
}

/// `+ auth(...)`, `+ ratelimit(...)`, or any other `+ name(...)` which
/// is consumed and ignored.
fn parse_route_middleware(p: &mut Parser, route: &mut Route) -> Result<(), Error> {
    p.bump(); // +
    let name = p.expect_ident("after `+`")?;
    match name.as_str() {
        "auth" => route.auth = Some(parse_auth(p)?),
        "ratelimit" => route.rate_limit = Some(parse_rate_limit(p)?),
        _ => skip_middleware_args(p)?,
    }
    Ok(())
}

/// `( kind [, arg ...] )` -- kind and args are identifiers or strings.
fn parse_auth(p: &mut Parser) -> Result<Auth, Error> {
    p.expect(TokenKind::LParen, "after `auth`")?;
    let kind = expect_auth_arg(p)?;
    let mut args = Vec::new();
    while p.eat(TokenKind::Comma) {
        args.push(expect_auth_arg(p)?);
    }
    p.expect(TokenKind::RParen, "to close the auth middleware")?;
    Ok(Auth { kind, args })
}

fn expect_auth_arg(p: &mut Parser) -> Result<String, Error> {
    match p.kind() {
        TokenKind::Ident | TokenKind::String => Ok(p.bump().literal),
        kind if kind.is_keyword() => Ok(p.bump().literal),
        _ => Err(p.route_error(format!(
            "expected an auth kind, found {}",
            crate::error::describe_token(p.current())
        ))),
    }
}

/// `+ ratelimit(100/min)` or `+ ratelimit("100/min")` -- both forms set
/// the same requests/window pair.
fn parse_rate_limit(p: &mut Parser) -> Result<RateLimit, Error> {
    p.expect(TokenKind::LParen, "after `ratelimit`")?;

    let limit = match p.kind() {
        TokenKind::String => {
            let tok = p.bump();
            let Some((requests, window)) = tok.literal.split_once('/') else {
                return Err(p.route_error(format!(
                    "invalid rate limit \"{}\": expected \"N/window\"",
                    tok.literal
                )));
            };
            let requests = requests.trim().parse::<i64>().map_err(|_| {
                p.route_error(format!(
                    "invalid rate limit \"{}\": expected \"N/window\"",
                    tok.literal
                ))
            })?;
            RateLimit {
                requests,
                window: window.trim().to_string(),
            }
        }
        TokenKind::Integer => {
            let tok = p.bump();
            let requests = tok
                .literal
                .parse::<i64>()
                .map_err(|_| p.route_error(format!("rate limit `{}` is out of range", tok.literal)))?;
            p.expect(TokenKind::Slash, "in the rate limit")?;
            let window = expect_segment(p)?;
            RateLimit { requests, window }
        }
        _ => {
            return Err(p.route_error(
                "rate limit must be `N/window` or a \"N/window\" string",
            ))
        }
    };

    p.expect(TokenKind::RParen, "to close the rate limit")?;
    Ok(limit)
}

/// Consume an ignored middleware's `( ... )` argument list, balancing
/// nested parentheses.
fn skip_middleware_args(p: &mut Parser) -> Result<(), Error> {
    if !p.at(TokenKind::LParen) {
        return Ok(());
    }
    let mut depth = 0u32;
    loop {
        match p.kind() {
            TokenKind::LParen => {
                depth += 1;
                p.bump();
            }
            TokenKind::RParen => {
                depth -= 1;
                p.bump();
                if depth == 0 {
                    return Ok(());
                }
            }
            TokenKind::Eof => {
                return Err(p.expect_error(TokenKind::RParen, "to close the middleware arguments"))
            }
            _ => {
                p.bump();
            }
        }
    }
}

/// `% name : Type`
fn parse_injection(p: &mut Parser) -> Result<Injection, Error> {
    p.bump(); // %
    let name = p.expect_ident("after `%`")?;
    p.expect(TokenKind::Colon, "after the injection name")?;
    let (ty, _) = types::parse_type(p)?;
    Ok(Injection { name, ty })
}

/// `? name : type [= default]` -- array types set the repeated flag.
fn parse_query_param(p: &mut Parser) -> Result<QueryParam, Error> {
    p.bump(); // ?
    let name = p.expect_ident("as the query parameter name")?;
    p.expect(TokenKind::Colon, "after the query parameter name")?;
    let (ty, required) = types::parse_type(p)?;
    let is_array = matches!(ty, Type::Array(_));

    let default = if p.eat(TokenKind::Equals) {
        Some(expressions::parse_expression(p)?)
    } else {
        None
    };
    if let Some(default) = &default {
        items::check_default_literal(p, &name, &ty, default)?;
    }

    Ok(QueryParam {
        name,
        ty,
        required,
        default,
        is_array,
    })
}

// ── WebSocket routes ─────────────────────────────────────────────────────

/// `/path { on connect { ... } on message { ... } ... }`
fn parse_websocket(p: &mut Parser) -> Result<Item, Error> {
    let path = parse_route_path(p)?;
    p.expect(TokenKind::LBrace, "to open the WebSocket body")?;
    p.skip_newlines();

    let mut events = Vec::new();
    while !p.at(TokenKind::RBrace) {
        if !p.at_ident("on") {
            return Err(p.route_error(format!(
                "expected `on <event>` in the WebSocket body, found {}",
                crate::error::describe_token(p.current())
            )));
        }
        p.bump(); // on
        let name = p.expect_ident("as the WebSocket event")?;
        let Some(event) = WsEvent::from_name(&name) else {
            return Err(p.error_with_hint(
                format!("unknown WebSocket event `{name}`"),
                "events are connect, message, disconnect, and error",
            ));
        };
        let body = statements::parse_brace_block(p)?;
        events.push(WsHandler { event, body });
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, "to close the WebSocket body")?;
    Ok(Item::WebSocketRoute(WebSocketRoute { path, events }))
}

// ── Task bodies (cron, events, queues, gRPC, GraphQL) ────────────────────

/// The body shared by non-route handlers: `%` injections, `+` settings
/// (with `+ auth` extracted), and statements.
struct TaskBody {
    auth: Option<Auth>,
    injections: Vec<Injection>,
    settings: Vec<(String, Vec<Expr>)>,
    statements: Vec<Statement>,
}

fn parse_task_body(p: &mut Parser) -> Result<TaskBody, Error> {
    p.expect(TokenKind::LBrace, "to open the body")?;
    p.skip_newlines();

    let mut body = TaskBody {
        auth: None,
        injections: Vec::new(),
        settings: Vec::new(),
        statements: Vec::new(),
    };

    loop {
        match p.kind() {
            TokenKind::RBrace => {
                p.bump();
                return Ok(body);
            }
            TokenKind::Eof => {
                return Err(p.expect_error(TokenKind::RBrace, "to close the body"));
            }
            TokenKind::Plus => {
                p.bump(); // +
                let name = p.expect_ident("after `+`")?;
                if name == "auth" {
                    body.auth = Some(parse_auth(p)?);
                } else {
                    let args = if p.at(TokenKind::LParen) {
                        expressions::parse_call_args(p)?
                    } else {
                        Vec::new()
                    };
                    body.settings.push((name, args));
                }
            }
            TokenKind::Percent => body.injections.push(parse_injection(p)?),
            _ => body.statements.push(statements::parse_statement(p)?),
        }
        p.skip_newlines();
    }
}

impl TaskBody {
    /// The last integer-valued setting with this name, if any.
    fn setting_int(&self, name: &str) -> Option<i64> {
        self.settings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .and_then(|(_, args)| match args.first() {
                Some(Expr::Literal(Literal::Int(v))) => Some(*v),
                _ => None,
            })
    }

    /// The last string-valued setting with this name, if any.
    fn setting_str(&self, name: &str) -> Option<String> {
        self.settings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .and_then(|(_, args)| match args.first() {
                Some(Expr::Literal(Literal::Str(v))) => Some(v.clone()),
                _ => None,
            })
    }
}

/// `* "schedule" [name] { body }`
pub(crate) fn parse_cron_shorthand(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // *
    parse_cron(p)
}

fn parse_cron(p: &mut Parser) -> Result<Item, Error> {
    let schedule = p.expect_string("as the cron schedule")?;
    let name = if p.at(TokenKind::Ident) {
        Some(p.bump().literal)
    } else {
        None
    };

    let body = parse_task_body(p)?;
    let timezone = body.setting_str("timezone");
    let retries = body.setting_int("retries");

    Ok(Item::CronTask(CronTask {
        schedule,
        name,
        timezone,
        retries,
        injections: body.injections,
        body: body.statements,
    }))
}

/// `~ [async] dotted.event { body }`
pub(crate) fn parse_event_shorthand(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // ~
    parse_event(p)
}

fn parse_event(p: &mut Parser) -> Result<Item, Error> {
    let is_async = p.eat(TokenKind::Async);
    let event = if p.at(TokenKind::String) {
        p.bump().literal
    } else {
        items::parse_dotted_name(p, "as the event type")?
    };

    let body = parse_task_body(p)?;
    Ok(Item::EventHandler(EventHandler {
        event,
        is_async,
        injections: body.injections,
        body: body.statements,
    }))
}

/// `& name { body }`
pub(crate) fn parse_queue_shorthand(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // &
    parse_queue(p)
}

fn parse_queue(p: &mut Parser) -> Result<Item, Error> {
    let queue = if p.at(TokenKind::String) {
        p.bump().literal
    } else {
        p.expect_ident("as the queue name")?
    };

    let body = parse_task_body(p)?;
    Ok(Item::QueueWorker(QueueWorker {
        queue,
        concurrency: body.setting_int("concurrency"),
        retries: body.setting_int("retries"),
        timeout: body.setting_int("timeout"),
        injections: body.injections,
        body: body.statements,
    }))
}

// ── gRPC ─────────────────────────────────────────────────────────────────

/// Service definition (`Name { ... }`) vs handler (`name( ... )`),
/// decided by the token after the name.
fn parse_grpc(p: &mut Parser) -> Result<Item, Error> {
    let name = p.expect_ident("as the gRPC name")?;

    match p.kind() {
        TokenKind::LBrace => parse_grpc_service(p, name),
        TokenKind::LParen => parse_grpc_handler(p, name),
        _ => Err(p.error_with_hint(
            format!(
                "expected `{{` or `(` after the gRPC name, found {}",
                crate::error::describe_token(p.current())
            ),
            "`@ grpc Name { ... }` defines a service; `@ grpc name(params) { ... }` a handler",
        )),
    }
}

fn parse_grpc_service(p: &mut Parser, name: String) -> Result<Item, Error> {
    p.bump(); // {
    p.skip_newlines();

    let mut methods = Vec::new();
    while !p.at(TokenKind::RBrace) {
        let method_name = p.expect_ident("as the method name")?;
        let (params, client_stream) = parse_stream_param_list(p)?;
        let (return_type, server_stream) = parse_stream_return(p)?;
        methods.push(GrpcMethod {
            name: method_name,
            params,
            return_type,
            streaming: StreamKind::from_markers(client_stream, server_stream),
        });
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, "to close the service body")?;
    Ok(Item::GrpcService(GrpcService { name, methods }))
}

fn parse_grpc_handler(p: &mut Parser, method: String) -> Result<Item, Error> {
    let (params, client_stream) = parse_stream_param_list(p)?;
    let (return_type, server_stream) = parse_stream_return(p)?;
    let body = parse_task_body(p)?;

    Ok(Item::GrpcHandler(GrpcHandler {
        method,
        params,
        return_type,
        streaming: StreamKind::from_markers(client_stream, server_stream),
        auth: body.auth,
        injections: body.injections,
        body: body.statements,
    }))
}

/// A parameter list whose leading `stream` marker flags client-side
/// streaming. A parameter actually named `stream` keeps working because
/// the marker is only taken when no `:` follows.
fn parse_stream_param_list(p: &mut Parser) -> Result<(Vec<Field>, bool), Error> {
    p.expect(TokenKind::LParen, "to open the parameter list")?;
    p.skip_newlines();

    let client_stream = if p.at_ident("stream") && p.peek_kind(1) != TokenKind::Colon {
        p.bump();
        true
    } else {
        false
    };

    let mut params = Vec::new();
    while !p.at(TokenKind::RParen) {
        params.push(items::parse_field(p)?);
        p.skip_newlines();
        if !p.eat(TokenKind::Comma) {
            break;
        }
        p.skip_newlines();
    }

    p.expect(TokenKind::RParen, "to close the parameter list")?;
    Ok((params, client_stream))
}

/// `-> [stream] Type`, both parts optional.
fn parse_stream_return(p: &mut Parser) -> Result<(Option<Type>, bool), Error> {
    if !p.eat(TokenKind::Arrow) {
        return Ok((None, false));
    }
    let server_stream = if p.at_ident("stream") {
        p.bump();
        true
    } else {
        false
    };
    let (ty, _) = types::parse_type(p)?;
    Ok((Some(ty), server_stream))
}

// ── GraphQL ──────────────────────────────────────────────────────────────

/// `field[(params)] [-> Type] { body }`
fn parse_graphql(p: &mut Parser, operation: GraphQLOperation) -> Result<Item, Error> {
    let field = p.expect_ident("as the resolver field")?;

    let params = if p.at(TokenKind::LParen) {
        items::parse_param_list(p)?
    } else {
        Vec::new()
    };

    let return_type = if p.eat(TokenKind::Arrow) {
        Some(types::parse_type(p)?.0)
    } else {
        None
    };

    let body = parse_task_body(p)?;
    Ok(Item::GraphQLResolver(GraphQLResolver {
        operation,
        field,
        params,
        return_type,
        auth: body.auth,
        injections: body.injections,
        body: body.statements,
    }))
}
