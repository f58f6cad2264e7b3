//! Directive-focused integration tests: routes, WebSockets, middleware,
//! background work, gRPC, GraphQL, and macros, all through
//! `parse_module`.

use glyph_parser::ast::{
    Auth, Expr, HttpMethod, Item, Node, RateLimit, Statement, StreamKind, WsEvent,
};
use glyph_parser::parse_module;

fn single_item(source: &str) -> Item {
    let module = parse_module(source).expect("module should parse");
    assert_eq!(module.items.len(), 1, "expected exactly one item");
    module.items.into_iter().next().unwrap()
}

fn route(source: &str) -> glyph_parser::ast::Route {
    match single_item(source) {
        Item::Route(route) => route,
        other => panic!("expected a route, got {other:?}"),
    }
}

// ── Route shapes (spec scenarios) ────────────────────────────────────────

#[test]
fn hello_route_shape() {
    let r = route("@ GET /hello { > {message: \"Hello\"} }");
    assert_eq!(r.path, "/hello");
    assert_eq!(r.method, HttpMethod::Get);
    assert_eq!(r.body.len(), 1);
    let Statement::Return(Expr::Object(fields)) = &r.body[0] else {
        panic!("expected a returned object");
    };
    assert_eq!(fields[0].key, "message");
    assert_eq!(fields[0].value, Expr::str("Hello"));
}

#[test]
fn bracketed_method_wins() {
    let r = route("@ POST /users/:id [PUT] { > {id:id} }");
    assert_eq!(r.method, HttpMethod::Put);
    assert_eq!(r.path, "/users/:id");
}

#[test]
fn route_directive_with_bracket() {
    let r = route("@ route /orders [DELETE] { > 1 }");
    assert_eq!(r.method, HttpMethod::Delete);
}

#[test]
fn every_method_keyword() {
    for (kw, method) in [
        ("GET", HttpMethod::Get),
        ("POST", HttpMethod::Post),
        ("PUT", HttpMethod::Put),
        ("PATCH", HttpMethod::Patch),
        ("DELETE", HttpMethod::Delete),
        ("SSE", HttpMethod::Sse),
    ] {
        let r = route(&format!("@ {kw} /x {{ > 1 }}"));
        assert_eq!(r.method, method, "method keyword {kw}");
    }
}

#[test]
fn route_paths_always_begin_with_slash() {
    for source in [
        "@ GET /a { > 1 }",
        "@ /a/b { > 1 }",
        "@ route /a/:id/c { > 1 }",
        "@ GET / { > 1 }",
    ] {
        let r = route(source);
        assert!(r.path.starts_with('/'), "path {:?}", r.path);
    }
}

#[test]
fn route_return_type_annotation() {
    let r = route("@ GET /me -> User { > user }");
    assert_eq!(
        r.return_type,
        Some(glyph_parser::ast::Type::Named("User".into()))
    );
}

// ── Middleware extraction ────────────────────────────────────────────────

#[test]
fn auth_kind_extraction() {
    let r = route("@ GET /admin {\n + auth(jwt)\n > 1\n}");
    assert_eq!(
        r.auth,
        Some(Auth {
            kind: "jwt".into(),
            args: vec![],
        })
    );
}

#[test]
fn auth_with_extra_args() {
    let r = route("@ GET /admin {\n + auth(jwt, admin, \"billing\")\n > 1\n}");
    assert_eq!(
        r.auth,
        Some(Auth {
            kind: "jwt".into(),
            args: vec!["admin".into(), "billing".into()],
        })
    );
}

#[test]
fn ratelimit_both_forms_agree() {
    let token_form = route("@ GET /x {\n + ratelimit(100/min)\n > 1\n}");
    assert_eq!(
        token_form.rate_limit,
        Some(RateLimit {
            requests: 100,
            window: "min".into(),
        })
    );

    let string_form = route("@ GET /x {\n + ratelimit(\"50/sec\")\n > 1\n}");
    assert_eq!(
        string_form.rate_limit,
        Some(RateLimit {
            requests: 50,
            window: "sec".into(),
        })
    );
}

#[test]
fn repeated_middleware_last_one_wins() {
    let r = route("@ GET /x {\n + auth(jwt)\n + auth(apikey)\n > 1\n}");
    assert_eq!(r.auth.map(|a| a.kind), Some("apikey".into()));
}

#[test]
fn spaced_ratelimit_tokens_parse_like_dense_ones() {
    let dense = route("@ GET /x {\n + ratelimit(100/min)\n > 1\n}");
    let spaced = route("@ GET /x {\n + ratelimit(100 / min)\n > 1\n}");
    assert_eq!(dense.rate_limit, spaced.rate_limit);
}

// ── WebSocket ────────────────────────────────────────────────────────────

#[test]
fn ws_connect_then_message_order() {
    let Item::WebSocketRoute(ws) =
        single_item("@ ws /chat { on connect { > \"ok\" } on message { > msg } }")
    else {
        panic!("expected a WebSocket route");
    };
    let events: Vec<_> = ws.events.iter().map(|h| h.event).collect();
    assert_eq!(events, vec![WsEvent::Connect, WsEvent::Message]);
}

#[test]
fn ws_all_four_events() {
    let Item::WebSocketRoute(ws) = single_item(
        "@ websocket /live {\n on connect { > 1 }\n on message { > 2 }\n on disconnect { > 3 }\n on error { > 4 }\n}",
    ) else {
        panic!("expected a WebSocket route");
    };
    assert_eq!(ws.events.len(), 4);
    assert_eq!(ws.events[3].event, WsEvent::Error);
}

// ── Background work ──────────────────────────────────────────────────────

#[test]
fn cron_directive_and_shorthand_agree() {
    let Item::CronTask(directive) = single_item("@ cron \"0 1 * * *\" { ? run() }") else {
        panic!("expected a cron task");
    };
    let Item::CronTask(shorthand) = single_item("* \"0 1 * * *\" { ? run() }") else {
        panic!("expected a cron task");
    };
    assert_eq!(directive, shorthand);
}

#[test]
fn event_directive_and_shorthand_agree() {
    let Item::EventHandler(directive) = single_item("@ on user.created { ? notify(user) }")
    else {
        panic!("expected an event handler");
    };
    let Item::EventHandler(shorthand) = single_item("~ user.created { ? notify(user) }") else {
        panic!("expected an event handler");
    };
    assert_eq!(directive, shorthand);
}

#[test]
fn queue_directive_and_shorthand_agree() {
    let Item::QueueWorker(directive) = single_item("@ queue emails { ? send(job) }") else {
        panic!("expected a queue worker");
    };
    let Item::QueueWorker(shorthand) = single_item("& emails { ? send(job) }") else {
        panic!("expected a queue worker");
    };
    assert_eq!(directive, shorthand);
}

#[test]
fn event_type_as_string_literal() {
    let Item::EventHandler(handler) = single_item("~ \"order.refunded\" { ? refund(order) }")
    else {
        panic!("expected an event handler");
    };
    assert_eq!(handler.event, "order.refunded");
}

// ── gRPC ─────────────────────────────────────────────────────────────────

#[test]
fn grpc_service_vs_handler_lookahead() {
    let Item::GrpcService(service) = single_item("@ rpc Users { Get(id: int!) -> User }")
    else {
        panic!("expected a service");
    };
    assert_eq!(service.name, "Users");
    assert_eq!(service.methods.len(), 1);

    let Item::GrpcHandler(handler) = single_item("@ rpc Get(id: int!) -> User { > id }") else {
        panic!("expected a handler");
    };
    assert_eq!(handler.method, "Get");
}

#[test]
fn grpc_bidirectional_handler() {
    let Item::GrpcHandler(handler) =
        single_item("@ grpc Talk(stream msg: Msg!) -> stream Msg { yield msg }")
    else {
        panic!("expected a handler");
    };
    assert_eq!(handler.streaming, StreamKind::Bidirectional);
}

#[test]
fn grpc_param_actually_named_stream() {
    let Item::GrpcHandler(handler) = single_item("@ grpc Tune(stream: int!) -> Ack { > 1 }")
    else {
        panic!("expected a handler");
    };
    assert_eq!(handler.streaming, StreamKind::Unary);
    assert_eq!(handler.params[0].name, "stream");
}

// ── Macros and quote ─────────────────────────────────────────────────────

#[test]
fn macro_def_quote_and_invocation() {
    let source = "macro! endpoints(prefix) {\n @ GET /status { > \"up\" }\n $ generated = quote { > prefix }\n}\nendpoints!(\"api\")\n";
    let module = parse_module(source).unwrap();
    assert_eq!(module.items.len(), 2);

    let Item::MacroDef(def) = &module.items[0] else {
        panic!("expected a macro definition");
    };
    assert_eq!(def.body.len(), 2);
    assert!(matches!(def.body[0], Node::Item(Item::Route(_))));
    let Node::Statement(Statement::Assign { value, .. }) = &def.body[1] else {
        panic!("expected the quote assignment");
    };
    assert!(matches!(value, Expr::Quote(_)));

    let Item::MacroInvocation(inv) = &module.items[1] else {
        panic!("expected a macro invocation");
    };
    assert_eq!(inv.name, "endpoints");
    assert_eq!(inv.args, vec![Expr::str("api")]);
}

#[test]
fn quote_captures_items_without_evaluation() {
    let source = "const T = quote { : Widget { id: int! } }";
    let Item::Const(decl) = single_item(source) else {
        panic!("expected a const");
    };
    let Expr::Quote(nodes) = &decl.value else {
        panic!("expected a quote");
    };
    assert_eq!(nodes.len(), 1);
    assert!(matches!(nodes[0], Node::Item(Item::TypeDef(_))));
}
