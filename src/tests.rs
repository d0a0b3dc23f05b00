// In src/tests.rs
//
// End-to-end tests against a loopback stub backend: a real TCP listener
// answering scripted HTTP responses, so the auth and dispatch paths are
// exercised over the wire exactly as in production.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use crate::app::App;
use crate::auth::AuthClient;
use crate::dispatch::ApiClient;
use crate::view::{AuthState, Output};
use crate::{extract, render, Error};

const LOGIN_OK: &str =
    r#"{"access_token":"tok-1","token_type":"bearer","user":{"email":"user@example.com"}}"#;

/// Serve the scripted responses, one connection each, and hand back the
/// raw requests once all of them have been consumed.
fn stub_server(responses: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let base = format!("http://{}", listener.local_addr().expect("stub addr"));
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().expect("accept stub connection");
            requests.push(read_request(&mut stream));
            write_response(&mut stream, status, body);
        }
        requests
    });
    (base, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stub stream"));
    let mut raw = String::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read request line");
        if let Some(rest) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = rest.trim().parse().expect("content length");
        }
        let done = line == "\r\n" || line == "\n";
        raw.push_str(&line);
        if done {
            break;
        }
    }
    if content_length > 0 {
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read request body");
        raw.push_str(&String::from_utf8_lossy(&body));
    }
    raw
}

fn write_response(stream: &mut TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(response.as_bytes())
        .expect("write stub response");
}

fn strip_ansi(text: &str) -> String {
    let re = regex::Regex::new("\x1b\\[[0-9;]*m").unwrap();
    re.replace_all(text, "").to_string()
}

#[test]
fn empty_credentials_are_rejected_before_any_network_call() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let mut app = App::new(Some(AuthClient::new(&base, "anon-key")), ApiClient::new(&base));
    for (email, password) in [("", ""), ("  ", "pw"), ("a@b.c", "   ")] {
        app.login(email, password);
        assert_eq!(
            app.view().notice.as_deref(),
            Some("Email and password required.")
        );
        app.register(email, password);
        assert_eq!(
            app.view().notice.as_deref(),
            Some("Email and password required.")
        );
    }

    // Nothing may have connected to the listener.
    let err = listener.accept().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
}

#[test]
fn login_transitions_view_and_logout_reverts_it() {
    let (base, server) = stub_server(vec![(200, LOGIN_OK)]);
    let mut app = App::new(Some(AuthClient::new(&base, "anon-key")), ApiClient::new(&base));

    app.login("user@example.com", "hunter2");
    assert_eq!(
        app.view().auth,
        AuthState::Authenticated {
            email: "user@example.com".to_string()
        }
    );
    assert_eq!(
        app.view().welcome.as_deref(),
        Some("Welcome, user@example.com!")
    );

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("POST /auth/v1/token?grant_type=password"));
    assert!(requests[0].contains("apikey: anon-key"));

    // Provider is gone by now; the local transition must still happen.
    app.logout();
    assert_eq!(app.view().auth, AuthState::Anonymous);
    assert!(app.view().welcome.is_none());
    assert_eq!(app.view().notice.as_deref(), Some("Logged out."));
}

#[test]
fn provider_error_message_is_displayed() {
    let (base, server) = stub_server(vec![(400, r#"{"msg":"User already registered"}"#)]);
    let mut app = App::new(Some(AuthClient::new(&base, "anon-key")), ApiClient::new(&base));

    app.register("user@example.com", "hunter2");
    assert_eq!(app.view().notice.as_deref(), Some("User already registered"));
    server.join().unwrap();
}

#[test]
fn backend_error_body_is_propagated_verbatim() {
    let (base, server) = stub_server(vec![(500, r#"{"error":"model unavailable"}"#)]);
    let err = ApiClient::new(&base).answer("why?", None).unwrap_err();
    assert_eq!(err.to_string(), "model unavailable");
    assert!(matches!(err, Error::Api(_)));
    server.join().unwrap();
}

#[test]
fn answer_request_carries_question_and_document() {
    let (base, server) = stub_server(vec![(200, r#"{"answer":"it is a test"}"#)]);
    let answer = ApiClient::new(&base)
        .answer("what is this?", Some("doc text"))
        .unwrap();
    assert_eq!(answer, "it is a test");

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("POST /api/data"));
    assert!(requests[0].contains(r#""userQuestion":"what is this?""#));
    assert!(requests[0].contains(r#""documentContent":"doc text""#));
}

#[test]
fn summarize_flow_renders_markdown_result() {
    let (base, server) = stub_server(vec![(200, LOGIN_OK), (200, r#"{"summary":"**short**"}"#)]);
    let mut app = App::new(Some(AuthClient::new(&base, "anon-key")), ApiClient::new(&base));

    app.login("user@example.com", "hunter2");
    app.summarize("https://example.com/article");
    assert_eq!(
        app.view().output,
        Some(Output::Summary("**short**".to_string()))
    );

    let rendered = app.view().render();
    assert!(rendered.contains(render::render_markdown("**short**").as_str()));
    assert_eq!(
        strip_ansi(&rendered),
        "Logged in as user@example.com\nWelcome, user@example.com!\nYou asked to summarize: https://example.com/article\nAI summarized:\nshort"
    );

    let requests = server.join().unwrap();
    assert!(requests[1].starts_with("POST /api/summarize_url"));
    assert!(requests[1].contains(r#""url":"https://example.com/article""#));
}

#[test]
fn protected_operations_require_login() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let mut app = App::new(None, ApiClient::new(&base));
    app.ask("anything", None);
    assert_eq!(app.view().notice.as_deref(), Some("Please log in first."));
    app.summarize("https://example.com");
    assert_eq!(app.view().notice.as_deref(), Some("Please log in first."));

    let err = listener.accept().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
}

#[test]
fn unsupported_upload_fails_before_dispatch() {
    let (base, server) = stub_server(vec![(200, LOGIN_OK)]);
    let mut app = App::new(Some(AuthClient::new(&base, "anon-key")), ApiClient::new(&base));

    app.login("user@example.com", "hunter2");
    app.ask("what is this?", Some(std::path::Path::new("report.xlsx")));
    assert_eq!(
        app.view().output,
        Some(Output::Failure(
            "Unsupported file type. Please upload txt, pdf, or docx.".to_string()
        ))
    );

    // Only the login reached the wire.
    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 1);
}

#[test]
fn ask_with_text_file_sends_its_exact_content() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(file, "hello").unwrap();
    assert_eq!(extract::extract(file.path()).unwrap(), "hello");

    let (base, server) = stub_server(vec![(200, LOGIN_OK), (200, r#"{"answer":"hi"}"#)]);
    let mut app = App::new(Some(AuthClient::new(&base, "anon-key")), ApiClient::new(&base));
    app.login("user@example.com", "hunter2");
    app.ask("greet me", Some(file.path()));
    assert_eq!(app.view().output, Some(Output::Answer("hi".to_string())));

    let requests = server.join().unwrap();
    assert!(requests[1].contains(r#""documentContent":"hello""#));
}
