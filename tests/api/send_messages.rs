use crate::helpers::{email, spawn_app, spawn_failing_silently_app, API_KEY};
use claim::{assert_err, assert_none, assert_ok};
use mandrill_backend::{ConfigurationError, MandrillOptions, Message, SendError};

#[tokio::test]
async fn an_empty_batch_is_a_no_op() {
    // arrange
    let app = spawn_app();

    // act
    let result = app.backend.send_messages(&[]).await;

    // assert
    assert_none!(assert_ok!(result));
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn plain_messages_are_posted_to_the_send_endpoint() {
    // arrange
    let app = spawn_app();
    let message = Message::plain(email());

    // act
    let sent = app.backend.send_messages(&[message]).await;

    // assert
    assert_eq!(assert_ok!(sent), Some(1));
    let requests = app.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "https://mandrill.test/api/1.0/messages/send.json"
    );
    assert_eq!(
        requests[0].body,
        serde_json::json!({
            "key": API_KEY,
            "message": {
                "text": "Welcome to our newsletter!",
                "subject": "Welcome!",
                "from_email": "newsletter@example.com",
                "from_name": "Newsletter",
                "to": [{"email": "ursula_le_guin@example.com", "name": "Ursula Le Guin"}],
            }
        })
    );
}

#[tokio::test]
async fn mandrill_messages_carry_their_extensions() {
    // arrange
    let app = spawn_app();
    let mut email = email();
    email.attach_alternative("<p>Welcome to our newsletter!</p>", "text/html");
    email.extra_headers.insert("X-Custom".into(), "1".into());
    email.extra_headers.insert("Reply-To".into(), "a@b.com".into());
    email.extra_headers.insert("Cc".into(), "x@y.com".into());
    let options = MandrillOptions {
        from_name: Some("The Team".into()),
        tags: vec!["welcome".into(), "t".repeat(51)],
        track_clicks: false,
        ..MandrillOptions::default()
    };
    let message = Message::mandrill(email, options).unwrap();

    // act
    let sent = app.backend.send_messages(&[message]).await;

    // assert
    assert_eq!(assert_ok!(sent), Some(1));
    let requests = app.requests();
    let body = &requests[0].body;
    assert_eq!(body["message"]["from_name"], "The Team");
    assert_eq!(
        body["message"]["headers"],
        serde_json::json!({"X-Custom": "1", "Reply-To": "a@b.com"})
    );
    assert_eq!(body["message"]["tags"], serde_json::json!(["welcome"]));
    assert_eq!(body["message"]["track_opens"], true);
    assert_eq!(body["message"]["track_clicks"], false);
    assert_eq!(
        body["message"]["html"],
        "<p>Welcome to our newsletter!</p>"
    );
    assert!(body.get("template_name").is_none());
}

#[tokio::test]
async fn messages_without_recipients_are_skipped() {
    // arrange
    let app = spawn_app();
    let first = Message::plain(email());
    let mut empty = email();
    empty.to.clear();
    let second = Message::plain(empty);

    // act
    let sent = app.backend.send_messages(&[first, second]).await;

    // assert
    assert_eq!(assert_ok!(sent), Some(1));
    assert_eq!(app.requests().len(), 1);
}

#[tokio::test]
async fn cc_and_bcc_addresses_are_sent_as_recipients() {
    // arrange
    let app = spawn_app();
    let mut email = email();
    email.to.clear();
    email.cc = vec!["cc@example.com".into()];
    email.bcc = vec!["bcc@example.com".into()];

    // act
    let sent = app.backend.send_messages(&[Message::plain(email)]).await;

    // assert
    assert_eq!(assert_ok!(sent), Some(1));
    assert_eq!(
        app.requests()[0].body["message"]["to"],
        serde_json::json!([
            {"email": "cc@example.com", "name": ""},
            {"email": "bcc@example.com", "name": ""},
        ])
    );
}

#[tokio::test]
async fn a_provider_error_is_raised_with_its_message() {
    // arrange
    let app = spawn_app();
    app.transport.respond_with(
        500,
        serde_json::json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Key",
            "message": "Invalid API key",
        }),
    );

    // act
    let result = app.backend.send_messages(&[Message::plain(email())]).await;

    // assert
    match assert_err!(result) {
        SendError::Provider(error) => {
            assert_eq!(error.status_code, 500);
            assert_eq!(error.message, "Invalid API key");
        }
        other => panic!("Expected a provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn a_provider_error_aborts_the_rest_of_the_batch() {
    // arrange
    let app = spawn_app();
    app.transport
        .respond_with(500, serde_json::json!({"message": "Invalid API key"}));

    // act
    let result = app
        .backend
        .send_messages(&[Message::plain(email()), Message::plain(email())])
        .await;

    // assert
    assert_err!(result);
    assert_eq!(app.requests().len(), 1);
}

#[tokio::test]
async fn a_provider_error_is_swallowed_when_failing_silently() {
    // arrange
    let app = spawn_failing_silently_app();
    app.transport
        .respond_with(500, serde_json::json!({"message": "Invalid API key"}));

    // act
    let sent = app.backend.send(&Message::plain(email())).await;

    // assert
    assert!(!assert_ok!(sent));
}

#[tokio::test]
async fn failing_silently_keeps_the_batch_going() {
    // arrange
    let app = spawn_failing_silently_app();
    app.transport
        .respond_with(400, serde_json::json!({"message": "Validation error"}));
    app.transport.fail_with("connection reset by peer");

    // act
    let sent = app
        .backend
        .send_messages(&[
            Message::plain(email()),
            Message::plain(email()),
            Message::plain(email()),
        ])
        .await;

    // assert
    assert_eq!(assert_ok!(sent), Some(1));
    assert_eq!(app.requests().len(), 3);
}

#[tokio::test]
async fn a_transport_failure_is_raised_when_not_failing_silently() {
    // arrange
    let app = spawn_app();
    app.transport.fail_with("connection refused");

    // act
    let result = app.backend.send_messages(&[Message::plain(email())]).await;

    // assert
    match assert_err!(result) {
        SendError::Transport { endpoint, .. } => {
            assert_eq!(endpoint, "https://mandrill.test/api/1.0/messages/send.json")
        }
        other => panic!("Expected a transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn two_alternatives_fail_even_when_failing_silently() {
    // arrange
    let app = spawn_failing_silently_app();
    let mut email = email();
    email.attach_alternative("<p>Hi</p>", "text/html");
    email.attach_alternative("Hi", "text/enriched");
    let message = Message::mandrill(email, MandrillOptions::default()).unwrap();

    // act
    let result = app.backend.send_messages(&[message]).await;

    // assert
    assert!(matches!(
        result,
        Err(SendError::Configuration(
            ConfigurationError::MultipleAlternatives
        ))
    ));
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn an_invalid_recipient_is_rejected_before_sending() {
    // arrange
    let app = spawn_app();
    let mut email = email();
    email.to = vec!["definitely-not-an-email".into()];

    // act
    let result = app.backend.send_messages(&[Message::plain(email)]).await;

    // assert
    assert!(matches!(result, Err(SendError::InvalidAddress { .. })));
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn an_invalid_recipient_is_counted_as_not_sent_when_failing_silently() {
    // arrange
    let app = spawn_failing_silently_app();
    let mut invalid = email();
    invalid.to = vec!["definitely-not-an-email".into()];

    // act
    let sent = app
        .backend
        .send_messages(&[
            Message::plain(email()),
            Message::plain(invalid),
            Message::plain(email()),
        ])
        .await;

    // assert
    assert_eq!(assert_ok!(sent), Some(2));
    assert_eq!(app.requests().len(), 2);
}

#[tokio::test]
async fn commented_and_domain_literal_addresses_are_sent() {
    // arrange
    let app = spawn_app();
    let mut email = email();
    email.to = vec![
        "Jane (work) <jane@example.com>".into(),
        "user@[127.0.0.1]".into(),
    ];

    // act
    let sent = app.backend.send_messages(&[Message::plain(email)]).await;

    // assert
    assert_eq!(assert_ok!(sent), Some(1));
    assert_eq!(
        app.requests()[0].body["message"]["to"],
        serde_json::json!([
            {"email": "jane@example.com", "name": "Jane"},
            {"email": "user@[127.0.0.1]", "name": ""},
        ])
    );
}

#[tokio::test]
async fn the_same_message_produces_the_same_payload_twice() {
    // arrange
    let app = spawn_app();
    let message = Message::mandrill(
        email(),
        MandrillOptions {
            tags: vec!["welcome".into()],
            ..MandrillOptions::default()
        },
    )
    .unwrap();

    // act
    let sent = app
        .backend
        .send_messages(&[message.clone(), message])
        .await;

    // assert
    assert_eq!(assert_ok!(sent), Some(2));
    let requests = app.requests();
    assert_eq!(requests[0].body, requests[1].body);
}
