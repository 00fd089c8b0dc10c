use super::*;

#[test]
fn secret_formatting_is_redacted() {
    let s = Secret::new("ya29.super-secret");
    assert_eq!(format!("{s:?}"), "Secret(<redacted>)");
    assert_eq!(s.to_string(), "<redacted>");
    assert!(!format!("{:?}", TokenSource::Static(s.clone())).contains("super-secret"));
    assert_eq!(s.expose(), "ya29.super-secret");
}

#[tokio::test]
async fn file_source_is_reread_every_call() {
    let path = std::env::temp_dir().join(format!("certcraft_token_{}", std::process::id()));
    std::fs::write(&path, "first\n").unwrap();
    let src = TokenSource::File { path: path.clone() };
    assert_eq!(src.resolve().await.unwrap().expose(), "first");

    std::fs::write(&path, "second").unwrap();
    assert_eq!(src.resolve().await.unwrap().expose(), "second");
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn missing_or_blank_sources_fail() {
    let src = TokenSource::Env {
        var: "CERTCRAFT_TEST_TOKEN_THAT_IS_NEVER_SET".to_string(),
    };
    assert!(src.resolve().await.is_err());

    let src = TokenSource::Static(Secret::new("   "));
    assert!(src.resolve().await.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn command_source_takes_trimmed_stdout() {
    let src = TokenSource::Command {
        program: "echo".to_string(),
        args: vec!["tok-123".to_string()],
    };
    assert_eq!(src.resolve().await.unwrap().expose(), "tok-123");

    let failing = TokenSource::Command {
        program: "false".to_string(),
        args: vec![],
    };
    assert!(failing.resolve().await.is_err());
}

#[test]
fn token_source_json_shape() {
    let src: TokenSource = serde_json::from_str(
        r#"{"kind":"command","program":"gcloud","args":["auth","print-access-token"]}"#,
    )
    .unwrap();
    assert_eq!(
        src,
        TokenSource::Command {
            program: "gcloud".to_string(),
            args: vec!["auth".to_string(), "print-access-token".to_string()],
        }
    );
    assert_eq!(
        serde_json::to_value(TokenSource::default()).unwrap(),
        serde_json::json!({"kind":"env","var":"GOOGLE_SHEETS_ACCESS_TOKEN"})
    );
}

#[test]
fn service_account_json_shape() {
    let src: TokenSource =
        serde_json::from_str(r#"{"kind":"service_account","key_env":"GOOGLE_SERVICE_ACCOUNT_KEY"}"#)
            .unwrap();
    assert_eq!(
        src,
        TokenSource::ServiceAccount {
            key_env: "GOOGLE_SERVICE_ACCOUNT_KEY".to_string(),
        }
    );
}

#[tokio::test]
async fn service_account_without_key_fails_before_any_exchange() {
    let src = TokenSource::ServiceAccount {
        key_env: "CERTCRAFT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
    };
    let err = src.resolve().await.unwrap_err();
    assert!(format!("{err:#}").contains("CERTCRAFT_TEST_KEY_THAT_IS_NEVER_SET"));
}
