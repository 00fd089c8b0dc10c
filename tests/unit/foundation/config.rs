use std::collections::HashMap;

use super::*;

#[test]
fn empty_json_is_the_default_config() {
    let cfg: AppConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.retry, RetryPolicy::default());
    assert_eq!(cfg.layout.canvas.width, 1200);
}

#[test]
fn env_overrides_take_precedence() {
    let env: HashMap<&str, &str> = [
        ("GOOGLE_SHEET_ID", "abc123"),
        ("GOOGLE_SHEET_NAME", "Peserta"),
        ("CERTCRAFT_TOKEN_ENV", "MY_TOKEN"),
        ("CERTCRAFT_BACKGROUND", "/srv/bg.jpeg"),
        ("CERTCRAFT_FONT", ""),
    ]
    .into_iter()
    .collect();

    let mut cfg = AppConfig::default();
    cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(cfg.sheets.spreadsheet_id.as_deref(), Some("abc123"));
    assert_eq!(cfg.sheets.sheet_name, "Peserta");
    assert_eq!(
        cfg.sheets.token,
        TokenSource::Env {
            var: "MY_TOKEN".to_string()
        }
    );
    assert_eq!(cfg.assets.background, PathBuf::from("/srv/bg.jpeg"));
    // Blank values are ignored.
    assert_eq!(cfg.assets.font, None);
}

#[test]
fn invalid_values_are_config_errors() {
    let cfg: AppConfig = serde_json::from_str(r#"{"retry":{"max_attempts":0}}"#).unwrap();
    assert!(matches!(cfg.validate(), Err(CertError::Config(_))));

    let cfg: AppConfig = serde_json::from_str(r#"{"encode":{"jpeg_quality":101}}"#).unwrap();
    assert!(cfg.validate().is_err());

    let cfg: AppConfig = serde_json::from_str(r#"{"sheets":{"sheet_name":" "}}"#).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn malformed_file_is_a_config_error() {
    let path = std::env::temp_dir().join(format!("certcraft_cfg_{}.json", std::process::id()));
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        AppConfig::from_json_file(&path),
        Err(CertError::Config(_))
    ));
    let _ = std::fs::remove_file(&path);

    assert!(matches!(
        AppConfig::from_json_file(Path::new("/nonexistent/certcraft.json")),
        Err(CertError::Other(_))
    ));
}

#[test]
fn explicit_missing_font_fails_compositor_construction() {
    let mut cfg = AppConfig::default();
    cfg.assets.font = Some(PathBuf::from("/nonexistent/certcraft/font.ttf"));
    assert!(matches!(
        cfg.build_compositor(),
        Err(CertError::ResourceLoad(_))
    ));
}

#[test]
fn partial_text_style_keeps_default_position() {
    let cfg: AppConfig =
        serde_json::from_str(r#"{"layout":{"participant_name":{"font_size_px":48.0}}}"#).unwrap();
    let defaults = LayoutConfig::default();

    assert_eq!(cfg.layout.participant_name.font_size_px, 48.0);
    assert_eq!(cfg.layout.participant_name.position.x, 0.5);
    assert_eq!(cfg.layout.participant_name.position.y, 0.53);
    assert_eq!(cfg.layout.participant_name.stroke, defaults.participant_name.stroke);
    assert_eq!(cfg.layout.affiliation, defaults.affiliation);
    assert_eq!(cfg.layout.canvas, defaults.canvas);
    assert!(cfg.validate().is_ok());
}

#[test]
fn layout_round_trips_and_rejects_unknown_style_keys() {
    let mut layout = LayoutConfig::default();
    layout.affiliation.position.y = 0.7;
    let json = serde_json::to_string(&layout).unwrap();
    let back: LayoutConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, layout);

    assert!(serde_json::from_str::<LayoutConfig>(r#"{"affiliation":{"font_size":20}}"#).is_err());
}

#[test]
fn service_account_key_selects_the_jwt_exchange() {
    let mut cfg = AppConfig::default();
    cfg.apply_env(|k| {
        (k == "GOOGLE_SERVICE_ACCOUNT_KEY").then(|| r#"{"client_email":"x"}"#.to_string())
    });
    assert_eq!(
        cfg.sheets.token,
        TokenSource::ServiceAccount {
            key_env: "GOOGLE_SERVICE_ACCOUNT_KEY".to_string()
        }
    );

    // An explicit token variable still wins.
    let mut cfg = AppConfig::default();
    cfg.apply_env(|k| match k {
        "GOOGLE_SERVICE_ACCOUNT_KEY" => Some("{}".to_string()),
        "CERTCRAFT_TOKEN_ENV" => Some("MY_TOKEN".to_string()),
        _ => None,
    });
    assert_eq!(
        cfg.sheets.token,
        TokenSource::Env {
            var: "MY_TOKEN".to_string()
        }
    );
}
