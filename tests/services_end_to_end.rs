//! Services, config flow and entry lifecycle wired to a real client
//! talking to a mock server.

use std::sync::Arc;

use elevenlabs_custom_tts::flow::{ConfigFlow, OptionsAction, OptionsFlow, ProfileForm};
use elevenlabs_custom_tts::profile::{
    ProfileStore, StoredProfile, SynthesisRequest, VoiceOverrides,
};
use elevenlabs_custom_tts::services::{GenerateVoiceRequest, GetVoicesRequest};
use elevenlabs_custom_tts::sink::Delivery;
use elevenlabs_custom_tts::{ElevenLabsClient, Error, Integration, Services};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const VOICES_BODY: &str = r#"{
  "voices": [
    {"voice_id": "21m00Tcm4TlvDq8ikWAM", "name": "Rachel", "category": "premade",
     "labels": {"accent": "american", "use case": "narration"}},
    {"voice_id": "c1", "name": "Office Clone", "category": "cloned"},
    {"voice_id": "AZnzlk1XvdvUeBnXmlld", "name": "Domi", "category": "premade",
     "labels": {"accent": "american", "description": "strong"}}
  ]
}"#;

async fn server_with_voices() -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/voices")
        .match_header("xi-api-key", "sk_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(VOICES_BODY)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/voices")
        .match_header("xi-api-key", Matcher::Regex("^(?:[^s]|s[^k]).*".into()))
        .with_status(401)
        .with_body(r#"{"detail":{"message":"Invalid API key"}}"#)
        .create_async()
        .await;
    server
}

fn client(server: &ServerGuard, key: &str) -> ElevenLabsClient {
    ElevenLabsClient::builder()
        .api_key(key)
        .base_url(server.url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_get_voices_filters_remote_listing() {
    let server = server_with_voices().await;
    let services = Services::new(
        Arc::new(client(&server, "sk_test")),
        Arc::new(ProfileStore::new()),
    );

    let premade = services
        .get_voices(&GetVoicesRequest {
            voice_type: Some("premade".into()),
            search_text: None,
        })
        .await
        .unwrap();
    let names: Vec<_> = premade.voices.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Rachel", "Domi"]);

    let by_label = services
        .get_voices(&GetVoicesRequest {
            voice_type: None,
            search_text: Some("NARRATION".into()),
        })
        .await
        .unwrap();
    assert_eq!(by_label.voices.len(), 1);
    assert_eq!(by_label.voices[0].voice_id, "21m00Tcm4TlvDq8ikWAM");

    let none = services
        .get_voices(&GetVoicesRequest {
            voice_type: Some("professional".into()),
            search_text: None,
        })
        .await
        .unwrap();
    assert!(none.voices.is_empty());
}

#[tokio::test]
async fn test_generate_voice_with_profile_writes_file() {
    let mut server = server_with_voices().await;
    let mock = server
        .mock("POST", "/v1/text-to-speech/morning-voice")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "text": "Rise and shine",
            "voice_settings": {"stability": 0.25, "speed": 1.25}
        })))
        .with_status(200)
        .with_body(b"mp3-bytes".as_slice())
        .create_async()
        .await;

    let mut profiles = ProfileStore::new();
    profiles
        .add("Morning", StoredProfile::for_voice("morning-voice").with_stability(0.25))
        .unwrap();
    let services = Services::new(Arc::new(client(&server, "sk_test")), Arc::new(profiles));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("morning.mp3");
    let mut request = GenerateVoiceRequest::new("Rise and shine");
    request.voice_profile = Some("Morning".into());
    request.speed = Some(1.25);
    request.output_path = Some(path.clone());

    let response = services.generate_voice(&request).await.unwrap();

    mock.assert_async().await;
    assert!(response.success);
    assert_eq!(response.audio_size, 9);
    assert_eq!(response.parameters.voice_id, "morning-voice");
    assert_eq!(response.delivered_to, Delivery::Written { path: path.clone() });
    assert!(response.audio.is_none());
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"mp3-bytes");
}

#[tokio::test]
async fn test_generate_voice_remote_failure_propagates() {
    let mut server = server_with_voices().await;
    server
        .mock("POST", Matcher::Regex("^/v1/text-to-speech/".into()))
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("busy")
        .create_async()
        .await;

    let services = Services::new(
        Arc::new(client(&server, "sk_test")),
        Arc::new(ProfileStore::new()),
    );
    let err = services
        .generate_voice(&GenerateVoiceRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Remote { status: 503, .. }));
}

#[tokio::test]
async fn test_setup_options_and_unload() {
    let server = server_with_voices().await;

    let err = ConfigFlow::new(&[])
        .submit("bad-key", &client(&server, "bad-key"))
        .await
        .unwrap_err();
    match err {
        Error::Configuration { message, .. } => assert_eq!(message, "invalid_api_key"),
        other => panic!("expected configuration error, got {other:?}"),
    }

    let entry = ConfigFlow::new(&[])
        .submit("sk_test", &client(&server, "sk_test"))
        .await
        .unwrap();
    assert!(entry.options.voice_profiles.is_empty());

    let existing = vec![entry.clone()];
    let err = ConfigFlow::new(&existing)
        .submit("sk_test", &client(&server, "sk_test"))
        .await
        .unwrap_err();
    assert!(err.is_configuration());

    let mut integration = Integration::new();
    integration
        .setup_entry(entry.clone(), Some(&server.url()))
        .unwrap();

    let mut flow = OptionsFlow::new(integration.entry(&entry.entry_id).unwrap());
    let form: ProfileForm = serde_json::from_value(json!({
        "Profile Name": "Evening",
        "Voice ID": "c1",
        "Speech Speed (0.25-4.0)": 0.75
    }))
    .unwrap();
    flow.submit(OptionsAction::AddProfile { form }).unwrap();
    integration
        .update_options(&entry.entry_id, flow.finish())
        .unwrap();

    let request =
        SynthesisRequest::new("hi").with_options(VoiceOverrides::new().with_profile("Evening"));
    let resolved = integration
        .default_services()
        .unwrap()
        .provider()
        .resolve(&request);
    assert_eq!(resolved.voice_id, "c1");
    assert_eq!(resolved.speed, 0.75);

    assert!(integration.unload_entry(&entry.entry_id));
    assert!(!integration.services_registered());
}
