//! Audio delivery: a playback device, a file, or the caller itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::tts::AudioOutput;
use crate::{Error, ErrorContext, Result};

/// A device that can play synthesized audio. Provided by the host.
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
    fn id(&self) -> &str;
    async fn play(&self, audio: &AudioOutput) -> Result<()>;
}

/// Where a synthesis result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioDestination {
    Playback(String),
    File(PathBuf),
    Inline,
}

impl AudioDestination {
    /// First match wins: playback device, then file path, then inline return.
    pub fn select(playback_device: Option<&str>, output_path: Option<&Path>) -> Self {
        if let Some(device) = playback_device.filter(|d| !d.trim().is_empty()) {
            return Self::Playback(device.to_string());
        }
        if let Some(path) = output_path.filter(|p| !p.as_os_str().is_empty()) {
            return Self::File(path.to_path_buf());
        }
        Self::Inline
    }
}

/// What happened to the audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    Played { device: String },
    Written { path: PathBuf },
    Inline,
}

/// Registry of playback devices plus file output.
#[derive(Clone, Default)]
pub struct AudioSink {
    devices: HashMap<String, Arc<dyn PlaybackDevice>>,
}

impl AudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: Arc<dyn PlaybackDevice>) -> Self {
        self.devices.insert(device.id().to_string(), device);
        self
    }

    pub fn device_ids(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Fail early if `destination` names a device that is not registered.
    pub fn ensure_available(&self, destination: &AudioDestination) -> Result<()> {
        if let AudioDestination::Playback(id) = destination {
            self.device(id)?;
        }
        Ok(())
    }

    fn device(&self, id: &str) -> Result<&Arc<dyn PlaybackDevice>> {
        self.devices.get(id).ok_or_else(|| {
            Error::validation_with_context(
                format!("Unknown playback device '{}'", id),
                ErrorContext::new()
                    .with_field_path("playback_device")
                    .with_source("sink"),
            )
        })
    }

    pub async fn deliver(
        &self,
        destination: &AudioDestination,
        audio: &AudioOutput,
    ) -> Result<Delivery> {
        match destination {
            AudioDestination::Playback(id) => {
                self.device(id)?.play(audio).await?;
                tracing::info!(device = %id, bytes = audio.len(), "audio sent to playback device");
                Ok(Delivery::Played { device: id.clone() })
            }
            AudioDestination::File(path) => {
                write_audio(path, audio).await?;
                tracing::info!(path = %path.display(), bytes = audio.len(), "audio written");
                Ok(Delivery::Written { path: path.clone() })
            }
            AudioDestination::Inline => Ok(Delivery::Inline),
        }
    }
}

async fn write_audio(path: &Path, audio: &AudioOutput) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &audio.data).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::AudioFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSpeaker {
        plays: AtomicUsize,
    }

    #[async_trait]
    impl PlaybackDevice for CountingSpeaker {
        fn id(&self) -> &str {
            "media_player.kitchen"
        }

        async fn play(&self, _audio: &AudioOutput) -> Result<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn audio() -> AudioOutput {
        AudioOutput {
            data: b"ID3audio".to_vec(),
            format: AudioFormat::Mp3,
        }
    }

    #[test]
    fn test_select_precedence() {
        let path = Path::new("/tmp/out.mp3");
        assert_eq!(
            AudioDestination::select(Some("speaker"), Some(path)),
            AudioDestination::Playback("speaker".into())
        );
        assert_eq!(
            AudioDestination::select(None, Some(path)),
            AudioDestination::File(path.to_path_buf())
        );
        assert_eq!(AudioDestination::select(None, None), AudioDestination::Inline);
        assert_eq!(
            AudioDestination::select(Some(" "), Some(Path::new(""))),
            AudioDestination::Inline
        );
    }

    #[tokio::test]
    async fn test_deliver_to_device() {
        let speaker = Arc::new(CountingSpeaker {
            plays: AtomicUsize::new(0),
        });
        let sink = AudioSink::new().with_device(speaker.clone());
        let dest = AudioDestination::Playback("media_player.kitchen".into());
        let delivery = sink.deliver(&dest, &audio()).await.unwrap();
        assert_eq!(
            delivery,
            Delivery::Played {
                device: "media_player.kitchen".into()
            }
        );
        assert_eq!(speaker.plays.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ensure_available() {
        let sink = AudioSink::new().with_device(Arc::new(CountingSpeaker {
            plays: AtomicUsize::new(0),
        }));
        assert!(sink
            .ensure_available(&AudioDestination::Playback("media_player.kitchen".into()))
            .is_ok());
        assert!(sink.ensure_available(&AudioDestination::Inline).is_ok());
        assert!(sink
            .ensure_available(&AudioDestination::Playback("media_player.attic".into()))
            .is_err());
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let err = AudioSink::new()
            .deliver(&AudioDestination::Playback("nope".into()), &audio())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_deliver_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("www").join("tts").join("out.mp3");
        let delivery = AudioSink::new()
            .deliver(&AudioDestination::File(path.clone()), &audio())
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Written { path: path.clone() });
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3audio");
    }
}
